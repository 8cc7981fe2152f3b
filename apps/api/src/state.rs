use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::keywords::KeywordExtractor;
use crate::llm_client::AtlasClient;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: AtlasClient,
    /// Constructed once in main and shared; never a module-level global.
    pub limiter: Arc<RateLimiter>,
    /// Pluggable keyword backend. Default: FrequencyKeywordExtractor.
    pub keywords: Arc<dyn KeywordExtractor>,
}
