pub mod health;
pub mod stats;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::resumes::handlers as resume_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/upload", post(resume_handlers::handle_upload))
        .route("/api/resumes", get(resume_handlers::handle_list_resumes))
        .route("/api/resumes/:id", get(resume_handlers::handle_get_resume))
        .route(
            "/api/resumes/:id/keywords",
            get(resume_handlers::handle_resume_keywords),
        )
        .route("/api/analyze", post(analysis_handlers::handle_analyze))
        .route(
            "/api/analysis/:id",
            get(analysis_handlers::handle_get_analysis),
        )
        .route("/api/stats", get(stats::stats_handler))
        .with_state(state)
}
