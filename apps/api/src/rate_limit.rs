//! Per-client request rate limiting.
//!
//! Each `(client, endpoint class)` pair owns a time-ordered queue of accepted
//! request instants; a request is allowed while fewer than the policy limit
//! remain inside the trailing window. The limiter is a plain value owned by
//! the composition root and injected through `AppState` — there is no global
//! instance. All operations are synchronous and bounded; the internal mutex
//! is never held across an await point.
//!
//! State is process-lifetime only and resets on restart.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::errors::AppError;

/// How often idle clients are swept out of the map.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy)]
pub struct RatePolicy {
    pub requests: usize,
    pub window: Duration,
}

/// Logical endpoint classes, each with its own fixed policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    Upload,
    Analysis,
    Health,
    Default,
}

impl EndpointClass {
    pub fn policy(self) -> RatePolicy {
        match self {
            EndpointClass::Upload => RatePolicy {
                requests: 10,
                window: Duration::from_secs(60),
            },
            EndpointClass::Analysis => RatePolicy {
                requests: 5,
                window: Duration::from_secs(300),
            },
            EndpointClass::Health => RatePolicy {
                requests: 120,
                window: Duration::from_secs(60),
            },
            EndpointClass::Default => RatePolicy {
                requests: 60,
                window: Duration::from_secs(60),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EndpointClass::Upload => "upload",
            EndpointClass::Analysis => "analysis",
            EndpointClass::Health => "health",
            EndpointClass::Default => "default",
        }
    }
}

struct LimiterState {
    clients: HashMap<(String, EndpointClass), VecDeque<Instant>>,
    last_sweep: Instant,
}

pub struct RateLimiter {
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LimiterState {
                clients: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Checks the request against the class policy, returning the 429 error
    /// (with a retry-after hint) on rejection. Never blocks or waits.
    pub fn check(&self, client_id: &str, class: EndpointClass) -> Result<(), AppError> {
        let now = Instant::now();
        if self.is_allowed_at(client_id, class, now) {
            Ok(())
        } else {
            Err(AppError::RateLimited {
                scope: class.as_str(),
                retry_after: self.retry_after_at(client_id, class, now),
            })
        }
    }

    pub fn is_allowed(&self, client_id: &str, class: EndpointClass) -> bool {
        self.is_allowed_at(client_id, class, Instant::now())
    }

    /// Seconds until the oldest retained request ages out of the window.
    pub fn retry_after(&self, client_id: &str, class: EndpointClass) -> u64 {
        self.retry_after_at(client_id, class, Instant::now())
    }

    fn is_allowed_at(&self, client_id: &str, class: EndpointClass, now: Instant) -> bool {
        let policy = class.policy();
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");

        if now.duration_since(state.last_sweep) >= SWEEP_INTERVAL {
            sweep_idle(&mut state.clients, now);
            state.last_sweep = now;
        }

        let queue = state
            .clients
            .entry((client_id.to_string(), class))
            .or_default();

        while queue.front().is_some_and(|&t| t + policy.window <= now) {
            queue.pop_front();
        }

        if queue.len() >= policy.requests {
            return false;
        }

        queue.push_back(now);
        true
    }

    fn retry_after_at(&self, client_id: &str, class: EndpointClass, now: Instant) -> u64 {
        let policy = class.policy();
        let state = self.state.lock().expect("rate limiter mutex poisoned");

        let Some(queue) = state.clients.get(&(client_id.to_string(), class)) else {
            return 0;
        };
        let Some(&oldest) = queue.front() else {
            return 0;
        };

        let remaining = (oldest + policy.window).saturating_duration_since(now);
        // Round up so a fresh rejection never advertises a zero-second wait.
        if remaining.subsec_nanos() > 0 {
            remaining.as_secs() + 1
        } else {
            remaining.as_secs()
        }
    }

    #[cfg(test)]
    fn tracked_entries(&self) -> usize {
        self.state
            .lock()
            .expect("rate limiter mutex poisoned")
            .clients
            .len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rate-limit identity of a connection. The peer IP, not the full address:
/// ports churn per connection.
pub fn client_id(addr: &SocketAddr) -> String {
    addr.ip().to_string()
}

fn sweep_idle(clients: &mut HashMap<(String, EndpointClass), VecDeque<Instant>>, now: Instant) {
    clients.retain(|(_, class), queue| {
        let window = class.policy().window;
        queue.back().is_some_and(|&newest| newest + window > now)
    });
}
