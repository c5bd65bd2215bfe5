use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;

use crate::client_ip::client_ip;
use crate::metrics::{RATE_LIMITED, RATE_LIMITER_ENTRIES};
use crate::state::AppState;

// Rate limit entry - tracks requests per client ip
pub struct RateLimitEntry {
    pub count: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited,
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

// Fixed window limiter shared by every route.
// entry() holds the shard write lock for the whole check-and-increment,
// so concurrent requests from one client are serialized.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                window_start: now,
            });

        // window elapsed? start a new one with this request
        if now.saturating_duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count < self.max_requests {
            entry.count += 1;
            return RateDecision::Allowed {
                remaining: self.max_requests - entry.count,
            };
        }

        RateDecision::Limited
    }

    // Drops entries whose window is over; they would be reset on the next hit anyway
    pub fn purge_stale(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.window_start) < self.window);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn rejection_message(&self) -> String {
        let minutes = self.window.as_secs().div_ceil(60).max(1);
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        format!(
            "Too many requests from this IP, please try again after {} {}",
            minutes, unit
        )
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    let decision = state.rate_limiter.check(&ip);
    RATE_LIMITER_ENTRIES.set(state.rate_limiter.len() as f64);

    if let RateDecision::Limited = decision {
        RATE_LIMITED.inc();
        tracing::warn!(client = %ip, path = %req.uri().path(), "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            state.rate_limiter.rejection_message(),
        )
            .into_response();
    }

    next.run(req).await
}

// Sweeps expired windows once per window length
pub async fn purge_task(limiter: Arc<RateLimiter>) {
    let mut interval = interval(limiter.window().max(Duration::from_secs(1)));

    loop {
        interval.tick().await;

        let removed = limiter.purge_stale(Instant::now());
        RATE_LIMITER_ENTRIES.set(limiter.len() as f64);
        if removed > 0 {
            tracing::debug!(removed, remaining = limiter.len(), "purged stale rate limit entries");
        }
    }
}
