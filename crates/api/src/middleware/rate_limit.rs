//! Fixed-window rate limiting for mutating routes.
//!
//! Callers are keyed by user id when authenticated, otherwise by client
//! address. Windows live in a [`RateLimitStore`]; the in-memory store is
//! swept by [`run_janitor`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use stockwise_shared::{AppError, Claims};
use stockwise_shared::config::RateLimitConfig;

use crate::AppState;
use crate::error::ApiError;

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Under the limit.
    Allowed {
        /// Requests left in the current window.
        remaining: u32,
    },
    /// Over the limit until the window resets.
    Limited {
        /// Time until the window resets.
        retry_after: Duration,
    },
}

/// Storage for per-caller request windows.
pub trait RateLimitStore: Send + Sync {
    /// Counts one request for `key` at `now`.
    fn hit(&self, key: &str, now: Instant) -> RateDecision;

    /// Drops windows that ended before `now`. Returns how many were dropped.
    fn sweep(&self, now: Instant) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// In-memory [`RateLimitStore`] backed by a `DashMap`.
#[derive(Debug)]
pub struct InMemoryRateLimitStore {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window: Duration,
}

impl InMemoryRateLimitStore {
    /// Creates a store allowing `max_requests` per `window`.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests: max_requests.max(1),
            window,
        }
    }

    /// Creates a store from configuration.
    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Number of tracked callers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no caller is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn hit(&self, key: &str, now: Instant) -> RateDecision {
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            return RateDecision::Limited { retry_after };
        }

        entry.count += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    fn sweep(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        before.saturating_sub(self.windows.len())
    }
}

/// Rate limit key: user id if authenticated, else client address.
fn caller_key(request: &Request) -> String {
    if let Some(claims) = request.extensions().get::<Claims>() {
        return format!("user:{}", claims.user_id());
    }

    if let Some(ip) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return format!("ip:{ip}");
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(
            || "ip:unknown".to_string(),
            |ConnectInfo(addr)| format!("ip:{}", addr.ip()),
        )
}

fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Rejects mutating requests over the caller's limit with 429.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !is_mutating(request.method()) {
        return next.run(request).await;
    }

    let key = caller_key(&request);
    match state.rate_limiter.hit(&key, Instant::now()) {
        RateDecision::Allowed { .. } => next.run(request).await,
        RateDecision::Limited { retry_after } => {
            tracing::warn!(%key, retry_after_secs = retry_after.as_secs(), "rate limit exceeded");
            // Round up so clients never retry inside the window
            let retry_after_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            ApiError::from(AppError::RateLimited { retry_after_secs }).into_response()
        }
    }
}

/// Sweeps expired windows every `interval`. Runs until the task is dropped.
pub async fn run_janitor(store: Arc<dyn RateLimitStore>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
    loop {
        ticker.tick().await;
        let dropped = store.sweep(Instant::now());
        if dropped > 0 {
            tracing::debug!(dropped, "rate limit windows swept");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_allows_up_to_limit() {
        let store = InMemoryRateLimitStore::new(3, WINDOW);
        let now = Instant::now();

        assert_eq!(store.hit("a", now), RateDecision::Allowed { remaining: 2 });
        assert_eq!(store.hit("a", now), RateDecision::Allowed { remaining: 1 });
        assert_eq!(store.hit("a", now), RateDecision::Allowed { remaining: 0 });
        assert_eq!(
            store.hit("a", now + Duration::from_secs(10)),
            RateDecision::Limited {
                retry_after: Duration::from_secs(50)
            }
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let store = InMemoryRateLimitStore::new(1, WINDOW);
        let now = Instant::now();

        assert!(matches!(store.hit("a", now), RateDecision::Allowed { .. }));
        assert!(matches!(store.hit("b", now), RateDecision::Allowed { .. }));
        assert!(matches!(store.hit("a", now), RateDecision::Limited { .. }));
    }

    #[test]
    fn test_window_resets() {
        let store = InMemoryRateLimitStore::new(1, WINDOW);
        let now = Instant::now();

        store.hit("a", now);
        assert!(matches!(store.hit("a", now), RateDecision::Limited { .. }));
        assert!(matches!(
            store.hit("a", now + WINDOW),
            RateDecision::Allowed { .. }
        ));
    }

    #[test]
    fn test_sweep_drops_expired_windows() {
        let store = InMemoryRateLimitStore::new(5, WINDOW);
        let now = Instant::now();

        store.hit("old", now);
        store.hit("new", now + Duration::from_secs(30));

        assert_eq!(store.sweep(now + Duration::from_secs(61)), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.sweep(now + Duration::from_secs(200)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_caller_key_prefers_user() {
        let user_id = uuid::Uuid::new_v4();
        let mut request = Request::builder()
            .header("x-forwarded-for", "10.0.0.1, 10.0.0.2")
            .body(Body::empty())
            .expect("request");
        assert_eq!(caller_key(&request), "ip:10.0.0.1");

        request.extensions_mut().insert(Claims::new(
            user_id,
            "cashier",
            chrono::Utc::now() + chrono::Duration::minutes(5),
        ));
        assert_eq!(caller_key(&request), format!("user:{user_id}"));
    }

    #[test]
    fn test_only_mutations_are_limited() {
        assert!(!is_mutating(&Method::GET));
        assert!(is_mutating(&Method::POST));
        assert!(is_mutating(&Method::PATCH));
        assert!(is_mutating(&Method::DELETE));
    }
}
