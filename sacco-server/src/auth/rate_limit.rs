//! Per-IP rate limiting for login and public search
//!
//! Each (route, IP) pair gets a fixed window sized by its [`RateLimit`] from
//! [`Config`]. Rejected requests are not counted and receive `429` with a
//! `Retry-After` header holding the seconds left in the window.

use axum::{
    extract::{Request, State},
    http::{Extensions, HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::Config;
use crate::security_log;
use crate::state::AppState;

/// Routes with their own budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitedRoute {
    Login,
    Search,
}

impl LimitedRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Search => "search",
        }
    }
}

/// `max_requests` per `window`, written `<requests>/<seconds>` in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimit {
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.max_requests, self.window.as_secs())
    }
}

impl FromStr for RateLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (requests, secs) = s
            .split_once('/')
            .ok_or_else(|| format!("expected <requests>/<seconds>, got {s:?}"))?;
        let requests: u32 = requests
            .trim()
            .parse()
            .map_err(|_| format!("invalid request count in {s:?}"))?;
        let secs: u64 = secs
            .trim()
            .parse()
            .map_err(|_| format!("invalid window in {s:?}"))?;
        if requests == 0 || secs == 0 {
            return Err(format!("rate limit {s:?} must be positive"));
        }
        Ok(Self::new(requests, secs))
    }
}

/// Result of counting one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Limited { retry_after: Duration },
}

struct Window {
    hits: u32,
    opened: Instant,
}

/// Client address resolved by the rate limit layer, readable by handlers
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

#[derive(Clone)]
pub struct RateLimiter {
    login: RateLimit,
    search: RateLimit,
    windows: Arc<Mutex<HashMap<(LimitedRoute, String), Window>>>,
}

impl RateLimiter {
    pub fn new(login: RateLimit, search: RateLimit) -> Self {
        Self {
            login,
            search,
            windows: Arc::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.login_rate_limit, config.search_rate_limit)
    }

    pub fn limit(&self, route: LimitedRoute) -> RateLimit {
        match route {
            LimitedRoute::Login => self.login,
            LimitedRoute::Search => self.search,
        }
    }

    /// Count a request from `ip` unless its window is already full
    pub async fn admit(&self, route: LimitedRoute, ip: &str) -> Admission {
        let limit = self.limit(route);
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry((route, ip.to_owned()))
            .or_insert(Window { hits: 0, opened: now });

        if now.duration_since(window.opened) >= limit.window {
            window.hits = 0;
            window.opened = now;
        }
        if window.hits >= limit.max_requests {
            let elapsed = now.duration_since(window.opened);
            return Admission::Limited {
                retry_after: limit.window.saturating_sub(elapsed),
            };
        }
        window.hits += 1;
        Admission::Allowed
    }

    /// Drop windows that have closed; returns how many were removed
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|(route, _), window| {
            now.duration_since(window.opened) < self.limit(*route).window
        });
        before - windows.len()
    }
}

/// First `X-Forwarded-For` entry, then the peer address
pub fn extract_ip(headers: &HeaderMap, extensions: &Extensions) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_owned();
    }

    extensions
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn too_many_requests(retry_after: Duration) -> Response {
    // round up so clients never retry inside the window
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    let mut response = AppError::new(ErrorCode::TooManyRequests).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
    response
}

async fn limited(
    state: &AppState,
    route: LimitedRoute,
    mut request: Request,
    next: Next,
) -> Response {
    let ip = extract_ip(request.headers(), request.extensions());
    if let Admission::Limited { retry_after } = state.rate_limiter.admit(route, &ip).await {
        security_log!(
            "WARN",
            "rate_limited",
            route = route.as_str(),
            ip = ip.clone(),
            retry_after_secs = retry_after.as_secs()
        );
        return too_many_requests(retry_after);
    }
    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}

/// `LOGIN_RATE_LIMIT` attempts per IP
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    limited(&state, LimitedRoute::Login, request, next).await
}

/// `SEARCH_RATE_LIMIT` public searches per IP
pub async fn search_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    limited(&state, LimitedRoute::Search, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimit::new(3, 60), RateLimit::new(1, 10))
    }

    #[tokio::test(start_paused = true)]
    async fn budget_is_per_route_and_ip() {
        let limiter = limiter();
        for _ in 0..3 {
            assert_eq!(limiter.admit(LimitedRoute::Login, "10.0.0.1").await, Admission::Allowed);
        }
        assert!(matches!(
            limiter.admit(LimitedRoute::Login, "10.0.0.1").await,
            Admission::Limited { .. }
        ));
        assert_eq!(limiter.admit(LimitedRoute::Login, "10.0.0.2").await, Admission::Allowed);
        assert_eq!(limiter.admit(LimitedRoute::Search, "10.0.0.1").await, Admission::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_counts_down_and_window_reopens() {
        let limiter = limiter();
        assert_eq!(limiter.admit(LimitedRoute::Search, "10.0.0.1").await, Admission::Allowed);

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(
            limiter.admit(LimitedRoute::Search, "10.0.0.1").await,
            Admission::Limited {
                retry_after: Duration::from_secs(6)
            }
        );

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(limiter.admit(LimitedRoute::Search, "10.0.0.1").await, Admission::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_drops_only_closed_windows() {
        let limiter = limiter();
        limiter.admit(LimitedRoute::Search, "10.0.0.1").await;
        limiter.admit(LimitedRoute::Login, "10.0.0.1").await;

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(limiter.cleanup().await, 1);
        // login window (60 s) is still open
        assert_eq!(limiter.admit(LimitedRoute::Login, "10.0.0.1").await, Admission::Allowed);
        assert_eq!(limiter.admit(LimitedRoute::Login, "10.0.0.1").await, Admission::Allowed);
        assert!(matches!(
            limiter.admit(LimitedRoute::Login, "10.0.0.1").await,
            Admission::Limited { .. }
        ));
    }

    #[test]
    fn parses_requests_per_window() {
        assert_eq!("30/60".parse::<RateLimit>(), Ok(RateLimit::new(30, 60)));
        assert_eq!(" 5 / 120 ".parse::<RateLimit>(), Ok(RateLimit::new(5, 120)));
        assert_eq!(RateLimit::new(5, 60).to_string(), "5/60");
        assert!("30".parse::<RateLimit>().is_err());
        assert!("0/60".parse::<RateLimit>().is_err());
        assert!("ten/60".parse::<RateLimit>().is_err());
    }

    #[test]
    fn retry_after_header_rounds_up() {
        let response = too_many_requests(Duration::from_millis(1500));
        assert_eq!(response.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }

    #[test]
    fn forwarded_for_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.9 , 10.0.0.1"),
        );
        assert_eq!(extract_ip(&headers, &Extensions::new()), "203.0.113.9");
        assert_eq!(extract_ip(&HeaderMap::new(), &Extensions::new()), "unknown");
    }
}
