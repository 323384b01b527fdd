//! HTTP API
//!
//! | Prefix | Access |
//! |--------|--------|
//! | `/health`, `/search`, `/verify-details`, `/submit-correction` | public |
//! | `/auth/*` | public login, session for the rest |
//! | `/admin/*` | session + role capability |

pub mod auth;
pub mod corrections;
pub mod health;
pub mod members;
pub mod public;
pub mod search_logs;
pub mod stats;
pub mod users;
pub mod verifications;

use axum::{Router, middleware};
use http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::state::AppState;

/// Admin routes; every one requires a session
fn admin_router(state: &AppState) -> Router<AppState> {
    let upload_limit = state.config.max_upload_bytes;
    Router::new()
        .merge(members::router(upload_limit))
        .merge(users::router())
        .merge(verifications::router())
        .merge(corrections::router())
        .merge(search_logs::router())
        .merge(stats::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// Every route, no outer middleware
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router(state))
        .merge(public::router(state))
        .merge(admin_router(state))
}

/// Credentialed CORS for the configured frontend origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Fully configured application, used by both the server and tests
pub fn build_app(state: AppState) -> Router {
    build_router(&state)
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
