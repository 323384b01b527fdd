//! Auth API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::rate_limit::login_rate_limit;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/auth/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    Router::new()
        .route("/auth/logout", post(handler::logout))
        .route("/auth/me", get(handler::me))
        .merge(login)
}
