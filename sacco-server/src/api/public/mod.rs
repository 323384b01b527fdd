//! Public member lookup API (no session)

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::rate_limit::search_rate_limit;
use crate::state::AppState;

pub fn router(state: &AppState) -> Router<AppState> {
    let search = Router::new()
        .route("/search", post(handler::search))
        .route_layer(middleware::from_fn_with_state(state.clone(), search_rate_limit));

    Router::new()
        .route("/verify-details", post(handler::verify_details))
        .route("/submit-correction", post(handler::submit_correction))
        .merge(search)
}
