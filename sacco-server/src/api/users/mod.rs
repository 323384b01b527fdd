//! Admin User API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};
use shared::permissions::Capability;

use crate::auth::require_permission;
use crate::state::AppState;

/// Only `manage_users` holders reach these routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handler::list).post(handler::create))
        .route(
            "/admin/users/{id}",
            patch(handler::update).delete(handler::delete),
        )
        .route_layer(middleware::from_fn(require_permission(
            Capability::ManageUsers,
        )))
}
