//! Member API Module

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use shared::permissions::Capability;

use crate::auth::require_permission;
use crate::state::AppState;

/// Member router; spreadsheet uploads are capped at `upload_limit` bytes
pub fn router(upload_limit: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/admin/members/bulk-upload", post(handler::bulk_upload))
        .route("/admin/members/bulk-update", post(handler::bulk_update))
        .layer(DefaultBodyLimit::max(upload_limit));

    Router::new()
        .route("/admin/members", get(handler::list).post(handler::create))
        .route(
            "/admin/members/{id}",
            put(handler::update).delete(handler::delete),
        )
        .route("/admin/members/bulk-delete", post(handler::bulk_delete))
        .merge(uploads)
        .route_layer(middleware::from_fn(require_permission(
            Capability::ManageMembers,
        )))
}
