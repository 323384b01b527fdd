//! Correction Request API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use shared::permissions::Capability;

use crate::auth::require_permission;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // Viewing and exporting: view_corrections
    let read_routes = Router::new()
        .route("/admin/corrections", get(handler::list))
        .route(
            "/admin/corrections/download-all-pdf",
            get(handler::download_all_pdf),
        )
        .route(
            "/admin/corrections/{id}/download-pdf",
            get(handler::download_pdf),
        )
        .route_layer(middleware::from_fn(require_permission(
            Capability::ViewCorrections,
        )));

    // Resolving: manage_corrections
    let manage_routes = Router::new()
        .route("/admin/corrections/{id}/resolve", post(handler::resolve))
        .route_layer(middleware::from_fn(require_permission(
            Capability::ManageCorrections,
        )));

    read_routes.merge(manage_routes)
}
