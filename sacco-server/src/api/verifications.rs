//! Verification log API

use axum::{
    Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};
use shared::client::{VerificationPage, VerificationQuery};
use shared::pagination::VERIFICATIONS_PER_PAGE;
use shared::permissions::Capability;

use crate::auth::require_permission;
use crate::db::verifications;
use crate::error::ServiceResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/verifications", get(list))
        .route_layer(middleware::from_fn(require_permission(
            Capability::ViewVerifications,
        )))
}

/// GET /admin/verifications
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<VerificationQuery>,
) -> ServiceResult<Json<VerificationPage>> {
    let page = query.page_params().resolve(VERIFICATIONS_PER_PAGE);
    let (rows, total) = verifications::list(&state.pool, query.search_text(), page).await?;
    Ok(Json(VerificationPage::new(rows, total, page)))
}
