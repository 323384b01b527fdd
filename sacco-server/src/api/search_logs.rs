//! Public search log API (any signed-in admin)

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use shared::client::{SearchLogPage, SearchLogQuery};
use shared::pagination::SEARCH_LOGS_PER_PAGE;

use crate::db::search_logs;
use crate::error::ServiceResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/search-logs", get(list))
}

/// GET /admin/search-logs
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchLogQuery>,
) -> ServiceResult<Json<SearchLogPage>> {
    let page = query.page_params().resolve(SEARCH_LOGS_PER_PAGE);
    let (rows, total) = search_logs::list(&state.pool, query.success.as_bool(), page).await?;
    Ok(Json(SearchLogPage::new(rows, total, page)))
}
