//! Dashboard statistics API (any signed-in admin)

use axum::{Json, Router, extract::State, routing::get};
use shared::models::Stats;

use crate::db::stats;
use crate::error::ServiceResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/stats", get(get_stats))
}

/// GET /admin/stats
pub async fn get_stats(State(state): State<AppState>) -> ServiceResult<Json<Stats>> {
    let stats = stats::collect(&state.pool).await?;
    Ok(Json(stats))
}
