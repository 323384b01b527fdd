//! Correction Request API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use shared::client::{CorrectionExportQuery, CorrectionFilter, CorrectionPage, CorrectionQuery};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::CorrectionRequest;
use shared::pagination::CORRECTIONS_PER_PAGE;

use crate::auth::CurrentUser;
use crate::db::corrections;
use crate::pdf;
use crate::error::ServiceError;
use crate::state::AppState;

/// GET /admin/corrections
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CorrectionQuery>,
) -> AppResult<Json<CorrectionPage>> {
    let page = query.page_params().resolve(CORRECTIONS_PER_PAGE);
    let (rows, total) = corrections::list(&state.pool, query.status, query.search_text(), page)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(CorrectionPage::new(rows, total, page)))
}

/// POST /admin/corrections/{id}/resolve
pub async fn resolve(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<CorrectionRequest>> {
    let correction = corrections::resolve(&state.pool, id, current.username()).await?;
    tracing::info!(
        correction_id = id,
        by = %current.username(),
        "Correction request resolved"
    );
    Ok(Json(correction))
}

fn pdf_attachment(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /admin/corrections/{id}/download-pdf
pub async fn download_pdf(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let correction = corrections::find_by_id(&state.pool, id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::CorrectionNotFound))?;

    let bytes = pdf::render(
        &format!("Correction Request {id}"),
        std::slice::from_ref(&correction),
    )?;
    Ok(pdf_attachment(&pdf::single_filename(id), bytes))
}

/// GET /admin/corrections/download-all-pdf?status=
pub async fn download_all_pdf(
    State(state): State<AppState>,
    Query(query): Query<CorrectionExportQuery>,
) -> AppResult<Response> {
    let rows = corrections::list_all(&state.pool, query.status)
        .await
        .map_err(ServiceError::from)?;

    let title = match query.status {
        CorrectionFilter::All => "All Correction Requests",
        CorrectionFilter::Pending => "Pending Correction Requests",
        CorrectionFilter::Resolved => "Resolved Correction Requests",
    };
    let bytes = pdf::render(title, &rows)?;
    let filename = pdf::export_filename(chrono::Local::now().date_naive());
    Ok(pdf_attachment(&filename, bytes))
}
