//! Member API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use shared::client::{
    BulkDeleteRequest, BulkDeleteResponse, BulkUpdateReport, BulkUploadReport, MemberPage,
    MemberQuery, MessageResponse,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Member, MemberCreate, MemberUpdate};
use shared::pagination::MEMBERS_PER_PAGE;

use crate::auth::CurrentUser;
use crate::db::members;
use crate::import::{self, Sheet};
use crate::error::ServiceError;
use crate::state::AppState;

/// GET /admin/members
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MemberQuery>,
) -> AppResult<Json<MemberPage>> {
    let page = query.page_params().resolve(MEMBERS_PER_PAGE);
    let (rows, total) = members::list(&state.pool, query.search_text(), page)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(MemberPage::new(rows, total, page)))
}

/// POST /admin/members
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<MemberCreate>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let data = payload.validate()?;
    let member = members::create(&state.pool, &data).await?;
    tracing::info!(
        member_id = member.id,
        member_number = %member.member_number,
        by = %current.username(),
        "Member created"
    );
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /admin/members/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<Member>> {
    let changes = payload.normalize()?;
    if changes.is_empty() {
        let member = members::find_by_id(&state.pool, id)
            .await
            .map_err(ServiceError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound))?;
        return Ok(Json(member));
    }
    let member = members::update(&state.pool, id, &changes).await?;
    Ok(Json(member))
}

/// DELETE /admin/members/{id}
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = members::delete(&state.pool, id)
        .await
        .map_err(ServiceError::from)?;
    if !deleted {
        return Err(AppError::new(ErrorCode::MemberNotFound));
    }
    tracing::info!(member_id = id, by = %current.username(), "Member deleted");
    Ok(Json(MessageResponse::new("Member deleted successfully")))
}

/// POST /admin/members/bulk-delete
///
/// Ids that no longer exist are ignored; `deleted` is the real count.
pub async fn bulk_delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    if req.ids.is_empty() {
        return Err(AppError::validation("No member ids provided"));
    }
    let mut ids = req.ids.clone();
    ids.sort_unstable();
    ids.dedup();

    let deleted = members::delete_many(&state.pool, &ids)
        .await
        .map_err(ServiceError::from)?;
    tracing::info!(
        requested = req.ids.len(),
        deleted,
        by = %current.username(),
        "Members bulk deleted"
    );
    Ok(Json(BulkDeleteResponse {
        deleted,
        requested: req.ids.len() as u64,
    }))
}

/// The `file` part of a multipart upload as (filename, bytes)
async fn read_upload(mut multipart: Multipart) -> AppResult<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().trim().to_string();
        if filename.is_empty() {
            return Err(AppError::new(ErrorCode::NoFileProvided));
        }
        let bytes = field.bytes().await.map_err(upload_error)?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(AppError::new(ErrorCode::NoFileProvided))
}

fn upload_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::FileTooLarge)
    } else {
        AppError::invalid_request(err.body_text())
    }
}

/// POST /admin/members/bulk-upload
pub async fn bulk_upload(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<BulkUploadReport>> {
    let (filename, bytes) = read_upload(multipart).await?;
    let sheet = Sheet::parse(&filename, &bytes)?;
    tracing::info!(
        filename = %filename,
        rows = sheet.len(),
        by = %current.username(),
        "Bulk member upload"
    );
    let report = import::import_members(&state.pool, &sheet).await?;
    Ok(Json(report))
}

/// POST /admin/members/bulk-update
pub async fn bulk_update(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<BulkUpdateReport>> {
    let (filename, bytes) = read_upload(multipart).await?;
    let sheet = Sheet::parse(&filename, &bytes)?;
    tracing::info!(
        filename = %filename,
        rows = sheet.len(),
        by = %current.username(),
        "Bulk member update"
    );
    let report = import::update_members(&state.pool, &sheet).await?;
    Ok(Json(report))
}
