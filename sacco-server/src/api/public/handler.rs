//! Public member lookup handlers

use axum::{Extension, Json, extract::State, http::StatusCode};
use shared::client::{
    CorrectionSubmission, MessageResponse, SearchRequest, SearchResponse, SubmissionResponse,
    VerifyDetailsRequest,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Member;
use sqlx::SqlitePool;

use crate::auth::rate_limit::ClientIp;
use crate::db::{corrections, members, search_logs, verifications};
use crate::error::ServiceError;
use crate::state::AppState;

/// POST /search
///
/// Every attempt that reaches the lookup is logged, found or not.
pub async fn search(
    State(state): State<AppState>,
    Extension(ClientIp(ip)): Extension<ClientIp>,
    Json(req): Json<SearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    let req = req.normalized()?;

    let member = members::find_by_identity(&state.pool, &req.member_number, &req.id_number)
        .await
        .map_err(ServiceError::from)?;

    search_logs::record(
        &state.pool,
        &req.member_number,
        &req.id_number,
        member.is_some(),
        Some(ip.as_str()),
    )
    .await
    .map_err(ServiceError::from)?;

    match member {
        Some(member) => Ok(Json(SearchResponse::found(member))),
        None => {
            tracing::debug!(member_number = %req.member_number, "Public search found no member");
            Ok(Json(SearchResponse::not_found()))
        }
    }
}

/// The member behind `member_id`, provided the number pair still matches it
async fn matching_member(
    pool: &SqlitePool,
    member_id: i64,
    member_number: &str,
    id_number: &str,
) -> AppResult<Member> {
    let member = members::find_by_id(pool, member_id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound))?;

    if member.member_number != member_number.trim() || member.id_number != id_number.trim() {
        return Err(AppError::new(ErrorCode::MemberMismatch));
    }
    Ok(member)
}

/// POST /verify-details
pub async fn verify_details(
    State(state): State<AppState>,
    Json(req): Json<VerifyDetailsRequest>,
) -> AppResult<Json<MessageResponse>> {
    if !req.verified {
        return Err(AppError::validation(
            "Details must be confirmed as correct to record a verification",
        ));
    }

    let member = matching_member(
        &state.pool,
        req.member_id,
        &req.member_number,
        &req.id_number,
    )
    .await?;
    let id = verifications::record(&state.pool, &member)
        .await
        .map_err(ServiceError::from)?;

    tracing::info!(verification_id = id, member_id = member.id, "Member verified details");
    Ok(Json(MessageResponse::new("Thank you for verifying your details")))
}

/// POST /submit-correction
pub async fn submit_correction(
    State(state): State<AppState>,
    Json(req): Json<CorrectionSubmission>,
) -> AppResult<(StatusCode, Json<SubmissionResponse>)> {
    req.validate()?;

    let member = matching_member(
        &state.pool,
        req.member_id,
        &req.member_number,
        &req.id_number,
    )
    .await?;
    let id = corrections::create(&state.pool, member.id, &req)
        .await
        .map_err(ServiceError::from)?;

    tracing::info!(correction_id = id, member_id = member.id, "Correction request submitted");
    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse {
            message: "Correction request submitted successfully".to_string(),
            id: Some(id),
        }),
    ))
}
