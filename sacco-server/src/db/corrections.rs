//! Correction request queries

use shared::client::{CorrectionFilter, CorrectionSubmission};
use shared::error::{AppError, ErrorCode};
use shared::models::{CorrectionRequest, CorrectionStatus};
use shared::pagination::Page;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::like_pattern;
use crate::error::ServiceResult;

const CORRECTION_COLUMNS: &str = "id, member_id, member_number, id_number, current_name, current_zone, current_status, correct_name, correct_zone, email, phone, additional_notes, status, submitted_at, resolved_at, resolved_by";

fn blank_to_none(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn create(
    pool: &SqlitePool,
    member_id: i64,
    data: &CorrectionSubmission,
) -> Result<i64, sqlx::Error> {
    let now = shared::util::now_millis();
    let done = sqlx::query(
        "INSERT INTO correction_requests (member_id, member_number, id_number, current_name, current_zone, current_status, correct_name, correct_zone, email, phone, additional_notes, status, submitted_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 'pending', ?12)",
    )
    .bind(member_id)
    .bind(data.member_number.trim())
    .bind(data.id_number.trim())
    .bind(&data.current_name)
    .bind(&data.current_zone)
    .bind(&data.current_status)
    .bind(blank_to_none(&data.correct_name))
    .bind(blank_to_none(&data.correct_zone))
    .bind(blank_to_none(&data.email))
    .bind(blank_to_none(&data.phone))
    .bind(blank_to_none(&data.additional_notes))
    .bind(now)
    .execute(pool)
    .await?;
    Ok(done.last_insert_rowid())
}

fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Sqlite>,
    filter: CorrectionFilter,
    search: Option<&str>,
) {
    let mut has_where = false;
    let status = match filter {
        CorrectionFilter::All => None,
        CorrectionFilter::Pending => Some(CorrectionStatus::Pending),
        CorrectionFilter::Resolved => Some(CorrectionStatus::Resolved),
    };
    if let Some(status) = status {
        builder.push(" WHERE status = ").push_bind(status);
        has_where = true;
    }
    if let Some(text) = search {
        let pattern = like_pattern(text);
        builder.push(if has_where { " AND (" } else { " WHERE (" });
        for (i, column) in ["member_number", "current_name", "email", "phone"]
            .iter()
            .enumerate()
        {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push(*column)
                .push(" LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        builder.push(")");
    }
}

pub async fn list(
    pool: &SqlitePool,
    filter: CorrectionFilter,
    search: Option<&str>,
    page: Page,
) -> Result<(Vec<CorrectionRequest>, u64), sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {CORRECTION_COLUMNS} FROM correction_requests"
    ));
    push_filters(&mut builder, filter, search);
    builder
        .push(" ORDER BY submitted_at DESC, id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = builder
        .build_query_as::<CorrectionRequest>()
        .fetch_all(pool)
        .await?;

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM correction_requests");
    push_filters(&mut count, filter, search);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    Ok((rows, total.max(0) as u64))
}

/// Every request matching `filter`, oldest first (PDF export)
pub async fn list_all(
    pool: &SqlitePool,
    filter: CorrectionFilter,
) -> Result<Vec<CorrectionRequest>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {CORRECTION_COLUMNS} FROM correction_requests"
    ));
    push_filters(&mut builder, filter, None);
    builder.push(" ORDER BY submitted_at ASC, id ASC");
    builder
        .build_query_as::<CorrectionRequest>()
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<CorrectionRequest>, sqlx::Error> {
    sqlx::query_as::<_, CorrectionRequest>(&format!(
        "SELECT {CORRECTION_COLUMNS} FROM correction_requests WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// pending -> resolved; a second resolve is a conflict
pub async fn resolve(
    pool: &SqlitePool,
    id: i64,
    resolved_by: &str,
) -> ServiceResult<CorrectionRequest> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE correction_requests SET status = 'resolved', resolved_at = ?1, resolved_by = ?2 WHERE id = ?3 AND status = 'pending'",
    )
    .bind(now)
    .bind(resolved_by)
    .bind(id)
    .execute(pool)
    .await?;

    let current = find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CorrectionNotFound))?;

    if rows.rows_affected() == 0 {
        return Err(AppError::new(ErrorCode::CorrectionAlreadyResolved).into());
    }
    Ok(current)
}
