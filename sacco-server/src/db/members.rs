//! Member queries

use shared::error::{AppError, ErrorCode};
use shared::models::{Member, MemberChanges, NewMember};
use shared::pagination::Page;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::like_pattern;
use crate::error::{ServiceResult, is_unique_violation};

const MEMBER_SELECT: &str = "SELECT id, name, member_number, id_number, zone, status, created_at, updated_at FROM members";

const SEARCH_FILTER: &str = "(name LIKE ?1 ESCAPE '\\' OR member_number LIKE ?1 ESCAPE '\\' OR id_number LIKE ?1 ESCAPE '\\' OR zone LIKE ?1 ESCAPE '\\')";

/// One page of members (newest first) and the total matching `search`
pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    page: Page,
) -> Result<(Vec<Member>, u64), sqlx::Error> {
    let (rows, total) = match search {
        Some(text) => {
            let pattern = like_pattern(text);
            let sql = format!(
                "{MEMBER_SELECT} WHERE {SEARCH_FILTER} ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
            );
            let rows = sqlx::query_as::<_, Member>(&sql)
                .bind(&pattern)
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(pool)
                .await?;
            let total: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM members WHERE {SEARCH_FILTER}"))
                    .bind(&pattern)
                    .fetch_one(pool)
                    .await?;
            (rows, total)
        }
        None => {
            let sql =
                format!("{MEMBER_SELECT} ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2");
            let rows = sqlx::query_as::<_, Member>(&sql)
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(pool)
                .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
                .fetch_one(pool)
                .await?;
            (rows, total)
        }
    };
    Ok((rows, total.max(0) as u64))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Member>, sqlx::Error> {
    sqlx::query_as::<_, Member>(&format!("{MEMBER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Exact match on both identifiers, as used by the public lookup
pub async fn find_by_identity(
    pool: &SqlitePool,
    member_number: &str,
    id_number: &str,
) -> Result<Option<Member>, sqlx::Error> {
    sqlx::query_as::<_, Member>(&format!(
        "{MEMBER_SELECT} WHERE member_number = ? AND id_number = ?"
    ))
    .bind(member_number)
    .bind(id_number)
    .fetch_optional(pool)
    .await
}

pub async fn create(pool: &SqlitePool, data: &NewMember) -> ServiceResult<Member> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "INSERT INTO members (name, member_number, id_number, zone, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )
    .bind(&data.name)
    .bind(&data.member_number)
    .bind(&data.id_number)
    .bind(&data.zone)
    .bind(data.status)
    .bind(now)
    .execute(pool)
    .await;

    let id = match result {
        Ok(done) => done.last_insert_rowid(),
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::new(ErrorCode::MemberNumberExists)
                .with_detail("member_number", data.member_number.clone())
                .into());
        }
        Err(e) => return Err(e.into()),
    };

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::database("Failed to create member").into())
}

pub async fn update(pool: &SqlitePool, id: i64, changes: &MemberChanges) -> ServiceResult<Member> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "UPDATE members SET name = COALESCE(?1, name), member_number = COALESCE(?2, member_number), id_number = COALESCE(?3, id_number), zone = COALESCE(?4, zone), status = COALESCE(?5, status), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&changes.name)
    .bind(&changes.member_number)
    .bind(&changes.id_number)
    .bind(&changes.zone)
    .bind(changes.status)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            return Err(AppError::new(ErrorCode::MemberNotFound).into());
        }
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::new(ErrorCode::MemberNumberExists).into());
        }
        Err(e) => return Err(e.into()),
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MemberNotFound).into())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query("DELETE FROM members WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Delete every id that still exists; returns the number actually removed
pub async fn delete_many(pool: &SqlitePool, ids: &[i64]) -> Result<u64, sqlx::Error> {
    if ids.is_empty() {
        return Ok(0);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM members WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    let rows = builder.build().execute(pool).await?;
    Ok(rows.rows_affected())
}

/// Insert unless the member number is taken; `false` means skipped
pub async fn insert_if_absent(
    conn: &mut SqliteConnection,
    data: &NewMember,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "INSERT INTO members (name, member_number, id_number, zone, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) ON CONFLICT(member_number) DO NOTHING",
    )
    .bind(&data.name)
    .bind(&data.member_number)
    .bind(&data.id_number)
    .bind(&data.zone)
    .bind(data.status)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Apply non-blank changes to the member with `member_number`; `false` when absent
pub async fn update_by_number(
    conn: &mut SqliteConnection,
    member_number: &str,
    changes: &MemberChanges,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE members SET name = COALESCE(?1, name), id_number = COALESCE(?2, id_number), zone = COALESCE(?3, zone), status = COALESCE(?4, status), updated_at = ?5 WHERE member_number = ?6",
    )
    .bind(&changes.name)
    .bind(&changes.id_number)
    .bind(&changes.zone)
    .bind(changes.status)
    .bind(now)
    .bind(member_number)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn exists_number(
    conn: &mut SqliteConnection,
    member_number: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM members WHERE member_number = ?")
        .bind(member_number)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}
