//! Verification log queries

use shared::models::{Member, Verification};
use shared::pagination::Page;
use sqlx::SqlitePool;

use super::like_pattern;

const VERIFICATION_SELECT: &str = "SELECT id, member_id, member_name, member_number, id_number, zone, verified_at FROM verifications";

const SEARCH_FILTER: &str = "(member_name LIKE ?1 ESCAPE '\\' OR member_number LIKE ?1 ESCAPE '\\' OR zone LIKE ?1 ESCAPE '\\')";

/// Snapshot the member as it was confirmed
pub async fn record(pool: &SqlitePool, member: &Member) -> Result<i64, sqlx::Error> {
    let now = shared::util::now_millis();
    let done = sqlx::query(
        "INSERT INTO verifications (member_id, member_name, member_number, id_number, zone, verified_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(member.id)
    .bind(&member.name)
    .bind(&member.member_number)
    .bind(&member.id_number)
    .bind(&member.zone)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(done.last_insert_rowid())
}

pub async fn list(
    pool: &SqlitePool,
    search: Option<&str>,
    page: Page,
) -> Result<(Vec<Verification>, u64), sqlx::Error> {
    let (rows, total) = match search {
        Some(text) => {
            let pattern = like_pattern(text);
            let rows = sqlx::query_as::<_, Verification>(&format!(
                "{VERIFICATION_SELECT} WHERE {SEARCH_FILTER} ORDER BY verified_at DESC, id DESC LIMIT ?2 OFFSET ?3"
            ))
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
            let total: i64 = sqlx::query_scalar(&format!(
                "SELECT COUNT(*) FROM verifications WHERE {SEARCH_FILTER}"
            ))
            .bind(&pattern)
            .fetch_one(pool)
            .await?;
            (rows, total)
        }
        None => {
            let rows = sqlx::query_as::<_, Verification>(&format!(
                "{VERIFICATION_SELECT} ORDER BY verified_at DESC, id DESC LIMIT ?1 OFFSET ?2"
            ))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM verifications")
                .fetch_one(pool)
                .await?;
            (rows, total)
        }
    };
    Ok((rows, total.max(0) as u64))
}
