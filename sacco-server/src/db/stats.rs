//! Dashboard counters

use shared::models::Stats;
use sqlx::SqlitePool;

pub async fn collect(pool: &SqlitePool) -> Result<Stats, sqlx::Error> {
    let (total_members, total_zones): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COUNT(DISTINCT zone) FROM members")
            .fetch_one(pool)
            .await?;

    let total_verifications: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM verifications")
        .fetch_one(pool)
        .await?;

    let (pending_corrections, resolved_corrections): (i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(status = 'pending'), 0), COALESCE(SUM(status = 'resolved'), 0) FROM correction_requests",
    )
    .fetch_one(pool)
    .await?;

    let (total_searches, successful_searches): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(search_successful), 0) FROM search_logs",
    )
    .fetch_one(pool)
    .await?;

    Ok(Stats {
        total_members,
        total_zones,
        total_verifications,
        pending_corrections,
        resolved_corrections,
        total_searches,
        successful_searches,
        failed_searches: total_searches - successful_searches,
    })
}
