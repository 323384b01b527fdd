//! Public search log queries

use shared::models::SearchLog;
use shared::pagination::Page;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub async fn record(
    pool: &SqlitePool,
    member_number: &str,
    id_number: &str,
    successful: bool,
    ip_address: Option<&str>,
) -> Result<(), sqlx::Error> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO search_logs (member_number, id_number, search_successful, ip_address, searched_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(member_number)
    .bind(id_number)
    .bind(successful)
    .bind(ip_address)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, success: Option<bool>) {
    if let Some(success) = success {
        builder.push(" WHERE search_successful = ").push_bind(success);
    }
}

pub async fn list(
    pool: &SqlitePool,
    success: Option<bool>,
    page: Page,
) -> Result<(Vec<SearchLog>, u64), sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, member_number, id_number, search_successful, ip_address, searched_at FROM search_logs",
    );
    push_filter(&mut builder, success);
    builder
        .push(" ORDER BY searched_at DESC, id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = builder.build_query_as::<SearchLog>().fetch_all(pool).await?;

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM search_logs");
    push_filter(&mut count, success);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    Ok((rows, total.max(0) as u64))
}
