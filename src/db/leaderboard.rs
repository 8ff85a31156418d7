use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::User;

/// One row of the daily leaderboard. Derived at read time, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct DailyLeaderboardEntry {
    pub user: User,
    #[serde(rename = "tapCount")]
    pub tap_count: i64,
    pub rank: i64,
}

/// One row of the all-time leaderboard: tap counts summed across all days.
#[derive(Debug, Clone, Serialize)]
pub struct AllTimeLeaderboardEntry {
    pub user: User,
    #[serde(rename = "totalTaps")]
    pub total_taps: i64,
    pub rank: i64,
}

#[derive(sqlx::FromRow)]
struct CountedRow {
    #[sqlx(flatten)]
    user: User,
    count: i64,
}

/// Top `limit` users for one calendar day, ordered by tap count.
///
/// Equal counts order by ascending user id so rankings are deterministic.
/// Users with no counter row for the day are absent, not shown as zero.
pub async fn daily_leaderboard(
    pool: &SqlitePool,
    date: NaiveDate,
    limit: i64,
) -> Result<Vec<DailyLeaderboardEntry>> {
    let rows = sqlx::query_as::<_, CountedRow>(
        "SELECT u.id, u.email, u.first_name, u.last_name, u.profile_image_url,
                u.created_at, u.updated_at, d.tap_count AS count
         FROM daily_taps d
         INNER JOIN users u ON u.id = d.user_id
         WHERE d.date = ?1
         ORDER BY d.tap_count DESC, u.id ASC
         LIMIT ?2",
    )
    .bind(date)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| DailyLeaderboardEntry {
            user: row.user,
            tap_count: row.count,
            rank: index as i64 + 1,
        })
        .collect())
}

/// Top `limit` users by lifetime tap total, summed across all days.
pub async fn all_time_leaderboard(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<AllTimeLeaderboardEntry>> {
    let rows = sqlx::query_as::<_, CountedRow>(
        "SELECT u.id, u.email, u.first_name, u.last_name, u.profile_image_url,
                u.created_at, u.updated_at, SUM(d.tap_count) AS count
         FROM daily_taps d
         INNER JOIN users u ON u.id = d.user_id
         GROUP BY u.id
         ORDER BY count DESC, u.id ASC
         LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| AllTimeLeaderboardEntry {
            user: row.user,
            total_taps: row.count,
            rank: index as i64 + 1,
        })
        .collect())
}
