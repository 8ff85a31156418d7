use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::models::DailyTap;

/// Apply an additive delta to a user's counter for one calendar day,
/// creating the row on the first tap of that day.
///
/// Concurrency control is conditional-update-then-insert: the UPDATE is a
/// single atomic statement, and an INSERT that loses the creation race to
/// a concurrent request falls back to the update path instead of erroring.
/// The returned row reflects every increment the store ordered before this
/// one, which may be more than the caller's own `previous + delta`.
pub async fn increment_or_create(
    pool: &SqlitePool,
    user_id: &str,
    date: NaiveDate,
    delta: i64,
) -> Result<DailyTap> {
    if let Some(row) = try_increment(pool, user_id, date, delta).await? {
        return Ok(row);
    }

    let now = Utc::now();
    let inserted = sqlx::query_as::<_, DailyTap>(
        "INSERT INTO daily_taps (user_id, date, tap_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         RETURNING id, user_id, date, tap_count, created_at, updated_at",
    )
    .bind(user_id)
    .bind(date)
    .bind(delta)
    .bind(now)
    .fetch_one(pool)
    .await;

    match inserted {
        Ok(row) => Ok(row),
        // Lost the creation race to a concurrent request; the row exists
        // now, so the update path must match.
        Err(err) if is_unique_violation(&err) => {
            try_increment(pool, user_id, date, delta)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "daily counter for user {user_id} on {date} vanished after insert conflict"
                    ))
                })
        }
        Err(err) => Err(err.into()),
    }
}

/// Fetch the counter row for (user, date), if any.
pub async fn get_daily_tap(
    pool: &SqlitePool,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<DailyTap>> {
    let row = sqlx::query_as::<_, DailyTap>(
        "SELECT id, user_id, date, tap_count, created_at, updated_at
         FROM daily_taps
         WHERE user_id = ?1 AND date = ?2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Append one ledger row per accepted tap in a batch.
///
/// Best-effort audit fan-out: a failed insert is logged and skipped, the
/// counter increment stands, and the caller's response is unaffected.
/// Returns the number of rows actually written.
pub async fn append_tap_records(
    pool: &SqlitePool,
    user_id: &str,
    daily_tap_id: i64,
    count: i64,
) -> u64 {
    let now = Utc::now();
    let mut written = 0u64;

    for _ in 0..count {
        let result = sqlx::query(
            "INSERT INTO tap_records (user_id, daily_tap_id, tapped_at) VALUES (?1, ?2, ?3)",
        )
        .bind(user_id)
        .bind(daily_tap_id)
        .bind(now)
        .execute(pool)
        .await;

        match result {
            Ok(_) => written += 1,
            Err(err) => {
                tracing::warn!(
                    "Failed to append tap record for user {}: {}",
                    user_id,
                    err
                );
            }
        }
    }

    written
}

/// Conditional increment: adds `delta` where the (user, date) row exists,
/// returning `None` when no row matched.
async fn try_increment(
    pool: &SqlitePool,
    user_id: &str,
    date: NaiveDate,
    delta: i64,
) -> Result<Option<DailyTap>> {
    let row = sqlx::query_as::<_, DailyTap>(
        "UPDATE daily_taps
         SET tap_count = tap_count + ?1, updated_at = ?2
         WHERE user_id = ?3 AND date = ?4
         RETURNING id, user_id, date, tap_count, created_at, updated_at",
    )
    .bind(delta)
    .bind(Utc::now())
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db_err| db_err.is_unique_violation())
}
