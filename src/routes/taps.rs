use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::constants::{ERR_INVALID_TAP_COUNT, MAX_BATCH_COUNT};
use crate::db;
use crate::error::{AppError, Result};
use crate::routes::today;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DailyTapsResponse {
    pub date: NaiveDate,
    #[serde(rename = "tapCount")]
    pub tap_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct BatchTapsRequest {
    pub count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BatchTapsResponse {
    pub date: NaiveDate,
    #[serde(rename = "tapCount")]
    pub tap_count: i64,
    pub processed: i64,
}

/// Current day's accumulated tap count for the requesting user
///
/// Returns zero when no counter row exists yet; the row is only created by
/// the first tap of the day.
pub async fn get_daily_taps(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DailyTapsResponse>> {
    let date = today();
    let tap_count = db::taps::get_daily_tap(&state.pool, &user_id, date)
        .await?
        .map(|row| row.tap_count)
        .unwrap_or(0);

    Ok(Json(DailyTapsResponse { date, tap_count }))
}

/// Record a single tap
pub async fn record_tap(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DailyTapsResponse>> {
    let date = today();
    let daily_tap = db::taps::increment_or_create(&state.pool, &user_id, date, 1).await?;
    db::taps::append_tap_records(&state.pool, &user_id, daily_tap.id, 1).await;

    Ok(Json(DailyTapsResponse {
        date,
        tap_count: daily_tap.tap_count,
    }))
}

/// Fold a client-side batch of taps into the day's counter
///
/// The counter increment commits first; ledger rows are appended after it
/// and are best-effort, so a ledger failure never rolls the increment back
/// or fails the response. The returned tap count is authoritative and may
/// include increments from concurrent requests.
pub async fn record_batch_taps(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<BatchTapsRequest>,
) -> Result<Json<BatchTapsResponse>> {
    let count = payload.count.unwrap_or(0);
    if count < 1 || count > MAX_BATCH_COUNT {
        return Err(AppError::InvalidInput(ERR_INVALID_TAP_COUNT.to_string()));
    }

    let date = today();
    let daily_tap = db::taps::increment_or_create(&state.pool, &user_id, date, count).await?;

    let written = db::taps::append_tap_records(&state.pool, &user_id, daily_tap.id, count).await;
    if written < count as u64 {
        tracing::warn!(
            "Ledger under-recorded batch for user {}: {}/{} rows written",
            user_id,
            written,
            count
        );
    }

    tracing::debug!(
        "Processed batch of {} taps for user {} on {}",
        count,
        user_id,
        date
    );

    Ok(Json(BatchTapsResponse {
        date,
        tap_count: daily_tap.tap_count,
        processed: count,
    }))
}
