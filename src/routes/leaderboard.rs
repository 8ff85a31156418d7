use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::constants::{DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT};
use crate::db;
use crate::db::leaderboard::{AllTimeLeaderboardEntry, DailyLeaderboardEntry};
use crate::error::Result;
use crate::routes::today;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyLeaderboardParams {
    pub date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AllTimeLeaderboardParams {
    pub limit: Option<i64>,
}

/// Ranked tap counts for one calendar day, defaulting to today.
/// Public: leaderboards carry no per-requester state.
pub async fn get_daily_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<DailyLeaderboardParams>,
) -> Result<Json<Vec<DailyLeaderboardEntry>>> {
    let date = params.date.unwrap_or_else(today);
    let limit = clamp_limit(params.limit);

    let entries = db::leaderboard::daily_leaderboard(&state.pool, date, limit).await?;
    Ok(Json(entries))
}

/// Ranked lifetime tap totals across all days
pub async fn get_all_time_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<AllTimeLeaderboardParams>,
) -> Result<Json<Vec<AllTimeLeaderboardEntry>>> {
    let limit = clamp_limit(params.limit);

    let entries = db::leaderboard::all_time_leaderboard(&state.pool, limit).await?;
    Ok(Json(entries))
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_defaults_and_bounds() {
        assert_eq!(clamp_limit(None), DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(1_000_000)), MAX_LEADERBOARD_LIMIT);
    }
}
