pub mod health;
pub mod leaderboard;
pub mod settings;
pub mod taps;

pub use health::health_check;
pub use leaderboard::{get_all_time_leaderboard, get_daily_leaderboard};
pub use settings::{get_settings, update_settings};
pub use taps::{get_daily_taps, record_batch_taps, record_tap};

use axum::routing::{get, post};
use axum::Router;
use chrono::{Local, NaiveDate};

use crate::AppState;

/// Build the application router over the shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/taps/daily", get(get_daily_taps))
        .route("/api/taps", post(record_tap))
        .route("/api/taps/batch", post(record_batch_taps))
        .route("/api/leaderboard/daily", get(get_daily_leaderboard))
        .route("/api/leaderboard/all-time", get(get_all_time_leaderboard))
        .route("/api/settings", get(get_settings).put(update_settings))
        .with_state(state)
}

/// Calendar day in server-local time, resolved once per request.
///
/// A tap arriving right at midnight may land on either side of the
/// boundary; whichever day the request resolves is the day it counts for.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
