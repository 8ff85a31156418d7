use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger entry: one row per accepted tap, linked to the daily counter it
/// contributed to. Append-only audit trail, never read on the hot path.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TapRecord {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "dailyTapId")]
    pub daily_tap_id: i64,
    #[serde(rename = "tappedAt")]
    pub tapped_at: DateTime<Utc>,
}
