use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One (user, calendar day) counter row.
///
/// At most one row exists per pair, enforced by a uniqueness constraint.
/// Rows are created on the first tap of the day, mutated only by additive
/// increment, and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyTap {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(rename = "tapCount")]
    pub tap_count: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
