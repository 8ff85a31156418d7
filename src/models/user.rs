use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User row, owned by the auth collaborator.
///
/// The tap path only references users: the row is inserted on first sight
/// of an id and never mutated here. Display attributes ride along into
/// leaderboard responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    #[serde(rename = "profileImageUrl")]
    pub profile_image_url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
