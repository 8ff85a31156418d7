use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::UserSettings;

/// Fetch the user's settings row, creating one with defaults on first
/// access. Two racing first reads both land on the same row through the
/// upsert.
pub async fn get_or_create_settings(pool: &SqlitePool, user_id: &str) -> Result<UserSettings> {
    let existing = sqlx::query_as::<_, UserSettings>(
        "SELECT id, user_id, sound_enabled, created_at, updated_at
         FROM user_settings
         WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match existing {
        Some(settings) => Ok(settings),
        None => upsert_settings(pool, user_id, true).await,
    }
}

/// Insert or update the user's settings row.
pub async fn upsert_settings(
    pool: &SqlitePool,
    user_id: &str,
    sound_enabled: bool,
) -> Result<UserSettings> {
    let now = Utc::now();
    let settings = sqlx::query_as::<_, UserSettings>(
        "INSERT INTO user_settings (user_id, sound_enabled, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT (user_id) DO UPDATE
         SET sound_enabled = excluded.sound_enabled, updated_at = excluded.updated_at
         RETURNING id, user_id, sound_enabled, created_at, updated_at",
    )
    .bind(user_id)
    .bind(sound_enabled)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(settings)
}
