use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;

/// Insert the user row if this id has not been seen before.
///
/// User records belong to the auth collaborator; the tap path only needs
/// the row to exist so counter and ledger foreign keys resolve. Existing
/// rows are left untouched.
pub async fn ensure_user(pool: &SqlitePool, user_id: &str) -> Result<()> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO users (id, created_at, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}
