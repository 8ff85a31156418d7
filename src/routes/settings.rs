use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::db;
use crate::error::Result;
use crate::models::UserSettings;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(rename = "soundEnabled")]
    pub sound_enabled: bool,
}

/// Fetch the requesting user's settings, creating defaults on first access
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserSettings>> {
    let settings = db::settings::get_or_create_settings(&state.pool, &user_id).await?;
    Ok(Json(settings))
}

/// Update the requesting user's settings
pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<UserSettings>> {
    let settings =
        db::settings::upsert_settings(&state.pool, &user_id, payload.sound_enabled).await?;
    Ok(Json(settings))
}
