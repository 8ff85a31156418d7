use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::db;
use crate::error::AppError;
use crate::AppState;

/// Header carrying the opaque user id resolved by the auth layer upstream
pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolved identity of the requester.
///
/// Authentication itself happens outside this service; whatever sits in
/// front of it resolves the session and forwards the opaque user id.
/// Requests without one are rejected with 401 before any handler runs.
/// First sight of an id materializes the user row so counter and ledger
/// foreign keys resolve.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AppError::Unauthorized)?
            .to_string();

        db::users::ensure_user(&state.pool, &user_id).await?;

        Ok(AuthUser(user_id))
    }
}
