//! Capability token issuance over HTTP.

use crate::errors::VoiceError;
use crate::models::UserTokenResponse;
use crate::routes::AppState;
use crate::services::token_service;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Longest accepted username.
pub const MAX_USERNAME_LENGTH: usize = 256;

/// `POST /tokens/:username`
///
/// Issues a user token with `sub = username` and the default ACL.
#[instrument(skip_all, name = "voice.tokens.user")]
pub async fn create_user_token(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserTokenResponse>, VoiceError> {
    validate_username(&username)?;

    let token = token_service::issue_user_token(&state.token_issuer, &state.config, &username)?;

    Ok(Json(UserTokenResponse { username, token }))
}

fn validate_username(username: &str) -> Result<(), VoiceError> {
    if username.trim().is_empty() {
        return Err(VoiceError::BadRequest("Username must not be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(VoiceError::BadRequest(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} bytes"
        )));
    }
    if username.chars().any(char::is_control) {
        return Err(VoiceError::BadRequest(
            "Username must not contain control characters".to_string(),
        ));
    }
    Ok(())
}
