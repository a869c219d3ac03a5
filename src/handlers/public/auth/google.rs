// handlers/public/auth/google.rs - POST /api/auth/google-auth handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::login::find_or_create;
use crate::app::AppState;
use crate::auth::CredentialError;
use crate::database::models::UserProfile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Json};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    #[serde(default)]
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct GoogleAuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/auth/google-auth - sign in with a Google identity, creating the account if needed
pub async fn google_auth_post(
    State(state): State<AppState>,
    Json(body): Json<GoogleAuthRequest>,
) -> ApiResult<GoogleAuthResponse> {
    let identity = state
        .verifier
        .verify(&body.id_token)
        .await
        .map_err(|e| match e {
            CredentialError::InvalidCredential(msg) => {
                tracing::warn!("Google sign-in rejected: {}", msg);
                ApiError::bad_request(format!("Google authentication failed: {}", msg))
            }
            other => other.into(),
        })?;

    let user = find_or_create(&state, identity, "Google User").await?;
    let token = state.tokens.issue(&user.user_id)?;

    Ok(ApiResponse::success(GoogleAuthResponse {
        token,
        user: user.into(),
    }))
}
