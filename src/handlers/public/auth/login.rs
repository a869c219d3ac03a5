// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::extract::State;
use serde::Deserialize;

use super::SessionResponse;
use crate::app::AppState;
use crate::auth::{verify_password, CredentialError, VerifiedIdentity};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Json};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub id_token: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Look up the identity's account, creating it on first sight.
pub(super) async fn find_or_create(
    state: &AppState,
    identity: VerifiedIdentity,
    default_name: &str,
) -> Result<User, ApiError> {
    if let Some(user) = state.users.get_by_id(&identity.subject_id).await? {
        return Ok(user);
    }

    let user = User {
        user_id: identity.subject_id,
        name: identity
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_name.to_string()),
        email: identity.email.unwrap_or_default(),
        phone: String::new(),
        password: String::new(),
    };
    state.users.save(&user).await?;
    tracing::info!("Created user {} on first sign-in", user.user_id);
    Ok(user)
}

/// POST /api/auth/login - exchange an identity token, or email and password, for a session token
pub async fn login_post(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    let id_token = body.id_token.filter(|t| !t.trim().is_empty());

    let user = match (id_token, body.email, body.password) {
        (Some(id_token), _, _) => {
            let identity = state.verifier.verify(&id_token).await.map_err(|e| match e {
                CredentialError::InvalidCredential(msg) => {
                    tracing::warn!("Login rejected: {}", msg);
                    ApiError::bad_request(format!("Login failed: {}", msg))
                }
                other => other.into(),
            })?;
            find_or_create(&state, identity, "Unknown").await?
        }
        (None, Some(email), Some(password)) => {
            let user = state.users.get_by_email(&email).await?;
            match user {
                Some(user) if verify_password(&password, &user.password) => user,
                _ => {
                    tracing::warn!("Password login failed for {}", email);
                    return Err(ApiError::bad_request("Login failed: invalid email or password"));
                }
            }
        }
        _ => {
            return Err(ApiError::bad_request(
                "Provide an idToken, or an email and password",
            ))
        }
    };

    let token = state.tokens.issue(&user.user_id)?;
    tracing::debug!("Issued session for user {}", user.user_id);

    Ok(ApiResponse::success(SessionResponse {
        user_id: user.user_id,
        token,
    }))
}
