// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;
use serde::Deserialize;

use super::SessionResponse;
use crate::app::AppState;
use crate::auth::{hash_password, CredentialError};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Json};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub id_token: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/**
 * POST /api/auth/register - Create an account from a provider identity token
 *
 * Expected Input:
 * ```json
 * { "idToken": "...", "name": "Sam", "phone": "555-0100", "password": "optional" }
 * ```
 *
 * Fails with 400 when the identity token is rejected or when the subject or its
 * email already has an account.
 */
pub async fn register_post(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<SessionResponse> {
    let identity = state
        .verifier
        .verify(&body.id_token)
        .await
        .map_err(|e| match e {
            CredentialError::InvalidCredential(msg) => {
                tracing::warn!("Registration rejected: {}", msg);
                ApiError::bad_request(format!("Registration failed: {}", msg))
            }
            other => other.into(),
        })?;

    let email = identity.email.clone().unwrap_or_default();
    if state.users.get_by_id(&identity.subject_id).await?.is_some()
        || state.users.get_by_email(&email).await?.is_some()
    {
        return Err(ApiError::bad_request("Email or user already exists"));
    }

    let password = match body.password.filter(|p| !p.is_empty()) {
        Some(plain) => hash_password(&plain).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("Could not store password")
        })?,
        None => String::new(),
    };

    let user = User {
        user_id: identity.subject_id,
        name: body.name.or(identity.display_name).unwrap_or_default(),
        email,
        phone: body.phone.unwrap_or_default(),
        password,
    };
    state.users.save(&user).await?;

    let token = state.tokens.issue(&user.user_id)?;
    tracing::info!("Registered user {}", user.user_id);

    Ok(ApiResponse::success(SessionResponse {
        user_id: user.user_id,
        token,
    }))
}
