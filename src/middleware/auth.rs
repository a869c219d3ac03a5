use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::Principal;
use crate::error::ApiError;

/// Session gate applied to every route. Allow-listed prefixes pass straight through;
/// everything else needs a valid session token for a known user.
pub async fn session_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path();
    let is_public = state
        .config
        .api
        .public_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()));
    if is_public {
        return Ok(next.run(request).await);
    }

    let token = extract_bearer_token(request.headers()).map_err(|msg| {
        tracing::warn!("Rejected {}: {}", request.uri().path(), msg);
        ApiError::forbidden(msg)
    })?;

    let session = state.tokens.decode(&token).map_err(|e| {
        tracing::warn!("Rejected {}: {}", request.uri().path(), e);
        ApiError::forbidden("Invalid session token")
    })?;

    // Store failures surface as 500 through the ApiError conversion
    if state.users.get_by_id(&session.subject).await?.is_none() {
        tracing::warn!("Rejected token for unknown user {}", session.subject);
        return Err(ApiError::forbidden("Unknown user"));
    }

    if !state.tokens.validate(&token, &session.subject) {
        tracing::warn!("Token validation failed for user {}", session.subject);
        return Err(ApiError::forbidden("Token validation failed (expired or invalid)"));
    }

    tracing::debug!("Authenticated user {}", session.subject);
    request
        .extensions_mut()
        .insert(Principal::user(session.subject));

    Ok(next.run(request).await)
}

/// Extract the session token from `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty session token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}

/// Handlers take the caller as an argument; only the gate ever creates one.
#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::forbidden("Authentication required"))
    }
}
