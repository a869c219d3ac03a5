// handlers/public/auth/logout.rs - POST /api/auth/logout handler

use crate::middleware::{ApiResponse, ApiResult};

/// Session tokens are stateless, so there is nothing to revoke server side.
pub async fn logout_post() -> ApiResult<String> {
    Ok(ApiResponse::message("Logged out successfully"))
}
