// handlers/public/auth/mod.rs - Session acquisition
//
// Identity tokens come from the external provider; session tokens are ours.

use serde::Serialize;

pub mod google;   // POST /api/auth/google-auth
pub mod login;    // POST /api/auth/login
pub mod logout;   // POST /api/auth/logout
pub mod register; // POST /api/auth/register

pub use google::google_auth_post;
pub use login::login_post;
pub use logout::logout_post;
pub use register::register_post;

/// Returned by register and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub token: String,
}
