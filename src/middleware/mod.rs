pub mod auth;
pub mod extract;
pub mod response;

pub use auth::session_gate;
pub use extract::{Json, Query};
pub use response::{ApiResponse, ApiResult};
