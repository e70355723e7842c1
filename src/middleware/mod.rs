pub mod auth;
pub mod response;

pub use auth::{require_admin, AuthSettings, AuthUser};
pub use response::{ApiResponse, ApiResult};
