pub mod auth;
pub mod extract;
pub mod recovery;
pub mod request_id;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser, JwtSecret};
pub use extract::{AppJson, AppPath, AppQuery};
pub use recovery::recovery_middleware;
pub use request_id::{current_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER};
pub use response::{ApiResponse, ApiResult};
