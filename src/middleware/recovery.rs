use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::error;

use super::request_id::current_request_id;
use crate::error::ApiError;

pub const PANIC_MESSAGE: &str = "Internal server error / 서버 내부 오류가 발생했습니다";

/// Turn a panicking handler into a 500 envelope instead of a dropped connection
pub async fn recovery_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            error!(
                request_id = %current_request_id(),
                method = %method,
                uri = %uri,
                panic_message = %panic_message(panic.as_ref()),
                "request handler panicked"
            );

            ApiError::internal_server_error(PANIC_MESSAGE).into_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
