use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{verify_jwt, JwtError};
use crate::error::ApiError;

/// HS256 secret shared by the auth layer
#[derive(Clone)]
pub struct JwtSecret(pub Arc<str>);

/// Authenticated caller. The raw token is kept so calls to the user service
/// can forward it.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub token: String,
}

/// Verify the bearer token and attach `AuthUser` to the request
pub async fn jwt_auth_middleware(
    State(secret): State<JwtSecret>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = authenticate(request.headers(), &secret.0).map_err(|err| {
        debug!(error = %err, "authentication failed");
        ApiError::unauthorized(err.client_message())
    })?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthUser, JwtError> {
    let token = bearer_token(headers)?;
    let user_id = verify_jwt(&token, secret)?;
    Ok(AuthUser { user_id, token })
}

/// Extract the token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Result<String, JwtError> {
    let value = headers.get(AUTHORIZATION).ok_or(JwtError::MissingHeader)?;
    let value = value.to_str().map_err(|_| JwtError::InvalidHeader)?;

    let (scheme, token) = value.split_once(' ').ok_or(JwtError::InvalidHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(JwtError::InvalidHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(JwtError::InvalidHeader);
    }

    Ok(token.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(JwtError::MissingHeader.client_message()))
    }
}
