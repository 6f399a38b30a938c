use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use super::{
    extractors::AuthUser,
    jwt::{JwtKeys, TokenError},
};
use crate::error::ApiError;

/// Why a request was refused. Logged, never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("missing authorization header")]
    MissingToken,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("invalid token")]
    InvalidToken,
    #[error("expired token")]
    ExpiredToken,
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthFailure> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthFailure::MissingToken)?
        .to_str()
        .map_err(|_| AuthFailure::MissingToken)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthFailure::MalformedHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthFailure::MalformedHeader);
    }
    Ok(token)
}

pub fn authenticate(keys: &JwtKeys, headers: &HeaderMap) -> Result<Uuid, AuthFailure> {
    let token = bearer_token(headers)?;
    match keys.verify(token) {
        Ok(claims) => Ok(claims.sub),
        Err(TokenError::Expired) => Err(AuthFailure::ExpiredToken),
        Err(_) => Err(AuthFailure::InvalidToken),
    }
}

/// Route layer for every protected route. On success the caller's id is
/// available to handlers through [`AuthUser`].
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match authenticate(&keys, req.headers()) {
        Ok(user_id) => {
            req.extensions_mut().insert(AuthUser(user_id));
            Ok(next.run(req).await)
        }
        Err(failure) => {
            warn!(reason = %failure, method = %req.method(), uri = %req.uri(), "request rejected");
            Err(ApiError::Unauthorized)
        }
    }
}
