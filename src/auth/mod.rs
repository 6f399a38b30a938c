use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub mod credentials;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
}

/// Account routes; mounted behind `require_auth`.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(handlers::me))
        .route("/api/auth/password", put(handlers::change_password))
}
