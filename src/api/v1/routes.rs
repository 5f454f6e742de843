/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /authorize, /signatures/verify, /auth-request
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth_request::auth_request, authorize::authorize, health::health,
    signatures::verify_signature,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/authorize", post(authorize))
        .route("/signatures/verify", post(verify_signature))
        .route("/auth-request", get(auth_request))
}
