//! Security core for the AI provider proxy: scope authorization for bearer
//! tokens and HMAC request signing, plus the axum decision service around them.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

pub use services::scope::{AuthorizationResult, Scope, ScopeAuthorizer, has_required_scope};
pub use services::signing::{
    Secret, SignatureError, SignaturePayload, generate_signature, verify_signature,
};
