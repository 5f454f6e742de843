pub mod auth_request;
pub mod authorize;
pub mod health;
pub mod signatures;
