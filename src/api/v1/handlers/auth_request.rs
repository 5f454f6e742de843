//! `GET /auth-request`: header-only gate for reverse proxies (nginx `auth_request` style).
//!
//! The proxy resolves the bearer token itself and forwards:
//! - `x-original-method` / `x-original-uri`: the client request line
//! - `x-token-scopes`: the granted scopes of the resolved token
//! - the signature headers from `services::signing::headers`
//!
//! The signed `path` is the original URI verbatim (query included); the
//! authorizer drops the query before matching.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::{
    error::AppError,
    services::{scope::parse_scopes, signing::headers::payload_from_headers},
    state::AppState,
};

pub const ORIGINAL_METHOD_HEADER: &str = "x-original-method";
pub const ORIGINAL_URI_HEADER: &str = "x-original-uri";
pub const TOKEN_SCOPES_HEADER: &str = "x-token-scopes";

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::bad_request("MISSING_HEADER", format!("missing header: {name}")))
}

pub async fn auth_request(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let method = header_str(&headers, ORIGINAL_METHOD_HEADER)?;
    let uri = header_str(&headers, ORIGINAL_URI_HEADER)?;

    // signature first: an unsigned request learns nothing about the route table
    let (payload, signature) = payload_from_headers(&headers, method, uri)?;
    state.verifier.verify(&payload, &signature).await?;

    let scopes = match headers.get(TOKEN_SCOPES_HEADER) {
        Some(value) => {
            let raw = value.to_str().map_err(|_| {
                AppError::bad_request("INVALID_SCOPE", "token scopes must be ASCII")
            })?;
            parse_scopes(raw)?
        }
        None => Vec::new(),
    };

    let result = state.authorizer.authorize(&scopes, uri, method).map_err(|err| {
        tracing::info!(
            method,
            uri,
            token_id = %payload.token_id,
            error = %err,
            "proxied request rejected"
        );
        AppError::from(err)
    })?;

    tracing::debug!(method, route = ?result.route, token_id = %payload.token_id, "proxied request allowed");

    Ok(StatusCode::NO_CONTENT)
}
