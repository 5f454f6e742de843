//! Header transport for signed requests.
//!
//! Header names are lowercase; `x-signature-timestamp` is epoch milliseconds.

use axum::http::HeaderMap;

use super::core::SignatureError;
use super::payload::SignaturePayload;

pub const SIGNATURE_HEADER: &str = "x-signature";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";
pub const NONCE_HEADER: &str = "x-signature-nonce";
pub const TOKEN_ID_HEADER: &str = "x-token-id";
pub const CONTENT_HASH_HEADER: &str = "x-content-sha256";

/// Headers to attach to a signed request.
pub fn signature_headers(payload: &SignaturePayload, signature: &str) -> [(&'static str, String); 5] {
    [
        (SIGNATURE_HEADER, signature.to_string()),
        (TIMESTAMP_HEADER, payload.timestamp.to_string()),
        (NONCE_HEADER, payload.nonce.clone()),
        (TOKEN_ID_HEADER, payload.token_id.clone()),
        (CONTENT_HASH_HEADER, payload.body_hash.clone()),
    ]
}

fn required<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(SignatureError::MalformedPayload(name))
}

/// Rebuild (payload, presented signature) from request headers.
///
/// `method` and `path` come from the request line, not from headers.
pub fn payload_from_headers(
    headers: &HeaderMap,
    method: &str,
    path: &str,
) -> Result<(SignaturePayload, String), SignatureError> {
    let signature = required(headers, SIGNATURE_HEADER)?;
    let timestamp = required(headers, TIMESTAMP_HEADER)?
        .parse::<i64>()
        .map_err(|_| SignatureError::MalformedPayload(TIMESTAMP_HEADER))?;
    let nonce = required(headers, NONCE_HEADER)?;
    let token_id = required(headers, TOKEN_ID_HEADER)?;
    let body_hash = required(headers, CONTENT_HASH_HEADER)?;

    let payload = SignaturePayload::new(timestamp, method, path, body_hash, token_id, nonce);
    Ok((payload, signature.to_string()))
}
