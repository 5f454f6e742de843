use serde::{Deserialize, Serialize};

use crate::services::signing::{SignatureError, SignaturePayload};

/// Every field is optional at the serde level so a missing one is reported
/// as `MALFORMED_PAYLOAD` naming the field, not as a generic body error.
#[derive(Debug, Default, Deserialize)]
pub struct VerifySignatureRequest {
    pub timestamp: Option<i64>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub body_hash: Option<String>,
    pub token_id: Option<String>,
    pub nonce: Option<String>,
    pub signature: Option<String>,
}

impl VerifySignatureRequest {
    pub fn into_parts(self) -> Result<(SignaturePayload, String), SignatureError> {
        let payload = SignaturePayload {
            timestamp: self
                .timestamp
                .ok_or(SignatureError::MalformedPayload("timestamp"))?,
            method: self.method.ok_or(SignatureError::MalformedPayload("method"))?,
            path: self.path.ok_or(SignatureError::MalformedPayload("path"))?,
            body_hash: self
                .body_hash
                .ok_or(SignatureError::MalformedPayload("body_hash"))?,
            token_id: self
                .token_id
                .ok_or(SignatureError::MalformedPayload("token_id"))?,
            nonce: self.nonce.ok_or(SignatureError::MalformedPayload("nonce"))?,
        };
        let signature = self
            .signature
            .ok_or(SignatureError::MalformedPayload("signature"))?;

        Ok((payload, signature))
    }
}

#[derive(Debug, Serialize)]
pub struct VerifySignatureResponse {
    pub valid: bool,
    pub token_id: String,
}
