use serde::{Deserialize, Serialize};

use super::core::SignatureError;

/// Separator of the canonical string. Fields containing it are rejected at verification.
pub const CANONICAL_DELIMITER: &str = "\n";

/// Fields committed to a request signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePayload {
    // epoch milliseconds
    pub timestamp: i64,
    pub method: String,
    pub path: String,
    // digest of the body, computed by the caller (see `hash_body`)
    pub body_hash: String,
    pub token_id: String,
    pub nonce: String,
}

impl SignaturePayload {
    pub fn new(
        timestamp: i64,
        method: impl Into<String>,
        path: impl Into<String>,
        body_hash: impl Into<String>,
        token_id: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            method: method.into(),
            path: path.into(),
            body_hash: body_hash.into(),
            token_id: token_id.into(),
            nonce: nonce.into(),
        }
    }

    /// Canonical form (v1):
    ///
    /// ```text
    /// {timestamp}\n{METHOD}\n{path}\n{body_hash}\n{token_id}\n{nonce}
    /// ```
    ///
    /// The method is upper-cased; everything else is taken verbatim.
    pub fn canonical_string(&self) -> String {
        let timestamp = self.timestamp.to_string();
        let method = self.method.to_ascii_uppercase();

        [
            timestamp.as_str(),
            method.as_str(),
            self.path.as_str(),
            self.body_hash.as_str(),
            self.token_id.as_str(),
            self.nonce.as_str(),
        ]
        .join(CANONICAL_DELIMITER)
    }

    /// Every string field must be non-empty and free of the delimiter.
    pub fn validate(&self) -> Result<(), SignatureError> {
        let fields = [
            ("method", &self.method),
            ("path", &self.path),
            ("body_hash", &self.body_hash),
            ("token_id", &self.token_id),
            ("nonce", &self.nonce),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() || value.contains(CANONICAL_DELIMITER) {
                return Err(SignatureError::MalformedPayload(name));
            }
        }

        if self.timestamp <= 0 {
            return Err(SignatureError::MalformedPayload("timestamp"));
        }

        Ok(())
    }
}
