/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - AuthzError / SignatureError / JsonRejection を統一的に変換
 */
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::scope::{AuthzError, Scope, ScopeParseError};
use crate::services::signing::SignatureError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_scopes: Option<Vec<Scope>>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { code: &'static str, message: String },
    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },
    #[error("{message}")]
    Forbidden {
        code: &'static str,
        message: String,
        required_scopes: Option<Vec<Scope>>,
    },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Forbidden { code, .. } => *code,
            AppError::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = self.to_string();

        let (status, required_scopes) = match self {
            AppError::BadRequest { .. } => (StatusCode::BAD_REQUEST, None),
            AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, None),
            AppError::Forbidden {
                required_scopes, ..
            } => (StatusCode::FORBIDDEN, required_scopes),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                required_scopes,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthzError> for AppError {
    fn from(e: AuthzError) -> Self {
        let message = e.to_string();
        match e {
            AuthzError::AccessDenied { required_scopes } => AppError::Forbidden {
                code: "ACCESS_DENIED",
                message,
                required_scopes: Some(required_scopes),
            },
            // deny-by-default for unmapped routes
            AuthzError::UnknownRoute { .. } => AppError::Forbidden {
                code: "UNKNOWN_ROUTE",
                message,
                required_scopes: None,
            },
        }
    }
}

impl From<SignatureError> for AppError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::MalformedPayload(_) => {
                AppError::bad_request("MALFORMED_PAYLOAD", e.to_string())
            }
            SignatureError::StalePayload { .. } => {
                AppError::unauthorized("STALE_PAYLOAD", e.to_string())
            }
            SignatureError::SignatureMismatch => {
                AppError::unauthorized("SIGNATURE_MISMATCH", "signature mismatch")
            }
            SignatureError::ReplayedNonce => {
                AppError::unauthorized("REPLAYED_NONCE", "nonce already used")
            }
            // Backend details stay in the logs
            SignatureError::ReplayBackend(_) => AppError::Internal,
        }
    }
}

impl From<ScopeParseError> for AppError {
    fn from(e: ScopeParseError) -> Self {
        AppError::bad_request("INVALID_SCOPE", e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::bad_request("INVALID_BODY", e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_errors_keep_distinct_codes() {
        let cases = [
            (SignatureError::MalformedPayload("nonce"), "MALFORMED_PAYLOAD"),
            (
                SignatureError::StalePayload {
                    skew_ms: 10,
                    max_skew_ms: 1,
                },
                "STALE_PAYLOAD",
            ),
            (SignatureError::SignatureMismatch, "SIGNATURE_MISMATCH"),
            (SignatureError::ReplayedNonce, "REPLAYED_NONCE"),
        ];

        for (err, code) in cases {
            assert_eq!(AppError::from(err).code(), code);
        }
    }

    #[test]
    fn access_denied_is_forbidden_with_required_scopes() {
        let err = AppError::from(AuthzError::AccessDenied {
            required_scopes: vec![Scope::ChatWrite],
        });
        assert_eq!(err.code(), "ACCESS_DENIED");
        assert_eq!(err.to_string(), "this action requires one of: chat:write");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
