/*
 * Responsibility
 * - POST /authorize
 * - token の scope 集合と (path, method) から allow/deny を返す
 * - deny は 403 + required_scopes (ユーザー向けメッセージ用)
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    api::v1::dto::authorize::{AuthorizeRequest, AuthorizeResponse},
    error::AppError,
    services::scope::AuthzError,
    state::AppState,
};

pub async fn authorize(
    State(state): State<AppState>,
    body: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<Json<AuthorizeResponse>, AppError> {
    let Json(req) = body?;
    let scopes = req.token_scopes()?;

    match state.authorizer.authorize(&scopes, &req.path, &req.method) {
        Ok(result) => Ok(Json(result.into())),
        Err(err) => {
            match &err {
                AuthzError::AccessDenied { required_scopes } => tracing::info!(
                    method = %req.method,
                    path = %req.path,
                    required = ?required_scopes,
                    "authorization denied"
                ),
                AuthzError::UnknownRoute { .. } => tracing::warn!(
                    method = %req.method,
                    path = %req.path,
                    "authorization requested for unmapped route"
                ),
            }
            Err(err.into())
        }
    }
}
