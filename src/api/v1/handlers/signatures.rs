/*
 * Responsibility
 * - POST /signatures/verify
 * - 署名の再計算 + 時刻 window + nonce replay を検証する
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    api::v1::dto::signatures::{VerifySignatureRequest, VerifySignatureResponse},
    error::AppError,
    state::AppState,
};

pub async fn verify_signature(
    State(state): State<AppState>,
    body: Result<Json<VerifySignatureRequest>, JsonRejection>,
) -> Result<Json<VerifySignatureResponse>, AppError> {
    let Json(req) = body?;
    let (payload, signature) = req.into_parts()?;

    state.verifier.verify(&payload, &signature).await?;

    Ok(Json(VerifySignatureResponse {
        valid: true,
        token_id: payload.token_id,
    }))
}
