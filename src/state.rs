/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - authorizer: 静的ルート表, verifier: 署名検証 + replay store
 * - Clone 前提で持つ (内部は Arc/Copy cheap)
 */
use std::sync::Arc;

use crate::services::{scope::ScopeAuthorizer, signing::SignedRequestVerifier};

#[derive(Clone, Debug)]
pub struct AppState {
    pub authorizer: ScopeAuthorizer,
    pub verifier: Arc<SignedRequestVerifier>,
}

impl AppState {
    pub fn new(authorizer: ScopeAuthorizer, verifier: Arc<SignedRequestVerifier>) -> Self {
        Self {
            authorizer,
            verifier,
        }
    }
}
