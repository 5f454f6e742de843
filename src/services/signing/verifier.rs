use std::sync::Arc;

use tracing::{error, info, warn};

use super::core::{RequestSigner, SignatureError, now_ms};
use super::payload::SignaturePayload;
use crate::services::replay::ReplayStore;

/// Signature check + nonce replay guard.
///
/// The nonce is only recorded after the MAC has been verified, so unsigned
/// traffic cannot burn other clients' nonces.
#[derive(Clone)]
pub struct SignedRequestVerifier {
    signer: RequestSigner,
    replay_store: Arc<dyn ReplayStore>,
}

impl std::fmt::Debug for SignedRequestVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedRequestVerifier")
            .field("policy", &self.signer.policy())
            .finish()
    }
}

/// `{token_len}:{token_id}:{nonce}`. The length prefix keeps the key
/// unambiguous when either field contains `:`.
pub fn replay_key(token_id: &str, nonce: &str) -> String {
    format!("{}:{}:{}", token_id.len(), token_id, nonce)
}

impl SignedRequestVerifier {
    pub fn new(signer: RequestSigner, replay_store: Arc<dyn ReplayStore>) -> Self {
        Self {
            signer,
            replay_store,
        }
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    pub async fn verify(
        &self,
        payload: &SignaturePayload,
        presented: &str,
    ) -> Result<(), SignatureError> {
        self.verify_at(payload, presented, now_ms()).await
    }

    pub async fn verify_at(
        &self,
        payload: &SignaturePayload,
        presented: &str,
        now_ms: i64,
    ) -> Result<(), SignatureError> {
        if let Err(err) = self.signer.verify(payload, presented, now_ms) {
            match &err {
                SignatureError::StalePayload { skew_ms, .. } => {
                    info!(token_id = %payload.token_id, skew_ms, "stale signed payload");
                }
                SignatureError::SignatureMismatch => {
                    warn!(
                        token_id = %payload.token_id,
                        method = %payload.method,
                        path = %payload.path,
                        "signature mismatch"
                    );
                }
                _ => {
                    info!(error = %err, "malformed signed payload");
                }
            }
            return Err(err);
        }

        let key = replay_key(&payload.token_id, &payload.nonce);
        let ttl = self.signer.policy().replay_ttl_seconds;

        let first_time = self
            .replay_store
            .check_and_store(&key, ttl)
            .await
            .map_err(|err| {
                error!(error = ?err, "replay backend failure");
                SignatureError::from(err)
            })?;

        if !first_time {
            warn!(key = %key, "signed request replay detected");
            return Err(SignatureError::ReplayedNonce);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{future::Future, pin::Pin};

    use super::*;
    use crate::services::replay::{InMemoryReplayStore, ReplayError};
    use crate::services::signing::{Secret, SignaturePolicy};

    struct BrokenStore;

    impl ReplayStore for BrokenStore {
        fn check_and_store<'a>(
            &'a self,
            _key: &'a str,
            _ttl_secs: u64,
        ) -> Pin<Box<dyn Future<Output = Result<bool, ReplayError>> + Send + 'a>> {
            Box::pin(async { Err(ReplayError::Poisoned) })
        }
    }

    fn signer() -> RequestSigner {
        RequestSigner::new(Secret::from("test-secret-key-12345"), SignaturePolicy::default())
    }

    fn payload(nonce: &str) -> SignaturePayload {
        SignaturePayload::new(
            1_700_000_000_000,
            "POST",
            "/v1/chat/completions",
            "abc123",
            "token-123",
            nonce,
        )
    }

    #[tokio::test]
    async fn first_use_passes_and_replay_is_rejected() {
        let verifier = SignedRequestVerifier::new(signer(), Arc::new(InMemoryReplayStore::new()));
        let p = payload("nonce-1");
        let sig = verifier.signer().sign(&p);
        let now = p.timestamp + 500;

        assert!(verifier.verify_at(&p, &sig, now).await.is_ok());
        let err = verifier.verify_at(&p, &sig, now).await.unwrap_err();
        assert!(matches!(err, SignatureError::ReplayedNonce));

        // a new nonce is fine
        let p2 = payload("nonce-2");
        let sig2 = verifier.signer().sign(&p2);
        assert!(verifier.verify_at(&p2, &sig2, now).await.is_ok());
    }

    #[tokio::test]
    async fn same_nonce_under_another_token_is_not_a_replay() {
        let verifier = SignedRequestVerifier::new(signer(), Arc::new(InMemoryReplayStore::new()));
        let a = payload("shared");
        let b = SignaturePayload {
            token_id: "token-999".into(),
            ..payload("shared")
        };
        let now = a.timestamp;

        assert!(verifier.verify_at(&a, &verifier.signer().sign(&a), now).await.is_ok());
        assert!(verifier.verify_at(&b, &verifier.signer().sign(&b), now).await.is_ok());
    }

    #[test]
    fn replay_key_is_unambiguous_across_colons() {
        assert_eq!(replay_key("token-123", "nonce-1"), "9:token-123:nonce-1");
        assert_ne!(replay_key("a", "b:c"), replay_key("a:b", "c"));
    }

    #[tokio::test]
    async fn colon_split_between_token_and_nonce_is_not_a_replay() {
        let verifier = SignedRequestVerifier::new(signer(), Arc::new(InMemoryReplayStore::new()));
        let a = SignaturePayload {
            token_id: "a".into(),
            ..payload("b:c")
        };
        let b = SignaturePayload {
            token_id: "a:b".into(),
            ..payload("c")
        };
        let now = a.timestamp;

        assert!(verifier.verify_at(&a, &verifier.signer().sign(&a), now).await.is_ok());
        assert!(verifier.verify_at(&b, &verifier.signer().sign(&b), now).await.is_ok());
    }

    #[tokio::test]
    async fn bad_signature_does_not_consume_the_nonce() {
        let store = Arc::new(InMemoryReplayStore::new());
        let verifier = SignedRequestVerifier::new(signer(), store.clone());
        let p = payload("nonce-1");
        let now = p.timestamp;

        let err = verifier.verify_at(&p, "forged", now).await.unwrap_err();
        assert!(matches!(err, SignatureError::SignatureMismatch));
        assert!(store.is_empty());

        let sig = verifier.signer().sign(&p);
        assert!(verifier.verify_at(&p, &sig, now).await.is_ok());
    }

    #[tokio::test]
    async fn stale_payload_is_distinct_from_mismatch() {
        let verifier = SignedRequestVerifier::new(signer(), Arc::new(InMemoryReplayStore::new()));
        let p = payload("nonce-1");
        let sig = verifier.signer().sign(&p);

        let err = verifier
            .verify_at(&p, &sig, p.timestamp + 3_600_000)
            .await
            .unwrap_err();
        assert!(matches!(err, SignatureError::StalePayload { .. }));
    }

    #[tokio::test]
    async fn replay_backend_failure_fails_closed() {
        let verifier = SignedRequestVerifier::new(signer(), Arc::new(BrokenStore));
        let p = payload("nonce-1");
        let sig = verifier.signer().sign(&p);

        let err = verifier.verify_at(&p, &sig, p.timestamp).await.unwrap_err();
        assert!(matches!(
            err,
            SignatureError::ReplayBackend(ReplayError::Poisoned)
        ));
    }
}
