//! Request signing (HMAC-SHA256) - core logic.
//!
//! Pure functions over (payload, secret). Replay bookkeeping lives in
//! `verifier.rs`; this module only knows about shape, time window and MAC.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::payload::SignaturePayload;
use super::secret::Secret;
use crate::services::replay::ReplayError;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_MAX_SKEW_MS: u64 = 300_000;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("malformed signature payload: missing or invalid {0}")]
    MalformedPayload(&'static str),

    #[error("stale payload: timestamp is {skew_ms}ms away from now (max {max_skew_ms}ms)")]
    StalePayload { skew_ms: u64, max_skew_ms: u64 },

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("nonce already used")]
    ReplayedNonce,

    #[error("replay store failure: {0}")]
    ReplayBackend(#[from] ReplayError),
}

/// Policy knobs for verification.
///
/// Kept apart from `Config` so the core stays testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignaturePolicy {
    // Accepted |now - timestamp|, milliseconds.
    pub max_skew_ms: u64,
    // How long a consumed nonce is remembered.
    pub replay_ttl_seconds: u64,
}

impl SignaturePolicy {
    pub fn new(max_skew_ms: u64) -> Self {
        Self {
            max_skew_ms,
            replay_ttl_seconds: default_replay_ttl_seconds(max_skew_ms),
        }
    }

    pub fn with_replay_ttl_seconds(mut self, ttl: u64) -> Self {
        self.replay_ttl_seconds = ttl.max(1);
        self
    }
}

impl Default for SignaturePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SKEW_MS)
    }
}

/// A timestamp is accepted up to `max_skew` on either side of now, so a nonce
/// has to be remembered for the whole `2 * max_skew` span.
pub fn default_replay_ttl_seconds(max_skew_ms: u64) -> u64 {
    (max_skew_ms.saturating_mul(2) / 1000).max(1)
}

/// HMAC-SHA256 over the canonical string, lowercase hex.
pub fn generate_signature(payload: &SignaturePayload, secret: &Secret) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.canonical_string().as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison. Different lengths compare unequal.
pub fn signatures_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// SHA-256 of a request body, lowercase hex.
pub fn hash_body(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Verify a presented signature.
///
/// Checks run in this order, each with its own error:
/// 1. payload shape (`MalformedPayload`)
/// 2. timestamp window (`StalePayload`)
/// 3. MAC (`SignatureMismatch`)
///
/// Nonce replay is NOT checked here.
pub fn verify_signature(
    payload: &SignaturePayload,
    presented: &str,
    secret: &Secret,
    policy: SignaturePolicy,
    now_ms: i64,
) -> Result<(), SignatureError> {
    payload.validate()?;
    if presented.trim().is_empty() {
        return Err(SignatureError::MalformedPayload("signature"));
    }

    let skew_ms = now_ms.abs_diff(payload.timestamp);
    if skew_ms > policy.max_skew_ms {
        return Err(SignatureError::StalePayload {
            skew_ms,
            max_skew_ms: policy.max_skew_ms,
        });
    }

    let expected = generate_signature(payload, secret);
    if !signatures_match(&expected, presented) {
        return Err(SignatureError::SignatureMismatch);
    }

    Ok(())
}

/// Secret + policy bundle.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    secret: Secret,
    policy: SignaturePolicy,
}

impl RequestSigner {
    pub fn new(secret: Secret, policy: SignaturePolicy) -> Self {
        Self { secret, policy }
    }

    pub fn policy(&self) -> SignaturePolicy {
        self.policy
    }

    pub fn sign(&self, payload: &SignaturePayload) -> String {
        generate_signature(payload, &self.secret)
    }

    pub fn verify(
        &self,
        payload: &SignaturePayload,
        presented: &str,
        now_ms: i64,
    ) -> Result<(), SignatureError> {
        verify_signature(payload, presented, &self.secret, self.policy, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-12345";
    const EXPECTED: &str = "45ad9c14e20c6e49994a5585c1fb880529490f8e81f544a7da4d4117ab4f3cac";

    fn sample() -> SignaturePayload {
        SignaturePayload::new(
            1234567890,
            "POST",
            "/api/proxy/chat",
            "abc123",
            "token-123",
            "nonce-456",
        )
    }

    #[test]
    fn signature_is_deterministic() {
        let secret = Secret::from(SECRET);
        let a = generate_signature(&sample(), &secret);
        let b = generate_signature(&sample(), &secret);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn known_vector_is_reproduced() {
        let secret = Secret::from(SECRET);
        assert_eq!(generate_signature(&sample(), &secret), EXPECTED);
    }

    #[test]
    fn path_change_alone_changes_signature() {
        let secret = Secret::from(SECRET);
        let mut other = sample();
        other.path = "/api/proxy/completions".to_string();
        assert_ne!(
            generate_signature(&sample(), &secret),
            generate_signature(&other, &secret)
        );
    }

    #[test]
    fn every_field_is_committed() {
        let secret = Secret::from(SECRET);
        let base = generate_signature(&sample(), &secret);

        let variants: Vec<SignaturePayload> = vec![
            SignaturePayload { timestamp: 1234567891, ..sample() },
            SignaturePayload { method: "PUT".into(), ..sample() },
            SignaturePayload { body_hash: "abc124".into(), ..sample() },
            SignaturePayload { token_id: "token-124".into(), ..sample() },
            SignaturePayload { nonce: "nonce-457".into(), ..sample() },
        ];

        for payload in variants {
            assert_ne!(base, generate_signature(&payload, &secret), "{payload:?}");
        }
    }

    #[test]
    fn fields_cannot_shift_across_the_delimiter() {
        let secret = Secret::from(SECRET);
        let a = SignaturePayload::new(1, "GET", "/a", "h", "tok", "n1");
        let b = SignaturePayload::new(1, "GET", "/a", "h", "to", "kn1");
        assert_ne!(generate_signature(&a, &secret), generate_signature(&b, &secret));
    }

    #[test]
    fn secret_change_changes_signature() {
        let a = generate_signature(&sample(), &Secret::from(SECRET));
        let b = generate_signature(&sample(), &Secret::from("test-secret-key-12346"));
        assert_ne!(a, b);
    }

    #[test]
    fn method_case_does_not_matter() {
        let secret = Secret::from(SECRET);
        let lower = SignaturePayload { method: "post".into(), ..sample() };
        assert_eq!(generate_signature(&lower, &secret), EXPECTED);
    }

    #[test]
    fn signatures_match_is_exact() {
        assert!(signatures_match(EXPECTED, EXPECTED));
        assert!(!signatures_match(EXPECTED, &EXPECTED[..63]));
        assert!(!signatures_match(EXPECTED, &EXPECTED.to_ascii_uppercase()));
        assert!(!signatures_match(EXPECTED, ""));
    }

    #[test]
    fn hash_body_is_sha256_hex() {
        assert_eq!(
            hash_body(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hash_body(br#"{"model":"gpt-4o"}"#),
            "960e9886e1bff92dceaf7f3850d2fe2f81776879f9077ef7e59f0e0fa929f504"
        );
    }

    #[test]
    fn verify_accepts_fresh_valid_signature() {
        let secret = Secret::from(SECRET);
        let payload = sample();
        let now = payload.timestamp + 1_000;
        let result = verify_signature(&payload, EXPECTED, &secret, SignaturePolicy::default(), now);
        assert!(result.is_ok());
    }

    #[test]
    fn verify_rejects_tampered_payload_as_mismatch() {
        let secret = Secret::from(SECRET);
        let tampered = SignaturePayload { path: "/api/proxy/embeddings".into(), ..sample() };
        let now = tampered.timestamp;
        let err = verify_signature(&tampered, EXPECTED, &secret, SignaturePolicy::default(), now)
            .unwrap_err();
        assert!(matches!(err, SignatureError::SignatureMismatch));
    }

    #[test]
    fn verify_rejects_stale_and_future_timestamps() {
        let secret = Secret::from(SECRET);
        let payload = sample();
        let policy = SignaturePolicy::new(60_000);

        let err = verify_signature(&payload, EXPECTED, &secret, policy, payload.timestamp + 60_001)
            .unwrap_err();
        assert!(matches!(
            err,
            SignatureError::StalePayload { skew_ms: 60_001, max_skew_ms: 60_000 }
        ));

        let err = verify_signature(&payload, EXPECTED, &secret, policy, payload.timestamp - 60_001)
            .unwrap_err();
        assert!(matches!(err, SignatureError::StalePayload { .. }));

        assert!(
            verify_signature(&payload, EXPECTED, &secret, policy, payload.timestamp + 60_000)
                .is_ok()
        );
    }

    #[test]
    fn verify_reports_malformed_before_stale_or_mismatch() {
        let secret = Secret::from(SECRET);
        let payload = SignaturePayload { token_id: String::new(), ..sample() };
        // also stale and wrong signature: shape wins
        let err = verify_signature(&payload, "deadbeef", &secret, SignaturePolicy::default(), 0)
            .unwrap_err();
        assert!(matches!(err, SignatureError::MalformedPayload("token_id")));

        let err = verify_signature(&sample(), "  ", &secret, SignaturePolicy::default(), 0)
            .unwrap_err();
        assert!(matches!(err, SignatureError::MalformedPayload("signature")));
    }

    #[test]
    fn stale_is_reported_before_mismatch() {
        let secret = Secret::from(SECRET);
        let payload = sample();
        let err = verify_signature(
            &payload,
            "not-the-signature",
            &secret,
            SignaturePolicy::default(),
            payload.timestamp + 10 * DEFAULT_MAX_SKEW_MS as i64,
        )
        .unwrap_err();
        assert!(matches!(err, SignatureError::StalePayload { .. }));
    }

    #[test]
    fn replay_ttl_covers_both_sides_of_the_window() {
        assert_eq!(SignaturePolicy::default().replay_ttl_seconds, 600);
        assert_eq!(default_replay_ttl_seconds(100), 1);
        assert_eq!(
            SignaturePolicy::new(1_000).with_replay_ttl_seconds(0).replay_ttl_seconds,
            1
        );
    }

    #[test]
    fn request_signer_round_trip() {
        let signer = RequestSigner::new(Secret::from(SECRET), SignaturePolicy::default());
        let payload = sample();
        let signature = signer.sign(&payload);
        assert_eq!(signature, EXPECTED);
        assert!(signer.verify(&payload, &signature, payload.timestamp).is_ok());
    }
}
