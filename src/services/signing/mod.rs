pub mod core;
pub mod headers;
pub mod payload;
pub mod secret;
pub mod verifier;

pub use self::core::{
    RequestSigner, SignatureError, SignaturePolicy, generate_signature, hash_body,
    signatures_match, verify_signature,
};
pub use payload::SignaturePayload;
pub use secret::Secret;
pub use verifier::SignedRequestVerifier;
