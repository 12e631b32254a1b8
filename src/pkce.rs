//! PKCE (RFC 7636) material for the sign-in flows
//!
//! Every magic link request and every Google authorization URL carries the
//! S256 challenge of a fresh verifier. The verifier itself stays with the
//! browser in a short-lived cookie and is presented again when the callback
//! exchanges the code.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Method name the identity service expects alongside the challenge
pub const CODE_CHALLENGE_METHOD: &str = "s256";

/// Random bytes behind a verifier; encodes to 43 characters
const VERIFIER_BYTES: usize = 32;

/// Verifier and the challenge derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
}

impl PkcePair {
    /// Fresh verifier from the thread-local CSPRNG
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFIER_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self::from_verifier(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Pair for a known verifier
    #[must_use]
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let challenge = code_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    #[must_use]
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    #[must_use]
    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

/// `BASE64URL(SHA256(verifier))` without padding
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
