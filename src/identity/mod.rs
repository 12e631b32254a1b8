//! Identity provider client
//!
//! This module defines the contract `authlink` consumes from the managed
//! identity service and ships a reqwest-backed implementation for
//! GoTrue-compatible endpoints. Credential issuance, OTP generation and token
//! verification all live on the provider side.

pub mod gotrue;

pub use gotrue::GoTrueClient;

use crate::models::{Session, User};
use async_trait::async_trait;
use std::fmt;

/// OAuth providers the sign-in page offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking the provider for an OAuth authorization URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthUrl {
    pub url: Option<String>,
}

/// Errors reported by the identity provider or the transport in front of it
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// The provider answered with an error payload
    #[error("{message}")]
    Provider { status: u16, message: String },
    /// The request never produced a usable response
    #[error("{0}")]
    Transport(String),
    /// The response body could not be decoded
    #[error("invalid response from identity provider: {0}")]
    Decode(String),
    #[error("identity provider misconfigured: {0}")]
    Configuration(String),
}

impl IdentityError {
    /// Message shown to users and forwarded in redirect annotations
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            IdentityError::Decode(err.to_string())
        } else {
            IdentityError::Transport(err.to_string())
        }
    }
}

/// Operations `authlink` needs from the identity service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Email a magic link pointing back at `redirect_url`, bound to the S256
    /// `code_challenge` of the browser's verifier
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the request or cannot be reached
    async fn request_email_link(
        &self,
        email: &str,
        redirect_url: &str,
        create_if_missing: bool,
        code_challenge: &str,
    ) -> Result<(), IdentityError>;

    /// Build the authorization URL for an OAuth provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not configured
    async fn request_oauth_url(
        &self,
        provider: OAuthProvider,
        redirect_url: &str,
        code_challenge: &str,
    ) -> Result<OAuthUrl, IdentityError>;

    /// Exchange an authorization code for a session. The provider refuses
    /// the code unless `code_verifier` matches the challenge it was issued for.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is invalid, expired or the provider cannot be reached
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, IdentityError>;

    /// Resolve the user behind an access token, `None` if the token is not accepted
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails for reasons other than a rejected token
    async fn get_user(&self, access_token: &str) -> Result<Option<User>, IdentityError>;
}
