//! Auth action layer
//!
//! Validates form input, calls the identity provider and folds every outcome
//! into an [`ActionResult`]. Provider failures are returned, never raised.
//! Each sign-in attempt carries the challenge of a [`PkcePair`] whose verifier
//! the caller hands to the browser.

use crate::identity::{IdentityProvider, OAuthProvider};
use crate::models::{ActionResult, AuthActionType, AuthFormData, AuthRequest};
use crate::pkce::PkcePair;
use crate::settings::AuthLinkSettings;
use crate::utils::logging::LoggingHelper;
use async_trait::async_trait;
use log::error;
use std::sync::Arc;

pub const EMAIL_REQUIRED: &str = "Email is required.";
pub const ACTION_TYPE_REQUIRED: &str = "Auth action type is required.";

/// Surface the form controller talks to; implemented by [`SignInFlow`]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Send a magic link for the submitted form
    ///
    /// # Errors
    ///
    /// Returns an error only when the call itself could not be made
    async fn send_magic_link(&self, form: &AuthFormData) -> anyhow::Result<ActionResult>;

    /// Ask for the Google authorization URL
    ///
    /// # Errors
    ///
    /// Returns an error only when the call itself could not be made
    async fn sign_in_with_google(&self) -> anyhow::Result<ActionResult>;
}

#[derive(Clone)]
pub struct AuthActions {
    provider: Arc<dyn IdentityProvider>,
    callback_url: String,
}

impl AuthActions {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, callback_url: String) -> Self {
        Self {
            provider,
            callback_url,
        }
    }

    #[must_use]
    pub fn from_settings(provider: Arc<dyn IdentityProvider>, settings: &AuthLinkSettings) -> Self {
        Self::new(provider, settings.callback_url())
    }

    /// Absolute callback URL handed to the provider
    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Validate a raw submission into an [`AuthRequest`]
    ///
    /// # Errors
    ///
    /// Returns the user-facing validation message when the email or the
    /// action type is missing
    pub fn validate(form: &AuthFormData) -> Result<AuthRequest, &'static str> {
        let email = form
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(EMAIL_REQUIRED)?;

        let mode = form
            .auth_action_type
            .as_deref()
            .and_then(|t| t.parse::<AuthActionType>().ok())
            .ok_or(ACTION_TYPE_REQUIRED)?;

        Ok(AuthRequest {
            email: email.to_string(),
            mode,
        })
    }

    /// Start a sign-in attempt with a fresh PKCE pair
    #[must_use]
    pub fn begin_flow(&self) -> SignInFlow {
        SignInFlow::new(self.clone(), PkcePair::generate())
    }

    /// Send a magic link for a raw form submission
    pub async fn send_magic_link(&self, form: &AuthFormData, pkce: &PkcePair) -> ActionResult {
        match Self::validate(form) {
            Ok(request) => self.send_magic_link_request(&request, pkce).await,
            Err(message) => ActionResult::error(message),
        }
    }

    /// Send a magic link for an already validated request
    pub async fn send_magic_link_request(
        &self,
        request: &AuthRequest,
        pkce: &PkcePair,
    ) -> ActionResult {
        let result = self
            .provider
            .request_email_link(
                &request.email,
                &self.callback_url,
                request.mode.creates_user(),
                pkce.challenge(),
            )
            .await;

        LoggingHelper::log_magic_link_outcome(request.mode, result.as_ref().err());

        match result {
            Ok(()) => ActionResult::message(format!(
                "Login link sent to {}. Please check your inbox.",
                request.email
            )),
            Err(e) => ActionResult::error(format!(
                "Failed to send {} link: {}",
                request.mode,
                e.message()
            )),
        }
    }

    /// Ask the provider for the Google authorization URL
    pub async fn sign_in_with_google(&self, pkce: &PkcePair) -> ActionResult {
        self.generate_oauth_sign_in_url(OAuthProvider::Google, pkce)
            .await
    }

    async fn generate_oauth_sign_in_url(
        &self,
        provider: OAuthProvider,
        pkce: &PkcePair,
    ) -> ActionResult {
        match self
            .provider
            .request_oauth_url(provider, &self.callback_url, pkce.challenge())
            .await
        {
            Err(e) => {
                error!("OAuth Error ({provider}): {e}");
                ActionResult::error(format!(
                    "Failed to initiate {provider} sign-in: {}",
                    e.message()
                ))
            }
            Ok(oauth) => match oauth.url.filter(|u| !u.is_empty()) {
                Some(url) => ActionResult::redirect(url),
                None => ActionResult::error(format!("Could not get {provider} sign-in URL.")),
            },
        }
    }
}

/// One sign-in attempt: the action layer bound to a single PKCE pair
#[derive(Clone)]
pub struct SignInFlow {
    actions: AuthActions,
    pkce: PkcePair,
}

impl SignInFlow {
    #[must_use]
    pub fn new(actions: AuthActions, pkce: PkcePair) -> Self {
        Self { actions, pkce }
    }

    /// Pair whose verifier must reach the callback
    #[must_use]
    pub fn pkce(&self) -> &PkcePair {
        &self.pkce
    }
}

#[async_trait]
impl AuthApi for SignInFlow {
    async fn send_magic_link(&self, form: &AuthFormData) -> anyhow::Result<ActionResult> {
        Ok(self.actions.send_magic_link(form, &self.pkce).await)
    }

    async fn sign_in_with_google(&self) -> anyhow::Result<ActionResult> {
        Ok(self.actions.sign_in_with_google(&self.pkce).await)
    }
}
