//! Mock objects and fake implementations for testing
//!
//! This module provides mock implementations of the identity provider, the
//! revalidation hook, the action layer and the navigator for isolated unit
//! and handler tests.

use crate::actions::AuthApi;
use crate::form::Navigator;
use crate::identity::{IdentityError, IdentityProvider, OAuthProvider, OAuthUrl};
use crate::models::{ActionResult, AuthFormData, Session, User};
use crate::revalidation::{RevalidateKind, Revalidator};
use async_trait::async_trait;
use std::sync::Mutex;

use super::fixtures::TestFixtures;

/// One call made against [`MockIdentityProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    EmailLink {
        email: String,
        redirect_url: String,
        create_if_missing: bool,
        code_challenge: String,
    },
    OAuthUrl {
        provider: OAuthProvider,
        redirect_url: String,
        code_challenge: String,
    },
    Exchange {
        code: String,
        code_verifier: Option<String>,
    },
    GetUser {
        access_token: String,
    },
}

/// Scripted identity provider that records every call
pub struct MockIdentityProvider {
    email_link: Result<(), IdentityError>,
    oauth: Result<OAuthUrl, IdentityError>,
    exchange: Result<Session, IdentityError>,
    user: Result<Option<User>, IdentityError>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn provider_error(message: &str) -> IdentityError {
    IdentityError::Provider {
        status: 400,
        message: message.to_string(),
    }
}

impl MockIdentityProvider {
    /// Provider where every operation succeeds
    #[must_use]
    pub fn new() -> Self {
        Self {
            email_link: Ok(()),
            oauth: Ok(OAuthUrl {
                url: Some(super::constants::TEST_OAUTH_URL.to_string()),
            }),
            exchange: Ok(TestFixtures::session()),
            user: Ok(Some(TestFixtures::user())),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn fail_email_link(mut self, message: &str) -> Self {
        self.email_link = Err(provider_error(message));
        self
    }

    #[must_use]
    pub fn with_oauth_url(mut self, url: Option<&str>) -> Self {
        self.oauth = Ok(OAuthUrl {
            url: url.map(ToString::to_string),
        });
        self
    }

    #[must_use]
    pub fn with_oauth_error(mut self, err: IdentityError) -> Self {
        self.oauth = Err(err);
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.exchange = Ok(session);
        self
    }

    #[must_use]
    pub fn fail_exchange(mut self, message: &str) -> Self {
        self.exchange = Err(provider_error(message));
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: Option<User>) -> Self {
        self.user = Ok(user);
        self
    }

    #[must_use]
    pub fn fail_get_user(mut self, message: &str) -> Self {
        self.user = Err(IdentityError::Transport(message.to_string()));
        self
    }

    /// Calls recorded so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the call log mutex is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn request_email_link(
        &self,
        email: &str,
        redirect_url: &str,
        create_if_missing: bool,
        code_challenge: &str,
    ) -> Result<(), IdentityError> {
        self.record(ProviderCall::EmailLink {
            email: email.to_string(),
            redirect_url: redirect_url.to_string(),
            create_if_missing,
            code_challenge: code_challenge.to_string(),
        });
        self.email_link.clone()
    }

    async fn request_oauth_url(
        &self,
        provider: OAuthProvider,
        redirect_url: &str,
        code_challenge: &str,
    ) -> Result<OAuthUrl, IdentityError> {
        self.record(ProviderCall::OAuthUrl {
            provider,
            redirect_url: redirect_url.to_string(),
            code_challenge: code_challenge.to_string(),
        });
        self.oauth.clone()
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, IdentityError> {
        self.record(ProviderCall::Exchange {
            code: code.to_string(),
            code_verifier: code_verifier.map(ToString::to_string),
        });
        self.exchange.clone()
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, IdentityError> {
        self.record(ProviderCall::GetUser {
            access_token: access_token.to_string(),
        });
        self.user.clone()
    }
}

/// Revalidator that remembers every signal
#[derive(Default)]
pub struct RecordingRevalidator {
    signals: Mutex<Vec<(String, RevalidateKind)>>,
}

impl RecordingRevalidator {
    /// Signals received so far
    ///
    /// # Panics
    ///
    /// Panics if the signal log mutex is poisoned.
    #[must_use]
    pub fn signals(&self) -> Vec<(String, RevalidateKind)> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait]
impl Revalidator for RecordingRevalidator {
    async fn revalidate(&self, path: &str, kind: RevalidateKind) {
        self.signals.lock().unwrap().push((path.to_string(), kind));
    }
}

/// Scripted action layer for form controller tests
pub struct MockAuthApi {
    magic_link: Result<ActionResult, String>,
    google: Result<ActionResult, String>,
    submitted: Mutex<Vec<AuthFormData>>,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthApi {
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic_link: Ok(ActionResult::message("Login link sent!")),
            google: Ok(ActionResult::redirect(super::constants::TEST_OAUTH_URL)),
            submitted: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_magic_link(mut self, result: ActionResult) -> Self {
        self.magic_link = Ok(result);
        self
    }

    /// Make the magic link call itself fail, as a dropped connection would
    #[must_use]
    pub fn with_magic_link_failure(mut self, message: &str) -> Self {
        self.magic_link = Err(message.to_string());
        self
    }

    #[must_use]
    pub fn with_google(mut self, result: ActionResult) -> Self {
        self.google = Ok(result);
        self
    }

    #[must_use]
    pub fn with_google_failure(mut self, message: &str) -> Self {
        self.google = Err(message.to_string());
        self
    }

    /// Forms submitted so far
    ///
    /// # Panics
    ///
    /// Panics if the submission log mutex is poisoned.
    #[must_use]
    pub fn submitted(&self) -> Vec<AuthFormData> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn send_magic_link(&self, form: &AuthFormData) -> anyhow::Result<ActionResult> {
        self.submitted.lock().unwrap().push(form.clone());
        self.magic_link.clone().map_err(anyhow::Error::msg)
    }

    async fn sign_in_with_google(&self) -> anyhow::Result<ActionResult> {
        self.google.clone().map_err(anyhow::Error::msg)
    }
}

/// Navigator that records requested URLs instead of leaving the page
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visited: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, url: &str) {
        self.visited.push(url.to_string());
    }
}
