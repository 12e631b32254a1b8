//! Route guard
//!
//! Capability check used by protected routes: who is signed in, if anyone.
//! The identity provider decides whether the stored access token is valid.

use crate::identity::{IdentityError, IdentityProvider};
use crate::models::User;
use crate::settings::AuthLinkSettings;
use crate::utils::cookie_utils::access_token_from_request;
use crate::utils::logging::LoggingHelper;
use crate::utils::redirect::RedirectTarget;
use crate::utils::response_builder::ResponseBuilder;
use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct SessionGuard {
    provider: Arc<dyn IdentityProvider>,
    login_path: String,
    base_url: Url,
}

impl SessionGuard {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, settings: &AuthLinkSettings) -> Self {
        Self {
            provider,
            login_path: settings.routes.login_path.clone(),
            base_url: settings.base_url(),
        }
    }

    /// User behind the request's access token; `None` without a token or
    /// when the provider rejects it
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not answer
    pub async fn current_user(&self, req: &HttpRequest) -> Result<Option<User>, IdentityError> {
        match access_token_from_request(req) {
            Some(token) => self.provider.get_user(&token).await,
            None => Ok(None),
        }
    }

    /// Signed-in user, or the redirect that sends the browser to the login page
    ///
    /// # Errors
    ///
    /// Returns the login redirect when no user is signed in or the lookup fails
    pub async fn require_user(&self, req: &HttpRequest) -> Result<User, HttpResponse> {
        match self.current_user(req).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(self.login_redirect(RedirectTarget::to(self.login_path.as_str()))),
            Err(e) => {
                LoggingHelper::log_session_lookup_failed(&e);
                Err(self.login_redirect(
                    RedirectTarget::to(self.login_path.as_str()).with_error("session_retrieval_failed"),
                ))
            }
        }
    }

    fn login_redirect(&self, target: RedirectTarget) -> HttpResponse {
        ResponseBuilder::redirect(&target.resolve(&self.base_url), None)
    }
}
