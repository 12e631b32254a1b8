// Centralized logging utilities to reduce verbose logging patterns
use crate::identity::IdentityError;
use crate::models::AuthActionType;
use log::{debug, error, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log callback details in development mode
    pub fn log_callback_debug(req: &actix_web::HttpRequest, code_present: bool, next: Option<&str>) {
        debug!(
            "Auth callback received via {}: code_present={code_present}, next={next:?}",
            req.method()
        );
        debug!("Callback request connection info: {:?}", req.connection_info());
    }

    pub fn log_missing_code() {
        warn!("Auth Callback - No 'code' parameter found in URL.");
    }

    pub fn log_missing_verifier() {
        warn!("Auth Callback - No PKCE verifier cookie; the link was opened in another browser or has expired.");
    }

    pub fn log_exchange_failed(err: &IdentityError) {
        error!("Auth Callback - Error exchanging code for session: {err}");
    }

    /// Log session handoff success
    pub fn log_session_created(user_email: Option<&str>, destination: &str) {
        info!(
            "Session established for user: {} (redirecting to {destination})",
            user_email.unwrap_or("<unknown>")
        );
    }

    /// Log the outcome of a magic link request
    pub fn log_magic_link_outcome(mode: AuthActionType, err: Option<&IdentityError>) {
        match err {
            None => info!("📧 Sent {mode} link"),
            Some(e) => warn!("Failed to send {mode} link: {e}"),
        }
    }

    pub fn log_session_lookup_failed(err: &IdentityError) {
        error!("Error fetching user session: {err}");
    }

    /// Log startup configuration summary
    pub fn log_identity_provider(url: &str, callback_url: &str) {
        info!("🔧 Identity provider: {url}");
        info!("🎯 Callback URL registered with provider: {callback_url}");
    }
}
