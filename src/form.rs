//! Sign-in form controller
//!
//! Holds the state of one sign-in form: the email track (magic link) and the
//! OAuth track (Google). Each track refuses a new call while one is
//! outstanding, which is how "the control is disabled" is enforced. The two
//! tracks never touch each other's state.

use crate::actions::AuthApi;
use crate::models::{ActionResult, AuthActionType, AuthFormData};
use log::error;

const EMAIL_SUCCESS_FALLBACK: &str = "Login link sent!";
const EMAIL_ERROR_FALLBACK: &str = "An error occurred.";
const OAUTH_ERROR_FALLBACK: &str = "Could not start Google sign-in.";

/// Full-page navigation issued when the OAuth URL arrives
pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailState {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthState {
    Idle,
    Requesting,
    /// The page is being replaced; nothing is reset
    Redirecting,
}

/// Message area of one track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl Feedback {
    fn clear(&mut self) {
        self.message = None;
        self.error = None;
    }
}

pub struct AuthForm<A, N> {
    mode: AuthActionType,
    api: A,
    navigator: N,
    email: String,
    email_state: EmailState,
    email_feedback: Feedback,
    oauth_state: OAuthState,
    oauth_feedback: Feedback,
}

impl<A: AuthApi, N: Navigator> AuthForm<A, N> {
    pub fn new(mode: AuthActionType, api: A, navigator: N) -> Self {
        Self {
            mode,
            api,
            navigator,
            email: String::new(),
            email_state: EmailState::Idle,
            email_feedback: Feedback::default(),
            oauth_state: OAuthState::Idle,
            oauth_feedback: Feedback::default(),
        }
    }

    pub fn mode(&self) -> AuthActionType {
        self.mode
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Edit the email field; ignored while a submission is outstanding
    pub fn set_email(&mut self, email: impl Into<String>) {
        if self.email_state == EmailState::Idle {
            self.email = email.into();
        }
    }

    pub fn email_state(&self) -> EmailState {
        self.email_state
    }

    pub fn oauth_state(&self) -> OAuthState {
        self.oauth_state
    }

    pub fn email_feedback(&self) -> &Feedback {
        &self.email_feedback
    }

    pub fn oauth_feedback(&self) -> &Feedback {
        &self.oauth_feedback
    }

    pub fn email_submit_enabled(&self) -> bool {
        self.email_state == EmailState::Idle
    }

    pub fn oauth_enabled(&self) -> bool {
        self.oauth_state == OAuthState::Idle
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.email_state, self.mode) {
            (EmailState::Submitting, _) => "Sending...",
            (EmailState::Idle, AuthActionType::Login) => "Login with Email",
            (EmailState::Idle, AuthActionType::Signup) => "Sign up with Email",
        }
    }

    /// Enter `Submitting` and return the payload to send, or `None` while a
    /// submission is already outstanding
    pub fn begin_email_submit(&mut self) -> Option<AuthFormData> {
        if self.email_state != EmailState::Idle {
            return None;
        }
        self.email_state = EmailState::Submitting;
        self.email_feedback.clear();
        Some(AuthFormData::new(&self.email, self.mode))
    }

    /// Apply the action result and return to `Idle`
    pub fn finish_email_submit(&mut self, result: ActionResult) {
        if result.success {
            self.email_feedback.message = Some(
                result
                    .message
                    .unwrap_or_else(|| EMAIL_SUCCESS_FALLBACK.to_string()),
            );
            self.email.clear();
        } else {
            self.email_feedback.error = Some(
                result
                    .error
                    .unwrap_or_else(|| EMAIL_ERROR_FALLBACK.to_string()),
            );
        }
        self.email_state = EmailState::Idle;
    }

    /// Run the whole email track for the current field value
    pub async fn submit_email(&mut self) {
        let Some(form) = self.begin_email_submit() else {
            return;
        };
        let result = match self.api.send_magic_link(&form).await {
            Ok(result) => result,
            Err(e) => {
                error!("Magic link request failed: {e:#}");
                ActionResult::error(EMAIL_ERROR_FALLBACK)
            }
        };
        self.finish_email_submit(result);
    }

    /// Run the OAuth track: navigate on success, show the error otherwise
    pub async fn click_google(&mut self) {
        if self.oauth_state != OAuthState::Idle {
            return;
        }
        self.oauth_state = OAuthState::Requesting;
        self.oauth_feedback.clear();

        let outcome = match self.api.sign_in_with_google().await {
            Ok(result) => result,
            Err(e) => {
                error!("Google Sign-In Error: {e:#}");
                ActionResult::error(e.to_string())
            }
        };

        match outcome {
            ActionResult {
                success: true,
                url: Some(url),
                ..
            } if !url.is_empty() => {
                self.oauth_state = OAuthState::Redirecting;
                self.navigator.navigate(&url);
            }
            ActionResult { error, .. } => {
                error!("Google Sign-In Error: {error:?}");
                self.oauth_feedback.error =
                    Some(error.unwrap_or_else(|| OAUTH_ERROR_FALLBACK.to_string()));
                self.oauth_state = OAuthState::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mock::{MockAuthApi, RecordingNavigator};

    fn form(api: MockAuthApi) -> AuthForm<MockAuthApi, RecordingNavigator> {
        AuthForm::new(AuthActionType::Login, api, RecordingNavigator::default())
    }

    #[tokio::test]
    async fn test_successful_submit_clears_email() {
        let api = MockAuthApi::new().with_magic_link(ActionResult::message(
            "Login link sent to a@b.com. Please check your inbox.",
        ));
        let mut form = form(api);
        form.set_email("a@b.com");
        form.submit_email().await;

        assert_eq!(form.email(), "");
        assert_eq!(
            form.email_feedback().message.as_deref(),
            Some("Login link sent to a@b.com. Please check your inbox.")
        );
        assert_eq!(form.email_feedback().error, None);
        assert_eq!(form.email_state(), EmailState::Idle);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_email() {
        let api = MockAuthApi::new()
            .with_magic_link(ActionResult::error("Failed to send login link: nope"));
        let mut form = form(api);
        form.set_email("a@b.com");
        form.submit_email().await;

        assert_eq!(form.email(), "a@b.com");
        assert_eq!(
            form.email_feedback().error.as_deref(),
            Some("Failed to send login link: nope")
        );
        assert!(form.email_submit_enabled());
    }

    #[tokio::test]
    async fn test_submit_sends_mode() {
        let api = MockAuthApi::new();
        let mut form = AuthForm::new(AuthActionType::Signup, api, RecordingNavigator::default());
        form.set_email("new@example.com");
        form.submit_email().await;

        assert_eq!(
            form.api.submitted(),
            vec![AuthFormData::new("new@example.com", AuthActionType::Signup)]
        );
    }

    #[test]
    fn test_submitting_disables_control_and_clears_feedback() {
        let mut form = form(MockAuthApi::new());
        form.set_email("a@b.com");
        form.finish_email_submit(ActionResult::error("old error"));

        let payload = form.begin_email_submit();
        assert!(payload.is_some());
        assert_eq!(form.email_state(), EmailState::Submitting);
        assert!(!form.email_submit_enabled());
        assert_eq!(form.submit_label(), "Sending...");
        assert_eq!(form.email_feedback(), &Feedback::default());

        // A second submit while outstanding is refused, and the field is locked
        assert!(form.begin_email_submit().is_none());
        form.set_email("other@b.com");
        assert_eq!(form.email(), "a@b.com");
    }

    #[tokio::test]
    async fn test_transport_error_is_shown() {
        let api = MockAuthApi::new().with_magic_link_failure("connection reset");
        let mut form = form(api);
        form.set_email("a@b.com");
        form.submit_email().await;

        assert_eq!(form.email_feedback().error.as_deref(), Some("An error occurred."));
        assert_eq!(form.email(), "a@b.com");
    }

    #[tokio::test]
    async fn test_google_success_navigates() {
        let api = MockAuthApi::new().with_google(ActionResult::redirect("https://accounts.test/o"));
        let mut form = form(api);
        form.click_google().await;

        assert_eq!(form.oauth_state(), OAuthState::Redirecting);
        assert_eq!(form.navigator().visited, vec!["https://accounts.test/o".to_string()]);
    }

    #[tokio::test]
    async fn test_google_failure_reenables_control() {
        let api = MockAuthApi::new()
            .with_google(ActionResult::error("Could not get google sign-in URL."));
        let mut form = form(api);
        form.click_google().await;

        assert_eq!(form.oauth_state(), OAuthState::Idle);
        assert!(form.oauth_enabled());
        assert_eq!(
            form.oauth_feedback().error.as_deref(),
            Some("Could not get google sign-in URL.")
        );
        assert!(form.navigator().visited.is_empty());
    }

    #[tokio::test]
    async fn test_google_exception_is_caught() {
        let api = MockAuthApi::new().with_google_failure("socket closed");
        let mut form = form(api);
        form.click_google().await;

        assert_eq!(form.oauth_state(), OAuthState::Idle);
        assert_eq!(form.oauth_feedback().error.as_deref(), Some("socket closed"));
    }

    #[tokio::test]
    async fn test_tracks_are_independent() {
        let api = MockAuthApi::new()
            .with_magic_link(ActionResult::message("sent"))
            .with_google(ActionResult::error("google down"));
        let mut form = form(api);
        form.set_email("a@b.com");
        form.submit_email().await;
        form.click_google().await;

        assert_eq!(form.email_feedback().message.as_deref(), Some("sent"));
        assert_eq!(form.oauth_feedback().error.as_deref(), Some("google down"));
    }

    #[test]
    fn test_submit_labels() {
        let login = form(MockAuthApi::new());
        assert_eq!(login.submit_label(), "Login with Email");
        let signup = AuthForm::new(
            AuthActionType::Signup,
            MockAuthApi::new(),
            RecordingNavigator::default(),
        );
        assert_eq!(signup.submit_label(), "Sign up with Email");
    }
}
