//! Request-scoped data types shared by the actions, handlers and form controller

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether the submitted email should sign in an existing user or create one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthActionType {
    Login,
    Signup,
}

impl AuthActionType {
    /// Lowercase word used in messages and form values
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuthActionType::Login => "login",
            AuthActionType::Signup => "signup",
        }
    }

    /// Whether the identity provider may create a missing account
    #[must_use]
    pub fn creates_user(self) -> bool {
        matches!(self, AuthActionType::Signup)
    }
}

impl fmt::Display for AuthActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAuthActionType(pub String);

impl fmt::Display for UnknownAuthActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown auth action type: {}", self.0)
    }
}

impl std::error::Error for UnknownAuthActionType {}

impl FromStr for AuthActionType {
    type Err = UnknownAuthActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(AuthActionType::Login),
            "signup" => Ok(AuthActionType::Signup),
            other => Err(UnknownAuthActionType(other.to_string())),
        }
    }
}

/// Validated email sign-in request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub email: String,
    pub mode: AuthActionType,
}

/// Raw form submission, as posted by the sign-in page or an API client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFormData {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "authActionType")]
    pub auth_action_type: Option<String>,
}

impl AuthFormData {
    #[must_use]
    pub fn new(email: &str, mode: AuthActionType) -> Self {
        Self {
            email: Some(email.to_string()),
            auth_action_type: Some(mode.as_str().to_string()),
        }
    }
}

/// Uniform outcome of an auth action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ActionResult {
    /// Successful action with a user-facing message
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Successful action that hands back a URL to navigate to
    #[must_use]
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Failed action with a user-facing error
    #[must_use]
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Query parameters delivered to the callback endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

impl CallbackQuery {
    /// Authorization code, ignoring empty values
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    /// Requested post-login path, ignoring empty values
    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.next.as_deref().filter(|n| !n.is_empty())
    }
}

/// Query annotations read back by the login page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPageQuery {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub details: Option<String>,
}

/// User record as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Session returned by a successful code exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
