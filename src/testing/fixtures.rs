//! Test fixtures providing pre-built test objects

use crate::models::{Session, User};
use crate::settings::{
    ApplicationSettings, AuthLinkSettings, CookieSettings, IdentitySettings,
};

use super::constants::{TEST_ACCESS_TOKEN, TEST_BASE_URL, TEST_EMAIL, TEST_USER_ID};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Settings pointing at the test base URL with insecure cookies
    #[must_use]
    pub fn settings() -> AuthLinkSettings {
        Self::settings_with_base_url(TEST_BASE_URL)
    }

    #[must_use]
    pub fn settings_with_base_url(base_url: &str) -> AuthLinkSettings {
        AuthLinkSettings {
            application: ApplicationSettings {
                base_url: base_url.to_string(),
                ..ApplicationSettings::default()
            },
            identity: IdentitySettings {
                url: "http://identity.test".to_string(),
                api_key: Some("test-anon-key".to_string()),
                api_key_env: None,
                ..IdentitySettings::default()
            },
            cookies: CookieSettings { secure: false },
            ..AuthLinkSettings::default()
        }
    }

    #[must_use]
    pub fn user() -> User {
        User {
            id: TEST_USER_ID.to_string(),
            email: Some(TEST_EMAIL.to_string()),
            role: Some("authenticated".to_string()),
        }
    }

    #[must_use]
    pub fn session() -> Session {
        Session {
            access_token: TEST_ACCESS_TOKEN.to_string(),
            refresh_token: Some("test-refresh-token".to_string()),
            expires_in: Some(3600),
            user: Some(Self::user()),
        }
    }
}
