//! Testing utilities for authlink
//!
//! Available to unit tests and, through the `testing` feature, to the
//! integration tests under `tests/`.
//!
//! - [`fixtures`] - Pre-built test data (settings, users, sessions)
//! - [`mock`] - Scripted identity provider, action layer, revalidator and navigator
//! - [`app`] - Builders for actix test services wired with mocks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use authlink::testing::mock::MockIdentityProvider;
//!
//! let provider = MockIdentityProvider::new().fail_exchange("Exchange failed");
//! ```

pub mod app;
pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;

/// Common test constants
pub mod constants {
    /// Default test email address
    pub const TEST_EMAIL: &str = "test@example.com";

    /// Default test user id
    pub const TEST_USER_ID: &str = "8d0fd2b3-9ca7-4cde-b3c4-6d6f2e1f6f01";

    /// Access token handed out by the mock provider
    pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

    /// Base URL used by the test settings
    pub const TEST_BASE_URL: &str = "http://localhost:3000";

    /// Authorization URL returned by the mock provider
    pub const TEST_OAUTH_URL: &str =
        "http://identity.test/auth/v1/authorize?provider=google&redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback";
}
