//! Builders for actix test services wired with mocks

use crate::app::AppServices;
use crate::settings::AuthLinkSettings;
use std::sync::Arc;

use super::fixtures::TestFixtures;
use super::mock::{MockIdentityProvider, RecordingRevalidator};

/// Services plus handles on the mocks they were built from
pub struct TestApp {
    pub services: AppServices,
    pub provider: Arc<MockIdentityProvider>,
    pub revalidator: Arc<RecordingRevalidator>,
}

impl TestApp {
    /// Wire `provider` with the default test settings
    #[must_use]
    pub fn new(provider: MockIdentityProvider) -> Self {
        Self::with_settings(provider, TestFixtures::settings())
    }

    #[must_use]
    pub fn with_settings(provider: MockIdentityProvider, settings: AuthLinkSettings) -> Self {
        let provider = Arc::new(provider);
        let revalidator = Arc::new(RecordingRevalidator::default());
        let services = AppServices::new(settings, provider.clone(), revalidator.clone());
        Self {
            services,
            provider,
            revalidator,
        }
    }
}
