//! Application wiring shared by the binary and the tests

use crate::actions::AuthActions;
use crate::guard::SessionGuard;
use crate::handlers::configure_services;
use crate::identity::IdentityProvider;
use crate::revalidation::Revalidator;
use crate::settings::AuthLinkSettings;
use actix_web::web;
use std::sync::Arc;

/// Long-lived collaborators handed to every worker
#[derive(Clone)]
pub struct AppServices {
    settings: AuthLinkSettings,
    provider: Arc<dyn IdentityProvider>,
    revalidator: Arc<dyn Revalidator>,
    actions: AuthActions,
    guard: SessionGuard,
}

impl AppServices {
    #[must_use]
    pub fn new(
        settings: AuthLinkSettings,
        provider: Arc<dyn IdentityProvider>,
        revalidator: Arc<dyn Revalidator>,
    ) -> Self {
        let actions = AuthActions::from_settings(provider.clone(), &settings);
        let guard = SessionGuard::new(provider.clone(), &settings);
        Self {
            settings,
            provider,
            revalidator,
            actions,
            guard,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &AuthLinkSettings {
        &self.settings
    }

    /// Register application data and routes on one worker's app
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.settings.clone()))
            .app_data(web::Data::from(self.provider.clone()))
            .app_data(web::Data::from(self.revalidator.clone()))
            .app_data(web::Data::new(self.actions.clone()))
            .app_data(web::Data::new(self.guard.clone()));
        configure_services(cfg, &self.settings.routes);
    }
}
