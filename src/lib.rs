#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the authlink application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod actions;
pub mod app;
pub mod form;
pub mod guard;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod pkce;
pub mod revalidation;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use actions::{AuthActions, AuthApi, SignInFlow};
pub use app::AppServices;
pub use form::{AuthForm, Navigator};
pub use guard::SessionGuard;
pub use handlers::{auth_callback, configure_services, health};
pub use identity::{GoTrueClient, IdentityError, IdentityProvider};
pub use models::{ActionResult, AuthActionType, AuthFormData};
pub use pkce::PkcePair;
pub use revalidation::{RevalidateKind, Revalidator};
pub use settings::AuthLinkSettings;
