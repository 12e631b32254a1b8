// HTTP request handlers for the sign-in front end
pub mod actions;
pub mod callback;
pub mod health;
pub mod pages;
pub mod session;

#[cfg(test)]
mod tests;

use crate::models::AuthActionType;
use crate::settings::RouteSettings;
use actix_web::web;

// Re-export the main handler functions
pub use actions::{google_action, magic_link_action};
pub use callback::auth_callback;
pub use health::health;
pub use pages::{login_email, login_google, login_page, signup_email, signup_google, signup_page};
pub use session::{current_user, dashboard, sign_out};

/// Register every route; application data is registered by [`crate::app::AppServices`]
///
/// The sign-in pages and the callback are mounted where `routes` says, so the
/// redirect targets built from the same settings always resolve.
pub fn configure_services(cfg: &mut web::ServiceConfig, routes: &RouteSettings) {
    let login = AuthActionType::Login;
    let signup = AuthActionType::Signup;
    cfg
        // Sign-in pages
        .route(routes.page_path(login), web::get().to(login_page))
        .route(routes.page_path(signup), web::get().to(signup_page))
        .route(&routes.email_form_path(login), web::post().to(login_email))
        .route(&routes.email_form_path(signup), web::post().to(signup_email))
        .route(&routes.google_form_path(login), web::post().to(login_google))
        .route(&routes.google_form_path(signup), web::post().to(signup_google))
        // Action endpoints
        .route("/auth/actions/magic-link", web::post().to(magic_link_action))
        .route("/auth/actions/google", web::post().to(google_action))
        // Callback
        .route(&routes.callback_path, web::get().to(auth_callback))
        // Session
        .route("/auth/user", web::get().to(current_user))
        .route("/auth/sign_out", web::get().to(sign_out))
        .route("/auth/sign_out", web::post().to(sign_out))
        .route("/dashboard", web::get().to(dashboard))
        // Health endpoint
        .route("/ping", web::get().to(health));
}
