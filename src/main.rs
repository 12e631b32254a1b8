#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use authlink::{
    revalidation, settings::AuthLinkSettings, utils::logging::LoggingHelper, AppServices,
    GoTrueClient,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = AuthLinkSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let identity = GoTrueClient::from_settings(&settings.identity).map_err(|e| {
        std::io::Error::other(format!("Failed to initialize identity provider: {e}"))
    })?;
    LoggingHelper::log_identity_provider(&settings.identity.url, &settings.callback_url());

    let revalidator = revalidation::from_settings(&settings);
    let services = AppServices::new(settings, Arc::new(identity), revalidator);

    start_server(services).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(services: AppServices) -> std::io::Result<()> {
    let bind_address = services.settings().get_bind_address();
    print_startup_info(&bind_address, services.settings());

    let cors_origins = services.settings().get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        let services = services.clone();
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(move |cfg| services.configure(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &AuthLinkSettings) {
    println!("Starting authlink {} on http://{bind_address}", authlink::VERSION);
    println!("Public base URL: {}", settings.base_url());
    println!();
    println!("Sign-in pages:");
    println!("  GET  /login, /signup              - Sign-in page per mode");
    println!("  POST /login/email, /signup/email  - Request a magic link");
    println!("  POST /login/google, /signup/google - Continue with Google");
    println!();
    println!("Action endpoints (JSON):");
    println!("  POST /auth/actions/magic-link - Request a magic link");
    println!("  POST /auth/actions/google     - Get the Google sign-in URL");
    println!();
    println!("Callback URL for the identity provider:");
    println!("  {}", settings.callback_url());
    println!();
    println!("Session endpoints:");
    println!("  GET  /auth/user          - Current user (JSON)");
    println!("  GET  /dashboard          - Protected landing page");
    println!("  GET|POST /auth/sign_out  - Clear session");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping               - Health check");
}
