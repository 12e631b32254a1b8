use crate::models::AuthActionType;
use serde::{Deserialize, Serialize};
use std::fs;
use url::Url;

/// Base URL used whenever the configured one is missing or unparsable
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Toml(#[from] basic_toml::Error),
    #[error("failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthLinkSettings {
    pub application: ApplicationSettings,
    pub identity: IdentitySettings,
    pub routes: RouteSettings,
    pub cookies: CookieSettings,
    pub revalidation: RevalidationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Public base URL used to build absolute redirect targets
    pub base_url: String,
    pub cors_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    /// Root URL of the identity service (e.g. `https://project.supabase.co`)
    pub url: String,

    // Direct value (can be overridden by the environment variable below)
    pub api_key: Option<String>,

    // Environment variable name for the api key override
    pub api_key_env: Option<String>,

    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    /// Login page; its forms post to `{login_path}/email` and `{login_path}/google`
    pub login_path: String,
    pub signup_path: String,
    pub default_next: String,
    pub callback_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RevalidationSettings {
    /// Optional webhook notified after a successful sign-in
    pub webhook_url: Option<String>,
    /// Environment variable holding the shared secret sent to the webhook
    pub secret_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: DEFAULT_BASE_URL.to_string(),
            cors_origins: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: None,
            api_key_env: Some("IDENTITY_API_KEY".to_string()),
            timeout_seconds: 10,
        }
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            signup_path: "/signup".to_string(),
            default_next: "/dashboard".to_string(),
            callback_path: "/auth/callback".to_string(),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true, // Default to secure cookies
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AuthLinkSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        // RUST_LOG has already been folded into logging.level
        env_logger::Builder::new()
            .parse_filters(&settings.logging.level)
            .try_init()?;

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `AUTHLINK_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed
    pub fn load_base_settings() -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_file(&default_config_path)?;
            log::info!(
                "Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("AUTHLINK_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_file(&secrets_path)?;
                log::info!("Overriding settings from {}", secrets_path.display());
            } else {
                log::info!(
                    "AUTHLINK_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a single TOML settings file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_file(path: &std::path::Path) -> Result<Self, SettingsError> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_identity_env_overrides(&mut settings.identity);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_revalidation_env_overrides(&mut settings.revalidation);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Some(base_url) = non_empty_env("PUBLIC_BASE_URL") {
            app_settings.base_url = base_url;
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
    }

    fn apply_identity_env_overrides(identity_settings: &mut IdentitySettings) {
        if let Some(url) = non_empty_env("IDENTITY_URL") {
            identity_settings.url = url;
        }
        if let Ok(timeout_str) = std::env::var("IDENTITY_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                identity_settings.timeout_seconds = timeout;
            }
        }
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    fn apply_revalidation_env_overrides(revalidation_settings: &mut RevalidationSettings) {
        if let Some(webhook_url) = non_empty_env("REVALIDATE_WEBHOOK_URL") {
            revalidation_settings.webhook_url = Some(webhook_url);
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Public base URL, falling back to [`DEFAULT_BASE_URL`] when the
    /// configured value is empty or cannot be parsed
    #[must_use]
    pub fn base_url(&self) -> Url {
        let configured = self.application.base_url.trim();
        if !configured.is_empty() {
            match Url::parse(configured) {
                Ok(url) if !url.cannot_be_a_base() => return url,
                Ok(_) => log::warn!("Base URL '{configured}' cannot be used as a base"),
                Err(e) => log::warn!("Invalid base URL '{configured}': {e}"),
            }
        }
        default_base_url()
    }

    /// Absolute URL of the callback endpoint handed to the identity provider
    #[must_use]
    pub fn callback_url(&self) -> String {
        let base = self.base_url();
        base.join(&self.routes.callback_path)
            .map_or_else(|_| format!("{DEFAULT_BASE_URL}/auth/callback"), String::from)
    }

    /// Shared secret for the revalidation webhook, if configured
    #[must_use]
    pub fn get_revalidation_secret(&self) -> Option<String> {
        self.revalidation
            .secret_env
            .as_deref()
            .and_then(non_empty_env)
    }
}

impl RouteSettings {
    /// Page serving the sign-in form for `mode`
    #[must_use]
    pub fn page_path(&self, mode: AuthActionType) -> &str {
        match mode {
            AuthActionType::Login => &self.login_path,
            AuthActionType::Signup => &self.signup_path,
        }
    }

    /// Target of the page's email form
    #[must_use]
    pub fn email_form_path(&self, mode: AuthActionType) -> String {
        sub_path(self.page_path(mode), "email")
    }

    /// Target of the page's Google button
    #[must_use]
    pub fn google_form_path(&self, mode: AuthActionType) -> String {
        sub_path(self.page_path(mode), "google")
    }
}

fn sub_path(page: &str, leaf: &str) -> String {
    format!("{}/{leaf}", page.trim_end_matches('/'))
}

impl IdentitySettings {
    /// Get the api key, checking the environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env {
            if let Some(value) = non_empty_env(env_var) {
                return Some(value);
            }
        }
        self.api_key.clone()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn default_base_url() -> Url {
    // DEFAULT_BASE_URL is a well-formed literal
    Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|_| unreachable!("invalid DEFAULT_BASE_URL"))
}
