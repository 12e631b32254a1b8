use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

use crate::models::Session;

/// Cookie names used by the session handoff
pub const ACCESS_TOKEN_COOKIE: &str = "authlink_access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "authlink_refresh_token";
pub const CODE_VERIFIER_COOKIE: &str = "authlink_code_verifier";

/// Access tokens without an `expires_in` are kept for one hour
const DEFAULT_ACCESS_TOKEN_SECONDS: i64 = 3600;
/// Refresh tokens outlive the access token; the provider enforces the real limit
const REFRESH_TOKEN_DAYS: i64 = 30;
/// Magic links and OAuth round trips must complete within this window
const CODE_VERIFIER_MINUTES: i64 = 60;

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Duration,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age: Duration::hours(24),
        }
    }
}

/// Build a cookie from explicit options
#[must_use]
pub fn build_cookie(name: &str, value: String, options: CookieOptions) -> Cookie<'static> {
    Cookie::build(name.to_owned(), value)
        .http_only(options.http_only)
        .secure(options.secure)
        .same_site(options.same_site)
        .path(options.path)
        .max_age(options.max_age)
        .finish()
}

/// Cookies carrying the tokens from a freshly exchanged session
#[must_use]
pub fn session_cookies(session: &Session, secure: bool) -> Vec<Cookie<'static>> {
    let access_seconds = session
        .expires_in
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_ACCESS_TOKEN_SECONDS);

    let mut cookies = vec![build_cookie(
        ACCESS_TOKEN_COOKIE,
        session.access_token.clone(),
        CookieOptions {
            secure,
            max_age: Duration::seconds(access_seconds),
            ..CookieOptions::default()
        },
    )];

    if let Some(refresh_token) = &session.refresh_token {
        cookies.push(build_cookie(
            REFRESH_TOKEN_COOKIE,
            refresh_token.clone(),
            CookieOptions {
                secure,
                max_age: Duration::days(REFRESH_TOKEN_DAYS),
                ..CookieOptions::default()
            },
        ));
    }

    cookies
}

/// Create an expired cookie to clear a specific cookie
#[must_use]
pub fn create_expired_cookie(name: &str, secure: bool) -> Cookie<'static> {
    build_cookie(
        name,
        String::new(),
        CookieOptions {
            secure,
            max_age: Duration::seconds(-1),
            ..CookieOptions::default()
        },
    )
}

/// Expired versions of every session cookie
#[must_use]
pub fn clear_session_cookies(secure: bool) -> Vec<Cookie<'static>> {
    vec![
        create_expired_cookie(ACCESS_TOKEN_COOKIE, secure),
        create_expired_cookie(REFRESH_TOKEN_COOKIE, secure),
    ]
}

/// Short-lived cookie holding the PKCE verifier until the callback runs
#[must_use]
pub fn code_verifier_cookie(verifier: &str, secure: bool) -> Cookie<'static> {
    build_cookie(
        CODE_VERIFIER_COOKIE,
        verifier.to_string(),
        CookieOptions {
            secure,
            max_age: Duration::minutes(CODE_VERIFIER_MINUTES),
            ..CookieOptions::default()
        },
    )
}

/// PKCE verifier from the request, ignoring empty values
#[must_use]
pub fn code_verifier_from_request(req: &HttpRequest) -> Option<String> {
    req.cookie(CODE_VERIFIER_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Access token from the request, ignoring empty values
#[must_use]
pub fn access_token_from_request(req: &HttpRequest) -> Option<String> {
    req.cookie(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
