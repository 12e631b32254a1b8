//! reqwest client for GoTrue-compatible identity services (Supabase auth)

use super::{IdentityError, IdentityProvider, OAuthProvider, OAuthUrl};
use crate::models::{Session, User};
use crate::pkce::CODE_CHALLENGE_METHOD;
use crate::settings::IdentitySettings;
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const OTP_PATH: &str = "auth/v1/otp";
const AUTHORIZE_PATH: &str = "auth/v1/authorize";
const TOKEN_PATH: &str = "auth/v1/token";
const USER_PATH: &str = "auth/v1/user";

/// Error body shapes GoTrue uses across versions
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .filter(|m| !m.is_empty())
    }
}

#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl GoTrueClient {
    /// Create a client from the identity settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identity URL cannot be parsed
    /// - No api key is configured
    /// - The HTTP client cannot be built
    pub fn from_settings(settings: &IdentitySettings) -> Result<Self, IdentityError> {
        let api_key = settings.get_api_key().ok_or_else(|| {
            IdentityError::Configuration("missing identity api key".to_string())
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| IdentityError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Self::new(http, &settings.url, api_key)
    }

    /// Create a client with an existing reqwest client
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL
    pub fn new(http: reqwest::Client, base_url: &str, api_key: String) -> Result<Self, IdentityError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| IdentityError::Configuration(format!("invalid identity URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(IdentityError::Configuration(format!(
                "identity URL '{base_url}' cannot be a base"
            )));
        }
        // Joining relative paths requires a trailing slash on the base
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        self.base_url
            .join(path)
            .map_err(|e| IdentityError::Configuration(format!("invalid endpoint {path}: {e}")))
    }

    /// Authorization URL for `provider`, redirecting back to `redirect_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the authorize endpoint cannot be built
    pub fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_url: &str,
        code_challenge: &str,
    ) -> Result<Url, IdentityError> {
        let mut url = self.endpoint(AUTHORIZE_PATH)?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_url)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Accept", "application/json")
    }

    /// Turn a non-success response into a provider error carrying its message
    async fn provider_error(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!("Identity provider returned {status}: {body}");
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            });
        IdentityError::Provider {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn request_email_link(
        &self,
        email: &str,
        redirect_url: &str,
        create_if_missing: bool,
        code_challenge: &str,
    ) -> Result<(), IdentityError> {
        let mut url = self.endpoint(OTP_PATH)?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_url);

        let response = self
            .request(reqwest::Method::POST, url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "email": email,
                "create_user": create_if_missing,
                "code_challenge": code_challenge,
                "code_challenge_method": CODE_CHALLENGE_METHOD,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::provider_error(response).await)
        }
    }

    async fn request_oauth_url(
        &self,
        provider: OAuthProvider,
        redirect_url: &str,
        code_challenge: &str,
    ) -> Result<OAuthUrl, IdentityError> {
        let url = self.authorize_url(provider, redirect_url, code_challenge)?;
        Ok(OAuthUrl {
            url: Some(url.into()),
        })
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, IdentityError> {
        let mut url = self.endpoint(TOKEN_PATH)?;
        url.query_pairs_mut().append_pair("grant_type", "pkce");

        let response = self
            .request(reqwest::Method::POST, url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "auth_code": code,
                "code_verifier": code_verifier,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }
        Ok(response.json::<Session>().await?)
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, IdentityError> {
        let url = self.endpoint(USER_PATH)?;
        let response = self
            .request(reqwest::Method::GET, url)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<User>().await?)),
            _ => Err(Self::provider_error(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GoTrueClient {
        GoTrueClient::new(reqwest::Client::new(), base, "anon-key".to_string()).unwrap()
    }

    #[test]
    fn test_authorize_url() {
        let client = client("https://project.supabase.co");
        let url = client
            .authorize_url(
                OAuthProvider::Google,
                "http://localhost:3000/auth/callback",
                "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/auth/v1/authorize?provider=google&redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback&code_challenge=E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM&code_challenge_method=s256"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let client = client("https://gateway.example.com/identity");
        let url = client.endpoint(OTP_PATH).unwrap();
        assert_eq!(url.as_str(), "https://gateway.example.com/identity/auth/v1/otp");
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let result = GoTrueClient::new(reqwest::Client::new(), "not a url", "k".to_string());
        assert!(matches!(result, Err(IdentityError::Configuration(_))));
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let settings = IdentitySettings {
            api_key: None,
            api_key_env: Some("AUTHLINK_TEST_UNSET_API_KEY".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            GoTrueClient::from_settings(&settings),
            Err(IdentityError::Configuration(_))
        ));
    }

    #[test]
    fn test_error_body_message_precedence() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"Code expired"}"#)
                .unwrap();
        assert_eq!(body.into_message(), Some("Code expired".to_string()));

        let body: ErrorBody = serde_json::from_str(r#"{"msg":"Signups not allowed for otp"}"#).unwrap();
        assert_eq!(body.into_message(), Some("Signups not allowed for otp".to_string()));
    }
}
