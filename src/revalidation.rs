//! Cache revalidation hook fired after a successful sign-in
//!
//! The hosting application decides what "revalidate" means; `authlink` only
//! signals which scope changed.

use crate::settings::AuthLinkSettings;
use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Granularity of a revalidation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevalidateKind {
    Page,
    Layout,
}

#[async_trait]
pub trait Revalidator: Send + Sync {
    /// Signal that cached content under `path` must be rebuilt. Never fails
    /// the caller; implementations log their own errors.
    async fn revalidate(&self, path: &str, kind: RevalidateKind);
}

/// Revalidator that only records the signal in the log
#[derive(Debug, Default, Clone)]
pub struct LogRevalidator;

#[async_trait]
impl Revalidator for LogRevalidator {
    async fn revalidate(&self, path: &str, kind: RevalidateKind) {
        info!("Revalidation requested for {path} ({kind:?})");
    }
}

#[derive(Debug, Serialize)]
struct RevalidatePayload<'a> {
    path: &'a str,
    #[serde(rename = "type")]
    kind: RevalidateKind,
    triggered_at: chrono::DateTime<Utc>,
}

/// Revalidator that POSTs the signal to the host application's webhook
pub struct WebhookRevalidator {
    client: reqwest::Client,
    url: String,
    secret: Option<String>,
}

impl WebhookRevalidator {
    #[must_use]
    pub fn new(client: reqwest::Client, url: String, secret: Option<String>) -> Self {
        Self {
            client,
            url,
            secret,
        }
    }

    async fn send(&self, path: &str, kind: RevalidateKind) -> anyhow::Result<()> {
        let mut request = self.client.post(&self.url).json(&RevalidatePayload {
            path,
            kind,
            triggered_at: Utc::now(),
        });
        if let Some(secret) = &self.secret {
            request = request.header("x-revalidate-secret", secret);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("revalidation webhook {} unreachable", self.url))?;
        if !response.status().is_success() {
            bail!("revalidation webhook answered {}", response.status());
        }
        Ok(())
    }
}

#[async_trait]
impl Revalidator for WebhookRevalidator {
    async fn revalidate(&self, path: &str, kind: RevalidateKind) {
        match self.send(path, kind).await {
            Ok(()) => info!("Revalidated {path} ({kind:?}) via webhook"),
            Err(e) => warn!("Revalidation of {path} failed: {e:#}"),
        }
    }
}

/// Pick the revalidator described by the settings
#[must_use]
pub fn from_settings(settings: &AuthLinkSettings) -> Arc<dyn Revalidator> {
    match settings.revalidation.webhook_url.as_deref() {
        Some(url) if !url.trim().is_empty() => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(settings.identity.timeout_seconds))
                .build()
                .unwrap_or_else(|e| {
                    warn!("Falling back to default HTTP client for revalidation: {e}");
                    reqwest::Client::new()
                });
            Arc::new(WebhookRevalidator::new(
                client,
                url.trim().to_string(),
                settings.get_revalidation_secret(),
            ))
        }
        _ => Arc::new(LogRevalidator),
    }
}
