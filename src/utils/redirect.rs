use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Longest `next` path accepted from the query string
const MAX_NEXT_LENGTH: usize = 2048;

// Control characters, backslashes, protocol-relative prefixes and dot-dot segments
// (plain or percent-encoded) never appear in a legitimate in-app path
static UNSAFE_NEXT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\x00-\x1F\x7F]|\\|%5c|^//|^/%2f|(?:^|/)(?:\.|%2e){2}(?:/|\?|#|$)").unwrap()
});

/// Destination of a redirect issued by the callback or the route guard,
/// with the optional annotations the login page reads back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    path: String,
    error: Option<String>,
    error_description: Option<String>,
    details: Option<String>,
}

impl RedirectTarget {
    #[must_use]
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            error: None,
            error_description: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.error_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Absolute URL for this target against `base`
    #[must_use]
    pub fn resolve(&self, base: &Url) -> String {
        let mut url = base.join(&self.path).unwrap_or_else(|e| {
            warn!("Could not resolve redirect path '{}': {e}", self.path);
            base.clone()
        });

        let annotations = [
            ("error", &self.error),
            ("error_description", &self.error_description),
            ("details", &self.details),
        ];
        if annotations.iter().any(|(_, value)| value.is_some()) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in annotations {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
        }

        url.into()
    }
}

/// Accept `next` only when it is a same-origin path
#[must_use]
pub fn validate_next_path(next: &str) -> Option<&str> {
    if next.len() > MAX_NEXT_LENGTH {
        warn!("Rejected post-login path: {} characters", next.len());
        return None;
    }
    if !next.starts_with('/') || UNSAFE_NEXT_PATTERN.is_match(next) {
        warn!("Rejected post-login path: {next}");
        return None;
    }
    debug!("Validated post-login path: {next}");
    Some(next)
}
