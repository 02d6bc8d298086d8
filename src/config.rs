//! Client configuration.

use crate::error::{CrossrefError, Result};
use std::time::Duration;
use url::Url;

/// Production Crossref REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.crossref.org";

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "crossref-client";

/// Per-request timeout of the default executor.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Identity and endpoint settings, fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Name reported in the `User-Agent` header.
    pub app_name: String,
    /// Contact address for Crossref's polite pool.
    pub mailto: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(app_name: impl Into<String>, mailto: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            mailto: mailto.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read `CROSSREF_MAILTO` (required), `CROSSREF_APP_NAME` and
    /// `CROSSREF_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), but an explicit `mailto` wins over
    /// `CROSSREF_MAILTO`. The other variables still apply.
    pub fn from_env_with_mailto(mailto: Option<String>) -> Result<Self> {
        Self::from_lookup(prefer_mailto(mailto, |key| std::env::var(key).ok()))
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mailto = present("CROSSREF_MAILTO").ok_or_else(|| {
            CrossrefError::Config("set CROSSREF_MAILTO to a contact address".to_string())
        })?;
        let app_name = present("CROSSREF_APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        let mut config = Self::new(app_name, mailto);
        if let Some(base_url) = present("CROSSREF_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Parsed `base_url`.
    pub fn parsed_base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| CrossrefError::Config(format!("invalid base URL {:?}: {}", self.base_url, e)))
    }
}

fn prefer_mailto<F>(mailto: Option<String>, lookup: F) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key: &str| match &mailto {
        Some(m) if key == "CROSSREF_MAILTO" => Some(m.clone()),
        _ => lookup(key),
    }
}
