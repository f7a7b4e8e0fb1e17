use std::fmt;

use amb_core::Platform;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
}

struct EnvKeys {
    token: &'static str,
    api_base: &'static str,
    secret: &'static str,
    verify_token: Option<&'static str>,
}

fn env_keys(platform: Platform) -> EnvKeys {
    match platform {
        Platform::Facebook => EnvKeys {
            token: "FACEBOOK_PAGE_TOKEN",
            api_base: "FACEBOOK_API_BASE",
            secret: "FACEBOOK_APP_SECRET",
            verify_token: Some("FACEBOOK_VERIFY_TOKEN"),
        },
        Platform::Line => EnvKeys {
            token: "LINE_CHANNEL_TOKEN",
            api_base: "LINE_API_BASE",
            secret: "LINE_CHANNEL_SECRET",
            verify_token: None,
        },
    }
}

/// Per-platform credentials. `token` is the page access token for Messenger and the channel
/// access token for LINE; `app_secret` keys webhook signature checks.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub app_secret: Option<String>,
    #[serde(default)]
    pub verify_token: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_app_secret(mut self, secret: impl Into<String>) -> Self {
        self.app_secret = Some(secret.into());
        self
    }

    pub fn from_env(platform: Platform) -> Result<Self, ConfigError> {
        Self::from_lookup(platform, |key| std::env::var(key).ok())
    }

    /// Builds credentials from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(platform: Platform, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys = env_keys(platform);
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = get(keys.token).ok_or(ConfigError::Missing(keys.token))?;
        Ok(Self {
            token,
            api_base: get(keys.api_base),
            app_secret: get(keys.secret),
            verify_token: keys.verify_token.and_then(get),
        })
    }

    pub(crate) fn api_base_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.api_base
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "<redacted>"))
            .field("verify_token", &self.verify_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
