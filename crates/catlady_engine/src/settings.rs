use std::fmt;
use std::time::Duration;

use url::Url;

use crate::{FailureKind, ImageError};

pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
pub const DEFAULT_USER_AGENT: &str = "Catbot/1 by cattebot";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub token_url: String,
    /// Feeds are read from `{api_base}/r/{feed_id}.json`.
    pub api_base: String,
    /// Client identifier sent as `User-Agent` on every outbound call.
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 8 * 1024 * 1024,
        }
    }
}

impl ApiSettings {
    /// `{api_base}/r/{feed_id}.json`, with `feed_id` escaped as one path
    /// segment so it cannot alter the path or add a query.
    pub fn feed_url(&self, feed_id: &str) -> Result<Url, ImageError> {
        let invalid_base = |message: String| {
            ImageError::new(FailureKind::Fetch { status: None }, message)
        };
        let mut url = Url::parse(&self.api_base)
            .map_err(|err| invalid_base(format!("invalid api base {}: {err}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|()| invalid_base(format!("api base {} cannot hold a path", self.api_base)))?
            .pop_if_empty()
            .push("r")
            .push(&format!("{feed_id}.json"));
        Ok(url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(30),
        }
    }
}

/// Account used for the password grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub app_id: String,
    pub app_secret: String,
}

impl Account {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}
