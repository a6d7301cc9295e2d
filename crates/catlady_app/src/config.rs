//! Loads the RON configuration file and applies environment overrides.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use catlady_engine::Account;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "catlady.ron";

const ENV_USERNAME: &str = "CATLADY_USERNAME";
const ENV_PASSWORD: &str = "CATLADY_PASSWORD";
const ENV_APP_ID: &str = "CATLADY_APP_ID";
const ENV_APP_SECRET: &str = "CATLADY_APP_SECRET";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("config is missing `{0}`")]
    Missing(&'static str),
    #[error("config lists no feeds")]
    NoFeeds,
    #[error("unknown verbosity `{0}`")]
    Verbosity(String),
}

/// Account secrets, feed mapping and verbosity. Deliberately not `Debug`.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
    /// Feed id -> display name.
    #[serde(default)]
    pub feeds: BTreeMap<String, String>,
    #[serde(default = "default_verbosity")]
    pub verbosity: String,
}

fn default_verbosity() -> String {
    "info".to_string()
}

impl AppConfig {
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Replaces account fields with any non-empty values found by `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields = [
            (ENV_USERNAME, &mut self.username),
            (ENV_PASSWORD, &mut self.password),
            (ENV_APP_ID, &mut self.app_id),
            (ENV_APP_SECRET, &mut self.app_secret),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|value| !value.is_empty()) {
                *field = value;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("username", &self.username),
            ("password", &self.password),
            ("app_id", &self.app_id),
            ("app_secret", &self.app_secret),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(ConfigError::Missing(*name));
        }
        if self.feeds.is_empty() {
            return Err(ConfigError::NoFeeds);
        }
        Ok(())
    }

    pub fn account(&self) -> Account {
        Account::new(
            self.username.clone(),
            self.password.clone(),
            self.app_id.clone(),
            self.app_secret.clone(),
        )
    }
}

pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::parse(path, &content)
}
