use std::sync::Arc;

use catlady_core::{Clock, Credential};
use feed_logging::{feed_debug, feed_error};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::http::{map_reqwest_error, read_body};
use crate::{Account, ApiSettings, FailureKind, ImageError};

/// Token endpoint response body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TokenGrant {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub token_type: String,
    /// Set instead of `access_token` when the grant is refused with a 200.
    #[serde(default)]
    pub error: Option<String>,
}

#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn request_token(&self) -> Result<TokenGrant, ImageError>;
}

/// Password-grant authenticator: app id/secret as basic auth, account
/// username/password in the form body.
pub struct RedditAuthenticator {
    account: Account,
    settings: ApiSettings,
    client: reqwest::Client,
}

impl RedditAuthenticator {
    pub fn new(account: Account, settings: ApiSettings, client: reqwest::Client) -> Self {
        Self {
            account,
            settings,
            client,
        }
    }

    fn form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "password")
            .append_pair("username", &self.account.username)
            .append_pair("password", &self.account.password)
            .finish()
    }
}

#[async_trait::async_trait]
impl Authenticator for RedditAuthenticator {
    async fn request_token(&self) -> Result<TokenGrant, ImageError> {
        let response = self
            .client
            .post(self.settings.token_url.as_str())
            .basic_auth(&self.account.app_id, Some(&self.account.app_secret))
            .header(USER_AGENT, self.settings.user_agent.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(self.form_body())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::new(
                FailureKind::Auth {
                    status: Some(status.as_u16()),
                },
                status.to_string(),
            ));
        }

        let body = read_body(
            response,
            self.settings.max_bytes,
            FailureKind::Auth { status: None },
        )
        .await?;
        serde_json::from_slice(&body)
            .map_err(|err| ImageError::new(FailureKind::Auth { status: None }, err.to_string()))
    }
}

/// Owns the shared bearer credential and refreshes it when it lapses.
///
/// The check and the refresh happen under one lock, so concurrent callers
/// that find the credential expired wait for a single acquisition.
pub struct CredentialManager {
    authenticator: Arc<dyn Authenticator>,
    clock: Arc<dyn Clock>,
    held: Mutex<Option<Credential>>,
}

impl CredentialManager {
    pub fn new(authenticator: Arc<dyn Authenticator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            authenticator,
            clock,
            held: Mutex::new(None),
        }
    }

    /// Returns the held credential if still valid, acquiring a new one otherwise.
    ///
    /// A failed acquisition leaves the held credential untouched and is
    /// returned to the caller.
    pub async fn ensure_valid(&self) -> Result<Credential, ImageError> {
        let mut held = self.held.lock().await;
        if let Some(credential) = held.as_ref() {
            if credential.is_valid_at(self.clock.now()) {
                return Ok(credential.clone());
            }
        }

        match self.acquire().await {
            Ok(credential) => {
                *held = Some(credential.clone());
                Ok(credential)
            }
            Err(err) => {
                feed_error!("Failed to acquire access token: {}", err);
                Err(err)
            }
        }
    }

    /// The credential currently held, valid or not.
    pub async fn current(&self) -> Option<Credential> {
        self.held.lock().await.clone()
    }

    async fn acquire(&self) -> Result<Credential, ImageError> {
        let grant = self.authenticator.request_token().await?;
        let access_token = match grant.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                let reason = grant
                    .error
                    .unwrap_or_else(|| "response carried no access token".to_string());
                return Err(ImageError::new(FailureKind::Auth { status: None }, reason));
            }
        };

        let credential = Credential::new(
            access_token,
            grant.token_type,
            grant.scope,
            grant.expires_in,
            self.clock.now(),
        );
        feed_debug!(
            "Got token: expires_in={:?} scope={} token_type={}",
            credential.expires_in,
            credential.scope,
            credential.token_type
        );
        Ok(credential)
    }
}
