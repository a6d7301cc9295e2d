use std::sync::Arc;

use catlady_core::{Snapshot, Submission};
use feed_logging::{feed_debug, feed_trace};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::Deserialize;

use crate::http::{map_reqwest_error, read_body};
use crate::{ApiSettings, CredentialManager, FailureKind, ImageError};

#[async_trait::async_trait]
pub trait ListingFetcher: Send + Sync {
    async fn fetch(&self, feed_id: &str) -> Result<Snapshot, ImageError>;
}

/// Authenticated listing retrieval from the feed API.
pub struct RedditListingFetcher {
    settings: ApiSettings,
    client: reqwest::Client,
    credentials: Arc<CredentialManager>,
}

impl RedditListingFetcher {
    pub fn new(
        settings: ApiSettings,
        client: reqwest::Client,
        credentials: Arc<CredentialManager>,
    ) -> Self {
        Self {
            settings,
            client,
            credentials,
        }
    }
}

#[async_trait::async_trait]
impl ListingFetcher for RedditListingFetcher {
    async fn fetch(&self, feed_id: &str) -> Result<Snapshot, ImageError> {
        let credential = self.credentials.ensure_valid().await?;
        let url = self.settings.feed_url(feed_id)?;
        feed_debug!("Requesting feed {} from {}", feed_id, url);

        let response = self
            .client
            .get(url.as_str())
            .header(USER_AGENT, self.settings.user_agent.as_str())
            .header(AUTHORIZATION, credential.authorization_value())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::new(
                FailureKind::Fetch {
                    status: Some(status.as_u16()),
                },
                status.to_string(),
            ));
        }

        let body = read_body(
            response,
            self.settings.max_bytes,
            FailureKind::Fetch { status: None },
        )
        .await?;
        feed_trace!(
            "Raw listing for {}: {}",
            feed_id,
            String::from_utf8_lossy(&body)
        );
        parse_listing(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: ListingPost,
}

#[derive(Debug, Deserialize)]
struct ListingPost {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    domain: String,
    #[serde(default)]
    over_18: bool,
}

/// Parses a listing body into a snapshot, preserving entry order.
pub fn parse_listing(body: &[u8]) -> Result<Snapshot, ImageError> {
    let listing: Listing = serde_json::from_slice(body)
        .map_err(|err| ImageError::new(FailureKind::Fetch { status: None }, err.to_string()))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| {
            let post = child.data;
            Submission::new(post.url, post.title, post.domain, post.over_18)
        })
        .collect())
}
