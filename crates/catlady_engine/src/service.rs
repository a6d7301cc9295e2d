use std::collections::BTreeMap;
use std::sync::Arc;

use catlady_core::{select_image, Clock, Snapshot, SystemClock};
use feed_logging::{feed_debug, feed_info, feed_warn};
use log::LevelFilter;
use rand::seq::IteratorRandom;

use crate::{
    build_client, Account, ApiSettings, CacheSettings, CredentialManager, FailureKind,
    ImageError, ListingFetcher, RedditAuthenticator, RedditListingFetcher, ResponseCache,
};

/// Picks random safe-for-work images from configured feeds.
pub struct ImageService {
    fetcher: Arc<dyn ListingFetcher>,
    cache: Arc<ResponseCache>,
    feeds: BTreeMap<String, String>,
}

impl ImageService {
    /// Builds the service against the default API endpoints.
    ///
    /// `feeds` maps feed ids to display names; `verbosity` caps the global
    /// log level.
    pub fn new(
        account: Account,
        feeds: BTreeMap<String, String>,
        verbosity: LevelFilter,
    ) -> Result<Self, ImageError> {
        Self::with_settings(
            account,
            feeds,
            verbosity,
            ApiSettings::default(),
            CacheSettings::default(),
        )
    }

    pub fn with_settings(
        account: Account,
        feeds: BTreeMap<String, String>,
        verbosity: LevelFilter,
        api: ApiSettings,
        cache_settings: CacheSettings,
    ) -> Result<Self, ImageError> {
        feed_logging::apply_verbosity(verbosity);

        let client = build_client(&api)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let authenticator = Arc::new(RedditAuthenticator::new(
            account,
            api.clone(),
            client.clone(),
        ));
        let credentials = Arc::new(CredentialManager::new(authenticator, clock.clone()));
        let fetcher = Arc::new(RedditListingFetcher::new(api, client, credentials));

        let cache = Arc::new(ResponseCache::with_clock(cache_settings.ttl, clock));
        ResponseCache::spawn_sweeper(&cache, cache_settings.sweep_interval);

        Ok(Self::from_parts(fetcher, cache, feeds))
    }

    pub fn from_parts(
        fetcher: Arc<dyn ListingFetcher>,
        cache: Arc<ResponseCache>,
        feeds: BTreeMap<String, String>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            feeds,
        }
    }

    /// Returns an image URL from `feed_id`, or an empty string when none
    /// could be found for any reason.
    pub async fn get_image(&self, feed_id: &str) -> String {
        match self.try_get_image(feed_id).await {
            Ok(url) => url,
            Err(err) if err.kind == FailureKind::NoQualifyingImage => String::new(),
            Err(err) => {
                feed_warn!("No image for feed {}: {}", feed_id, err);
                String::new()
            }
        }
    }

    pub async fn try_get_image(&self, feed_id: &str) -> Result<String, ImageError> {
        let snapshot = self.snapshot(feed_id).await?;
        let selection = select_image(&snapshot);
        if selection.adult_skipped > 0 {
            feed_info!(
                "Skipped {} adult links in feed {}",
                selection.adult_skipped,
                feed_id
            );
        }

        match selection.url {
            Some(url) => {
                feed_debug!("Found image {} in feed {}", url, feed_id);
                Ok(url)
            }
            None => {
                feed_info!(
                    "Ran out of links in feed {} (size {}, inspected {})",
                    feed_id,
                    snapshot.len(),
                    selection.inspected
                );
                Err(ImageError::new(
                    FailureKind::NoQualifyingImage,
                    format!("no qualifying image in feed {feed_id}"),
                ))
            }
        }
    }

    /// The cached snapshot for `feed_id`, fetching it on a miss. Failed
    /// retrievals are not cached.
    pub async fn snapshot(&self, feed_id: &str) -> Result<Arc<Snapshot>, ImageError> {
        if let Some(snapshot) = self.cache.get(feed_id) {
            feed_info!("Feed {} found in cache", feed_id);
            return Ok(snapshot);
        }

        feed_info!("Feed {} not found in cache", feed_id);
        let snapshot = Arc::new(self.fetcher.fetch(feed_id).await?);
        self.cache.set(feed_id, snapshot.clone());
        Ok(snapshot)
    }

    pub fn display_name(&self, feed_id: &str) -> Option<&str> {
        self.feeds.get(feed_id).map(String::as_str)
    }

    /// Configured `(feed id, display name)` pairs in id order.
    pub fn feeds(&self) -> impl Iterator<Item = (&str, &str)> {
        self.feeds
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
    }

    pub fn random_feed(&self) -> Option<&str> {
        self.feeds
            .keys()
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }
}
