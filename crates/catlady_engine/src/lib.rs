//! Catlady engine: authenticated feed retrieval, caching, and the image facade.
mod auth;
mod cache;
mod fetch;
mod http;
mod service;
mod settings;
mod types;

pub use auth::{Authenticator, CredentialManager, RedditAuthenticator, TokenGrant};
pub use cache::ResponseCache;
pub use catlady_core::{Credential, Snapshot, Submission};
pub use fetch::{parse_listing, ListingFetcher, RedditListingFetcher};
pub use http::build_client;
pub use service::ImageService;
pub use settings::{
    Account, ApiSettings, CacheSettings, DEFAULT_API_BASE, DEFAULT_TOKEN_URL, DEFAULT_USER_AGENT,
};
pub use types::{FailureKind, ImageError};
