use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use catlady_core::ManualClock;
use catlady_engine::{
    build_client, Account, ApiSettings, Authenticator, CredentialManager, FailureKind,
    ImageError, RedditAuthenticator, TokenGrant, DEFAULT_USER_AGENT,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct CountingAuthenticator {
    calls: AtomicUsize,
    expires_in: u64,
    delay: Duration,
}

impl CountingAuthenticator {
    fn new(expires_in: u64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            expires_in,
            delay: Duration::ZERO,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Authenticator for CountingAuthenticator {
    async fn request_token(&self) -> Result<TokenGrant, ImageError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(TokenGrant {
            access_token: Some(format!("token-{call}")),
            expires_in: self.expires_in,
            scope: "*".to_string(),
            token_type: "bearer".to_string(),
            error: None,
        })
    }
}

struct FailingAuthenticator {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Authenticator for FailingAuthenticator {
    async fn request_token(&self) -> Result<TokenGrant, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TokenGrant {
            error: Some("invalid_grant".to_string()),
            ..TokenGrant::default()
        })
    }
}

fn account() -> Account {
    Account::new("kitty", "hunter2", "app-id", "app-secret")
}

fn settings_for(server: &MockServer) -> ApiSettings {
    ApiSettings {
        token_url: format!("{}/api/v1/access_token", server.uri()),
        api_base: server.uri(),
        ..ApiSettings::default()
    }
}

#[tokio::test]
async fn first_call_acquires_and_second_reuses() {
    let authenticator = Arc::new(CountingAuthenticator::new(3600));
    let clock = Arc::new(ManualClock::new());
    let manager = CredentialManager::new(authenticator.clone(), clock.clone());

    let first = manager.ensure_valid().await.expect("credential");
    assert_eq!(authenticator.calls(), 1);
    assert_eq!(first.access_token, "token-1");

    let second = manager.ensure_valid().await.expect("credential");
    assert_eq!(authenticator.calls(), 1);
    assert_eq!(second, first);
}

#[tokio::test]
async fn expired_credential_is_replaced() {
    let authenticator = Arc::new(CountingAuthenticator::new(60));
    let clock = Arc::new(ManualClock::new());
    let manager = CredentialManager::new(authenticator.clone(), clock.clone());

    manager.ensure_valid().await.expect("credential");
    clock.advance(Duration::from_secs(60));
    let refreshed = manager.ensure_valid().await.expect("credential");

    assert_eq!(authenticator.calls(), 2);
    assert_eq!(refreshed.access_token, "token-2");
}

#[tokio::test]
async fn zero_ttl_grant_triggers_acquisition_every_call() {
    let authenticator = Arc::new(CountingAuthenticator::new(0));
    let clock = Arc::new(ManualClock::new());
    let manager = CredentialManager::new(authenticator.clone(), clock.clone());

    manager.ensure_valid().await.expect("credential");
    manager.ensure_valid().await.expect("credential");
    assert_eq!(authenticator.calls(), 2);
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let authenticator = Arc::new(CountingAuthenticator {
        delay: Duration::from_millis(50),
        ..CountingAuthenticator::new(3600)
    });
    let clock = Arc::new(ManualClock::new());
    let manager = Arc::new(CredentialManager::new(authenticator.clone(), clock.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.ensure_valid().await })
        })
        .collect();

    for task in tasks {
        let credential = task.await.expect("join").expect("credential");
        assert_eq!(credential.access_token, "token-1");
    }
    assert_eq!(authenticator.calls(), 1);
}

#[tokio::test]
async fn refused_grant_is_an_auth_error_and_keeps_nothing() {
    let authenticator = Arc::new(FailingAuthenticator {
        calls: AtomicUsize::new(0),
    });
    let clock = Arc::new(ManualClock::new());
    let manager = CredentialManager::new(authenticator.clone(), clock.clone());

    let err = manager.ensure_valid().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Auth { status: None });
    assert_eq!(err.message, "invalid_grant");
    assert!(manager.current().await.is_none());

    manager.ensure_valid().await.unwrap_err();
    assert_eq!(authenticator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reddit_authenticator_sends_password_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(basic_auth("app-id", "app-secret"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=kitty"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"access_token":"abc","expires_in":3600,"scope":"*","token_type":"bearer"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let client = build_client(&settings).expect("client");
    let authenticator = RedditAuthenticator::new(account(), settings, client);

    let grant = authenticator.request_token().await.expect("grant");
    assert_eq!(
        grant,
        TokenGrant {
            access_token: Some("abc".to_string()),
            expires_in: 3600,
            scope: "*".to_string(),
            token_type: "bearer".to_string(),
            error: None,
        }
    );
}

#[tokio::test]
async fn reddit_authenticator_maps_rejection_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let client = build_client(&settings).expect("client");
    let authenticator = RedditAuthenticator::new(account(), settings, client);

    let err = authenticator.request_token().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Auth { status: Some(401) });
}

#[tokio::test]
async fn reddit_authenticator_rejects_garbage_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let client = build_client(&settings).expect("client");
    let authenticator = RedditAuthenticator::new(account(), settings, client);

    let err = authenticator.request_token().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Auth { status: None });
}

#[tokio::test]
async fn unreachable_token_endpoint_is_a_transport_error() {
    let settings = ApiSettings {
        token_url: "http://127.0.0.1:9/api/v1/access_token".to_string(),
        connect_timeout: Duration::from_millis(200),
        request_timeout: Duration::from_millis(500),
        ..ApiSettings::default()
    };
    let client = build_client(&settings).expect("client");
    let authenticator = RedditAuthenticator::new(account(), settings, client);

    let err = authenticator.request_token().await.unwrap_err();
    assert!(err.is_transport(), "unexpected {err}");
}
