// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;

use crate::cache::credential::Credential;
use crate::config::service::{ActionConfig, AuthConfig, SecretValue};
use crate::error::{ConfigurationError, ProviderError, TokenFetchError};
use crate::sources::TokenProvider;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    build_reqwest_client_with_timeout(Duration::from_secs(5))
}

pub fn build_reqwest_client_with_timeout(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .expect("reqwest client")
}

pub fn auth_config(token_url: impl Into<String>) -> AuthConfig {
    AuthConfig::new(
        token_url,
        SecretValue::literal("test-client-id"),
        SecretValue::literal("test-client-secret"),
    )
}

pub fn action_config(url: impl Into<String>) -> ActionConfig {
    ActionConfig { url: url.into() }
}

/// What the fake provider does on its n-th fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFetch {
    Issue,
    FailFetch,
    Misconfigured,
}

/// In-memory provider issuing `token-1`, `token-2`, ... and counting calls.
#[derive(Debug)]
pub struct FakeProvider {
    plan: Vec<FakeFetch>,
    cached: Mutex<Option<Credential>>,
    pub gets: AtomicUsize,
    pub fetches: AtomicUsize,
    pub invalidations: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::with_plan(Vec::new())
    }

    /// Fetches beyond the end of `plan` succeed.
    pub fn with_plan(plan: Vec<FakeFetch>) -> Self {
        Self {
            plan,
            cached: Mutex::new(None),
            gets: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn invalidation_count(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

impl TokenProvider for FakeProvider {
    async fn get(&self) -> Result<Credential, ProviderError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(credential) = self.cached.lock().unwrap().clone() {
            return Ok(credential);
        }

        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        match self.plan.get(n - 1).copied().unwrap_or(FakeFetch::Issue) {
            FakeFetch::Issue => {
                let credential = Credential::new(format!("token-{}", n));
                *self.cached.lock().unwrap() = Some(credential.clone());
                Ok(credential)
            }
            FakeFetch::FailFetch => Err(TokenFetchError::Malformed("missing 'access_token'".into()).into()),
            FakeFetch::Misconfigured => Err(ConfigurationError::Missing("client_secret").into()),
        }
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        self.cached.lock().unwrap().take();
    }
}
