use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::credential::Credential;
use crate::cache::credential_cache::CredentialCache;
use crate::config::service::AuthConfig;
use crate::error::{ProviderError, TokenFetchError};
use crate::helpers::time::Stopwatch;
use crate::observability::metrics::get_metrics;
use crate::sources::TokenProvider;

static ERROR_MSG: &str = "error";
static OK_MSG: &str = "ok";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client-credentials token provider with a single cached credential.
#[derive(Debug, Clone)]
pub struct OAuth2TokenProvider {
    cfg: Arc<AuthConfig>,
    client: Client,
    cache: CredentialCache,
    // serializes cold-cache fetches so concurrent callers share one request
    fetch_lock: Arc<Mutex<()>>,
}

impl OAuth2TokenProvider {
    pub fn new(cfg: AuthConfig, client: Client) -> Self {
        Self {
            cfg: Arc::new(cfg),
            client,
            cache: CredentialCache::new(),
            fetch_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Request a new credential from the token endpoint and cache it.
    ///
    /// Credentials are resolved before anything is sent, so a missing
    /// `client_id` or `client_secret` never reaches the network.
    pub async fn fetch(&self) -> Result<Credential, ProviderError> {
        let (client_id, client_secret) = self.cfg.credentials()?;

        let metrics = get_metrics().await;
        let watch = Stopwatch::start();
        metrics.token_fetch_requests.inc();

        match self.request_token(&client_id, &client_secret).await {
            Ok(credential) => {
                metrics.token_fetch_duration.with_label_values(&[OK_MSG]).observe(watch.elapsed_secs());
                metrics.token_fetched_at_unix.set(credential.fetched_at_unix_ts as i64);
                self.cache.set(credential.clone()).await;
                info!(token_url = %self.cfg.token_url, "fetched new access token");
                Ok(credential)
            }
            Err(e) => {
                metrics.token_fetch_duration.with_label_values(&[ERROR_MSG]).observe(watch.elapsed_secs());
                metrics.token_fetch_failures.with_label_values(&[fetch_failure_reason(&e)]).inc();
                warn!(token_url = %self.cfg.token_url, error = %e, "token fetch failed");
                Err(e.into())
            }
        }
    }

    async fn request_token(&self, client_id: &str, client_secret: &str) -> Result<Credential, TokenFetchError> {
        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];
        if let Some(scope) = &self.cfg.scope {
            form.push(("scope", scope.as_str()));
        }

        let response = self
            .client
            .post(&self.cfg.token_url)
            .form(&form)
            .send()
            .await
            .map_err(TokenFetchError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(TokenFetchError::Transport)?;
        if !status.is_success() {
            return Err(TokenFetchError::Status { status, body });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| TokenFetchError::Malformed(format!("body is not JSON: {}", e)))?;
        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(Credential::new(token)),
            _ => Err(TokenFetchError::Malformed("missing 'access_token'".to_string())),
        }
    }
}

impl TokenProvider for OAuth2TokenProvider {
    async fn get(&self) -> Result<Credential, ProviderError> {
        if let Some(credential) = self.cache.get().await {
            return Ok(credential);
        }

        let _guard = self.fetch_lock.lock().await;
        // another caller may have filled the slot while we waited
        if let Some(credential) = self.cache.get().await {
            debug!("using credential fetched by a concurrent caller");
            return Ok(credential);
        }
        self.fetch().await
    }

    async fn invalidate(&self) {
        if self.cache.clear().await {
            debug!("cached credential invalidated");
        }
    }
}

fn fetch_failure_reason(e: &TokenFetchError) -> &'static str {
    match e {
        TokenFetchError::Status { .. } => "status",
        TokenFetchError::Malformed(_) => "malformed",
        TokenFetchError::Transport(_) => "transport",
    }
}
