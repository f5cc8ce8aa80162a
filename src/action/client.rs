use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, warn};

use crate::action::normalize::{
    normalize_response, normalize_token_error, normalize_transport_error, RawResponse,
};
use crate::action::types::{ActionPayload, ActionRequest, NormalizedResult};
use crate::config::service::ActionConfig;
use crate::error::{ConfigurationError, FailureKind, ProviderError};
use crate::helpers::time::Stopwatch;
use crate::observability::metrics::get_metrics;
use crate::sources::TokenProvider;

static SUCCESS_MSG: &str = "success";

/// Outcome of a single authenticated POST.
enum Attempt {
    Completed(RawResponse),
    AuthRejected(RawResponse),
}

impl Attempt {
    fn into_response(self) -> RawResponse {
        match self {
            Attempt::Completed(raw) | Attempt::AuthRejected(raw) => raw,
        }
    }
}

enum CallError {
    Provider(ProviderError),
    Transport(reqwest::Error),
}

impl From<ProviderError> for CallError {
    fn from(e: ProviderError) -> Self {
        CallError::Provider(e)
    }
}

/// Calls the downstream action endpoint with a bearer token from `P`.
///
/// A 401 triggers one re-authentication and one resend of the same payload;
/// whatever the resend returns is final.
#[derive(Debug, Clone)]
pub struct ActionClient<P> {
    cfg: ActionConfig,
    client: Client,
    provider: P,
}

impl<P: TokenProvider> ActionClient<P> {
    pub fn new(cfg: ActionConfig, client: Client, provider: P) -> Self {
        Self { cfg, client, provider }
    }

    /// Run the action and normalize the outcome.
    ///
    /// Only a configuration problem escapes as `Err`; token, transport and
    /// downstream failures all come back as a failed [`NormalizedResult`].
    pub async fn invoke(&self, request: &ActionRequest) -> Result<NormalizedResult, ConfigurationError> {
        let metrics = get_metrics().await;
        let watch = Stopwatch::start();

        let (result, failure) = match self.call_with_reauth(request).await {
            Ok(response) => normalize_response(&request.serial_number, &response),
            Err(CallError::Provider(ProviderError::Configuration(e))) => {
                error!(error = %e, "action aborted, token provider is misconfigured");
                return Err(e);
            }
            Err(CallError::Provider(ProviderError::Fetch(e))) => {
                error!(serial = %request.serial_number, error = %e, "could not obtain access token");
                (normalize_token_error(), Some(FailureKind::TokenFetch))
            }
            Err(CallError::Transport(e)) => {
                error!(serial = %request.serial_number, error = %e, "action request failed");
                (normalize_transport_error(&e), Some(FailureKind::TransportFailure))
            }
        };

        let outcome = failure.map(|kind| kind.as_str()).unwrap_or(SUCCESS_MSG);
        metrics.action_calls.with_label_values(&[outcome]).inc();
        metrics.action_duration.with_label_values(&[outcome]).observe(watch.elapsed_secs());
        match failure {
            None => info!(serial = %request.serial_number, reference_id = ?result.reference_id(), "serial updated"),
            Some(kind) => warn!(
                serial = %request.serial_number,
                kind = kind.as_str(),
                error_code = ?result.error_code(),
                message = %result.message(),
                "serial update failed"
            ),
        }
        Ok(result)
    }

    async fn call_with_reauth(&self, request: &ActionRequest) -> Result<RawResponse, CallError> {
        let payload = ActionPayload::from(request);

        match self.attempt(&payload).await? {
            Attempt::Completed(raw) => Ok(raw),
            Attempt::AuthRejected(_) => {
                warn!(serial = %request.serial_number, "action endpoint rejected the access token, re-authenticating");
                get_metrics().await.action_reauthentications.inc();
                self.provider.invalidate().await;
                Ok(self.attempt(&payload).await?.into_response())
            }
        }
    }

    async fn attempt(&self, payload: &ActionPayload<'_>) -> Result<Attempt, CallError> {
        let credential = self.provider.get().await?;

        let response = self
            .client
            .post(&self.cfg.url)
            .bearer_auth(credential.value())
            .json(payload)
            .send()
            .await
            .map_err(CallError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(CallError::Transport)?;
        debug!(status = %status, "action endpoint responded");

        let raw = RawResponse { status, body };
        if status == StatusCode::UNAUTHORIZED {
            Ok(Attempt::AuthRejected(raw))
        } else {
            Ok(Attempt::Completed(raw))
        }
    }
}
