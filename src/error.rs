//! Error taxonomy shared by the token provider and the action client.
//!
//! Only [`ConfigurationError`] is allowed to leave [`crate::action::client::ActionClient::invoke`];
//! every other failure is folded into a [`crate::action::types::NormalizedResult`].

use reqwest::StatusCode;
use thiserror::Error;

/// Required settings are missing or unreadable. Raised before any network call.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("required setting '{0}' is missing or empty")]
    Missing(&'static str),

    #[error("environment variable '{name}' for '{setting}' is not set")]
    MissingEnv { setting: &'static str, name: String },

    #[error("cannot read '{path}' for '{setting}': {source}")]
    File {
        setting: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The token endpoint could not produce a credential.
#[derive(Debug, Error)]
pub enum TokenFetchError {
    #[error("token endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed token response: {0}")]
    Malformed(String),

    #[error("token request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Everything `TokenProvider::get` can fail with.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Fetch(#[from] TokenFetchError),
}

/// Terminal failure kinds of one `invoke` call, used as log and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Non-2xx (other than the handled 401) or `success` not true.
    DownstreamRejected,
    /// 401 on the retried attempt as well.
    AuthenticationExpired,
    MalformedResponse,
    TransportFailure,
    TokenFetch,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            FailureKind::DownstreamRejected => "downstream_rejected",
            FailureKind::AuthenticationExpired => "authentication_expired",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::TransportFailure => "transport_failure",
            FailureKind::TokenFetch => "token_fetch",
        }
    }
}
