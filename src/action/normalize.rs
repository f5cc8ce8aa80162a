//! Collapse whatever the action endpoint answered into a [`NormalizedResult`].

use reqwest::StatusCode;
use serde_json::Value;

use crate::action::types::NormalizedResult;
use crate::error::FailureKind;

pub const INVALID_JSON_CODE: &str = "SF_INVALID_JSON";
pub const AUTH_ERROR_CODE: &str = "SF_AUTH_ERROR";
pub const TIMEOUT_CODE: &str = "SF_TIMEOUT";
pub const TRANSPORT_ERROR_CODE: &str = "SF_TRANSPORT_ERROR";
const HTTP_CODE_PREFIX: &str = "SF_HTTP_";

/// Status and raw body of the final action response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Map a downstream response. The failure kind is `None` on success.
pub fn normalize_response(serial_number: &str, response: &RawResponse) -> (NormalizedResult, Option<FailureKind>) {
    let status = response.status.as_u16();
    let body: Value = match serde_json::from_str(&response.body) {
        Ok(v) => v,
        Err(_) => {
            return (
                NormalizedResult::failed(
                    format!("Salesforce returned a non-JSON response (HTTP {})", status),
                    None,
                    INVALID_JSON_CODE,
                ),
                Some(FailureKind::MalformedResponse),
            );
        }
    };

    let message = string_field(&body, "message");
    let reference_id = string_field(&body, "caseId");

    if response.status == StatusCode::OK && body.get("success") == Some(&Value::Bool(true)) {
        let message = message
            .unwrap_or_else(|| format!("Serial {} updated successfully in Salesforce", serial_number));
        return (NormalizedResult::succeeded(message, reference_id), None);
    }

    let error_code = string_field(&body, "error_code")
        .unwrap_or_else(|| format!("{}{}", HTTP_CODE_PREFIX, status));
    let message = message.unwrap_or_else(|| format!("Salesforce request failed with HTTP {}", status));
    let kind = if response.status == StatusCode::UNAUTHORIZED {
        FailureKind::AuthenticationExpired
    } else {
        FailureKind::DownstreamRejected
    };
    (NormalizedResult::failed(message, reference_id, error_code), Some(kind))
}

/// The token endpoint could not authenticate us. Details stay in the logs.
pub fn normalize_token_error() -> NormalizedResult {
    NormalizedResult::failed(
        "Internal error authenticating with Salesforce",
        None,
        AUTH_ERROR_CODE,
    )
}

/// Connection failure or timeout on the action call.
pub fn normalize_transport_error(error: &reqwest::Error) -> NormalizedResult {
    if error.is_timeout() {
        NormalizedResult::failed("Salesforce request timed out", None, TIMEOUT_CODE)
    } else {
        NormalizedResult::failed(
            format!("Salesforce request failed: {}", error),
            None,
            TRANSPORT_ERROR_CODE,
        )
    }
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_owned)
}
