use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::action::client::ActionClient;
use crate::action::types::{ActionRequest, NormalizedResult};
use crate::config::service::GatewayConfig;
use crate::error::ConfigurationError;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;
use crate::sources::oauth2::OAuth2TokenProvider;
use crate::utils::constants::API_KEY_HEADER;

pub const INVALID_ROLE_CODE: &str = "INVALID_ROLE";

/// Inbound request from the technicians app.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessSerialRequest {
    pub serial: String,
    pub username: String,
    pub role: String,
}

impl ProcessSerialRequest {
    fn first_empty_field(&self) -> Option<&'static str> {
        [
            ("serial", &self.serial),
            ("username", &self.username),
            ("role", &self.role),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSerialResponse {
    pub ok: bool,
    pub message: String,
    pub salesforce_id: Option<String>,
    pub error_code: Option<String>,
}

impl From<NormalizedResult> for ProcessSerialResponse {
    fn from(result: NormalizedResult) -> Self {
        Self {
            ok: result.success(),
            message: result.message().to_owned(),
            salesforce_id: result.reference_id().map(str::to_owned),
            error_code: result.error_code().map(str::to_owned),
        }
    }
}

#[derive(Clone)]
pub struct GatewayState {
    path: String,
    api_key: Arc<str>,
    allowed_roles: Arc<HashSet<String>>,
    client: Arc<ActionClient<OAuth2TokenProvider>>,
}

impl GatewayState {
    pub fn new(
        cfg: &GatewayConfig,
        client: ActionClient<OAuth2TokenProvider>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            path: cfg.path.clone(),
            api_key: cfg.api_key.resolve("api_key")?.into(),
            allowed_roles: Arc::new(cfg.allowed_roles.iter().cloned().collect()),
            client: Arc::new(client),
        })
    }

    pub fn router(&self) -> Router<AppState> {
        info!("served path: {}", &self.path);
        Router::new().route(&self.path, post(process_serial))
    }
}

async fn process_serial(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ProcessSerialRequest>, JsonRejection>,
) -> Response {
    let gateway = &state.gateway_state;
    let metrics = get_metrics().await;

    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if api_key != Some(gateway.api_key.as_ref()) {
        warn!("rejected request with invalid API key");
        metrics.gateway_rejections.with_label_values(&["api_key"]).inc();
        return detail(StatusCode::UNAUTHORIZED, "invalid API key".to_string());
    }

    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            metrics.gateway_rejections.with_label_values(&["validation"]).inc();
            return detail(rejection.status(), rejection.body_text());
        }
    };

    if let Some(field) = payload.first_empty_field() {
        metrics.gateway_rejections.with_label_values(&["validation"]).inc();
        return detail(StatusCode::UNPROCESSABLE_ENTITY, format!("field '{}' must not be empty", field));
    }

    if !gateway.allowed_roles.contains(&payload.role) {
        metrics.gateway_rejections.with_label_values(&["role"]).inc();
        let response = ProcessSerialResponse {
            ok: false,
            message: format!("unknown role: {}", payload.role),
            salesforce_id: None,
            error_code: Some(INVALID_ROLE_CODE.to_string()),
        };
        return (StatusCode::OK, Json(response)).into_response();
    }

    let request = ActionRequest::new(payload.serial, payload.username, payload.role);
    match gateway.client.invoke(&request).await {
        Ok(result) => (StatusCode::OK, Json(ProcessSerialResponse::from(result))).into_response(),
        Err(e) => {
            error!(error = %e, "cannot process serial, service is misconfigured");
            detail(StatusCode::INTERNAL_SERVER_ERROR, "service is not configured to reach Salesforce".to_string())
        }
    }
}

fn detail(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}
