//! Configuration validation with aggregated errors.
//! - every issue is collected into Vec<String>, nothing short-circuits
//! - secrets are resolved here so a missing client id fails at startup,
//!   not on the first inbound request

use std::collections::HashSet;

use reqwest::Url;
use tracing::{error, info};

use crate::config::service::{ActionConfig, AuthConfig, GatewayConfig, ServiceConfig};
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_auth(&cfg.auth, &mut errors);
    validate_action(&cfg.action, &mut errors);
    validate_gateway(&cfg.gateway, &cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        return Ok(());
    }

    let metrics = get_metrics().await;
    for e in &errors {
        error!("config validation: {}", e);
        metrics.config_validation_errors.inc();
    }
    Err(errors)
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.http_timeout_ms == Some(0) {
        errors.push("settings.http_timeout_ms must be greater than 0".to_string());
    }
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            settings.server.port
        ));
    }
    if !settings.metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            settings.metrics.path
        ));
    }
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_auth(auth: &AuthConfig, errors: &mut Vec<String>) {
    validate_url("auth.token_url", &auth.token_url, errors);
    if let Err(e) = auth.client_id.resolve("client_id") {
        errors.push(format!("auth.client_id: {}", e));
    }
    if let Err(e) = auth.client_secret.resolve("client_secret") {
        errors.push(format!("auth.client_secret: {}", e));
    }
}

fn validate_action(action: &ActionConfig, errors: &mut Vec<String>) {
    validate_url("action.url", &action.url, errors);
}

fn validate_gateway(gateway: &GatewayConfig, settings: &SettingsConfig, errors: &mut Vec<String>) {
    if !gateway.path.starts_with('/') {
        errors.push(format!("gateway.path '{}' must start with '/'", gateway.path));
    }
    if settings.metrics.is_enabled && settings.metrics.path == gateway.path {
        errors.push(format!(
            "gateway.path '{}' collides with settings.metrics.path",
            gateway.path
        ));
    }
    if let Err(e) = gateway.api_key.resolve("api_key") {
        errors.push(format!("gateway.api_key: {}", e));
    }
    if gateway.allowed_roles.is_empty() {
        errors.push("gateway.allowed_roles must contain at least one role".to_string());
    }
    let mut seen = HashSet::new();
    for role in &gateway.allowed_roles {
        if role.trim().is_empty() {
            errors.push("gateway.allowed_roles contains an empty role".to_string());
        } else if !seen.insert(role.as_str()) {
            errors.push(format!("gateway.allowed_roles contains duplicate role '{}'", role));
        }
    }
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<String>) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "{} '{}' has unsupported scheme '{}'",
            field,
            value,
            url.scheme()
        )),
        Err(e) => errors.push(format!("{} '{}' is not a valid URL: {}", field, value, e)),
    }
}
