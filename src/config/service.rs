use serde::Deserialize;
use std::{env, fs};

use crate::config::settings::SettingsConfig;
use crate::error::ConfigurationError;
use crate::utils::constants::{
    DEFAULT_ALLOWED_ROLES, DEFAULT_API_KEY_ENV, DEFAULT_CLIENT_ID_ENV, DEFAULT_CLIENT_SECRET_ENV,
    DEFAULT_GATEWAY_PATH,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub auth: AuthConfig,
    pub action: ActionConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// ================================
/// OAuth2 client-credentials grant
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub token_url: String,
    #[serde(default = "default_client_id")]
    pub client_id: SecretValue,
    #[serde(default = "default_client_secret")]
    pub client_secret: SecretValue,
    /// sent as `scope` form field when present
    pub scope: Option<String>,
}

impl AuthConfig {
    pub fn new(token_url: impl Into<String>, client_id: SecretValue, client_secret: SecretValue) -> Self {
        Self {
            token_url: token_url.into(),
            client_id,
            client_secret,
            scope: None,
        }
    }

    /// Resolve `(client_id, client_secret)`; both must be non-empty.
    pub fn credentials(&self) -> Result<(String, String), ConfigurationError> {
        let client_id = self.client_id.resolve("client_id")?;
        let client_secret = self.client_secret.resolve("client_secret")?;
        Ok((client_id, client_secret))
    }
}

/// ================================
/// Downstream action endpoint
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ActionConfig {
    pub url: String,
}

/// ================================
/// Inbound gateway
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_path")]
    pub path: String,
    #[serde(default = "default_api_key")]
    pub api_key: SecretValue,
    #[serde(default = "default_allowed_roles")]
    pub allowed_roles: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            path: default_gateway_path(),
            api_key: default_api_key(),
            allowed_roles: default_allowed_roles(),
        }
    }
}

/// Where a secret comes from
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SecretValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

impl SecretValue {
    pub fn literal(value: impl Into<String>) -> Self {
        SecretValue::Literal { value: value.into() }
    }

    pub fn from_env(name: impl Into<String>) -> Self {
        SecretValue::FromEnv { from_env: name.into() }
    }

    /// Resolve the secret, failing on absent or blank values.
    pub fn resolve(&self, setting: &'static str) -> Result<String, ConfigurationError> {
        let value = match self {
            SecretValue::Literal { value } => value.to_owned(),
            SecretValue::FromEnv { from_env } => env::var(from_env)
                .map_err(|_| ConfigurationError::MissingEnv { setting, name: from_env.to_owned() })?,
            SecretValue::FromFile { path } => fs::read_to_string(path)
                .map_err(|source| ConfigurationError::File { setting, path: path.to_owned(), source })?
                .trim()
                .to_string(),
        };
        if value.trim().is_empty() {
            return Err(ConfigurationError::Missing(setting));
        }
        Ok(value)
    }
}

fn default_client_id() -> SecretValue {
    SecretValue::from_env(DEFAULT_CLIENT_ID_ENV)
}

fn default_client_secret() -> SecretValue {
    SecretValue::from_env(DEFAULT_CLIENT_SECRET_ENV)
}

fn default_api_key() -> SecretValue {
    SecretValue::from_env(DEFAULT_API_KEY_ENV)
}

fn default_gateway_path() -> String {
    DEFAULT_GATEWAY_PATH.to_string()
}

fn default_allowed_roles() -> Vec<String> {
    DEFAULT_ALLOWED_ROLES.iter().map(|role| role.to_string()).collect()
}
