//! Shared constants and invariants

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_GATEWAY_PATH: &str = "/process-serial";

pub const DEFAULT_CLIENT_ID_ENV: &str = "SF_CLIENT_ID";
pub const DEFAULT_CLIENT_SECRET_ENV: &str = "SF_CLIENT_SECRET";
pub const DEFAULT_API_KEY_ENV: &str = "GATEWAY_API_KEY";

pub const DEFAULT_ALLOWED_ROLES: [&str; 3] = ["ROL_A", "ROL_B", "ROL_C"];

/// header checked by the gateway
pub const API_KEY_HEADER: &str = "x-api-key";
