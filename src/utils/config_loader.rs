use std::path::Path;

use anyhow::{Context, Result};

use crate::config::proc_loader::file_to_config;
use crate::ServiceConfig;

/// Load, expand and validate the service configuration at `config_path`.
pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    file_to_config(Path::new(config_path))
        .await
        .with_context(|| format!("failed to load service config from '{}'", config_path))
}
