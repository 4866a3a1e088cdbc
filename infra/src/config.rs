//! Configuration loading for binaries
//!
//! Layers, lowest precedence first:
//! 1. Environment-aware defaults and the flat variables read by
//!    [`AppConfig::from_env`] (`API_BASE_URL`, `SERVER_PORT`, ...), after
//!    loading `.env` if present
//! 2. An optional TOML file
//! 3. `HOMEBOOK__<SECTION>__<KEY>` environment overrides

use std::path::Path;

use ::config::{Config, Environment, File};
use hb_shared::config::AppConfig;

use crate::InfrastructureError;

/// Prefix of nested environment overrides
pub const ENV_PREFIX: &str = "HOMEBOOK";

/// Load the application configuration
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let defaults = AppConfig::from_env();

    let mut builder = Config::builder().add_source(Config::try_from(&defaults)?);
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(false));
    }
    let config: AppConfig = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config
        .rate_limit
        .validate()
        .map_err(InfrastructureError::Config)?;

    tracing::debug!(
        environment = %config.environment,
        api_base_url = %config.client.api_base_url,
        "Configuration loaded"
    );

    Ok(config)
}
