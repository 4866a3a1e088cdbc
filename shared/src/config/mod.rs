//! Configuration module with concern-specific sub-modules
//!
//! - `client` - backend API client, OTP flow timing and session persistence
//! - `environment` - environment detection and logging configuration
//! - `rate_limit` - fixed-window rate limiting for the OTP endpoints
//! - `server` - HTTP server configuration

pub mod client;
pub mod environment;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use client::{ClientConfig, OtpFlowConfig, OtpPurpose};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Backend API client configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Phone verification flow configuration
    #[serde(default)]
    pub otp: OtpFlowConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            client: ClientConfig::default(),
            otp: OtpFlowConfig::default(),
            rate_limit: RateLimitConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            rate_limit: RateLimitConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
            ..Default::default()
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            rate_limit: RateLimitConfig::production(),
            logging: LoggingConfig::for_environment(Environment::Production),
            ..Default::default()
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.rate_limit = RateLimitConfig::production();
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        config.client = ClientConfig::from_env();
        config.otp = OtpFlowConfig::from_env();
        config.rate_limit = config.rate_limit.with_env_overrides();
        config.server = config.server.with_env_overrides();
        config.logging = config.logging.with_env_overrides();
        config
    }
}
