//! Client configuration: backend location, OTP flow timing and persistence

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Why the code is requested; forwarded verbatim to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OtpPurpose {
    #[default]
    Login,
    Signup,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Login => "LOGIN",
            OtpPurpose::Signup => "SIGNUP",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OtpPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOGIN" => Ok(OtpPurpose::Login),
            "SIGNUP" => Ok(OtpPurpose::Signup),
            _ => Err(format!("Invalid OTP purpose: {}", s)),
        }
    }
}

/// Backend API client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the backend (without the `/api/...` path)
    pub api_base_url: String,

    /// Optional request timeout; the transport default applies when unset
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,

    /// User agent sent with backend requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// File backing the durable client session
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("http://localhost:5000"),
            request_timeout_seconds: None,
            user_agent: default_user_agent(),
            session_file: default_session_file(),
        }
    }
}

impl ClientConfig {
    /// Load client configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            request_timeout_seconds: env::var("API_REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok()),
            user_agent: env::var("API_USER_AGENT").unwrap_or(defaults.user_agent),
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
        }
    }

    /// Build a full endpoint URL from a path such as `/api/otp/send`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }
}

/// Phone verification flow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpFlowConfig {
    /// Seconds before another code may be requested
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_seconds: u32,

    /// Purpose sent with every OTP request
    #[serde(default)]
    pub purpose: OtpPurpose,
}

impl Default for OtpFlowConfig {
    fn default() -> Self {
        Self {
            resend_cooldown_seconds: default_resend_cooldown(),
            purpose: OtpPurpose::default(),
        }
    }
}

impl OtpFlowConfig {
    /// Load flow configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            resend_cooldown_seconds: env::var("OTP_RESEND_COOLDOWN_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_resend_cooldown),
            purpose: env::var("OTP_PURPOSE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}

fn default_user_agent() -> String {
    format!("homebook-client/{}", env!("CARGO_PKG_VERSION"))
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".homebook/session.json")
}

fn default_resend_cooldown() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_wire_format() {
        assert_eq!(serde_json::to_string(&OtpPurpose::Signup).unwrap(), "\"SIGNUP\"");
        assert_eq!("login".parse::<OtpPurpose>(), Ok(OtpPurpose::Login));
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ClientConfig {
            api_base_url: "https://api.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.endpoint("/api/otp/send"), "https://api.example.com/api/otp/send");
    }

    #[test]
    fn test_default_cooldown_is_thirty_seconds() {
        assert_eq!(OtpFlowConfig::default().resend_cooldown_seconds, 30);
    }
}
