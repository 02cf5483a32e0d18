use anyhow::{Result, anyhow};
use std::env;
use tracing::{info, warn};

// Import logging macros
use crate::{log_system_event, log_validation};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_USER_ID: &str = "hackathon_user_123";

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub user: UserConfig,
    pub logging: LoggingConfig,
}

/// Backend endpoint configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

/// Identity attached to every result report
#[derive(Debug, Clone)]
pub struct UserConfig {
    pub user_id: String,
}

/// Logging system configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

impl Config {
    /// Load configuration from the process environment with sensible defaults
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        log_system_event!(config, "Loading client configuration");

        let config = Config {
            api: ApiConfig::from_vars(&lookup)?,
            user: UserConfig::from_vars(&lookup),
            logging: LoggingConfig::from_vars(&lookup),
        };

        log_system_event!(config, "Configuration loaded successfully");
        config.log_configuration_summary();

        Ok(config)
    }

    /// Log a summary of loaded configuration (without sensitive data)
    fn log_configuration_summary(&self) {
        info!(
            api_url_masked = %mask_sensitive_data(&self.api.base_url),
            request_timeout_secs = self.api.request_timeout_secs,
            user_id = %self.user.user_id,
            log_level = %self.logging.level,
            "Configuration summary"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(anyhow!("EDUGENIE_API_URL must start with 'http://' or 'https://'"));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(anyhow!("Request timeout must be greater than 0"));
        }

        if self.user.user_id.trim().is_empty() {
            warn!("User id is empty - results will be recorded without an owner");
        }

        if !["trace", "debug", "info", "warn", "error"]
            .iter()
            .any(|level| self.logging.level.to_lowercase().starts_with(level))
        {
            warn!("Unusual log filter '{}', it will be passed to EnvFilter as-is", self.logging.level);
        }

        log_validation!(success, "configuration", "Configuration validation completed successfully");
        Ok(())
    }
}

impl ApiConfig {
    fn from_vars<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("EDUGENIE_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_str = lookup("EDUGENIE_REQUEST_TIMEOUT_SECS").unwrap_or_else(|| "60".to_string());
        let request_timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
            anyhow!(
                "Invalid EDUGENIE_REQUEST_TIMEOUT_SECS value: '{}'. Must be a whole number of seconds",
                timeout_str
            )
        })?;

        Ok(ApiConfig {
            base_url,
            request_timeout_secs,
        })
    }
}

impl UserConfig {
    fn from_vars<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_id = lookup("EDUGENIE_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string());
        UserConfig { user_id }
    }
}

impl LoggingConfig {
    fn from_vars<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup("RUST_LOG").unwrap_or_else(|| "info,edugenie=debug".to_string());

        let file_enabled = lookup("LOG_FILE_ENABLED")
            .and_then(|value| value.parse::<bool>().ok())
            .unwrap_or(true);

        let console_enabled = lookup("LOG_CONSOLE_ENABLED")
            .and_then(|value| value.parse::<bool>().ok())
            .unwrap_or(true);

        let log_directory = lookup("LOG_DIRECTORY").unwrap_or_else(|| "logs".to_string());

        LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        }
    }
}

/// Mask sensitive data in configuration for safe logging
fn mask_sensitive_data(data: &str) -> String {
    let chars: Vec<char> = data.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}
