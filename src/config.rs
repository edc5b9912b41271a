use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Longest session lifetime accepted, in days.
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Largest accepted `MAX_UPLOAD_BYTES`.
pub const MAX_UPLOAD_LIMIT: usize = 1024 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_path: PathBuf,
    pub media_root: PathBuf,
    pub max_upload_bytes: usize,

    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // Listing and caching
    pub posts_per_page: usize,
    pub index_cache_ttl: Duration,

    // Sessions
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
    pub cleanup_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset or empty variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Storage
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/yatube.sqlite")),
            media_root: PathBuf::from(env_or_default("MEDIA_ROOT", "./data/media")),
            max_upload_bytes: parse_env_usize("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8000)?,

            // Listing and caching
            posts_per_page: parse_env_usize("POSTS_PER_PAGE", 10)?,
            index_cache_ttl: Duration::from_secs(parse_env_u64("INDEX_CACHE_SECS", 20)?),

            // Sessions
            session_ttl_days: parse_env_u64("SESSION_TTL_DAYS", 14)?
                .try_into()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "SESSION_TTL_DAYS".to_string(),
                    message: "value is too large".to_string(),
                })?,
            cookie_secure: parse_env_bool("COOKIE_SECURE", false)?,
            cleanup_interval: Duration::from_secs(parse_env_u64("CLEANUP_INTERVAL_SECS", 3600)?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.posts_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                name: "POSTS_PER_PAGE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_UPLOAD_BYTES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_upload_bytes > MAX_UPLOAD_LIMIT {
            return Err(ConfigError::InvalidValue {
                name: "MAX_UPLOAD_BYTES".to_string(),
                message: format!("must be at most {MAX_UPLOAD_LIMIT}"),
            });
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "CLEANUP_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.session_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_DAYS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.session_ttl_days > MAX_SESSION_TTL_DAYS {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_DAYS".to_string(),
                message: format!("must be at most {MAX_SESSION_TTL_DAYS}"),
            });
        }
        Ok(())
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}
