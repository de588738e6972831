//! Configuration module for the gym attendance backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveTime;
use chrono_tz::Tz;

/// Default daily time at which unmarked members are recorded as absent.
pub const DEFAULT_ABSENT_AT: &str = "21:05";

/// Default business timezone for the daily absence run.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared admin key for API access (required in production)
    pub admin_key: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Local time of day for the automatic absence run
    pub absent_at: NaiveTime,
    /// Timezone used to resolve `absent_at` and "today"
    pub timezone: Tz,
}

/// Invalid configuration value.
#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let admin_key = env::var("GYM_ADMIN_KEY").ok().filter(|k| !k.is_empty());

        let db_path = env::var("GYM_DB_PATH")
            .unwrap_or_else(|_| "./data/gym.sqlite".to_string())
            .into();

        let bind_raw = env::var("GYM_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError(format!("invalid GYM_BIND_ADDR '{}'", bind_raw)))?;

        let log_level = env::var("GYM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("GYM_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") | Err(_) => LogFormat::Pretty,
            Ok(other) => {
                return Err(ConfigError(format!(
                    "invalid GYM_LOG_FORMAT '{}', expected 'pretty' or 'json'",
                    other
                )))
            }
        };

        let absent_raw =
            env::var("GYM_ABSENT_AT").unwrap_or_else(|_| DEFAULT_ABSENT_AT.to_string());
        let absent_at = parse_time_of_day(&absent_raw)?;

        let tz_raw = env::var("GYM_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());
        let timezone = tz_raw
            .parse::<Tz>()
            .map_err(|e| ConfigError(format!("invalid GYM_TIMEZONE '{}': {}", tz_raw, e)))?;

        Ok(Self {
            admin_key,
            db_path,
            bind_addr,
            log_level,
            log_format,
            absent_at,
            timezone,
        })
    }
}

/// Parse an `HH:MM` time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ConfigError(format!("invalid time of day '{}', expected HH:MM", value)))
}
