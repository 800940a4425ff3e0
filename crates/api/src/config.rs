//! Environment configuration for the admin server.

use std::net::SocketAddr;

use chrono_tz::Tz;
use thiserror::Error;

use batchadmin_infra::DEFAULT_PAGE_SIZE;

pub const BIND_ADDR_VAR: &str = "BATCHADMIN_BIND_ADDR";
pub const TIMEZONE_VAR: &str = "BATCHADMIN_TIMEZONE";
pub const PAGE_SIZE_VAR: &str = "BATCHADMIN_PAGE_SIZE";
pub const BASE_PATH_VAR: &str = "BATCHADMIN_BASE_PATH";
pub const SEED_DEMO_VAR: &str = "BATCHADMIN_SEED_DEMO";

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: invalid socket address {value:?}")]
    BindAddr { var: &'static str, value: String },
    #[error("{var}: unknown time zone {value:?}")]
    TimeZone { var: &'static str, value: String },
    #[error("{var}: page size must be a positive integer, got {value:?}")]
    PageSize { var: &'static str, value: String },
    #[error("{var}: expected true/false, got {value:?}")]
    Flag { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub bind_addr: SocketAddr,
    /// Zone used to render start dates and times.
    pub time_zone: Tz,
    /// Page size applied when a listing request does not name one.
    pub page_size: usize,
    /// Prefix for resource links, without a trailing slash.
    pub base_path: String,
    pub seed_demo: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            time_zone: Tz::UTC,
            page_size: DEFAULT_PAGE_SIZE,
            base_path: String::new(),
            seed_demo: false,
        }
    }
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(value) = get(BIND_ADDR_VAR) {
            config.bind_addr = value.parse().map_err(|_| ConfigError::BindAddr {
                var: BIND_ADDR_VAR,
                value,
            })?;
        }

        if let Some(value) = get(TIMEZONE_VAR) {
            config.time_zone = value.parse().map_err(|_| ConfigError::TimeZone {
                var: TIMEZONE_VAR,
                value,
            })?;
        } else if let Some(value) = get("TZ") {
            // TZ may hold a POSIX rule or a file path rather than an IANA name.
            match value.trim_start_matches(':').parse::<Tz>() {
                Ok(tz) => config.time_zone = tz,
                Err(_) => tracing::warn!(tz = %value, "TZ is not an IANA zone name; displaying times in UTC"),
            }
        }

        if let Some(value) = get(PAGE_SIZE_VAR) {
            config.page_size = match value.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::PageSize {
                        var: PAGE_SIZE_VAR,
                        value,
                    });
                }
            };
        }

        if let Some(value) = get(BASE_PATH_VAR) {
            config.base_path = value.trim_end_matches('/').to_string();
        }

        if let Some(value) = get(SEED_DEMO_VAR) {
            config.seed_demo = parse_flag(SEED_DEMO_VAR, value)?;
        }

        Ok(config)
    }
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Flag { var, value }),
    }
}
