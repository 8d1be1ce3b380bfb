//! Server Configuration
//!
//! Read once at startup from the process environment (after `.env`).

use std::env;
use std::str::FromStr;

use platform::rate_limit::RateLimitConfig;
use thiserror::Error;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    /// Reported by the healthcheck; `development` relaxes defaults
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub limiter: RateLimitConfig,
    /// `None` when `CORS_TRUSTED_ORIGINS` is unset
    pub trusted_origins: Option<Vec<String>>,
    pub metrics_enabled: bool,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let base_limiter = if environment == "development" {
            RateLimitConfig::development()
        } else {
            RateLimitConfig::default()
        };
        let limiter = RateLimitConfig {
            enabled: parse_or(&lookup, "LIMITER_ENABLED", base_limiter.enabled)?,
            requests_per_second: parse_or(
                &lookup,
                "LIMITER_RPS",
                base_limiter.requests_per_second,
            )?,
            burst: parse_or(&lookup, "LIMITER_BURST", base_limiter.burst)?,
            ..base_limiter
        };
        if limiter.enabled {
            let rps = limiter.requests_per_second;
            if !rps.is_finite() || rps <= 0.0 {
                return Err(ConfigError::Invalid {
                    name: "LIMITER_RPS",
                    value: rps.to_string(),
                });
            }
            if limiter.burst == 0 {
                return Err(ConfigError::Invalid {
                    name: "LIMITER_BURST",
                    value: limiter.burst.to_string(),
                });
            }
        }

        let trusted_origins = lookup("CORS_TRUSTED_ORIGINS")
            .map(|origins| origins.split_whitespace().map(str::to_string).collect());

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            environment,
            database_url,
            db_max_connections: parse_or(
                &lookup,
                "DB_MAX_CONNECTIONS",
                DEFAULT_DB_MAX_CONNECTIONS,
            )?,
            limiter,
            trusted_origins,
            metrics_enabled: parse_or(&lookup, "METRICS_ENABLED", false)?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
