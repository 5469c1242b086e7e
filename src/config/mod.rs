use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::validation::ValidationConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    /// In-memory storage when unset.
    pub database_url: Option<String>,
    /// In-memory reset ledger and no rate limiting when unset.
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_access_expiration_secs: u64,
    pub jwt_reset_expiration_secs: u64,
    pub bcrypt_cost: u32,
    pub front_end_url: String,
    pub email_from_address: String,
    /// Captcha checks always pass when unset.
    pub captcha_secret: Option<String>,
    pub request_timeout_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub seed_mock_data: bool,
    pub validation: ValidationConfig,
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Durations given in hours, with or without a trailing `h`.
fn hours_or(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let hours = match optional(key) {
        None => default,
        Some(value) => match value.trim().trim_end_matches('h').parse::<u64>() {
            Ok(hours) => hours,
            Err(_) => return Err(ConfigError::Invalid { key, value }),
        },
    };
    hours.checked_mul(3600).ok_or(ConfigError::Invalid {
        key,
        value: hours.to_string(),
    })
}

fn validation_from_env() -> Result<ValidationConfig, ConfigError> {
    let defaults = ValidationConfig::default();
    let validation = ValidationConfig {
        name_max: parse_or("NAME_MAX_LENGTH", defaults.name_max)?,
        description_max: parse_or("DESCRIPTION_MAX_LENGTH", defaults.description_max)?,
        password_min: parse_or("PASSWORD_MIN_LENGTH", defaults.password_min)?,
        password_max: parse_or("PASSWORD_MAX_LENGTH", defaults.password_max)?,
        ..defaults
    };
    if validation.password_min > validation.password_max {
        return Err(ConfigError::Invalid {
            key: "PASSWORD_MIN_LENGTH",
            value: validation.password_min.to_string(),
        });
    }
    Ok(validation)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let bcrypt_cost = parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(Config {
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: parse_or("SERVER_PORT", 8080)?,
            api_base_uri: optional("API_BASE_URI").unwrap_or_else(|| "/api".to_string()),
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            jwt_secret: required("JWT_SECRET")?,
            jwt_access_expiration_secs: hours_or("JWT_ACCESS_EXPIRATION", 24)?,
            jwt_reset_expiration_secs: hours_or("JWT_RESET_EXPIRATION", 1)?,
            bcrypt_cost,
            front_end_url: optional("FRONT_END_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            email_from_address: optional("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|| "hammergen@localhost".to_string()),
            captcha_secret: optional("CAPTCHA_SECRET"),
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            rate_limit_window_secs: parse_or("RATE_LIMIT_WINDOW", 60)?,
            rate_limit_requests: parse_or("RATE_LIMIT_REQUESTS", 100)?,
            seed_mock_data: parse_or("SEED_MOCK_DATA", false)?,
            validation: validation_from_env()?,
        })
    }

    pub fn jwt_access_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_access_expiration_secs)
    }

    pub fn jwt_reset_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_reset_expiration_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            api_base_uri: "/api".to_string(),
            database_url: None,
            redis_url: None,
            jwt_secret: crate::testing::TEST_SECRET.to_string(),
            jwt_access_expiration_secs: 3600,
            jwt_reset_expiration_secs: 600,
            bcrypt_cost: 4,
            front_end_url: "http://localhost:8080".to_string(),
            email_from_address: "noreply@example.com".to_string(),
            captcha_secret: None,
            request_timeout_secs: 5,
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            seed_mock_data: false,
            validation: ValidationConfig::default(),
        }
    }
}
