use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_MESSAGES_API_BASE: &str = "http://november7-730026606190.europe-west1.run.app";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Upstream base URL, without the `/messages/` resource path.
    pub messages_api_base: String,
    /// Timeout applied to every single upstream HTTP attempt.
    pub request_timeout: Duration,
    pub page_limit: usize,
    pub max_pages: usize,
    /// Deadline for gathering all pages for one question.
    pub ask_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, applying defaults
    /// for every missing key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = parse_var(&lookup, "PORT", 3000)?;
        let ip = IpAddr::from_str(host.trim())
            .map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let messages_api_base = lookup("MESSAGES_API_BASE")
            .map(|base| base.trim().to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_MESSAGES_API_BASE.to_string());

        let request_timeout = parse_seconds(&lookup, "MESSAGES_API_TIMEOUT", 25.0)?;
        let ask_timeout = parse_seconds(&lookup, "ASK_TIMEOUT", 90.0)?;

        let page_limit: usize = parse_var(&lookup, "MESSAGES_API_LIMIT", 50)?;
        if page_limit == 0 {
            return Err(AppError::ConfigError("MESSAGES_API_LIMIT must be greater than zero".to_string()));
        }
        let max_pages: usize = parse_var(&lookup, "MESSAGES_API_MAX_PAGES", 20)?;
        if max_pages == 0 {
            return Err(AppError::ConfigError("MESSAGES_API_MAX_PAGES must be greater than zero".to_string()));
        }

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            messages_api_base,
            request_timeout,
            page_limit,
            max_pages,
            ask_timeout,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

fn parse_seconds<F>(lookup: &F, key: &str, default: f64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: f64 = parse_var(lookup, key, default)?;
    if secs <= 0.0 {
        return Err(AppError::ConfigError(format!("{} must be positive", key)));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e)))
}
