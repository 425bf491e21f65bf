//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use anyhow::Context;
use chrono::FixedOffset;
use payments_hex::parse_offset;

/// Payment server configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Offset used for dates in responses; `None` means the host's own.
    pub display_offset: Option<FixedOffset>,
}

/// Report server configuration.
#[derive(Debug)]
pub struct ReportConfig {
    pub port: u16,
    pub payment_service_url: String,
    pub payment_service_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a port number")?;

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let display_offset = var("DISPLAY_UTC_OFFSET")
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_offset(&v))
            .transpose()
            .context("DISPLAY_UTC_OFFSET must look like +03:00")?;

        Ok(Self {
            port,
            database_url,
            display_offset,
        })
    }
}

impl ReportConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = var("REPORT_PORT")
            .unwrap_or_else(|| "3001".to_string())
            .parse()
            .context("REPORT_PORT must be a port number")?;

        let payment_service_url = var("PAYMENT_SERVICE_URL")
            .ok_or_else(|| anyhow::anyhow!("PAYMENT_SERVICE_URL environment variable is required"))?;

        let timeout_secs: u64 = var("PAYMENT_SERVICE_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("PAYMENT_SERVICE_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            port,
            payment_service_url,
            payment_service_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
