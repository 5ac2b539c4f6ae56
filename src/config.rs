//! Environment configuration

use anyhow::{Context, Result};
use crate::domain::value_objects::{normalize_currency, DEFAULT_CURRENCY};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Absent means orders live in memory only.
    pub database_url: Option<String>,
    pub max_connections: u32,
    /// Absent means events are only logged.
    pub nats_url: Option<String>,
    pub currency: String,
}

impl Config {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let port = non_empty("PORT").map(|v| v.parse::<u16>().with_context(|| format!("PORT must be a port number, got {v:?}"))).transpose()?.unwrap_or(8083);
        let max_connections = non_empty("DATABASE_MAX_CONNECTIONS")
            .map(|v| v.parse::<u32>().with_context(|| format!("DATABASE_MAX_CONNECTIONS must be an integer, got {v:?}")))
            .transpose()?.unwrap_or(10);
        let currency = non_empty("ORDER_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let currency = normalize_currency(&currency).context("ORDER_CURRENCY")?;
        Ok(Self { port, database_url: non_empty("DATABASE_URL"), max_connections, nats_url: non_empty("NATS_URL"), currency })
    }
}
