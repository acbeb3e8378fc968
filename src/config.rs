use std::env;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use thiserror::Error;

use crate::domain::pricing::Rates;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    pub rates: Rates,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse(&lookup, "PORT", "8080")?;
        let pool_size = parse(&lookup, "DATABASE_POOL_SIZE", "10")?;

        let rates = Rates {
            shipping_cost: money(&lookup, "SHIPPING_COST", "5.00")?,
            tax_rate: money(&lookup, "TAX_RATE", "0.10")?,
            discount_rate: money(&lookup, "DISCOUNT_RATE", "0.05")?,
        };
        if rates.discount_rate > BigDecimal::from(1) {
            return Err(ConfigError::Invalid {
                key: "DISCOUNT_RATE",
                value: rates.discount_rate.to_string(),
                reason: "must not exceed 1".to_string(),
            });
        }

        Ok(Self {
            database_url,
            host,
            port,
            pool_size,
            rates,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

/// A non-negative decimal.
fn money<F>(lookup: &F, key: &'static str, default: &str) -> Result<BigDecimal, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let amount: BigDecimal = parse(lookup, key, default)?;
    if amount < BigDecimal::zero() {
        return Err(ConfigError::Invalid {
            key,
            value: amount.to_string(),
            reason: "must not be negative".to_string(),
        });
    }
    Ok(amount)
}
