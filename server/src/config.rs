//! Server configuration read from the environment.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use shared::ManualDepositConfig;

pub const DATABASE_URL_VAR: &str = "CLINIC_LEDGER_DATABASE_URL";
pub const BIND_ADDR_VAR: &str = "CLINIC_LEDGER_BIND_ADDR";
pub const CORS_ORIGIN_VAR: &str = "CLINIC_LEDGER_CORS_ORIGIN";
pub const MAX_DEPOSIT_AMOUNT_VAR: &str = "CLINIC_LEDGER_MAX_DEPOSIT_AMOUNT";
pub const MAX_DESCRIPTION_LENGTH_VAR: &str = "CLINIC_LEDGER_MAX_DESCRIPTION_LENGTH";
pub const DEPOSIT_LABEL_VAR: &str = "CLINIC_LEDGER_DEPOSIT_LABEL";

const DEFAULT_DATABASE_URL: &str = "sqlite:clinic-ledger.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// Limits for operator-entered amounts and descriptions
    pub deposit: ManualDepositConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset variables fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup(DATABASE_URL_VAR).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("{} is not a socket address: {}", BIND_ADDR_VAR, bind_addr))?;

        let cors_origin =
            lookup(CORS_ORIGIN_VAR).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origin = cors_origin
            .parse::<HeaderValue>()
            .with_context(|| format!("{} is not a valid origin: {}", CORS_ORIGIN_VAR, cors_origin))?;

        let mut deposit = ManualDepositConfig::default();
        if let Some(value) = lookup(MAX_DEPOSIT_AMOUNT_VAR) {
            deposit.max_amount = value
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|amount| *amount > 0)
                .with_context(|| {
                    format!("{} must be a positive whole number: {}", MAX_DEPOSIT_AMOUNT_VAR, value)
                })?;
        }
        if let Some(value) = lookup(MAX_DESCRIPTION_LENGTH_VAR) {
            deposit.max_description_length = value.trim().parse::<usize>().with_context(|| {
                format!("{} is not a length: {}", MAX_DESCRIPTION_LENGTH_VAR, value)
            })?;
        }
        if let Some(label) = lookup(DEPOSIT_LABEL_VAR).filter(|label| !label.trim().is_empty()) {
            deposit.default_label = label.trim().to_string();
        }

        Ok(Self {
            database_url,
            bind_addr,
            cors_origin,
            deposit,
        })
    }
}
