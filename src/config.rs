//! Configuration loading from TOML files.
//!
//! The bot token is taken from the `TELEGRAM_BOT_TOKEN` environment variable
//! (loaded via `.env` by `main`) unless `telegram.bot_token` is set in the
//! config file, so the secret stays out of committed configuration.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub pricing: PricingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram transport configuration.
#[derive(Debug, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Usually left unset in favor of `TELEGRAM_BOT_TOKEN`.
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Chat that receives operator notifications and may issue operator commands.
    pub admin_chat_id: i64,
    /// Public channel that receives the periodic quote broadcast.
    pub channel_chat_id: i64,
}

impl TelegramConfig {
    /// Resolve the bot token from config or environment.
    pub fn token(&self) -> Result<String, ConfigError> {
        if let Some(token) = &self.bot_token {
            return Ok(token.clone());
        }
        std::env::var("TELEGRAM_BOT_TOKEN").map_err(|_| ConfigError::MissingField {
            field: "telegram.bot_token (or TELEGRAM_BOT_TOKEN)",
        })
    }
}

/// Upstream price source endpoints and quoting parameters.
#[derive(Debug, Deserialize)]
pub struct PricingConfig {
    /// USDT/IRR spot price endpoint.
    pub spot_url: String,
    /// 18-karat gold price endpoint (IRR per gram).
    pub gold_url: String,
    /// International gold ounce endpoint (USD per troy ounce).
    pub ounce_url: String,
    /// Per-source request timeout in seconds.
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,
    /// Fixed spread subtracted from the buy price to quote a sell price, in IRR.
    #[serde(default = "default_sell_spread")]
    pub sell_spread: Decimal,
}

fn default_source_timeout() -> u64 {
    10
}

fn default_sell_spread() -> Decimal {
    dec!(500)
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the ledger's JSON tables.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.admin_chat_id == 0 {
            return Err(ConfigError::InvalidValue {
                field: "telegram.admin_chat_id",
                reason: "must be a real chat id".into(),
            });
        }

        for (field, value) in [
            ("pricing.spot_url", &self.pricing.spot_url),
            ("pricing.gold_url", &self.pricing.gold_url),
            ("pricing.ounce_url", &self.pricing.ounce_url),
        ] {
            url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
                field,
                reason: e.to_string(),
            })?;
        }

        if self.pricing.source_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pricing.source_timeout_secs",
                reason: "must be at least 1".into(),
            });
        }

        if self.pricing.sell_spread < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "pricing.sell_spread",
                reason: "must not be negative".into(),
            });
        }

        Ok(())
    }
}
