//! Configuration for the tripwise CLI.
//!
//! A TOML file in the platform config directory, layered over built-in
//! defaults and under `TRIPWISE_*` environment variables, translated into
//! `tripwise_core::StoreConfig`. The CLI applies its own flag overrides on
//! top of the loaded [`Config`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tripwise_core::config::{DEFAULT_HISTORY_CAPACITY, DEFAULT_RESULT_COUNT, default_payment_fees};
use tripwise_core::model::DEFAULT_PAGE_LIMIT;
use tripwise_core::{CurrencyCode, PaymentMethod, StoreConfig};

const ENV_PREFIX: &str = "TRIPWISE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Currency every draft amount is stored in.
    #[serde(default = "default_base_currency")]
    pub base_currency: CurrencyCode,

    /// Display currency until one is chosen with `currency set`.
    #[serde(default = "default_base_currency")]
    pub display_currency: CurrencyCode,

    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    #[serde(default = "default_result_count")]
    pub result_count: usize,

    /// Simulated backend delay, humantime syntax ("300ms", "1s").
    #[serde(default = "default_latency")]
    pub latency: String,

    #[serde(default)]
    pub seed: u64,

    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Where persisted state lives. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Flat payment fees in the base currency.
    #[serde(default = "default_payment_fees")]
    pub payment_fees: BTreeMap<PaymentMethod, u64>,

    /// Rate overrides per one USD.
    #[serde(default)]
    pub rates: BTreeMap<CurrencyCode, f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            display_currency: default_base_currency(),
            page_limit: default_page_limit(),
            result_count: default_result_count(),
            latency: default_latency(),
            seed: 0,
            history_capacity: default_history_capacity(),
            data_dir: None,
            payment_fees: default_payment_fees(),
            rates: BTreeMap::new(),
        }
    }
}

fn default_base_currency() -> CurrencyCode {
    CurrencyCode::IDR
}
fn default_page_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}
fn default_result_count() -> usize {
    DEFAULT_RESULT_COUNT
}
fn default_latency() -> String {
    "300ms".into()
}
fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Config {
    /// Parsed `latency`.
    pub fn latency(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(self.latency.trim()).map_err(|e| ConfigError::Validation {
            field: "latency".into(),
            reason: e.to_string(),
        })
    }

    /// Configured data directory, or the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Translate into the settings the stores consume.
    pub fn to_store_config(&self) -> Result<StoreConfig, ConfigError> {
        if self.page_limit == 0 {
            return Err(ConfigError::Validation {
                field: "page_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "history_capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        if let Some((code, rate)) = self.rates.iter().find(|(_, r)| !r.is_finite() || **r <= 0.0) {
            return Err(ConfigError::Validation {
                field: format!("rates.{code}"),
                reason: format!("expected a positive rate, got {rate}"),
            });
        }

        let mut payment_fees = default_payment_fees();
        payment_fees.extend(self.payment_fees.iter().map(|(m, f)| (*m, *f)));

        Ok(StoreConfig {
            base_currency: self.base_currency,
            display_currency: self.display_currency,
            history_capacity: self.history_capacity,
            page_limit: self.page_limit,
            result_count: self.result_count,
            latency: self.latency()?,
            seed: self.seed,
            payment_fees,
            rates: self.rates.clone(),
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "tripwise", "tripwise")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "tripwise", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory for persisted store state.
pub fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "tripwise"]),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if anything fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
