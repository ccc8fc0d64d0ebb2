//! CLI configuration: thin wrapper around `tripwise_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--data-dir, --latency, etc.).

use std::path::PathBuf;

use tripwise_core::StoreConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use tripwise_config::{Config, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Settings resolved from config file, environment, and flags.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub store: StoreConfig,
    /// `None` when running ephemeral.
    pub data_dir: Option<PathBuf>,
}

/// Load the config and apply flag overrides. Flags beat env beat file.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let mut store = cfg.to_store_config()?;

    if let Some(latency) = global.latency {
        store.latency = latency;
    }

    let data_dir = if global.ephemeral {
        None
    } else {
        Some(global.data_dir.clone().unwrap_or_else(|| cfg.data_dir()))
    };

    tracing::debug!(
        base = %store.base_currency,
        latency = ?store.latency,
        data_dir = ?data_dir,
        "configuration resolved"
    );
    Ok(Resolved { store, data_dir })
}
