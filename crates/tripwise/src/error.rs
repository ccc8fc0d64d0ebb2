//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tripwise_config::ConfigError;
use tripwise_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(tripwise::not_found),
        help("Run: tripwise {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("No checkout draft for selection '{id}'")]
    #[diagnostic(
        code(tripwise::no_draft),
        help("Start one with: tripwise checkout init {id}")
    )]
    NoDraft { id: String },

    #[error("Hotel '{id}' is no longer available")]
    #[diagnostic(
        code(tripwise::hotel_unavailable),
        help("Pick another hotel with: tripwise hotel list")
    )]
    HotelUnavailable { id: String },

    #[error("Selection '{id}' is a {actual} selection; this needs a {expected} selection")]
    #[diagnostic(code(tripwise::wrong_kind))]
    WrongKind {
        id: String,
        expected: String,
        actual: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tripwise::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(tripwise::config),
        help("Check the config file (tripwise config path) and TRIPWISE_* variables.")
    )]
    Config(Box<figment::Error>),

    #[error("failed to write config: {0}")]
    #[diagnostic(code(tripwise::config_write))]
    ConfigWrite(#[from] toml::ser::Error),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(tripwise::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Could not access saved state under '{key}'")]
    #[diagnostic(
        code(tripwise::storage),
        help("Check permissions on the data directory, or run with --ephemeral.")
    )]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(tripwise::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(tripwise::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::NoDraft { .. } | Self::HotelUnavailable { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Validation { .. }
            | Self::WrongKind { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SelectionNotFound { id } => CliError::NotFound {
                resource_type: "selection".into(),
                identifier: id.to_string(),
                list_command: "selections list".into(),
            },

            CoreError::NotAHotelSelection { id, kind } => CliError::WrongKind {
                id: id.to_string(),
                expected: "hotel".into(),
                actual: kind,
            },

            CoreError::NotAFlightSelection { id, kind } => CliError::WrongKind {
                id: id.to_string(),
                expected: "flight".into(),
                actual: kind,
            },

            CoreError::HotelNotFound { id } => CliError::HotelUnavailable { id },

            CoreError::Storage { key, source } => CliError::Storage { key, source },

            CoreError::Serialization(e) => CliError::Json(e),

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Serialization(e) => CliError::ConfigWrite(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use tripwise_core::SelectionId;

    use super::*;

    #[test]
    fn lookup_misses_exit_not_found() {
        let err = CliError::from(CoreError::SelectionNotFound {
            id: SelectionId::new(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);

        let err = CliError::from(CoreError::HotelNotFound { id: "HTL-X".into() });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn wrong_kind_is_a_usage_error() {
        let err = CliError::from(CoreError::NotAFlightSelection {
            id: SelectionId::new(),
            kind: "hotel".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert!(err.to_string().contains("needs a flight selection"));
    }
}
