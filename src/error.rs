//! Error types for map loading and settings.
//!
//! Only input problems are errors. Illegal tank actions are reported as `false`
//! by the world and never surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("couldn't read map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing or invalid line for {key}")]
    MissingMetadata { key: &'static str },

    #[error("invalid value {value:?} for {key}")]
    InvalidMetadata { key: &'static str, value: String },

    #[error("map dimensions must be positive (rows={rows}, cols={cols})")]
    ZeroDimension { rows: usize, cols: usize },

    #[error("map seeds {found} player(s), at least {required} are needed")]
    InsufficientPlayers { found: usize, required: usize },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("couldn't read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}
