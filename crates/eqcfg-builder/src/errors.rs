use eqcfg_manifest::ManifestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a runtime configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("default start level should be a strictly positive integer, got {0}")]
    InvalidDefaultStartLevel(i32),

    #[error("plugins directory {} is not a readable directory", .0.display())]
    PluginsDirectory(PathBuf),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Error writing config file: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid start level '{value}' for bundle: {bundle}")]
    InvalidStartLevel { bundle: String, value: String },

    #[error("invalid start level override '{0}', expected NAME=LEVEL")]
    InvalidOverride(String),

    #[error("Cannot read start levels file {}", path.display())]
    StartLevelsRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
