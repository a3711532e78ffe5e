use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading bundle metadata
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Error loading manifest information for {archive}")]
    ArchiveRead {
        archive: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid manifest in {archive}: {reason} (line {line})")]
    MalformedManifest {
        archive: String,
        line: usize,
        reason: &'static str,
    },

    #[error("Cannot read plugins directory {}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid bundle descriptor: {0}")]
    InvalidDescriptor(&'static str),
}
