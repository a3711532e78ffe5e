//! Plugin directory discovery
//!
//! Lists the direct entries of a plugins directory, reads every `.jar` in it
//! and returns the bundles found, sorted by symbolic name so the generated
//! configuration does not depend on filesystem listing order.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::descriptor::BundleDescriptor;
use crate::errors::ManifestError;
use crate::reader::read_bundle_file;

/// File name suffix of plugin archives (matched case-sensitively)
pub const ARCHIVE_EXTENSION: &str = ".jar";

/// Discover all bundles and fragments directly inside `directory`.
///
/// Non-archive entries and archives that are not bundles are skipped. An
/// error reading any archive aborts the whole discovery.
pub fn discover_bundles(directory: &Path) -> Result<Vec<BundleDescriptor>, ManifestError> {
    debug!("Discovering bundles in: {:?}", directory);

    let entries = fs::read_dir(directory).map_err(|source| directory_error(directory, source))?;

    let mut bundles = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| directory_error(directory, source))?;
        let path = entry.path();

        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            debug!("Skipping entry with non UTF-8 name: {:?}", path);
            continue;
        };
        if !file_name.ends_with(ARCHIVE_EXTENSION) {
            debug!("Skipping non jar: {}", file_name);
            continue;
        }
        if !path.is_file() {
            debug!("Skipping jar that is not a regular file: {}", file_name);
            continue;
        }

        match read_bundle_file(&path)? {
            Some(bundle) => {
                debug!("Adding: {}", bundle);
                bundles.push(bundle);
            }
            None => debug!("Skipping non bundle jar: {}", file_name),
        }
    }

    bundles.sort();
    info!("Found {} bundles in {:?}", bundles.len(), directory);
    Ok(bundles)
}

fn directory_error(directory: &Path, source: std::io::Error) -> ManifestError {
    ManifestError::DirectoryRead {
        path: directory.to_path_buf(),
        source,
    }
}
