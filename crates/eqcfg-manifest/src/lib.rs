//! eqcfg bundle metadata
//!
//! Reads OSGi bundle identity from plugin archives and discovers the bundles
//! of a plugins directory. Archives are classified as bundles, fragments, or
//! "not a bundle" from the main section of `META-INF/MANIFEST.MF`.

pub mod descriptor;
pub mod discovery;
pub mod errors;
pub mod manifest;
pub mod reader;

pub use descriptor::BundleDescriptor;
pub use discovery::{discover_bundles, ARCHIVE_EXTENSION};
pub use errors::ManifestError;
pub use reader::{read_bundle, read_bundle_file};
