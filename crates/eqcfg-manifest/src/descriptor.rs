//! Bundle identity extracted from a plugin archive.
//!
//! A [`BundleDescriptor`] is built once per archive by the reader and never
//! mutated afterwards. A fragment only names its host; descriptors never point
//! at each other.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::errors::ManifestError;

/// Identity, version and role of one bundle archive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BundleDescriptor {
    file_name: String,
    symbolic_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fragment_host: Option<String>,
}

impl BundleDescriptor {
    /// Describe an ordinary bundle.
    pub fn bundle(
        file_name: impl Into<String>,
        symbolic_name: impl Into<String>,
        version: Option<String>,
    ) -> Result<Self, ManifestError> {
        Self::build(file_name.into(), symbolic_name.into(), version, None)
    }

    /// Describe a fragment attached to `host`.
    ///
    /// The host is taken as declared; a manifest with an empty
    /// `Fragment-Host` value still yields a fragment.
    pub fn fragment(
        file_name: impl Into<String>,
        symbolic_name: impl Into<String>,
        version: Option<String>,
        host: impl Into<String>,
    ) -> Result<Self, ManifestError> {
        Self::build(
            file_name.into(),
            symbolic_name.into(),
            version,
            Some(host.into()),
        )
    }

    fn build(
        file_name: String,
        symbolic_name: String,
        version: Option<String>,
        fragment_host: Option<String>,
    ) -> Result<Self, ManifestError> {
        if file_name.is_empty() {
            return Err(ManifestError::InvalidDescriptor(
                "archive file name must not be empty",
            ));
        }
        if symbolic_name.is_empty() {
            return Err(ManifestError::InvalidDescriptor(
                "symbolic name must not be empty",
            ));
        }
        Ok(BundleDescriptor {
            file_name,
            symbolic_name,
            version,
            fragment_host,
        })
    }

    /// Archive file name on disk (not a path)
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Symbolic name of the host bundle, set only for fragments
    pub fn fragment_host(&self) -> Option<&str> {
        self.fragment_host.as_deref()
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment_host.is_some()
    }
}

// Symbolic name decides the order; the remaining fields only break ties so
// that `Ord` agrees with `Eq`.
impl Ord for BundleDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbolic_name
            .cmp(&other.symbolic_name)
            .then_with(|| self.file_name.cmp(&other.file_name))
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.fragment_host.cmp(&other.fragment_host))
    }
}

impl PartialOrd for BundleDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BundleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.symbolic_name,
            self.version.as_deref().unwrap_or("unversioned"),
            self.file_name
        )?;
        if let Some(host) = &self.fragment_host {
            write!(f, " fragment of {}", host)?;
        }
        Ok(())
    }
}
