//! In-memory description of an Equinox runtime configuration.
//!
//! A [`ConfigDescriptor`] owns its bundle list and start-level map; both are
//! taken by value at construction and only exposed read-only afterwards.

use eqcfg_manifest::BundleDescriptor;
use std::collections::BTreeMap;

use crate::errors::ConfigError;

/// Start level overrides keyed by bundle symbolic name
pub type StartLevels = BTreeMap<String, i32>;

/// Start level used when none is configured
pub const DEFAULT_START_LEVEL: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDescriptor {
    default_start_level: i32,
    bundles: Vec<BundleDescriptor>,
    start_levels: StartLevels,
}

impl ConfigDescriptor {
    /// Build a configuration model.
    ///
    /// `default_start_level` must be strictly positive. Override values are
    /// not checked here; overrides naming bundles absent from `bundles` are
    /// kept but have no effect on the rendered file.
    pub fn new(
        default_start_level: i32,
        bundles: impl IntoIterator<Item = BundleDescriptor>,
        start_levels: StartLevels,
    ) -> Result<Self, ConfigError> {
        if default_start_level <= 0 {
            return Err(ConfigError::InvalidDefaultStartLevel(default_start_level));
        }
        Ok(ConfigDescriptor {
            default_start_level,
            bundles: bundles.into_iter().collect(),
            start_levels,
        })
    }

    /// Build a configuration model without any start level override.
    pub fn with_default_start_levels(
        default_start_level: i32,
        bundles: impl IntoIterator<Item = BundleDescriptor>,
    ) -> Result<Self, ConfigError> {
        Self::new(default_start_level, bundles, StartLevels::new())
    }

    pub fn default_start_level(&self) -> i32 {
        self.default_start_level
    }

    /// Bundles in the order they were supplied
    pub fn bundles(&self) -> &[BundleDescriptor] {
        &self.bundles
    }

    pub fn start_levels(&self) -> &StartLevels {
        &self.start_levels
    }

    /// Override for `symbolic_name`, if any
    pub fn start_level_for(&self, symbolic_name: &str) -> Option<i32> {
        self.start_levels.get(symbolic_name).copied()
    }

    /// Bundles sorted by symbolic name
    pub fn sorted_bundles(&self) -> Vec<&BundleDescriptor> {
        let mut sorted: Vec<&BundleDescriptor> = self.bundles.iter().collect();
        sorted.sort();
        sorted
    }

    pub fn fragment_count(&self) -> usize {
        self.bundles.iter().filter(|b| b.is_fragment()).count()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
