//! Turns a plugins directory into a written `config.ini`.

use eqcfg_manifest::{discover_bundles, BundleDescriptor};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::model::{ConfigDescriptor, StartLevels};
use crate::writer::write_config;

/// OSGi framework bundle, started by the launcher and never listed
pub const FRAMEWORK_BUNDLE: &str = "org.eclipse.osgi";

const PLUGINS_DIR: &str = "plugins";
const CONFIGURATION_DIR: &str = "configuration";
const CONFIG_FILE: &str = "config.ini";

/// Outcome of a successful [`ConfigBuilder::build`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub target: PathBuf,
    pub bundle_count: usize,
    pub fragment_count: usize,
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    plugins_dir: PathBuf,
    default_start_level: i32,
    start_levels: StartLevels,
}

impl ConfigBuilder {
    /// Validate the inputs of a build.
    ///
    /// Only metadata checks happen here; no archive is opened.
    pub fn new(
        plugins_dir: impl Into<PathBuf>,
        default_start_level: i32,
        start_levels: StartLevels,
    ) -> Result<Self, ConfigError> {
        let plugins_dir = plugins_dir.into();
        if !plugins_dir.is_dir() || fs::read_dir(&plugins_dir).is_err() {
            return Err(ConfigError::PluginsDirectory(plugins_dir));
        }
        if default_start_level <= 0 {
            return Err(ConfigError::InvalidDefaultStartLevel(default_start_level));
        }
        Ok(ConfigBuilder {
            plugins_dir,
            default_start_level,
            start_levels,
        })
    }

    /// Builder for the `plugins` directory of an Eclipse installation.
    pub fn for_eclipse_dir(
        eclipse_dir: &Path,
        default_start_level: i32,
        start_levels: StartLevels,
    ) -> Result<Self, ConfigError> {
        Self::new(
            eclipse_dir.join(PLUGINS_DIR),
            default_start_level,
            start_levels,
        )
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// `<parent of plugins dir>/configuration/config.ini`
    pub fn target_path(&self) -> PathBuf {
        let root = self.plugins_dir.parent().unwrap_or_else(|| Path::new(""));
        root.join(CONFIGURATION_DIR).join(CONFIG_FILE)
    }

    /// Bundles that belong in the configuration, sorted.
    pub fn discover(&self) -> Result<Vec<BundleDescriptor>, ConfigError> {
        let bundles = discover_bundles(&self.plugins_dir)?
            .into_iter()
            .filter(|bundle| {
                let framework = bundle.symbolic_name() == FRAMEWORK_BUNDLE;
                if framework {
                    debug!("Excluding framework bundle: {}", bundle);
                }
                !framework
            })
            .collect();
        Ok(bundles)
    }

    /// Discover the bundles and build the configuration model.
    pub fn assemble(&self) -> Result<ConfigDescriptor, ConfigError> {
        ConfigDescriptor::new(
            self.default_start_level,
            self.discover()?,
            self.start_levels.clone(),
        )
    }

    /// Assemble and write the configuration to [`Self::target_path`].
    pub fn build(&self) -> Result<BuildReport, ConfigError> {
        let descriptor = self.assemble()?;
        let target = self.target_path();
        write_config(&descriptor, &target)?;

        let report = BuildReport {
            target,
            bundle_count: descriptor.len(),
            fragment_count: descriptor.fragment_count(),
        };
        info!(
            "Wrote {} bundles ({} fragments) to {:?}",
            report.bundle_count, report.fragment_count, report.target
        );
        Ok(report)
    }
}
