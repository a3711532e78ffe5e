//! `config.ini` rendering and persistence
//!
//! Output grammar:
//!
//! ```text
//! #Product Runtime Configuration File
//! osgi.bundles.defaultStartLevel=<default>
//! osgi.bundles=<entry>,\
//! <entry>,\
//! org.eclipse.equinox.servletbridge.extensionbundle
//! ```
//!
//! A bundle entry is `<name>@start` or `<name>@<level>:start`; a fragment entry
//! is the bare `<name>`. The servlet bridge extension bundle always closes
//! the list, with no trailing newline.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::model::ConfigDescriptor;

const HEADER_COMMENT: &str = "#Product Runtime Configuration File";
const DEFAULT_START_LEVEL_KEY: &str = "osgi.bundles.defaultStartLevel";
const BUNDLES_KEY: &str = "osgi.bundles";
const ENTRY_SEPARATOR: &str = ",\\\n";

/// Framework extension bundle appended to every bundle list
pub const FRAMEWORK_EXTENSION_BUNDLE: &str = "org.eclipse.equinox.servletbridge.extensionbundle";

/// Render the configuration file content.
///
/// Pure function of the model: bundles are sorted by symbolic name, so the
/// result is byte-identical for the same set of bundles and overrides.
pub fn render_config(descriptor: &ConfigDescriptor) -> String {
    let mut content = String::new();
    content.push_str(HEADER_COMMENT);
    content.push('\n');
    content.push_str(&format!(
        "{}={}\n",
        DEFAULT_START_LEVEL_KEY,
        descriptor.default_start_level()
    ));
    content.push_str(BUNDLES_KEY);
    content.push('=');

    for bundle in descriptor.sorted_bundles() {
        content.push_str(bundle.symbolic_name());
        if !bundle.is_fragment() {
            content.push('@');
            if let Some(level) = descriptor.start_level_for(bundle.symbolic_name()) {
                content.push_str(&format!("{}:", level));
            }
            content.push_str("start");
        }
        content.push_str(ENTRY_SEPARATOR);
    }

    content.push_str(FRAMEWORK_EXTENSION_BUNDLE);
    content
}

/// Render `descriptor` and write it to `target`, creating parent directories.
pub fn write_config(descriptor: &ConfigDescriptor, target: &Path) -> Result<(), ConfigError> {
    let content = render_config(descriptor);
    debug!("Writing {} bytes to {:?}", content.len(), target);

    let write_error = |source| ConfigError::Write {
        path: target.to_path_buf(),
        source,
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut file = File::create(target).map_err(write_error)?;
    file.write_all(content.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)?;
    file.sync_all().map_err(write_error)?;

    info!("Config written to: {:?}", target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StartLevels;
    use eqcfg_manifest::BundleDescriptor;
    use tempfile::TempDir;

    struct Fixture {
        bundle1: BundleDescriptor,
        bundle2: BundleDescriptor,
        bundle3: BundleDescriptor,
        fragment1: BundleDescriptor,
    }

    fn fixture() -> Fixture {
        let version = || Some("1.0.0".to_string());
        Fixture {
            bundle1: BundleDescriptor::bundle("bundle1.jar", "bundle1", version()).unwrap(),
            bundle2: BundleDescriptor::bundle("bundle2.jar", "bundle2", version()).unwrap(),
            bundle3: BundleDescriptor::bundle("bundle3.jar", "bundle3", version()).unwrap(),
            fragment1: BundleDescriptor::fragment("fragment1.jar", "fragment1", version(), "bundle1")
                .unwrap(),
        }
    }

    #[test]
    fn test_basic() {
        let f = fixture();
        let descriptor =
            ConfigDescriptor::with_default_start_levels(4, vec![f.bundle1, f.bundle2, f.fragment1])
                .unwrap();
        let expected = "#Product Runtime Configuration File\n\
                        osgi.bundles.defaultStartLevel=4\n\
                        osgi.bundles=bundle1@start,\\\n\
                        bundle2@start,\\\n\
                        fragment1,\\\n\
                        org.eclipse.equinox.servletbridge.extensionbundle";
        assert_eq!(render_config(&descriptor), expected);
    }

    #[test]
    fn test_bundle_start_levels() {
        let f = fixture();
        let mut levels = StartLevels::new();
        levels.insert("bundle1".to_string(), 1);
        levels.insert("bundle2".to_string(), 5);
        // Fragment start level should be ignored
        levels.insert("fragment1".to_string(), 5);

        let descriptor = ConfigDescriptor::new(
            4,
            vec![f.bundle1, f.bundle2, f.bundle3, f.fragment1],
            levels,
        )
        .unwrap();
        let expected = "#Product Runtime Configuration File\n\
                        osgi.bundles.defaultStartLevel=4\n\
                        osgi.bundles=bundle1@1:start,\\\n\
                        bundle2@5:start,\\\n\
                        bundle3@start,\\\n\
                        fragment1,\\\n\
                        org.eclipse.equinox.servletbridge.extensionbundle";
        assert_eq!(render_config(&descriptor), expected);
    }

    #[test]
    fn test_default_start_level_is_rendered() {
        let descriptor = ConfigDescriptor::with_default_start_levels(6, Vec::new()).unwrap();
        assert_eq!(
            render_config(&descriptor),
            "#Product Runtime Configuration File\n\
             osgi.bundles.defaultStartLevel=6\n\
             osgi.bundles=org.eclipse.equinox.servletbridge.extensionbundle"
        );
    }

    #[test]
    fn test_render_is_independent_of_input_order() {
        let f = fixture();
        let forward = ConfigDescriptor::with_default_start_levels(
            4,
            vec![f.bundle1.clone(), f.bundle2.clone(), f.fragment1.clone()],
        )
        .unwrap();
        let backward =
            ConfigDescriptor::with_default_start_levels(4, vec![f.fragment1, f.bundle2, f.bundle1])
                .unwrap();
        assert_eq!(render_config(&forward), render_config(&backward));
        assert_eq!(render_config(&forward), render_config(&forward));
    }

    #[test]
    fn test_override_for_unknown_bundle_is_inert() {
        let f = fixture();
        let mut levels = StartLevels::new();
        levels.insert("not.installed".to_string(), 1);
        let with_override = ConfigDescriptor::new(4, vec![f.bundle1.clone()], levels).unwrap();
        let without = ConfigDescriptor::with_default_start_levels(4, vec![f.bundle1]).unwrap();
        assert_eq!(render_config(&with_override), render_config(&without));
    }

    #[test]
    fn test_write_config_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("configuration").join("config.ini");
        let f = fixture();
        let descriptor = ConfigDescriptor::with_default_start_levels(4, vec![f.bundle1]).unwrap();

        write_config(&descriptor, &target).unwrap();

        let written = fs::read_to_string(&target).unwrap();
        assert_eq!(written, render_config(&descriptor));
        assert!(!written.ends_with('\n'));
    }

    #[test]
    fn test_write_config_failure_names_target() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("configuration");
        fs::write(&blocker, "a file where a directory should be").unwrap();
        let target = blocker.join("config.ini");
        let descriptor = ConfigDescriptor::with_default_start_levels(4, Vec::new()).unwrap();

        let err = write_config(&descriptor, &target).unwrap_err();
        assert!(matches!(err, ConfigError::Write { ref path, .. } if path == &target));
    }
}
