//! Equinox `config.ini` builder
//!
//! Assembles the bundles discovered in a plugins directory and the start
//! level overrides into a [`ConfigDescriptor`], then renders it as the
//! `osgi.bundles` list the Equinox launcher reads.

pub mod assembler;
pub mod errors;
pub mod model;
pub mod start_levels;
pub mod writer;

pub use assembler::{BuildReport, ConfigBuilder, FRAMEWORK_BUNDLE};
pub use errors::ConfigError;
pub use model::{ConfigDescriptor, StartLevels, DEFAULT_START_LEVEL};
pub use start_levels::{
    apply_override, load_start_levels, parse_start_level_arg, StartLevelsBuilder,
    RESET_START_LEVEL,
};
pub use writer::{render_config, write_config, FRAMEWORK_EXTENSION_BUNDLE};
