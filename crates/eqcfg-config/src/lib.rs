//! User settings for the eqcfg CLI

pub mod errors;
pub mod settings;

pub use errors::SettingsError;
pub use settings::{Settings, CONFIG_ENV_VAR};
