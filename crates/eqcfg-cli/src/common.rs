//! Common types and utilities shared across commands

use clap::Parser;
use eqcfg_config::{Settings, SettingsError};
use eqcfg_logger::{Logger, LoggerError};
use std::path::PathBuf;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Only print warnings and errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(long, global = true, value_name = "PATH", help = "Also write every message to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(long = "config", global = true, value_name = "PATH", help = "Settings file to use instead of the default location")]
    pub config_file: Option<PathBuf>,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    pub fn logger(&self) -> Result<Logger, LoggerError> {
        Logger::new(self.verbosity_level(), self.quiet, self.log_file.as_deref())
    }

    /// `--config` when given, otherwise the default settings location
    pub fn settings_path(&self) -> Result<PathBuf, SettingsError> {
        match self.config_file {
            Some(ref path) => Ok(path.clone()),
            None => Settings::path(),
        }
    }

    pub fn load_settings(&self) -> Result<Settings, SettingsError> {
        Settings::load_from(&self.settings_path()?)
    }
}
