use crate::GlobalOpts;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use eqcfg_config::Settings;
use eqcfg_logger::Logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print every configured value
    Show,
    /// Print the settings file location
    Path,
    /// Print one value
    Get { key: String },
    /// Set a value: default-start-level, start-levels-file or start-levels.<bundle>
    Set { key: String, value: String },
}

pub fn handle_config(action: ConfigAction, opts: &GlobalOpts, logger: &Logger) -> Result<()> {
    let path = opts.settings_path()?;
    logger.debug(&format!("Reading settings from: {}", path.display()));

    match action {
        ConfigAction::Show => {
            let settings = Settings::load_from(&path)?;
            println!("{}", "Configuration:".bold().green());
            if settings.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in settings.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Get { key } => {
            let settings = Settings::load_from(&path)?;
            match settings.get(&key)? {
                Some(value) => println!("{}", value),
                None => logger.warn(&format!("{} is not set", key)),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load_from(&path)?;
            settings.set(&key, &value)?;
            settings
                .save_to(&path)
                .with_context(|| format!("Failed to save settings to {}", path.display()))?;
            logger.success(&format!("Set {} = {}", key, value));
        }
    }
    Ok(())
}
