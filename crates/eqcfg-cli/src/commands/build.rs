use anyhow::{Context, Result};
use clap::Args;
use eqcfg_builder::{
    parse_start_level_arg, render_config, ConfigBuilder, StartLevels, StartLevelsBuilder,
    DEFAULT_START_LEVEL,
};
use eqcfg_config::Settings;
use eqcfg_logger::Logger;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct BuildCommand {
    /// Eclipse installation root, the directory containing `plugins`
    pub eclipse_dir: PathBuf,

    /// Start level of bundles without an explicit one [default: 4]
    #[arg(short = 'd', long, allow_negative_numbers = true)]
    pub default_start_level: Option<i32>,

    /// Properties file mapping bundle symbolic names to start levels
    #[arg(short = 's', long, value_name = "FILE")]
    pub start_levels: Option<PathBuf>,

    /// Start level override; a level of -1 restores the default
    #[arg(long = "start-level", value_name = "NAME=LEVEL")]
    pub start_level: Vec<String>,

    /// Print the generated file instead of writing it
    #[arg(long)]
    pub dry_run: bool,
}

impl BuildCommand {
    /// Command line, then settings file, then the built-in default.
    pub fn default_start_level(&self, settings: &Settings) -> i32 {
        self.default_start_level
            .or(settings.default_start_level)
            .unwrap_or(DEFAULT_START_LEVEL)
    }

    /// Layer start levels: settings file sources first, command line last.
    pub fn start_levels(&self, settings: &Settings) -> Result<StartLevels> {
        let mut builder = StartLevelsBuilder::new();
        if let Some(ref file) = settings.start_levels_file {
            builder = builder.properties_file(file)?;
        }
        builder = builder.override_levels(
            settings
                .start_levels
                .iter()
                .map(|(name, level)| (name.as_str(), *level)),
        );

        if let Some(ref file) = self.start_levels {
            builder = builder.properties_file(file)?;
        }
        let overrides = self
            .start_level
            .iter()
            .map(|arg| parse_start_level_arg(arg))
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.override_levels(overrides.iter().map(|(name, level)| (name.as_str(), *level)));

        Ok(builder.build())
    }
}

pub fn handle_build(cmd: BuildCommand, settings: &Settings, logger: &Logger) -> Result<()> {
    let default_start_level = cmd.default_start_level(settings);
    let start_levels = cmd.start_levels(settings)?;
    logger.debug(&format!(
        "Default start level {}, {} start level overrides",
        default_start_level,
        start_levels.len()
    ));

    let builder = ConfigBuilder::for_eclipse_dir(&cmd.eclipse_dir, default_start_level, start_levels)?;

    if cmd.dry_run {
        let descriptor = builder.assemble()?;
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(render_config(&descriptor).as_bytes())
            .and_then(|()| stdout.flush())
            .context("Failed to print configuration")?;
        logger.info(&format!(
            "Dry run: {} would not be written",
            builder.target_path().display()
        ));
        return Ok(());
    }

    logger.spinner_start(&format!("Scanning {}", builder.plugins_dir().display()));
    match builder.build() {
        Ok(report) => {
            logger.spinner_success(&format!(
                "Wrote {} ({} bundles, {} fragments)",
                report.target.display(),
                report.bundle_count,
                report.fragment_count
            ));
            Ok(())
        }
        Err(e) => {
            logger.spinner_stop();
            Err(e.into())
        }
    }
}
