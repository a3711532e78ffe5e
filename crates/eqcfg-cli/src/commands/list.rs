use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use eqcfg_builder::{ConfigBuilder, StartLevels, DEFAULT_START_LEVEL};
use eqcfg_logger::Logger;
use eqcfg_manifest::BundleDescriptor;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ListCommand {
    /// Eclipse installation root, the directory containing `plugins`
    pub eclipse_dir: PathBuf,

    /// Print the bundles as a JSON array
    #[arg(long)]
    pub json: bool,
}

pub fn handle_list(cmd: ListCommand, logger: &Logger) -> Result<()> {
    let builder = ConfigBuilder::for_eclipse_dir(&cmd.eclipse_dir, DEFAULT_START_LEVEL, StartLevels::new())?;
    let bundles = builder.discover()?;

    if cmd.json {
        let json = serde_json::to_string_pretty(&bundles).context("Failed to serialize bundles")?;
        println!("{}", json);
    } else {
        for bundle in &bundles {
            println!("{}", format_bundle(bundle));
        }
    }

    let fragments = bundles.iter().filter(|b| b.is_fragment()).count();
    logger.info(&format!(
        "{} bundles ({} fragments) in {}",
        bundles.len(),
        fragments,
        builder.plugins_dir().display()
    ));
    Ok(())
}

fn format_bundle(bundle: &BundleDescriptor) -> String {
    let mut line = format!(
        "{} {} {}",
        bundle.symbolic_name().cyan(),
        bundle.version().unwrap_or("-"),
        bundle.file_name().dimmed()
    );
    if let Some(host) = bundle.fragment_host() {
        line.push_str(&format!(" {} {}", "fragment of".yellow(), host));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bundle() {
        colored::control::set_override(false);
        let bundle =
            BundleDescriptor::bundle("a_1.0.jar", "com.acme.a", Some("1.0".to_string())).unwrap();
        assert_eq!(format_bundle(&bundle), "com.acme.a 1.0 a_1.0.jar");

        let fragment = BundleDescriptor::fragment("f.jar", "com.acme.f", None, "com.acme.a").unwrap();
        assert_eq!(
            format_bundle(&fragment),
            "com.acme.f - f.jar fragment of com.acme.a"
        );
    }
}
