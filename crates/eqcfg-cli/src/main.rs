use clap::{Parser, Subcommand};
use eqcfg::{
    commands::{
        build::{self, BuildCommand},
        config::{self, ConfigAction},
        list::{self, ListCommand},
    },
    init_tracing, GlobalOpts,
};
use eqcfg_logger::Logger;

#[derive(Parser)]
#[command(name = "eqcfg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Equinox runtime configuration builder",
    long_about = "eqcfg scans the plugins directory of an Eclipse installation and writes the configuration/config.ini that tells Equinox which bundles to install and start."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate configuration/config.ini
    Build(BuildCommand),
    /// List the bundles that would be configured
    List(ListCommand),
    /// Inspect or edit eqcfg settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn run(command: Commands, global: &GlobalOpts, logger: &Logger) -> anyhow::Result<()> {
    match command {
        Commands::Build(cmd) => {
            let settings = global.load_settings()?;
            build::handle_build(cmd, &settings, logger)
        }
        Commands::List(cmd) => list::handle_list(cmd, logger),
        Commands::Config { action } => config::handle_config(action, global, logger),
    }
}

fn main() {
    let cli = Cli::parse();

    let logger = match cli.global.logger() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&logger);

    if let Err(e) = run(cli.command, &cli.global, &logger) {
        logger.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
