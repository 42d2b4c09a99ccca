//! Headless CLI
//!
//! Publishes headless CMS content as JSON and sitemap artifacts.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use headless::Environment;

/// Command-line interface for Headless.
#[derive(Parser)]
#[command(
    name = "headless",
    version,
    about = "Publish headless CMS content to remote storage"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "headless.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Publish content groups and the sitemap for an environment
    Publish {
        /// Target environment (staging or production)
        environment: Environment,
    },
    /// Validate configuration and content references
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Show name, version and homepage
    About,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    headless::init_tracing(cli.verbose);

    match cli.command {
        Commands::Publish { environment } => {
            headless::cmd::publish::run(&cli.config, environment)?;
        }
        Commands::Check { strict } => {
            headless::cmd::check::run(&cli.config, strict)?;
        }
        Commands::About => {
            headless::cmd::about::run()?;
        }
    }

    Ok(())
}
