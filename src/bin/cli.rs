//! toolwatch CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use toolwatch::{
    error::Result,
    models::{Config, ReportFormat},
    pipeline::{self, RunOptions},
    utils,
};

/// toolwatch - daily AI repository digest
#[derive(Parser, Debug)]
#[command(
    name = "toolwatch",
    version,
    about = "Collect trending AI repositories from GitHub and write an analyzed report"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/toolwatch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress console progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect new repositories, analyze them and write a report
    Run {
        /// DeepSeek API key (overrides the cache and environment)
        #[arg(long)]
        api_key: Option<String>,

        /// Analyze only the first few repositories
        #[arg(long)]
        test: bool,

        /// Skip AI analysis entirely
        #[arg(long)]
        no_analysis: bool,

        /// Report format: markdown or text
        #[arg(long)]
        format: Option<ReportFormat>,
    },

    /// Inspect or edit the seen-set
    Seen {
        #[command(subcommand)]
        action: SeenAction,
    },

    /// Resolve and validate the DeepSeek API key
    CheckKey {
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(Subcommand, Debug)]
enum SeenAction {
    /// List every seen URL
    Show,
    /// Forget every seen URL
    Clear,
    /// Forget one URL
    Remove { url: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let loaded = Config::load(&cli.config);
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    init_logging(cli.verbose, &config.logging.level);
    utils::log::set_quiet(cli.quiet);

    match &loaded {
        Ok(_) => log::info!("Loaded configuration from {}", cli.config.display()),
        Err(e) => log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        ),
    }

    match cli.command {
        Command::Run {
            api_key,
            test,
            no_analysis,
            format,
        } => {
            config.validate()?;
            let options = RunOptions {
                api_key,
                test_mode: test,
                analyze: !no_analysis,
                format,
            };
            let summary = pipeline::run_pipeline(&config, &options)?;
            if summary.report.is_none() {
                log::info!("No report written");
            }
        }

        Command::Seen { action } => match action {
            SeenAction::Show => pipeline::run_seen_show(&config)?,
            SeenAction::Clear => {
                pipeline::run_seen_clear(&config)?;
            }
            SeenAction::Remove { url } => {
                pipeline::run_seen_remove(&config, &url)?;
            }
        },

        Command::CheckKey { api_key } => {
            pipeline::run_check_key(&config, api_key.as_deref())?;
        }

        Command::Validate => {
            pipeline::run_validate(&cli.config)?;
        }
    }

    log::info!("Done!");
    Ok(())
}
