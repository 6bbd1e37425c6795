//! `scout`: terminal console for a lead-harvesting job backend.
mod app;
mod config;
mod effects;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use scout_core::RawJobConfig;
use scout_logging::{scout_error, LogDestination};

/// Scout job console
#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(version)]
#[command(about = "Start, watch and stop lead-harvesting jobs", long_about = None)]
struct Cli {
    /// Console configuration file (RON)
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Backend base URL; overrides the config file
    #[arg(long, global = true, env = "SCOUT_BACKEND_URL")]
    backend: Option<String>,

    /// Also write diagnostics to the terminal at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a job and follow it until it ends
    Run(RunArgs),

    /// Abort the job the backend is running
    Stop,

    /// Print the backend's current statistics once
    Stats,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Business category to search for
    #[arg(long, short)]
    keyword: String,

    /// Area to search in
    #[arg(long, short)]
    location: String,

    /// Requested number of results; lowered to the licence ceiling
    #[arg(long, short, default_value_t = RawJobConfig::default().max_results)]
    max_results: u32,

    /// Show the browser window while harvesting
    #[arg(long)]
    headed: bool,

    /// Only keep businesses without a website
    #[arg(long)]
    no_website: bool,
}

impl From<RunArgs> for RawJobConfig {
    fn from(args: RunArgs) -> Self {
        RawJobConfig {
            keyword: args.keyword,
            location: args.location,
            max_results: args.max_results,
            headless: !args.headed,
            exclude_website: args.no_website,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (destination, level) = if cli.verbose {
        (
            LogDestination::Both(PathBuf::from(scout_logging::DEFAULT_LOG_FILE)),
            LevelFilter::Debug,
        )
    } else {
        (LogDestination::default_file(), LevelFilter::Info)
    };
    if !scout_logging::initialize(destination, level) {
        eprintln!("Warning: diagnostic logging is disabled");
    }

    let mut config = config::load_or_default(&cli.config);
    if let Some(url) = cli.backend {
        config.backend_url = url;
    }

    let result = match cli.command {
        Commands::Run(args) => app::run_job(&config, args.into()),
        Commands::Stop => app::send_stop(&config),
        Commands::Stats => app::show_stats(&config),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            scout_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
