mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, run::RunArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kwplan",
    about = "Keyword research reports: journey stages, content typologies, CTR ranges and growth plans",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding the keyword exports and kwplan.yaml (default: current directory)
    #[arg(long, global = true, env = "KWPLAN_DIR")]
    dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse every CSV export in the directory and write the report
    Run(RunArgs),

    /// Classify a single intent / SERP feature combination
    Classify {
        /// Search intent, e.g. "Transactional"
        #[arg(long)]
        intent: String,
        /// Comma-separated SERP features
        #[arg(long, default_value = "")]
        serp: String,
        /// Label language: en or pt-br
        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Estimate clicks for a search volume by ranking position
    Ctr {
        /// Monthly search volume
        #[arg(long)]
        volume: f64,
        /// Ranking position 1-10 (omit for all positions)
        #[arg(long)]
        position: Option<u8>,
    },

    /// Inspect and validate kwplan.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run(_) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let dir = cli
        .dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let result = match cli.command {
        Commands::Run(args) => cmd::run::run(&dir, args, cli.json),
        Commands::Classify {
            intent,
            serp,
            locale,
        } => cmd::classify::run(&intent, &serp, &locale, cli.json),
        Commands::Ctr { volume, position } => cmd::ctr::run(volume, position, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&dir, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
