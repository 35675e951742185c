use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use kwplan_core::config::{Config, WarnLevel};
use kwplan_core::paths;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate kwplan.yaml for common mistakes
    Validate,

    /// Show the effective configuration (file values over defaults)
    Show,

    /// Write a kwplan.yaml with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(dir: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(dir, json),
        ConfigSubcommand::Show => show(dir, json),
        ConfigSubcommand::Init { force } => init(dir, force),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(dir: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(dir).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let has_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if has_errors {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(dir: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(dir).context("failed to load config")?;
    if json {
        print_json(&config)?;
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(dir: &Path, force: bool) -> anyhow::Result<()> {
    let path = paths::config_path(dir);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    Config::default()
        .save(dir)
        .context("failed to save config")?;
    println!("Wrote {}", path.display());
    Ok(())
}
