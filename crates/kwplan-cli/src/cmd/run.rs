use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Args;
use kwplan_core::cluster::TfIdfKMeans;
use kwplan_core::config::{Config, GrowthConfig, WarnLevel};
use kwplan_core::export::{default_exporters, export_all};
use kwplan_core::filters::GeoMode;
use kwplan_core::ingest;
use kwplan_core::paths;
use kwplan_core::pipeline::{run_pipeline, RunOptions, RunOutput};
use kwplan_core::summary::BucketCount;
use kwplan_core::types::Locale;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RunArgs {
    /// Output directory (default: analysis-YYYYMMDD-HHMMSS inside the input directory)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Strategic objective: 1-6, a label, or free text
    #[arg(long)]
    objective: Option<String>,

    /// Current monthly organic traffic
    #[arg(long)]
    current_volume: Option<f64>,

    /// Target traffic growth in percent
    #[arg(long)]
    growth_percent: Option<f64>,

    /// Planning horizon in months
    #[arg(long)]
    months: Option<u32>,

    /// New keywords to target each month
    #[arg(long)]
    keywords_per_month: Option<u32>,

    /// Geographic filter mode: strict or loose
    #[arg(long)]
    geo_mode: Option<String>,

    /// Label language: en or pt-br
    #[arg(long)]
    locale: Option<String>,

    /// Seed for semantic grouping
    #[arg(long)]
    seed: Option<u64>,
}

impl RunArgs {
    /// Flags win over kwplan.yaml.
    fn apply(self, config: &mut Config) -> anyhow::Result<Option<PathBuf>> {
        if let Some(objective) = self.objective {
            config.objective = objective;
        }
        if let Some(locale) = self.locale {
            config.locale = locale.parse::<Locale>()?;
        }
        if let Some(mode) = self.geo_mode {
            config.geo_filter.mode = mode.parse::<GeoMode>()?;
        }
        if let Some(seed) = self.seed {
            config.clustering.seed = seed;
        }
        let flags = GrowthConfig {
            current_volume: self.current_volume,
            growth_percent: self.growth_percent,
            months: self.months,
            keywords_per_month: self.keywords_per_month,
        };
        if !flags.is_empty() {
            config.growth = Some(config.growth.unwrap_or_default().overlay(flags));
        }
        Ok(self.output)
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(dir: &Path, args: RunArgs, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(dir).context("failed to load kwplan.yaml")?;
    let output = args.apply(&mut config)?;

    let errors: Vec<String> = config
        .validate()
        .into_iter()
        .filter(|w| w.level == WarnLevel::Error)
        .map(|w| w.message)
        .collect();
    if !errors.is_empty() {
        anyhow::bail!("invalid configuration: {}", errors.join("; "));
    }

    let table = ingest::load_dir(dir)
        .with_context(|| format!("failed to read keyword exports in {}", dir.display()))?;
    tracing::info!(
        files = table.sources.len(),
        keywords = table.records.len(),
        "merged keyword exports"
    );

    let options = RunOptions::from_config(dir, &config)?;
    let clusterer = TfIdfKMeans {
        max_iterations: config.clustering.max_iterations,
        ..TfIdfKMeans::default()
    };
    let run = run_pipeline(&table, &options, &clusterer)?;

    let out_dir = output.unwrap_or_else(|| paths::default_output_dir(dir, chrono::Local::now()));
    let exported = export_all(&run, &out_dir, &default_exporters());

    if json {
        print_json(&run.summary)?;
    } else {
        print_report(&run, table.sources.len(), &out_dir);
    }

    let written = exported.context("some report files could not be written")?;
    tracing::info!(files = written.len(), dir = %out_dir.display(), "report written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

fn bucket_rows(buckets: &[BucketCount]) -> Vec<Vec<String>> {
    buckets
        .iter()
        .map(|b| {
            vec![
                b.label.clone(),
                b.count.to_string(),
                b.example.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

fn print_report(run: &RunOutput, files: usize, out_dir: &Path) {
    let s = &run.summary;
    println!(
        "Read {} keywords from {files} file(s). Kept {} ({} geographic, {} negative excluded).",
        s.filters.input_keywords,
        s.filters.kept_keywords,
        s.filters.geo_excluded,
        s.filters.negative_excluded
    );
    println!("Objective: {}", s.objective);
    println!();
    print_table(&["Journey stage", "Keywords", "Example"], bucket_rows(&s.journey_stages));
    println!();
    print_table(&["Typology", "Keywords", "Example"], bucket_rows(&s.typologies));

    if let Some(g) = &s.growth {
        println!();
        println!(
            "Growth plan: {} keywords over {} months ({} unscheduled), {} group(s).",
            g.scheduled_keywords,
            g.months,
            g.unscheduled_keywords,
            g.cluster_labels.len()
        );
    }
    println!();
    println!("Report: {}", out_dir.display());
}
