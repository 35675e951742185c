//! Writers for a finished run. Each [`Exporter`] owns a set of files under
//! the run's output directory and never changes the [`RunOutput`] it reads.

mod report;
mod sheets;
mod summary;

pub use report::NarrativeExporter;
pub use sheets::SheetExporter;
pub use summary::{summary_xml, SummaryExporter};

use crate::error::{KwError, Result};
use crate::io::ensure_dir;
use crate::pipeline::RunOutput;
use std::path::{Path, PathBuf};

pub trait Exporter {
    fn name(&self) -> &'static str;

    /// Write this exporter's files under `out_dir`, returning their paths.
    fn export(&self, run: &RunOutput, out_dir: &Path) -> Result<Vec<PathBuf>>;
}

pub fn default_exporters() -> Vec<Box<dyn Exporter>> {
    vec![
        Box::new(SheetExporter),
        Box::new(SummaryExporter),
        Box::new(NarrativeExporter::now()),
    ]
}

/// Run every exporter even when an earlier one fails; failures are logged
/// and reported together once all have run.
pub fn export_all(
    run: &RunOutput,
    out_dir: &Path,
    exporters: &[Box<dyn Exporter>],
) -> Result<Vec<PathBuf>> {
    ensure_dir(out_dir)?;
    let mut written = Vec::new();
    let mut failed = Vec::new();
    for exporter in exporters {
        match exporter.export(run, out_dir) {
            Ok(paths) => {
                tracing::info!(exporter = exporter.name(), files = paths.len(), "export complete");
                written.extend(paths);
            }
            Err(e) => {
                tracing::error!(exporter = exporter.name(), error = %e, "export failed");
                failed.push(format!("{}: {e}", exporter.name()));
            }
        }
    }
    if !failed.is_empty() {
        return Err(KwError::ExportFailed(failed.join("; ")));
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Shared cell formatting
// ---------------------------------------------------------------------------

/// Whole numbers print without a fractional part.
pub(crate) fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

pub(crate) fn fmt_opt_number(value: Option<f64>) -> String {
    value.map(fmt_number).unwrap_or_default()
}

/// ARGB fill for a volume cell: red at the table minimum, green at the
/// maximum. A flat column reads as the minimum.
pub fn heat_color(value: f64, min: f64, max: f64) -> String {
    let ratio = if max != min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let green = (255.0 * ratio) as u8;
    let red = (255.0 * (1.0 - ratio)) as u8;
    format!("FF{red:02x}{green:02x}00")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::TfIdfKMeans;
    use crate::config::Config;
    use crate::ingest::KeywordTable;
    use crate::pipeline::{run_pipeline, RunOptions};
    use crate::types::KeywordRecord;
    use tempfile::TempDir;

    struct Broken;

    impl Exporter for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn export(&self, _run: &RunOutput, _out_dir: &Path) -> Result<Vec<PathBuf>> {
            Err(KwError::Xml("boom".to_string()))
        }
    }

    fn run() -> RunOutput {
        let table = KeywordTable {
            records: vec![KeywordRecord::new("seo").with_volume(10.0)],
            has_volume: true,
            ..KeywordTable::default()
        };
        let opts = RunOptions::from_config(Path::new("."), &Config::default()).unwrap();
        run_pipeline(&table, &opts, &TfIdfKMeans::default()).unwrap()
    }

    #[test]
    fn heat_color_endpoints() {
        assert_eq!(heat_color(0.0, 0.0, 100.0), "FFff0000");
        assert_eq!(heat_color(100.0, 0.0, 100.0), "FF00ff00");
        assert_eq!(heat_color(50.0, 0.0, 100.0), "FF7f7f00");
        assert_eq!(heat_color(7.0, 7.0, 7.0), "FFff0000");
    }

    #[test]
    fn numbers_drop_trailing_zero_fraction() {
        assert_eq!(fmt_number(1000.0), "1000");
        assert_eq!(fmt_number(0.35), "0.35");
        assert_eq!(fmt_opt_number(None), "");
    }

    #[test]
    fn failing_exporter_does_not_stop_the_others() {
        let dir = TempDir::new().unwrap();
        let exporters: Vec<Box<dyn Exporter>> = vec![Box::new(Broken), Box::new(SummaryExporter)];
        let err = export_all(&run(), dir.path(), &exporters).unwrap_err();
        assert!(matches!(err, KwError::ExportFailed(ref m) if m.starts_with("broken")));
        assert!(dir.path().join("summary.json").exists());
    }

    #[test]
    fn default_exporters_write_everything() {
        let dir = TempDir::new().unwrap();
        let written = export_all(&run(), dir.path(), &default_exporters()).unwrap();
        assert!(written.iter().any(|p| p.ends_with("keyword-overview.csv")));
        assert!(written.iter().any(|p| p.ends_with("summary.xml")));
        assert!(written.iter().any(|p| p.ends_with("report.md")));
    }
}
