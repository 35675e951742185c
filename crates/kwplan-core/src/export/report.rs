use super::{fmt_number, Exporter};
use crate::error::Result;
use crate::io::atomic_write;
use crate::paths;
use crate::pipeline::RunOutput;
use crate::planner::{INSUFFICIENT_DATA_LABEL, MIN_KEYWORDS_FOR_GROUPING};
use crate::summary::{BucketCount, GrowthSummary, SummaryRecord};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// `report.md`: the run narrated for a reader who will not open the sheets.
pub struct NarrativeExporter {
    generated_at: DateTime<Local>,
}

impl NarrativeExporter {
    pub fn new(generated_at: DateTime<Local>) -> Self {
        Self { generated_at }
    }

    pub fn now() -> Self {
        Self::new(Local::now())
    }

    pub fn render(&self, summary: &SummaryRecord) -> String {
        let mut md = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_report(&mut md, summary);
        md
    }

    fn write_report(&self, md: &mut String, s: &SummaryRecord) -> std::fmt::Result {
        writeln!(md, "# Keyword Research Report")?;
        writeln!(md)?;
        writeln!(
            md,
            "Generated {}. Labels: {}.",
            self.generated_at.format("%Y-%m-%d %H:%M"),
            s.locale
        )?;
        writeln!(md)?;

        writeln!(md, "## Strategic objective")?;
        writeln!(md)?;
        match s.aligned_with_objective {
            Some(n) => writeln!(
                md,
                "**{}**: {n} of {} kept keywords serve this objective.",
                s.objective, s.filters.kept_keywords
            )?,
            None => writeln!(md, "**{}** (custom objective).", s.objective)?,
        }
        writeln!(md)?;

        writeln!(md, "## Filters")?;
        writeln!(md)?;
        writeln!(md, "- Input keywords: {}", s.filters.input_keywords)?;
        match s.filters.geo_mode {
            Some(mode) => writeln!(
                md,
                "- Geographic exclusions ({mode}): {}",
                s.filters.geo_excluded
            )?,
            None => writeln!(md, "- Geographic filter disabled")?,
        }
        writeln!(md, "- Negative keyword exclusions: {}", s.filters.negative_excluded)?;
        writeln!(md, "- Kept keywords: {}", s.filters.kept_keywords)?;
        writeln!(md)?;

        bucket_section(md, "Journey stages", &s.journey_stages)?;
        bucket_section(md, "Suggested typologies", &s.typologies)?;
        bucket_section(md, "Search intent", &s.intents)?;
        bucket_section(md, "Tail length", &s.tail_lengths)?;
        bucket_section(md, "SERP features", &s.serp_features)?;

        writeln!(md, "## Click-through potential")?;
        writeln!(md)?;
        writeln!(
            md,
            "{} keywords with search volume have click ranges per ranking position in `{}`.",
            s.ctr_keywords,
            paths::CTR_SHEET
        )?;
        writeln!(md)?;

        if let Some(g) = &s.growth {
            growth_section(md, g)?;
        }
        Ok(())
    }
}

fn bucket_section(md: &mut String, title: &str, buckets: &[BucketCount]) -> std::fmt::Result {
    writeln!(md, "## {title}")?;
    writeln!(md)?;
    if buckets.iter().all(|b| b.count == 0) {
        writeln!(md, "No keywords.")?;
        writeln!(md)?;
        return Ok(());
    }
    writeln!(md, "| {title} | Keywords | Example |")?;
    writeln!(md, "|---|---:|---|")?;
    for b in buckets {
        writeln!(
            md,
            "| {} | {} | {} |",
            escape_cell(&b.label),
            b.count,
            b.example.as_deref().map(escape_cell).unwrap_or_default()
        )?;
    }
    writeln!(md)
}

fn growth_section(md: &mut String, g: &GrowthSummary) -> std::fmt::Result {
    writeln!(md, "## Growth plan")?;
    writeln!(md)?;
    writeln!(
        md,
        "Growing {} monthly visits by {}% over {} months with {} new keywords a month.",
        fmt_number(g.current_volume),
        fmt_number(g.growth_percent),
        g.months,
        g.keywords_per_month
    )?;
    writeln!(
        md,
        "Each keyword should bring between {:.0} and {:.0} searches a month.",
        g.max_volume_per_keyword, g.min_volume_per_keyword
    )?;
    writeln!(
        md,
        "{} keywords scheduled, {} left unscheduled.",
        g.scheduled_keywords, g.unscheduled_keywords
    )?;
    writeln!(md)?;

    writeln!(md, "| Month | Projected traffic |")?;
    writeln!(md, "|---:|---:|")?;
    for (i, v) in g.projection.iter().enumerate() {
        writeln!(md, "| {} | {:.0} |", i + 1, v)?;
    }
    writeln!(md)?;

    if !g.clusters.is_empty() {
        writeln!(md, "| Month | Group | Keywords | Example |")?;
        writeln!(md, "|---:|---|---:|---|")?;
        for c in &g.clusters {
            writeln!(
                md,
                "| {} | {} | {} | {} |",
                c.month,
                escape_cell(&c.label),
                c.keywords,
                escape_cell(&c.example)
            )?;
        }
        writeln!(md)?;

        if g.clusters.iter().all(|c| c.label == INSUFFICIENT_DATA_LABEL) {
            writeln!(
                md,
                "No month reached {MIN_KEYWORDS_FOR_GROUPING} keywords, so no semantic groups were \
                 formed. Grouping runs per month and needs at least \
                 {MIN_KEYWORDS_FOR_GROUPING} keywords per month."
            )?;
            writeln!(md)?;
        }
    }
    Ok(())
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

impl Exporter for NarrativeExporter {
    fn name(&self) -> &'static str {
        "report"
    }

    fn export(&self, run: &RunOutput, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let path = out_dir.join(paths::REPORT_MD);
        atomic_write(&path, self.render(&run.summary).as_bytes())?;
        Ok(vec![path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::TfIdfKMeans;
    use crate::config::{Config, GrowthConfig};
    use crate::ingest::KeywordTable;
    use crate::pipeline::{run_pipeline, RunOptions};
    use crate::types::{KeywordRecord, Locale};
    use chrono::TimeZone;

    fn exporter() -> NarrativeExporter {
        NarrativeExporter::new(Local.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap())
    }

    fn run(config: &Config) -> RunOutput {
        let table = KeywordTable {
            records: vec![
                KeywordRecord::new("comprar tênis")
                    .with_intent("Transactional")
                    .with_serp("Shopping ads")
                    .with_volume(900.0),
                KeywordRecord::new("o que é seo")
                    .with_intent("Informational")
                    .with_serp("Featured snippets")
                    .with_volume(100.0),
            ],
            has_volume: true,
            has_serp_features: true,
            ..KeywordTable::default()
        };
        let opts = RunOptions::from_config(Path::new("."), config).unwrap();
        run_pipeline(&table, &opts, &TfIdfKMeans::default()).unwrap()
    }

    #[test]
    fn report_covers_every_section() {
        let md = exporter().render(&run(&Config::default()).summary);
        assert!(md.starts_with("# Keyword Research Report"));
        assert!(md.contains("Generated 2026-05-01 09:30."));
        assert!(md.contains("**More Traffic**: 1 of 2 kept keywords serve this objective."));
        assert!(md.contains("- Geographic exclusions (strict): 0"));
        assert!(md.contains("| Decision | 1 | comprar tênis |"));
        assert!(md.contains("| Blog Article | 1 | o que é seo |"));
        assert!(!md.contains("## Growth plan"));
    }

    #[test]
    fn report_includes_growth_when_planned() {
        let cfg = Config {
            growth: Some(GrowthConfig {
                current_volume: Some(1000.0),
                growth_percent: Some(10.0),
                months: Some(4),
                keywords_per_month: Some(1),
            }),
            ..Config::default()
        };
        let md = exporter().render(&run(&cfg).summary);
        assert!(md.contains("## Growth plan"));
        assert!(md.contains("| 4 | 1331 |"));
        assert!(md.contains("2 keywords scheduled, 0 left unscheduled."));
        assert!(md.contains("No month reached 10 keywords, so no semantic groups were formed."));
    }

    #[test]
    fn grouping_note_is_omitted_when_a_month_was_clustered() {
        let growth = GrowthSummary {
            current_volume: 1000.0,
            growth_percent: 10.0,
            months: 2,
            keywords_per_month: 10,
            min_volume_per_keyword: 500.0,
            max_volume_per_keyword: 28.6,
            scheduled_keywords: 12,
            unscheduled_keywords: 0,
            projection: vec![1000.0, 1100.0],
            cluster_labels: vec!["Group_0".to_string(), INSUFFICIENT_DATA_LABEL.to_string()],
            clusters: vec![
                crate::summary::ClusterSummary {
                    month: 1,
                    label: "Group_0".to_string(),
                    keywords: 10,
                    example: "tênis de corrida".to_string(),
                },
                crate::summary::ClusterSummary {
                    month: 2,
                    label: INSUFFICIENT_DATA_LABEL.to_string(),
                    keywords: 2,
                    example: "tênis nike".to_string(),
                },
            ],
        };
        let mut md = String::new();
        growth_section(&mut md, &growth).unwrap();
        assert!(md.contains("| 1 | Group_0 | 10 | tênis de corrida |"));
        assert!(!md.contains("No month reached"));
    }

    #[test]
    fn portuguese_labels() {
        let cfg = Config {
            locale: Locale::PtBr,
            ..Config::default()
        };
        let md = exporter().render(&run(&cfg).summary);
        assert!(md.contains("| Decisão | 1 | comprar tênis |"));
    }

    #[test]
    fn pipes_in_labels_are_escaped() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
    }
}
