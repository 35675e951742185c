use super::{fmt_number, fmt_opt_number, heat_color, Exporter};
use crate::ctr::CTR_BANDS;
use crate::error::Result;
use crate::filters::Exclusion;
use crate::io::write_csv;
use crate::paths;
use crate::pipeline::RunOutput;
use crate::segments::{segment_by_intent, segment_by_journey, segment_by_serp_feature};
use crate::types::{KeywordRecord, Locale};
use std::path::{Path, PathBuf};

/// Columns left out of the journey sheets.
const JOURNEY_DROPPED: [&str; 3] = ["CPC (USD)", "Competitive Density", "Number of Results"];

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Input columns first, in a fixed order, then passthrough columns.
struct Layout<'a> {
    extra: Vec<&'a str>,
    density: bool,
    journey: Option<Locale>,
    heat: Option<(f64, f64)>,
}

impl<'a> Layout<'a> {
    fn input(run: &'a RunOutput) -> Self {
        Self {
            extra: run.extra_columns.iter().map(String::as_str).collect(),
            density: true,
            journey: None,
            heat: None,
        }
    }

    fn journey(run: &'a RunOutput) -> Self {
        Self {
            extra: run
                .extra_columns
                .iter()
                .map(String::as_str)
                .filter(|c| !JOURNEY_DROPPED.contains(c))
                .collect(),
            density: false,
            journey: Some(run.locale),
            heat: None,
        }
    }

    fn with_heat(mut self, records: &[KeywordRecord]) -> Self {
        let mut volumes = records.iter().filter_map(|r| r.volume);
        if let Some(first) = volumes.next() {
            let (min, max) = volumes.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
            self.heat = Some((min, max));
        }
        self
    }

    fn headers(&self) -> Vec<String> {
        let mut h: Vec<String> = vec!["Keyword".into(), "Intent".into(), "Volume".into()];
        h.push("Trend".into());
        if self.density {
            h.push("Competitive Density".into());
        }
        h.push("SERP Features".into());
        h.extend(self.extra.iter().map(|c| c.to_string()));
        if self.journey.is_some() {
            h.push("Journey Stage".into());
            h.push("Suggested Typology".into());
        }
        if self.heat.is_some() {
            h.push("Volume Heat".into());
        }
        h
    }

    fn row(&self, rec: &KeywordRecord) -> Vec<String> {
        let mut row = vec![
            rec.keyword.clone(),
            rec.intent.clone().unwrap_or_default(),
            fmt_opt_number(rec.volume),
            rec.trend.clone().unwrap_or_default(),
        ];
        if self.density {
            row.push(fmt_opt_number(rec.competitive_density));
        }
        row.push(rec.serp_features.clone().unwrap_or_default());
        for col in &self.extra {
            row.push(rec.extra.get(*col).cloned().unwrap_or_default());
        }
        if let Some(locale) = self.journey {
            row.push(
                rec.journey_stage
                    .map(|s| s.label(locale).to_string())
                    .unwrap_or_default(),
            );
            row.push(
                rec.typology
                    .map(|t| t.label(locale).to_string())
                    .unwrap_or_default(),
            );
        }
        if let Some((min, max)) = self.heat {
            row.push(
                rec.volume
                    .map(|v| heat_color(v, min, max))
                    .unwrap_or_default(),
            );
        }
        row
    }

    fn write(&self, path: &Path, records: &[KeywordRecord]) -> Result<PathBuf> {
        write_csv(path, &self.headers(), records.iter().map(|r| self.row(r)))?;
        Ok(path.to_path_buf())
    }
}

fn write_exclusions(path: &Path, reason_header: &str, excluded: &[Exclusion]) -> Result<PathBuf> {
    let headers: Vec<String> = ["Keyword", "Volume", "Intent", reason_header]
        .iter()
        .map(|s| s.to_string())
        .collect();
    write_csv(
        path,
        &headers,
        excluded.iter().map(|e| {
            vec![
                e.record.keyword.clone(),
                fmt_opt_number(e.record.volume),
                e.record.intent.clone().unwrap_or_default(),
                e.reason.clone(),
            ]
        }),
    )?;
    Ok(path.to_path_buf())
}

// ---------------------------------------------------------------------------
// SheetExporter
// ---------------------------------------------------------------------------

/// Analyst-facing CSV sheets.
pub struct SheetExporter;

impl SheetExporter {
    fn overview(run: &RunOutput, out: &Path) -> Result<PathBuf> {
        Layout::input(run)
            .with_heat(&run.overview)
            .write(&out.join(paths::OVERVIEW_SHEET), &run.overview)
    }

    fn intents(run: &RunOutput, out: &Path) -> Result<Vec<PathBuf>> {
        let layout = Layout::input(run);
        segment_by_intent(&run.classified)
            .iter()
            .map(|seg| layout.write(&paths::intent_sheet(out, &seg.label), &seg.records))
            .collect()
    }

    fn serp_features(run: &RunOutput, out: &Path) -> Result<Vec<PathBuf>> {
        if !run.has_serp_features {
            tracing::warn!("skipping SERP feature sheets: no 'SERP Features' column");
            return Ok(Vec::new());
        }
        let layout = Layout::input(run);
        segment_by_serp_feature(&run.classified)
            .iter()
            .map(|seg| layout.write(&paths::serp_feature_sheet(out, &seg.label), &seg.records))
            .collect()
    }

    fn journey(run: &RunOutput, out: &Path) -> Result<Vec<PathBuf>> {
        let mut written = vec![Layout::journey(run).write(
            &out.join(paths::JOURNEY_OVERVIEW_SHEET),
            &run.classified,
        )?];
        for seg in segment_by_journey(&run.classified, run.locale) {
            let path = paths::journey_sheet(out, &seg.label);
            written.push(
                Layout::journey(run)
                    .with_heat(&seg.records)
                    .write(&path, &seg.records)?,
            );
        }
        Ok(written)
    }

    fn ctr(run: &RunOutput, out: &Path) -> Result<PathBuf> {
        let mut headers: Vec<String> = ["Keyword", "Volume", "Intent", "Trend"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        headers.extend(CTR_BANDS.iter().map(|b| b.header()));
        let path = out.join(paths::CTR_SHEET);
        write_csv(
            &path,
            &headers,
            run.ctr_rows.iter().map(|row| {
                let mut cells = vec![
                    row.keyword.clone(),
                    fmt_number(row.volume),
                    row.intent.clone().unwrap_or_default(),
                    row.trend.clone().unwrap_or_default(),
                ];
                cells.extend(row.clicks.iter().map(|c| c.to_string()));
                cells
            }),
        )?;
        Ok(path)
    }

    fn filters(run: &RunOutput, out: &Path) -> Result<Vec<PathBuf>> {
        Ok(vec![
            write_exclusions(&out.join(paths::GEO_EXCLUDED_SHEET), "Reason", &run.geo.excluded)?,
            Layout::input(run).write(&out.join(paths::NEGATIVE_KEPT_SHEET), &run.negative.kept)?,
            write_exclusions(
                &out.join(paths::NEGATIVE_EXCLUDED_SHEET),
                "Matched Term",
                &run.negative.excluded,
            )?,
        ])
    }

    fn growth(run: &RunOutput, out: &Path) -> Result<Option<PathBuf>> {
        let Some(plan) = &run.growth else {
            return Ok(None);
        };
        let headers: Vec<String> = [
            "Month",
            "Group",
            "Keyword",
            "Volume",
            "Journey Stage",
            "Suggested Typology",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let locale = run.locale;
        let rows = plan.months.iter().flat_map(|m| {
            m.keywords.iter().map(move |rec| {
                vec![
                    m.month.to_string(),
                    rec.semantic_group.clone().unwrap_or_default(),
                    rec.keyword.clone(),
                    fmt_opt_number(rec.volume),
                    rec.journey_stage
                        .map(|s| s.label(locale).to_string())
                        .unwrap_or_default(),
                    rec.typology
                        .map(|t| t.label(locale).to_string())
                        .unwrap_or_default(),
                ]
            })
        });
        let path = out.join(paths::GROWTH_PLAN_SHEET);
        write_csv(&path, &headers, rows)?;
        Ok(Some(path))
    }
}

impl Exporter for SheetExporter {
    fn name(&self) -> &'static str {
        "sheets"
    }

    fn export(&self, run: &RunOutput, out_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = vec![Self::overview(run, out_dir)?];
        written.extend(Self::intents(run, out_dir)?);
        written.extend(Self::serp_features(run, out_dir)?);
        written.extend(Self::journey(run, out_dir)?);
        written.push(Self::ctr(run, out_dir)?);
        written.extend(Self::filters(run, out_dir)?);
        written.extend(Self::growth(run, out_dir)?);
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
