//! One analysis run, from a merged keyword table to everything the exporters
//! need. No I/O happens here once [`RunOptions`] is built.

use crate::cluster::TextClusterer;
use crate::config::Config;
use crate::ctr::{build_ctr_table, CtrRow};
use crate::error::{KwError, Result};
use crate::filters::{
    load_term_list, parse_term_list, GeoFilter, NegativeFilter, Partition, DEFAULT_GAZETTEER,
    DEFAULT_STOP_LIST,
};
use crate::ingest::KeywordTable;
use crate::planner::{plan_growth, GrowthPlan, GrowthSettings};
use crate::summary::{build_summary, SummaryInput, SummaryRecord};
use crate::taxonomy::TypologyClassifier;
use crate::types::{KeywordRecord, Locale, ObjectiveSelection};
use std::path::Path;

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

pub struct RunOptions {
    pub locale: Locale,
    pub objective: ObjectiveSelection,
    /// `None` when the geographic filter is disabled.
    pub geo: Option<GeoFilter>,
    pub negative: Option<NegativeFilter>,
    pub growth: Option<GrowthSettings>,
    pub seed: u64,
    pub classifier: TypologyClassifier,
}

impl RunOptions {
    /// Resolve filters and growth settings from a loaded config. Term list
    /// paths are relative to `dir`.
    pub fn from_config(dir: &Path, config: &Config) -> Result<Self> {
        let geo = if config.geo_filter.enabled {
            let terms = match &config.geo_filter.gazetteer {
                Some(p) => load_term_list(&Config::resolve(dir, p), "gazetteer")?,
                None => parse_term_list(DEFAULT_GAZETTEER),
            };
            Some(GeoFilter::new(&terms, config.geo_filter.mode)?)
        } else {
            None
        };

        let negative = if config.negative_filter.enabled {
            let terms = match &config.negative_filter.stop_list {
                Some(p) => load_term_list(&Config::resolve(dir, p), "stop list")?,
                None => parse_term_list(DEFAULT_STOP_LIST),
            };
            Some(NegativeFilter::new(terms))
        } else {
            None
        };

        let growth = match &config.growth {
            Some(g) => match g.settings() {
                Some(settings) => {
                    settings.validate()?;
                    Some(settings)
                }
                None => {
                    if !g.is_empty() {
                        tracing::warn!(
                            missing = %g.missing_fields().join(", "),
                            "growth settings incomplete; skipping growth plan"
                        );
                    }
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            locale: config.locale,
            objective: config.objective_selection(),
            geo,
            negative,
            growth,
            seed: config.clustering.seed,
            classifier: TypologyClassifier::default(),
        })
    }
}

// ---------------------------------------------------------------------------
// RunOutput
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub locale: Locale,
    pub objective: ObjectiveSelection,
    /// The full merged table, before any filter.
    pub overview: Vec<KeywordRecord>,
    pub extra_columns: Vec<String>,
    pub has_volume: bool,
    pub has_serp_features: bool,
    pub geo: Partition,
    pub negative: Partition,
    /// Records that survived both filters, classified.
    pub classified: Vec<KeywordRecord>,
    pub ctr_rows: Vec<CtrRow>,
    pub growth: Option<GrowthPlan>,
    pub summary: SummaryRecord,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

pub fn run_pipeline(
    table: &KeywordTable,
    options: &RunOptions,
    clusterer: &dyn TextClusterer,
) -> Result<RunOutput> {
    if options.growth.is_some() && !table.has_volume {
        return Err(KwError::MissingVolumeColumn);
    }
    if !table.has_serp_features {
        tracing::warn!("no 'SERP Features' column; typologies fall back to manual review");
    }

    let geo = match &options.geo {
        Some(filter) => filter.partition(&table.records),
        None => Partition::keep_all(&table.records),
    };
    tracing::info!(
        kept = geo.kept.len(),
        excluded = geo.excluded.len(),
        "geographic filter"
    );

    let negative = match &options.negative {
        Some(filter) => filter.partition(&geo.kept),
        None => Partition::keep_all(&geo.kept),
    };
    tracing::info!(
        kept = negative.kept.len(),
        excluded = negative.excluded.len(),
        "negative keyword filter"
    );
    if negative.kept.is_empty() {
        tracing::warn!("no keywords left after filtering; the report will be empty");
    }

    let classified = options.classifier.classify_records(&negative.kept);
    let ctr_rows = build_ctr_table(&classified);

    let growth = match &options.growth {
        Some(settings) => Some(plan_growth(&classified, settings, clusterer, options.seed)?),
        None => None,
    };

    let summary = build_summary(&SummaryInput {
        locale: options.locale,
        objective: &options.objective,
        input_keywords: table.records.len(),
        geo_mode: options.geo.as_ref().map(GeoFilter::mode),
        geo: &geo,
        negative: &negative,
        classified: &classified,
        ctr_keywords: ctr_rows.len(),
        growth: growth.as_ref(),
    });

    Ok(RunOutput {
        locale: options.locale,
        objective: options.objective.clone(),
        overview: table.records.clone(),
        extra_columns: table.extra_columns.clone(),
        has_volume: table.has_volume,
        has_serp_features: table.has_serp_features,
        geo,
        negative,
        classified,
        ctr_rows,
        growth,
        summary,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
