use crate::cluster::TextClusterer;
use crate::ctr::{compute_volume_target_per_keyword, VolumeTarget};
use crate::error::{KwError, Result};
use crate::types::KeywordRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// Tunables
// ---------------------------------------------------------------------------

/// Below this many keywords a month is not clustered at all.
pub const MIN_KEYWORDS_FOR_GROUPING: usize = 10;
/// Smallest month bucket the calendar will cut.
pub const MIN_BUCKET_SIZE: usize = 1;
/// Fewest semantic groups requested per month.
pub const MIN_SEMANTIC_GROUPS: usize = 2;
pub const INSUFFICIENT_DATA_LABEL: &str = "Insufficient data for grouping";
pub const DEFAULT_SEED: u64 = 42;

pub fn semantic_group_count(keywords_per_month: u32) -> usize {
    MIN_SEMANTIC_GROUPS.max(keywords_per_month as usize / 2)
}

pub fn group_label(id: usize) -> String {
    format!("Group_{id}")
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

pub(crate) fn by_volume_desc(a: &KeywordRecord, b: &KeywordRecord) -> Ordering {
    match (a.volume, b.volume) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_density_asc(a: &KeywordRecord, b: &KeywordRecord) -> Ordering {
    match (a.competitive_density, b.competitive_density) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Highest volume first, cheaper competition first on ties. Stable.
pub fn rank_keywords(records: &[KeywordRecord]) -> Vec<KeywordRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| by_volume_desc(a, b).then_with(|| by_density_asc(a, b)));
    ranked
}

// ---------------------------------------------------------------------------
// Monthly calendar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    /// 1-based.
    pub month: usize,
    pub keywords: Vec<KeywordRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCalendar {
    pub bucket_size: usize,
    pub months: Vec<MonthBucket>,
    /// Selected keywords past the last full bucket. Never redistributed.
    pub unscheduled: Vec<KeywordRecord>,
}

impl MonthlyCalendar {
    pub fn scheduled_count(&self) -> usize {
        self.months.iter().map(|m| m.keywords.len()).sum()
    }
}

pub fn build_monthly_calendar(
    records: &[KeywordRecord],
    months_count: usize,
    keywords_per_month: usize,
) -> Result<MonthlyCalendar> {
    if months_count == 0 {
        return Err(KwError::InvalidConfig(
            "months must be greater than zero".to_string(),
        ));
    }
    let ranked = rank_keywords(records);
    let total = (months_count * keywords_per_month).min(ranked.len());
    let selected = &ranked[..total];
    let bucket_size = MIN_BUCKET_SIZE.max(total / months_count);

    let months = (0..months_count)
        .map(|i| {
            let start = (i * bucket_size).min(total);
            let end = ((i + 1) * bucket_size).min(total);
            MonthBucket {
                month: i + 1,
                keywords: selected[start..end].to_vec(),
            }
        })
        .collect();
    let scheduled_end = (months_count * bucket_size).min(total);

    Ok(MonthlyCalendar {
        bucket_size,
        months,
        unscheduled: selected[scheduled_end..].to_vec(),
    })
}

// ---------------------------------------------------------------------------
// Semantic groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCluster {
    pub label: String,
    pub month: usize,
    pub keywords: Vec<KeywordRecord>,
}

/// One group label per keyword, in input order.
pub fn build_semantic_groups(
    subset: &[KeywordRecord],
    group_count: usize,
    clusterer: &dyn TextClusterer,
    seed: u64,
) -> Result<Vec<String>> {
    if subset.len() < MIN_KEYWORDS_FOR_GROUPING {
        return Ok(vec![INSUFFICIENT_DATA_LABEL.to_string(); subset.len()]);
    }

    let k = group_count.min(subset.len());
    if k < group_count {
        tracing::warn!(
            requested = group_count,
            keywords = subset.len(),
            "more semantic groups requested than keywords; clamping"
        );
    }

    let texts: Vec<String> = subset.iter().map(|r| r.keyword.clone()).collect();
    let ids = clusterer.cluster(&texts, k, seed)?;
    if ids.len() != texts.len() {
        return Err(KwError::Clustering(format!(
            "clusterer returned {} labels for {} keywords",
            ids.len(),
            texts.len()
        )));
    }
    Ok(ids.into_iter().map(group_label).collect())
}

/// Group labelled keywords into clusters, ordered by first appearance.
pub fn collect_clusters(month: usize, keywords: &[KeywordRecord]) -> Vec<KeywordCluster> {
    let mut clusters: Vec<KeywordCluster> = Vec::new();
    for rec in keywords {
        let label = rec
            .semantic_group
            .clone()
            .unwrap_or_else(|| INSUFFICIENT_DATA_LABEL.to_string());
        match clusters.iter_mut().find(|c| c.label == label) {
            Some(c) => c.keywords.push(rec.clone()),
            None => clusters.push(KeywordCluster {
                label,
                month,
                keywords: vec![rec.clone()],
            }),
        }
    }
    clusters
}

// ---------------------------------------------------------------------------
// Growth plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthSettings {
    pub current_volume: f64,
    pub growth_percent: f64,
    pub months: u32,
    pub keywords_per_month: u32,
}

impl GrowthSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.current_volume.is_finite() && self.current_volume > 0.0) {
            return Err(KwError::InvalidConfig(format!(
                "current_volume must be positive, got {}",
                self.current_volume
            )));
        }
        if !(self.growth_percent.is_finite() && self.growth_percent > 0.0) {
            return Err(KwError::InvalidConfig(format!(
                "growth_percent must be positive, got {}",
                self.growth_percent
            )));
        }
        if self.months == 0 {
            return Err(KwError::InvalidConfig(
                "months must be greater than zero".to_string(),
            ));
        }
        if self.keywords_per_month == 0 {
            return Err(KwError::InvalidConfig(
                "keywords_per_month must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// `current * (1 + growth/100)^i` for each planning month, starting at i = 0.
pub fn growth_projection(current_volume: f64, growth_percent: f64, months: u32) -> Vec<f64> {
    let factor = 1.0 + growth_percent / 100.0;
    (0..months)
        .map(|i| current_volume * factor.powi(i as i32))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedMonth {
    pub month: usize,
    pub keywords: Vec<KeywordRecord>,
    pub clusters: Vec<KeywordCluster>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPlan {
    pub settings: GrowthSettings,
    pub target: VolumeTarget,
    pub bucket_size: usize,
    pub months: Vec<PlannedMonth>,
    pub unscheduled: Vec<KeywordRecord>,
    pub projection: Vec<f64>,
}

impl GrowthPlan {
    pub fn clusters(&self) -> impl Iterator<Item = &KeywordCluster> {
        self.months.iter().flat_map(|m| m.clusters.iter())
    }

    pub fn scheduled_count(&self) -> usize {
        self.months.iter().map(|m| m.keywords.len()).sum()
    }
}

/// Schedule the highest-volume keywords across the horizon and group each
/// month semantically. Records without a volume are not candidates.
pub fn plan_growth(
    records: &[KeywordRecord],
    settings: &GrowthSettings,
    clusterer: &dyn TextClusterer,
    seed: u64,
) -> Result<GrowthPlan> {
    settings.validate()?;
    let target = compute_volume_target_per_keyword(
        settings.current_volume,
        settings.growth_percent,
        settings.keywords_per_month,
    )?;

    let candidates: Vec<KeywordRecord> = records
        .iter()
        .filter(|r| r.volume.is_some())
        .cloned()
        .collect();
    let calendar = build_monthly_calendar(
        &candidates,
        settings.months as usize,
        settings.keywords_per_month as usize,
    )?;
    tracing::info!(
        scheduled = calendar.scheduled_count(),
        unscheduled = calendar.unscheduled.len(),
        bucket_size = calendar.bucket_size,
        "built monthly calendar"
    );

    let group_count = semantic_group_count(settings.keywords_per_month);
    let mut months = Vec::with_capacity(calendar.months.len());
    for bucket in calendar.months {
        let labels = build_semantic_groups(&bucket.keywords, group_count, clusterer, seed)?;
        let keywords: Vec<KeywordRecord> = bucket
            .keywords
            .into_iter()
            .zip(labels)
            .map(|(mut rec, label)| {
                rec.semantic_group = Some(label);
                rec
            })
            .collect();
        let clusters = collect_clusters(bucket.month, &keywords);
        months.push(PlannedMonth {
            month: bucket.month,
            keywords,
            clusters,
        });
    }

    Ok(GrowthPlan {
        settings: *settings,
        target,
        bucket_size: calendar.bucket_size,
        months,
        unscheduled: calendar.unscheduled,
        projection: growth_projection(
            settings.current_volume,
            settings.growth_percent,
            settings.months,
        ),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
