use crate::filters::{GeoMode, Partition};
use crate::planner::GrowthPlan;
use crate::segments::{
    segment_by_intent, segment_by_journey, segment_by_serp_feature, segment_by_tail,
    segment_by_typology, Segment,
};
use crate::types::{KeywordRecord, Locale, ObjectiveSelection};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub label: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl BucketCount {
    fn from_segment(seg: &Segment) -> Self {
        Self {
            label: seg.label.clone(),
            count: seg.len(),
            example: seg.first_keyword().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSummary {
    pub input_keywords: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_mode: Option<GeoMode>,
    pub geo_excluded: usize,
    pub negative_excluded: usize,
    pub kept_keywords: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub month: usize,
    pub label: String,
    pub keywords: usize,
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSummary {
    pub current_volume: f64,
    pub growth_percent: f64,
    pub months: u32,
    pub keywords_per_month: u32,
    pub min_volume_per_keyword: f64,
    pub max_volume_per_keyword: f64,
    pub scheduled_keywords: usize,
    pub unscheduled_keywords: usize,
    pub projection: Vec<f64>,
    pub cluster_labels: Vec<String>,
    pub clusters: Vec<ClusterSummary>,
}

impl GrowthSummary {
    fn from_plan(plan: &GrowthPlan) -> Self {
        let mut cluster_labels: Vec<String> = Vec::new();
        for c in plan.clusters() {
            if !cluster_labels.contains(&c.label) {
                cluster_labels.push(c.label.clone());
            }
        }
        let clusters = plan
            .clusters()
            .map(|c| ClusterSummary {
                month: c.month,
                label: c.label.clone(),
                keywords: c.keywords.len(),
                example: c
                    .keywords
                    .first()
                    .map(|k| k.keyword.clone())
                    .unwrap_or_default(),
            })
            .collect();
        Self {
            current_volume: plan.settings.current_volume,
            growth_percent: plan.settings.growth_percent,
            months: plan.settings.months,
            keywords_per_month: plan.settings.keywords_per_month,
            min_volume_per_keyword: plan.target.min_per_keyword,
            max_volume_per_keyword: plan.target.max_per_keyword,
            scheduled_keywords: plan.scheduled_count(),
            unscheduled_keywords: plan.unscheduled.len(),
            projection: plan.projection.clone(),
            cluster_labels,
            clusters,
        }
    }
}

/// Everything a run produced, reduced to counts and examples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub locale: Locale,
    pub objective: String,
    /// Kept keywords whose intent serves the selected objective. Absent for
    /// free-text objectives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aligned_with_objective: Option<usize>,
    pub filters: FilterSummary,
    pub journey_stages: Vec<BucketCount>,
    pub typologies: Vec<BucketCount>,
    pub intents: Vec<BucketCount>,
    pub tail_lengths: Vec<BucketCount>,
    pub serp_features: Vec<BucketCount>,
    pub ctr_keywords: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth: Option<GrowthSummary>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

pub struct SummaryInput<'a> {
    pub locale: Locale,
    pub objective: &'a ObjectiveSelection,
    pub input_keywords: usize,
    pub geo_mode: Option<GeoMode>,
    pub geo: &'a Partition,
    pub negative: &'a Partition,
    /// Kept and classified records.
    pub classified: &'a [KeywordRecord],
    pub ctr_keywords: usize,
    pub growth: Option<&'a GrowthPlan>,
}

fn counts(segments: &[Segment]) -> Vec<BucketCount> {
    segments.iter().map(BucketCount::from_segment).collect()
}

pub fn build_summary(input: &SummaryInput) -> SummaryRecord {
    let records = input.classified;

    let mut serp_features = counts(&segment_by_serp_feature(records));
    serp_features.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    let typologies = counts(&segment_by_typology(records, input.locale))
        .into_iter()
        .filter(|b| b.count > 0)
        .collect();

    let aligned_with_objective = input
        .objective
        .known()
        .map(|obj| records.iter().filter(|r| r.objective == Some(obj)).count());

    SummaryRecord {
        locale: input.locale,
        objective: input.objective.label(input.locale),
        aligned_with_objective,
        filters: FilterSummary {
            input_keywords: input.input_keywords,
            geo_mode: input.geo_mode,
            geo_excluded: input.geo.excluded.len(),
            negative_excluded: input.negative.excluded.len(),
            kept_keywords: records.len(),
        },
        journey_stages: counts(&segment_by_journey(records, input.locale)),
        typologies,
        intents: counts(&segment_by_intent(records)),
        tail_lengths: counts(&segment_by_tail(records)),
        serp_features,
        ctr_keywords: input.ctr_keywords,
        growth: input.growth.map(GrowthSummary::from_plan),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
