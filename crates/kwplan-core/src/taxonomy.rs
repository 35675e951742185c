use crate::filters::classify_tail;
use crate::rules::default_rule_tables;
use crate::types::{JourneyStage, KeywordRecord, StrategicObjective, Typology};

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Trimmed, lowercased intent. Absent intents normalize to the empty string.
pub fn normalize_intent(intent: &str) -> String {
    intent.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Journey stage (exact match)
// ---------------------------------------------------------------------------

pub fn classify_journey_stage(intent: &str) -> JourneyStage {
    match normalize_intent(intent).as_str() {
        "informational" => JourneyStage::Awareness,
        "transactional" | "transacional" => JourneyStage::Decision,
        "commercial" => JourneyStage::Consideration,
        "navegacional" => JourneyStage::Loyalty,
        _ => JourneyStage::Undefined,
    }
}

// ---------------------------------------------------------------------------
// Strategic objective (substring match)
// ---------------------------------------------------------------------------

/// Maps an intent to the objective it serves by substring, so mixed intents
/// such as `"informational, commercial"` resolve to the first listed family.
pub fn map_strategic_objective(intent: &str) -> StrategicObjective {
    let intent = normalize_intent(intent);
    if intent.contains("informational") {
        StrategicObjective::MoreTraffic
    } else if intent.contains("transactional") || intent.contains("transacional") {
        StrategicObjective::EcommerceSales
    } else if intent.contains("commercial") {
        StrategicObjective::LeadCapture
    } else if intent.contains("navegacional") {
        StrategicObjective::BrandingAuthority
    } else {
        StrategicObjective::Other
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// Matches when any term is a substring of the lowercased SERP text.
pub struct TypologyRule {
    pub id: &'static str,
    pub any_of: &'static [&'static str],
    pub typology: Typology,
}

impl TypologyRule {
    pub fn matches(&self, serp_lower: &str) -> bool {
        self.any_of.iter().any(|term| serp_lower.contains(term))
    }
}

/// Ordered rules for one intent family. Order is priority.
pub struct RuleTable {
    pub intents: &'static [&'static str],
    pub rules: Vec<TypologyRule>,
}

impl RuleTable {
    pub fn first_match(&self, serp_lower: &str) -> Option<Typology> {
        self.rules
            .iter()
            .find(|rule| rule.matches(serp_lower))
            .map(|rule| rule.typology)
    }
}

// ---------------------------------------------------------------------------
// TypologyClassifier
// ---------------------------------------------------------------------------

pub struct TypologyClassifier {
    tables: Vec<RuleTable>,
}

impl Default for TypologyClassifier {
    fn default() -> Self {
        Self::new(default_rule_tables())
    }
}

impl TypologyClassifier {
    pub fn new(tables: Vec<RuleTable>) -> Self {
        Self { tables }
    }

    pub fn classify(&self, intent: &str, serp_features: &str) -> Typology {
        let intent = normalize_intent(intent);
        let serp = serp_features.trim().to_lowercase();

        let Some(table) = self.tables.iter().find(|t| t.intents.contains(&intent.as_str())) else {
            return Typology::ManualReview;
        };

        // Fallback: nothing in the SERP text points at a format
        table.first_match(&serp).unwrap_or(Typology::ManualReview)
    }

    /// Derive journey stage, typology, objective and tail length for every
    /// record. Returns new records; the input is left untouched.
    pub fn classify_records(&self, records: &[KeywordRecord]) -> Vec<KeywordRecord> {
        records
            .iter()
            .map(|rec| {
                let mut out = rec.clone();
                out.journey_stage = Some(classify_journey_stage(rec.intent_str()));
                out.typology = Some(self.classify(rec.intent_str(), rec.serp_str()));
                out.objective = Some(map_strategic_objective(rec.intent_str()));
                out.tail = Some(classify_tail(&rec.keyword));
                out
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
