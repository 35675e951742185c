use crate::types::{JourneyStage, KeywordRecord, Locale, TailLength, Typology};
use std::collections::BTreeSet;

/// Intent sheets, matched case-insensitively as substrings of the intent.
pub const INTENT_SHEETS: [&str; 4] = ["Informational", "Transactional", "Commercial", "Navigational"];
pub const NO_INTENT_SHEET: &str = "No Intent";

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    pub records: Vec<KeywordRecord>,
}

impl Segment {
    fn new(label: impl Into<String>, records: Vec<KeywordRecord>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_keyword(&self) -> Option<&str> {
        self.records.first().map(|r| r.keyword.as_str())
    }
}

fn select<F>(records: &[KeywordRecord], pred: F) -> Vec<KeywordRecord>
where
    F: Fn(&KeywordRecord) -> bool,
{
    records.iter().filter(|r| pred(r)).cloned().collect()
}

/// One segment per intent sheet plus the "No Intent" sheet. A record with a
/// mixed intent such as "informational, commercial" lands in both sheets.
pub fn segment_by_intent(records: &[KeywordRecord]) -> Vec<Segment> {
    let mut out: Vec<Segment> = INTENT_SHEETS
        .iter()
        .map(|sheet| {
            let needle = sheet.to_lowercase();
            Segment::new(
                *sheet,
                select(records, |r| {
                    r.intent
                        .as_deref()
                        .is_some_and(|i| i.to_lowercase().contains(&needle))
                }),
            )
        })
        .collect();
    out.push(Segment::new(
        NO_INTENT_SHEET,
        select(records, |r| r.intent.is_none()),
    ));
    out
}

/// Distinct SERP feature tokens across all records, sorted.
pub fn serp_feature_tokens(records: &[KeywordRecord]) -> Vec<String> {
    let tokens: BTreeSet<&str> = records.iter().flat_map(|r| r.serp_tokens()).collect();
    tokens.into_iter().map(str::to_string).collect()
}

/// One segment per distinct SERP feature token, by token membership.
pub fn segment_by_serp_feature(records: &[KeywordRecord]) -> Vec<Segment> {
    serp_feature_tokens(records)
        .into_iter()
        .map(|token| {
            let members = select(records, |r| r.serp_tokens().contains(token.as_str()));
            Segment::new(token, members)
        })
        .collect()
}

/// Every journey stage, including empty ones. Records must be classified.
pub fn segment_by_journey(records: &[KeywordRecord], locale: Locale) -> Vec<Segment> {
    JourneyStage::all()
        .iter()
        .map(|stage| {
            Segment::new(
                stage.label(locale),
                select(records, |r| r.journey_stage == Some(*stage)),
            )
        })
        .collect()
}

/// Every typology, including empty ones. Records must be classified.
pub fn segment_by_typology(records: &[KeywordRecord], locale: Locale) -> Vec<Segment> {
    Typology::all()
        .iter()
        .map(|t| Segment::new(t.label(locale), select(records, |r| r.typology == Some(*t))))
        .collect()
}

pub fn segment_by_tail(records: &[KeywordRecord]) -> Vec<Segment> {
    TailLength::all()
        .iter()
        .map(|t| Segment::new(t.as_str(), select(records, |r| r.tail == Some(*t))))
        .collect()
}
