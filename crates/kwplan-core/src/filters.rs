//! Keyword filters: geographic exclusion, negative keywords and tail length.
//!
//! Both exclusion filters split a table into a kept and an excluded side. The
//! excluded side keeps the reason so analysts can review what was dropped.

use crate::error::{KwError, Result};
use crate::types::{KeywordRecord, TailLength};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_GAZETTEER: &str = include_str!("../data/gazetteer.txt");
pub const DEFAULT_STOP_LIST: &str = include_str!("../data/negative_keywords.txt");

// ---------------------------------------------------------------------------
// Term lists
// ---------------------------------------------------------------------------

/// One entry per line; blank lines and `#` comments are skipped. Entries are
/// lowercased and deduplicated in first-seen order.
pub fn parse_term_list(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let term = line.to_lowercase();
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Read a term list from disk. A missing or unreadable file is fatal.
pub fn load_term_list(path: &Path, kind: &str) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|_| KwError::MissingResource {
        kind: kind.to_string(),
        path: path.display().to_string(),
    })?;
    Ok(parse_term_list(&text))
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub record: KeywordRecord,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Partition {
    pub kept: Vec<KeywordRecord>,
    pub excluded: Vec<Exclusion>,
}

impl Partition {
    /// Everything passes through, nothing excluded.
    pub fn keep_all(records: &[KeywordRecord]) -> Self {
        Self {
            kept: records.to_vec(),
            excluded: Vec::new(),
        }
    }

    fn split<F>(records: &[KeywordRecord], mut reason: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut out = Partition::default();
        for rec in records {
            match reason(&rec.keyword) {
                Some(reason) => out.excluded.push(Exclusion {
                    record: rec.clone(),
                    reason,
                }),
                None => out.kept.push(rec.clone()),
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Geographic filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoMode {
    /// Whole-word gazetteer match only.
    #[default]
    Strict,
    /// Gazetteer match, a trailing "em/no/na/de <word>" suffix, or any bare
    /// two or three letter token.
    Loose,
}

impl std::fmt::Display for GeoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GeoMode::Strict => "strict",
            GeoMode::Loose => "loose",
        })
    }
}

impl std::str::FromStr for GeoMode {
    type Err = KwError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(GeoMode::Strict),
            "loose" => Ok(GeoMode::Loose),
            other => Err(KwError::InvalidConfig(format!(
                "unknown geo mode '{other}': expected strict or loose"
            ))),
        }
    }
}

static TRAILING_PLACE_RE: OnceLock<Regex> = OnceLock::new();
static SHORT_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn trailing_place_re() -> &'static Regex {
    TRAILING_PLACE_RE.get_or_init(|| Regex::new(r"\b(em|no|na|de)\s+\w+$").unwrap())
}

fn short_token_re() -> &'static Regex {
    SHORT_TOKEN_RE.get_or_init(|| Regex::new(r"\b\p{L}{2,3}\b").unwrap())
}

pub struct GeoFilter {
    mode: GeoMode,
    gazetteer: Option<Regex>,
}

impl GeoFilter {
    pub fn new(gazetteer: &[String], mode: GeoMode) -> Result<Self> {
        let mut names: Vec<&str> = gazetteer
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        // Longest first so multi-word names win over their prefixes.
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        names.dedup();

        let gazetteer = if names.is_empty() {
            None
        } else {
            let alternation: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
            let pattern = format!(r"(?i)\b(?:{})\b", alternation.join("|"));
            Some(Regex::new(&pattern).map_err(|e| KwError::InvalidConfig(e.to_string()))?)
        };
        Ok(Self { mode, gazetteer })
    }

    pub fn mode(&self) -> GeoMode {
        self.mode
    }

    /// Why `keyword` looks geographic, or `None` when it does not.
    pub fn exclusion_reason(&self, keyword: &str) -> Option<String> {
        let keyword = keyword.to_lowercase();
        if let Some(m) = self.gazetteer.as_ref().and_then(|re| re.find(&keyword)) {
            return Some(format!("place: {}", m.as_str()));
        }
        if self.mode == GeoMode::Strict {
            return None;
        }
        if let Some(m) = trailing_place_re().find(&keyword) {
            return Some(format!("place suffix: {}", m.as_str()));
        }
        short_token_re()
            .find(&keyword)
            .map(|m| format!("short token: {}", m.as_str()))
    }

    pub fn partition(&self, records: &[KeywordRecord]) -> Partition {
        Partition::split(records, |kw| self.exclusion_reason(kw))
    }
}

// ---------------------------------------------------------------------------
// Negative keywords
// ---------------------------------------------------------------------------

pub struct NegativeFilter {
    terms: Vec<String>,
}

impl NegativeFilter {
    pub fn new(terms: Vec<String>) -> Self {
        let terms = terms
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// First stop-list entry found anywhere inside the keyword.
    pub fn matched_term(&self, keyword: &str) -> Option<&str> {
        let keyword = keyword.to_lowercase();
        self.terms
            .iter()
            .find(|t| keyword.contains(t.as_str()))
            .map(String::as_str)
    }

    pub fn partition(&self, records: &[KeywordRecord]) -> Partition {
        Partition::split(records, |kw| {
            self.matched_term(kw).map(|t| format!("negative: {t}"))
        })
    }
}

// ---------------------------------------------------------------------------
// Tail length
// ---------------------------------------------------------------------------

pub fn classify_tail(keyword: &str) -> TailLength {
    match keyword.split_whitespace().count() {
        0..=2 => TailLength::Short,
        3 => TailLength::Medium,
        _ => TailLength::Long,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn records(keywords: &[&str]) -> Vec<KeywordRecord> {
        keywords.iter().map(|k| KeywordRecord::new(*k)).collect()
    }

    #[test]
    fn parse_term_list_skips_comments_and_blanks() {
        let parsed = parse_term_list("# header\n\nSão Paulo\n  curitiba \nsão paulo\n");
        assert_eq!(parsed, terms(&["são paulo", "curitiba"]));
    }

    #[test]
    fn default_lists_are_non_empty() {
        assert!(parse_term_list(DEFAULT_GAZETTEER).len() > 50);
        assert!(parse_term_list(DEFAULT_STOP_LIST).len() > 50);
    }

    #[test]
    fn load_term_list_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = load_term_list(&dir.path().join("nope.txt"), "gazetteer").unwrap_err();
        assert!(matches!(err, KwError::MissingResource { .. }));
        assert!(err.to_string().contains("gazetteer"));
    }

    #[test]
    fn load_term_list_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stop.txt");
        std::fs::write(&path, "Vagas\nGRÁTIS\n").unwrap();
        assert_eq!(
            load_term_list(&path, "stop list").unwrap(),
            terms(&["vagas", "grátis"])
        );
    }

    #[test]
    fn strict_geo_excludes_exact_gazetteer_entry() {
        let f = GeoFilter::new(&terms(&["rio"]), GeoMode::Strict).unwrap();
        assert!(f.exclusion_reason("rio").is_some());
        assert!(f.exclusion_reason("Rio").is_some());
        assert!(f.exclusion_reason("hotel no rio barato").is_some());
    }

    #[test]
    fn strict_geo_requires_whole_word() {
        let f = GeoFilter::new(&terms(&["rio"]), GeoMode::Strict).unwrap();
        assert!(f.exclusion_reason("rioja").is_none());
        assert!(f.exclusion_reason("vinho rioja").is_none());
        assert!(f.exclusion_reason("armário").is_none());
    }

    #[test]
    fn strict_geo_matches_accented_multiword_names() {
        let f = GeoFilter::new(&terms(&["são paulo", "belém"]), GeoMode::Strict).unwrap();
        assert!(f.exclusion_reason("dentista são paulo zona sul").is_some());
        assert!(f.exclusion_reason("açaí em belém").is_some());
        assert_eq!(
            f.exclusion_reason("dentista são paulo").as_deref(),
            Some("place: são paulo")
        );
    }

    #[test]
    fn strict_geo_ignores_loose_heuristics() {
        let f = GeoFilter::new(&terms(&["curitiba"]), GeoMode::Strict).unwrap();
        assert!(f.exclusion_reason("pizzaria em moema").is_none());
        assert!(f.exclusion_reason("seguro auto sp").is_none());
    }

    #[test]
    fn loose_geo_adds_suffix_and_abbreviation_heuristics() {
        let f = GeoFilter::new(&terms(&["curitiba"]), GeoMode::Loose).unwrap();
        assert!(f.exclusion_reason("pizzaria em moema").is_some());
        assert!(f.exclusion_reason("seguro auto sp").is_some());
        assert!(f.exclusion_reason("curitiba").is_some());
        assert!(f.exclusion_reason("seguradora automotiva").is_none());
    }

    #[test]
    fn empty_gazetteer_excludes_nothing_in_strict_mode() {
        let f = GeoFilter::new(&[], GeoMode::Strict).unwrap();
        assert!(f.exclusion_reason("são paulo").is_none());
    }

    #[test]
    fn geo_partition_records_reason() {
        let f = GeoFilter::new(&terms(&["recife"]), GeoMode::Strict).unwrap();
        let p = f.partition(&records(&["praia recife", "praia"]));
        assert_eq!(p.kept.len(), 1);
        assert_eq!(p.excluded.len(), 1);
        assert_eq!(p.excluded[0].record.keyword, "praia recife");
        assert_eq!(p.excluded[0].reason, "place: recife");
    }

    #[test]
    fn negative_filter_is_case_insensitive_substring() {
        let f = NegativeFilter::new(terms(&["Vaga", "grátis"]));
        assert_eq!(f.matched_term("VAGAS de emprego"), Some("vaga"));
        assert_eq!(f.matched_term("curso gratis"), None);
        assert_eq!(f.matched_term("curso GRÁTIS online"), Some("grátis"));
        assert_eq!(f.matched_term("curso online"), None);
    }

    #[test]
    fn empty_stop_list_keeps_everything() {
        let f = NegativeFilter::new(Vec::new());
        assert_eq!(f.matched_term("vagas grátis"), None);
        let p = f.partition(&records(&["a", "b"]));
        assert_eq!(p.kept.len(), 2);
        assert!(p.excluded.is_empty());
    }

    #[test]
    fn tail_length_buckets() {
        assert_eq!(classify_tail(""), TailLength::Short);
        assert_eq!(classify_tail("seo"), TailLength::Short);
        assert_eq!(classify_tail("  curso   seo "), TailLength::Short);
        assert_eq!(classify_tail("curso de seo"), TailLength::Medium);
        assert_eq!(classify_tail("curso de seo online"), TailLength::Long);
    }

    proptest! {
        #[test]
        fn negative_partition_is_exhaustive_and_disjoint(
            keywords in prop::collection::vec("[a-z ]{0,16}", 0..40),
            stop in prop::collection::vec("[a-z]{1,3}", 0..6),
        ) {
            let input: Vec<KeywordRecord> = keywords
                .iter()
                .enumerate()
                .map(|(i, k)| KeywordRecord::new(k.clone()).with_volume(i as f64))
                .collect();
            let p = NegativeFilter::new(stop).partition(&input);

            prop_assert_eq!(p.kept.len() + p.excluded.len(), input.len());
            // Volumes are unique per row, so they identify membership.
            let mut seen: Vec<f64> = p
                .kept
                .iter()
                .chain(p.excluded.iter().map(|e| &e.record))
                .filter_map(|r| r.volume)
                .collect();
            seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let expected: Vec<f64> = (0..input.len()).map(|i| i as f64).collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
