use chrono::{DateTime, Local};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File and directory constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "kwplan.yaml";
pub const OUTPUT_DIR_PREFIX: &str = "analysis-";

pub const OVERVIEW_SHEET: &str = "keyword-overview.csv";
pub const INTENTS_DIR: &str = "intents";
pub const SERP_FEATURES_DIR: &str = "serp-features";
pub const JOURNEY_DIR: &str = "journey";
pub const JOURNEY_OVERVIEW_SHEET: &str = "journey/overview.csv";
pub const CTR_SHEET: &str = "ctr-by-position.csv";
pub const GEO_EXCLUDED_SHEET: &str = "filters/geo-excluded.csv";
pub const NEGATIVE_KEPT_SHEET: &str = "filters/negative-kept.csv";
pub const NEGATIVE_EXCLUDED_SHEET: &str = "filters/negative-excluded.csv";
pub const GROWTH_PLAN_SHEET: &str = "growth-plan.csv";

pub const SUMMARY_JSON: &str = "summary.json";
pub const SUMMARY_XML: &str = "summary.xml";
pub const REPORT_MD: &str = "report.md";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

/// `analysis-YYYYMMDD-HHMMSS` inside the input directory.
pub fn default_output_dir(input: &Path, now: DateTime<Local>) -> PathBuf {
    input.join(format!("{OUTPUT_DIR_PREFIX}{}", now.format("%Y%m%d-%H%M%S")))
}

static UNSAFE_CHARS_RE: OnceLock<Regex> = OnceLock::new();

fn unsafe_chars_re() -> &'static Regex {
    UNSAFE_CHARS_RE.get_or_init(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).unwrap())
}

/// Turn a sheet label such as a SERP feature into a file name.
pub fn sheet_file_name(label: &str) -> String {
    let cleaned = unsafe_chars_re().replace_all(label.trim(), "_");
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "_.csv".to_string()
    } else {
        format!("{cleaned}.csv")
    }
}

pub fn intent_sheet(out: &Path, label: &str) -> PathBuf {
    out.join(INTENTS_DIR).join(sheet_file_name(label))
}

pub fn serp_feature_sheet(out: &Path, label: &str) -> PathBuf {
    out.join(SERP_FEATURES_DIR).join(sheet_file_name(label))
}

pub fn journey_sheet(out: &Path, label: &str) -> PathBuf {
    out.join(JOURNEY_DIR).join(sheet_file_name(label))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sheet_names_strip_path_separators() {
        assert_eq!(sheet_file_name("People also ask"), "People also ask.csv");
        assert_eq!(sheet_file_name("Ads top/bottom"), "Ads top_bottom.csv");
        assert_eq!(sheet_file_name(".."), "_.csv");
        assert_eq!(sheet_file_name("Conscientização"), "Conscientização.csv");
    }

    #[test]
    fn output_dir_is_timestamped() {
        let now = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            default_output_dir(Path::new("/data"), now),
            PathBuf::from("/data/analysis-20260304-050607")
        );
    }

    #[test]
    fn path_helpers() {
        let out = Path::new("/tmp/run");
        assert_eq!(config_path(Path::new("/data")), PathBuf::from("/data/kwplan.yaml"));
        assert_eq!(
            intent_sheet(out, "No Intent"),
            PathBuf::from("/tmp/run/intents/No Intent.csv")
        );
        assert_eq!(
            serp_feature_sheet(out, "Video"),
            PathBuf::from("/tmp/run/serp-features/Video.csv")
        );
        assert_eq!(
            journey_sheet(out, "Awareness"),
            PathBuf::from("/tmp/run/journey/Awareness.csv")
        );
    }
}
