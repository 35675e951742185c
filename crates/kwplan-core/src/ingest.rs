//! Reading keyword exports.
//!
//! Every `*.csv` directly inside the input directory is read, mapped onto
//! [`KeywordRecord`] columns by header name and merged into one table.

use crate::error::{KwError, Result};
use crate::planner::by_volume_desc;
use crate::types::KeywordRecord;
use csv::{ByteRecord, StringRecord};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// KeywordTable
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    pub records: Vec<KeywordRecord>,
    pub sources: Vec<PathBuf>,
    /// Passthrough headers, first-seen order across all files.
    pub extra_columns: Vec<String>,
    pub has_volume: bool,
    pub has_serp_features: bool,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ColumnMap {
    keyword: Option<usize>,
    volume: Option<usize>,
    intent: Option<usize>,
    serp: Option<usize>,
    trend: Option<usize>,
    density: Option<usize>,
    extras: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut map = ColumnMap::default();
        for (i, raw) in headers.iter().enumerate() {
            let name = raw.trim_start_matches('\u{feff}').trim();
            let lower = name.to_lowercase();
            let slot = match lower.as_str() {
                "keyword" => &mut map.keyword,
                "intent" => &mut map.intent,
                "serp features" => &mut map.serp,
                "trend" => &mut map.trend,
                "competitive density" => &mut map.density,
                _ if lower.contains("volume") && map.volume.is_none() => &mut map.volume,
                _ => {
                    map.extras.push((i, name.to_string()));
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(i);
            } else {
                map.extras.push((i, name.to_string()));
            }
        }
        map
    }
}

/// Cells that are not valid UTF-8 are decoded lossily. The flag reports
/// whether any replacement happened.
fn decode_lossy(row: ByteRecord) -> (StringRecord, bool) {
    match StringRecord::from_byte_record(row) {
        Ok(rec) => (rec, false),
        Err(err) => {
            let raw = err.into_byte_record();
            let rec: StringRecord = raw.iter().map(String::from_utf8_lossy).collect();
            (rec, true)
        }
    }
}

fn cell(row: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-numeric, negative and non-finite values read as absent.
pub fn parse_volume(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != '_').collect();
    let value: f64 = cleaned.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// `*.csv` files directly inside `dir`, sorted by file name.
pub fn find_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(KwError::NoInputFiles(dir.display().to_string()));
    }
    Ok(files)
}

struct FileRows {
    records: Vec<KeywordRecord>,
    extras: Vec<String>,
    has_volume: bool,
    has_serp: bool,
}

fn read_file(path: &Path) -> Result<Option<FileRows>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let (headers, mut lossy) = decode_lossy(rdr.byte_headers()?.clone());
    let map = ColumnMap::from_headers(&headers);
    if map.keyword.is_none() {
        tracing::warn!(file = %path.display(), "no 'Keyword' column; skipping file");
        return Ok(None);
    }

    let mut records = Vec::new();
    let mut lossy_rows = 0usize;
    for row in rdr.byte_records() {
        let (row, replaced) = decode_lossy(row?);
        if replaced {
            lossy_rows += 1;
        }
        let mut extra = IndexMap::new();
        for (i, name) in &map.extras {
            extra.insert(name.clone(), row.get(*i).unwrap_or("").to_string());
        }
        records.push(KeywordRecord {
            keyword: cell(&row, map.keyword).unwrap_or_default(),
            volume: cell(&row, map.volume).and_then(|v| parse_volume(&v)),
            intent: cell(&row, map.intent),
            serp_features: cell(&row, map.serp),
            trend: cell(&row, map.trend),
            competitive_density: cell(&row, map.density).and_then(|v| parse_number(&v)),
            extra,
            ..Default::default()
        });
    }

    lossy |= lossy_rows > 0;
    if lossy {
        tracing::warn!(
            file = %path.display(),
            rows = lossy_rows,
            "file is not valid UTF-8; invalid bytes replaced"
        );
    }

    Ok(Some(FileRows {
        records,
        extras: map.extras.into_iter().map(|(_, name)| name).collect(),
        has_volume: map.volume.is_some(),
        has_serp: map.serp.is_some(),
    }))
}

/// Keyword ascending, then volume descending with absent volumes last.
pub fn sort_records(records: &mut [KeywordRecord]) {
    records.sort_by(|a, b| a.keyword.cmp(&b.keyword).then_with(|| by_volume_desc(a, b)));
}

/// Read and merge every export in `dir`.
pub fn load_dir(dir: &Path) -> Result<KeywordTable> {
    let files = find_input_files(dir)?;
    let mut table = KeywordTable::default();

    for path in files {
        tracing::info!(file = %path.display(), "reading keyword export");
        let Some(rows) = read_file(&path)? else {
            continue;
        };
        table.has_volume |= rows.has_volume;
        table.has_serp_features |= rows.has_serp;
        for name in rows.extras {
            if !table.extra_columns.contains(&name) {
                table.extra_columns.push(name);
            }
        }
        table.records.extend(rows.records);
        table.sources.push(path);
    }

    if table.sources.is_empty() {
        return Err(KwError::NoInputFiles(dir.display().to_string()));
    }
    sort_records(&mut table.records);
    Ok(table)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
