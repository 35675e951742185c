use crate::error::{KwError, Result};
use crate::types::KeywordRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CtrBand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CtrBand {
    pub position: u8,
    pub min_rate: f64,
    pub max_rate: f64,
}

impl CtrBand {
    /// Column header, e.g. `Position 1 (25%-35%)`.
    pub fn header(&self) -> String {
        format!(
            "Position {} ({}%-{}%)",
            self.position,
            (self.min_rate * 100.0).round() as u32,
            (self.max_rate * 100.0).round() as u32
        )
    }
}

const fn band(position: u8, min_rate: f64, max_rate: f64) -> CtrBand {
    CtrBand {
        position,
        min_rate,
        max_rate,
    }
}

/// Expected click-through rate range per organic position.
pub const CTR_BANDS: [CtrBand; 10] = [
    band(1, 0.25, 0.35),
    band(2, 0.15, 0.20),
    band(3, 0.10, 0.15),
    band(4, 0.07, 0.10),
    band(5, 0.05, 0.07),
    band(6, 0.04, 0.06),
    band(7, 0.03, 0.05),
    band(8, 0.02, 0.04),
    band(9, 0.02, 0.03),
    band(10, 0.01, 0.02),
];

pub fn ctr_band(position: u8) -> Result<&'static CtrBand> {
    if !(1..=10).contains(&position) {
        return Err(KwError::InvalidPosition(position));
    }
    Ok(&CTR_BANDS[usize::from(position) - 1])
}

// ---------------------------------------------------------------------------
// ClickRange
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRange {
    pub low: u64,
    pub high: u64,
}

impl fmt::Display for ClickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.low, self.high)
    }
}

fn check_volume(volume: f64) -> Result<()> {
    if !volume.is_finite() || volume < 0.0 {
        return Err(KwError::InvalidVolume(volume));
    }
    Ok(())
}

/// Clicks a keyword can expect at `position`, truncated toward zero.
pub fn estimate_clicks(volume: f64, position: u8) -> Result<ClickRange> {
    check_volume(volume)?;
    let band = ctr_band(position)?;
    Ok(ClickRange {
        low: (volume * band.min_rate).trunc() as u64,
        high: (volume * band.max_rate).trunc() as u64,
    })
}

// ---------------------------------------------------------------------------
// Volume targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeTarget {
    /// Monthly traffic the growth goal adds on top of the current volume.
    pub absolute_growth: f64,
    /// Search volume each keyword needs if it only reaches position 10.
    pub min_per_keyword: f64,
    /// Search volume each keyword needs if it reaches position 1.
    pub max_per_keyword: f64,
}

pub fn compute_volume_target_per_keyword(
    current_volume: f64,
    growth_percent: f64,
    keywords_per_month: u32,
) -> Result<VolumeTarget> {
    if keywords_per_month == 0 {
        return Err(KwError::InvalidConfig(
            "keywords_per_month must be greater than zero".to_string(),
        ));
    }
    check_volume(current_volume)?;
    let kpm = f64::from(keywords_per_month);
    let absolute_growth = current_volume * growth_percent / 100.0;
    Ok(VolumeTarget {
        absolute_growth,
        min_per_keyword: absolute_growth / (kpm * CTR_BANDS[9].min_rate),
        max_per_keyword: absolute_growth / (kpm * CTR_BANDS[0].max_rate),
    })
}

// ---------------------------------------------------------------------------
// CTR table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtrRow {
    pub keyword: String,
    pub volume: f64,
    pub intent: Option<String>,
    pub trend: Option<String>,
    pub clicks: Vec<ClickRange>,
}

/// Click ranges for every record with a positive volume.
pub fn build_ctr_table(records: &[KeywordRecord]) -> Vec<CtrRow> {
    records
        .iter()
        .filter_map(|rec| {
            let volume = rec.volume.filter(|v| *v > 0.0)?;
            let clicks = CTR_BANDS
                .iter()
                .map(|b| estimate_clicks(volume, b.position))
                .collect::<Result<Vec<_>>>()
                .ok()?;
            Some(CtrRow {
                keyword: rec.keyword.clone(),
                volume,
                intent: rec.intent.clone(),
                trend: rec.trend.clone(),
                clicks,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_ordered_and_well_formed() {
        for (i, b) in CTR_BANDS.iter().enumerate() {
            assert_eq!(usize::from(b.position), i + 1);
            assert!(b.min_rate < b.max_rate, "position {}", b.position);
        }
    }

    #[test]
    fn golden_click_estimates() {
        assert_eq!(
            estimate_clicks(1000.0, 1).unwrap(),
            ClickRange { low: 250, high: 350 }
        );
        assert_eq!(
            estimate_clicks(1000.0, 10).unwrap(),
            ClickRange { low: 10, high: 20 }
        );
        assert_eq!(
            estimate_clicks(1000.0, 4).unwrap(),
            ClickRange { low: 70, high: 100 }
        );
    }

    #[test]
    fn zero_volume_is_zero_clicks_everywhere() {
        for p in 1..=10 {
            assert_eq!(
                estimate_clicks(0.0, p).unwrap(),
                ClickRange { low: 0, high: 0 }
            );
        }
    }

    #[test]
    fn estimates_truncate_instead_of_rounding() {
        // 19 * 0.35 = 6.65 and 19 * 0.25 = 4.75
        assert_eq!(
            estimate_clicks(19.0, 1).unwrap(),
            ClickRange { low: 4, high: 6 }
        );
        assert_eq!(
            estimate_clicks(99.0, 10).unwrap(),
            ClickRange { low: 0, high: 1 }
        );
    }

    #[test]
    fn rejects_out_of_range_positions() {
        assert!(matches!(
            estimate_clicks(100.0, 0),
            Err(KwError::InvalidPosition(0))
        ));
        assert!(matches!(
            estimate_clicks(100.0, 11),
            Err(KwError::InvalidPosition(11))
        ));
    }

    #[test]
    fn rejects_negative_and_nan_volume() {
        assert!(matches!(
            estimate_clicks(-1.0, 1),
            Err(KwError::InvalidVolume(_))
        ));
        assert!(estimate_clicks(f64::NAN, 1).is_err());
    }

    #[test]
    fn header_labels() {
        assert_eq!(CTR_BANDS[0].header(), "Position 1 (25%-35%)");
        assert_eq!(CTR_BANDS[3].header(), "Position 4 (7%-10%)");
        assert_eq!(CTR_BANDS[9].header(), "Position 10 (1%-2%)");
    }

    #[test]
    fn display_click_range() {
        assert_eq!(ClickRange { low: 3, high: 7 }.to_string(), "3 - 7");
    }

    #[test]
    fn volume_target_uses_worst_and_best_bands() {
        let t = compute_volume_target_per_keyword(10_000.0, 10.0, 10).unwrap();
        assert!((t.absolute_growth - 1000.0).abs() < 1e-9);
        // 1000 / (10 * 0.01)
        assert!((t.min_per_keyword - 10_000.0).abs() < 1e-6);
        // 1000 / (10 * 0.35)
        assert!((t.max_per_keyword - 1000.0 / 3.5).abs() < 1e-6);
        assert!(t.min_per_keyword > t.max_per_keyword);
    }

    #[test]
    fn volume_target_rejects_zero_keywords_per_month() {
        assert!(matches!(
            compute_volume_target_per_keyword(1000.0, 10.0, 0),
            Err(KwError::InvalidConfig(_))
        ));
    }

    #[test]
    fn ctr_table_skips_rows_without_positive_volume() {
        let rows = build_ctr_table(&[
            KeywordRecord::new("a").with_volume(1000.0),
            KeywordRecord::new("b").with_volume(0.0),
            KeywordRecord::new("c"),
        ]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].keyword, "a");
        assert_eq!(rows[0].clicks.len(), 10);
        assert_eq!(rows[0].clicks[0], ClickRange { low: 250, high: 350 });
    }
}
