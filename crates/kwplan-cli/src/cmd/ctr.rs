use crate::output::{print_json, print_table};
use kwplan_core::ctr::{ctr_band, estimate_clicks, CTR_BANDS};

pub fn run(volume: f64, position: Option<u8>, json: bool) -> anyhow::Result<()> {
    let positions: Vec<u8> = match position {
        Some(p) => vec![p],
        None => CTR_BANDS.iter().map(|b| b.position).collect(),
    };

    let mut rows = Vec::with_capacity(positions.len());
    for p in positions {
        let band = ctr_band(p)?;
        let clicks = estimate_clicks(volume, p)?;
        rows.push((band, clicks));
    }

    if json {
        let value: Vec<serde_json::Value> = rows
            .iter()
            .map(|(band, clicks)| {
                serde_json::json!({
                    "position": band.position,
                    "min_rate": band.min_rate,
                    "max_rate": band.max_rate,
                    "low": clicks.low,
                    "high": clicks.high,
                })
            })
            .collect();
        print_json(&value)?;
        return Ok(());
    }

    print_table(
        &["Position", "Clicks"],
        rows.iter()
            .map(|(band, clicks)| vec![band.header(), clicks.to_string()])
            .collect(),
    );
    Ok(())
}
