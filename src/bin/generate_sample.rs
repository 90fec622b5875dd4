use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::{json, Value};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Knuth's multiplication method; fine for the small means used here.
    fn poisson(&mut self, mean: f64) -> u32 {
        let l = (-mean).exp();
        let mut k = 0u32;
        let mut p = 1.0;
        loop {
            p *= self.next_f64();
            if p <= l {
                return k;
            }
            k += 1;
        }
    }
}

const PANELS: [(&str, f64); 3] = [("Control", 1.0), ("Subsurface", 0.55), ("Illuminated", 0.35)];
const BYCATCH_MEANS: [(&str, f64); 5] = [
    ("Manta", 0.15),
    ("Turtle", 0.4),
    ("Dolphin", 0.2),
    ("Shark", 0.9),
    ("Bird", 0.5),
];
const TARGET_MEANS: [(&str, f64); 3] =
    [("Yellowfin", 6.0), ("Skipjack", 9.0), ("Billfish", 1.5)];

fn header() -> Vec<String> {
    let mut h = vec!["Date".to_string(), "Panel Type".to_string()];
    h.extend(TARGET_MEANS.iter().map(|(s, _)| s.to_string()));
    h.extend(BYCATCH_MEANS.iter().map(|(s, _)| s.to_string()));
    h
}

/// One trip row: date, panel, then target and bycatch counts. The panel's
/// factor scales bycatch only; the treatments are not supposed to change
/// target catch much.
fn trip_row(rng: &mut SimpleRng, date: NaiveDate, panel: &str, factor: f64) -> Vec<String> {
    let mut row = vec![date.format("%Y-%m-%d").to_string(), panel.to_string()];
    for (_, mean) in TARGET_MEANS {
        row.push(rng.poisson(mean).to_string());
    }
    for (_, mean) in BYCATCH_MEANS {
        row.push(rng.poisson(mean * factor).to_string());
    }
    row
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 8).context("bad start date")?;

    // Three boats, one sheet each, plus a notes sheet the loader must skip.
    let mut sheets = serde_json::Map::new();
    let mut all_rows: Vec<Vec<String>> = Vec::new();

    for boat in 1..=3u32 {
        let mut grid: Vec<Value> = vec![json!(header())];
        for week in 0..20u32 {
            for (pi, (panel, factor)) in PANELS.iter().enumerate() {
                let date = start + chrono::Duration::days((week * 7 + pi as u32 * 2) as i64);
                let row = trip_row(&mut rng, date, panel, *factor);
                all_rows.push(row.clone());
                grid.push(json!(row));
            }
        }
        sheets.insert(format!("Boat {boat}"), Value::Array(grid));
    }
    sheets.insert(
        "Summary".to_string(),
        json!([["This sheet is ignored by the loader"]]),
    );

    let workbook_path = "sample_workbook.json";
    std::fs::write(workbook_path, serde_json::to_string_pretty(&sheets)?)
        .with_context(|| format!("writing {workbook_path}"))?;

    // The same trips flattened into a single CSV upload.
    let csv_path = "sample_trips.csv";
    let mut writer = csv::Writer::from_path(csv_path)
        .with_context(|| format!("writing {csv_path}"))?;
    writer.write_record(header())?;
    for row in &all_rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} trips across 3 boats to {workbook_path} and {csv_path}",
        all_rows.len()
    );
    Ok(())
}
