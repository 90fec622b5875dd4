use chrono::NaiveDate;

use super::ingest::RawTable;
use super::model::{TripRecord, TripTable, BYCATCH_SPECIES, TARGET_SPECIES, UNKNOWN_PANEL};
use crate::error::{IngestError, Result};

// ---------------------------------------------------------------------------
// Record Normalizer
// ---------------------------------------------------------------------------

/// Turn raw partitions into one typed, sorted trip table.
///
/// Lenient by design: a malformed date becomes a null date (row kept), a
/// malformed or absent count becomes 0 ("no observed catch", not "unknown"),
/// and a blank panel type becomes [`UNKNOWN_PANEL`]. Partitions only need to
/// share the fixed species-column names; anything else is a tolerant union.
///
/// Fails with `DataUnavailable` when no partition has rows or when no
/// partition carries a `Date` column at all.
pub fn normalize(partitions: &[RawTable]) -> Result<TripTable> {
    if partitions.iter().all(|p| p.rows.is_empty()) {
        return Err(IngestError::DataUnavailable(
            "all partitions are empty".into(),
        ));
    }
    if partitions.iter().all(|p| p.column("Date").is_none()) {
        return Err(IngestError::DataUnavailable(
            "no partition has a Date column".into(),
        ));
    }

    let mut records = Vec::new();
    for part in partitions {
        let date_col = part.column("Date");
        let panel_col = part.column("Panel Type");
        let bycatch_cols = BYCATCH_SPECIES.map(|s| part.column(s));
        let target_cols = TARGET_SPECIES.map(|s| part.column(s));

        for row in &part.rows {
            let date = date_col.and_then(|c| parse_date(part.cell(row, c)));
            let panel_type = match panel_col.map(|c| part.cell(row, c).trim()) {
                Some(p) if !p.is_empty() => p.to_string(),
                _ => UNKNOWN_PANEL.to_string(),
            };

            let bycatch = bycatch_cols.map(|c| parse_count(c.map(|c| part.cell(row, c))));
            let target = target_cols.map(|c| parse_count(c.map(|c| part.cell(row, c))));

            records.push(TripRecord {
                date,
                boat: part.partition.clone(),
                panel_type,
                bycatch,
                target,
                total_bycatch: 0,
                total_target: 0,
            });
        }
    }

    // Ascending by date; null dates sort first so a glance at the top of the
    // table shows what still needs a date fixed at the source.
    records.sort_by_key(|r| r.date);

    let mut table = TripTable::from_records(records);
    compute_derived(&mut table);
    log::info!(
        "normalized {} trip(s) across {} boat(s)",
        table.len(),
        table.boats.len()
    );
    Ok(table)
}

/// Date formats seen in the field sheets. ISO first, then the day-first
/// forms the logbooks use.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y"];

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}

/// Coerce a count cell to a non-negative integer; `None` means the column is
/// absent from this partition. Accepts a stray decimal point ("3.0") since
/// spreadsheet exports produce those.
fn parse_count(cell: Option<&str>) -> u32 {
    let Some(cell) = cell else { return 0 };
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<u32>() {
        return n;
    }
    match cell.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => f as u32,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Derived-Metric Calculator
// ---------------------------------------------------------------------------

/// Recompute `total_bycatch` / `total_target` for every row as fixed-list
/// sums. Idempotent: totals are overwritten, never accumulated.
pub fn compute_derived(table: &mut TripTable) {
    for rec in &mut table.records {
        rec.total_bycatch = rec.bycatch.iter().sum();
        rec.total_target = rec.target.iter().sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ingest::RawTable;

    fn part(partition: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            partition,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parses_dates_and_coerces_counts() {
        let p = part(
            "Boat 1",
            &["Date", "Panel Type", "Shark", "Yellowfin"],
            &[&["2024-01-05", "Control", "2", "5"], &["05/02/2024", "Control", "x", ""]],
        );
        let table = normalize(&[p]).unwrap();
        assert_eq!(table.records[0].date, Some(d("2024-01-05")));
        assert_eq!(table.records[1].date, Some(d("2024-02-05")));
        // Shark is index 3 in BYCATCH_SPECIES, Yellowfin index 0 in TARGET_SPECIES.
        assert_eq!(table.records[0].bycatch[3], 2);
        assert_eq!(table.records[0].target[0], 5);
        // Garbled and missing counts are zero, not null.
        assert_eq!(table.records[1].bycatch[3], 0);
        assert_eq!(table.records[1].target[0], 0);
    }

    #[test]
    fn unparseable_date_keeps_row_and_sorts_first() {
        let p = part(
            "Boat 1",
            &["Date", "Panel Type", "Shark"],
            &[
                &["2024-03-01", "Control", "1"],
                &["not a date", "Control", "7"],
                &["2024-01-01", "Control", "2"],
            ],
        );
        let table = normalize(&[p]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0].date, None);
        assert_eq!(table.records[0].bycatch[3], 7);
        assert_eq!(table.records[1].date, Some(d("2024-01-01")));
        assert_eq!(table.records[2].date, Some(d("2024-03-01")));
    }

    #[test]
    fn blank_panel_type_becomes_unknown() {
        let p = part(
            "Boat 1",
            &["Date", "Panel Type"],
            &[&["2024-01-05", "  "], &["2024-01-06", "Illuminated"]],
        );
        let table = normalize(&[p]).unwrap();
        assert_eq!(table.records[0].panel_type, UNKNOWN_PANEL);
        assert_eq!(table.records[1].panel_type, "Illuminated");
    }

    #[test]
    fn partitions_are_tagged_and_concatenated() {
        let a = part("Boat 1", &["Date", "Turtle"], &[&["2024-01-05", "1"]]);
        let b = part("Boat 2", &["Date", "Dolphin"], &[&["2024-01-06", "2"]]);
        let table = normalize(&[a, b]).unwrap();
        assert_eq!(table.records[0].boat, "Boat 1");
        assert_eq!(table.records[1].boat, "Boat 2");
        // Column absent from a partition coerces to zero for its rows.
        assert_eq!(table.records[0].bycatch[2], 0); // Dolphin on Boat 1
        assert_eq!(table.records[1].bycatch[1], 0); // Turtle on Boat 2
        assert_eq!(table.boats.len(), 2);
    }

    #[test]
    fn missing_date_column_everywhere_is_unavailable() {
        let p = part("Boat 1", &["Panel Type", "Shark"], &[&["Control", "1"]]);
        assert!(matches!(
            normalize(&[p]),
            Err(IngestError::DataUnavailable(_))
        ));
    }

    #[test]
    fn empty_partitions_are_unavailable() {
        let p = part("Boat 1", &["Date"], &[]);
        assert!(matches!(
            normalize(&[p]),
            Err(IngestError::DataUnavailable(_))
        ));
    }

    #[test]
    fn duplicated_species_header_coerces_from_first_column() {
        let p = part(
            "Boat 1",
            &["Date", "Shark", "Shark"],
            &[&["2024-01-05", "2", "9"]],
        );
        let table = normalize(&[p]).unwrap();
        // The renamed "Shark_2" column is ignored by typed coercion.
        assert_eq!(table.records[0].bycatch[3], 2);
    }

    #[test]
    fn totals_are_fixed_list_sums() {
        let p = part(
            "Boat 1",
            &[
                "Date", "Panel Type", "Manta", "Turtle", "Dolphin", "Shark", "Bird", "Yellowfin",
                "Skipjack", "Billfish",
            ],
            &[&["2024-01-05", "Control", "1", "0", "2", "3", "0", "4", "5", "6"]],
        );
        let table = normalize(&[p]).unwrap();
        assert_eq!(table.records[0].total_bycatch, 6);
        assert_eq!(table.records[0].total_target, 15);
    }

    #[test]
    fn compute_derived_is_idempotent() {
        let p = part(
            "Boat 1",
            &["Date", "Shark", "Yellowfin"],
            &[&["2024-01-05", "2", "5"]],
        );
        let mut table = normalize(&[p]).unwrap();
        let before = table.records.clone();
        compute_derived(&mut table);
        compute_derived(&mut table);
        assert_eq!(table.records, before);
    }

    #[test]
    fn decimal_exports_coerce_to_counts() {
        assert_eq!(parse_count(Some("3.0")), 3);
        assert_eq!(parse_count(Some("3.5")), 0);
        assert_eq!(parse_count(Some("-2")), 0);
        assert_eq!(parse_count(None), 0);
    }
}
