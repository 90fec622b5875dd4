use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{IngestError, Result};

// ---------------------------------------------------------------------------
// RawTable – one partition of untyped cells
// ---------------------------------------------------------------------------

/// A rectangular grid of string cells from one source partition (one boat
/// sheet, or the whole CSV upload). Headers are deduplicated on
/// construction; everything else stays untyped until normalization.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Partition label: the sheet name or `"upload"`.
    pub partition: String,
    /// Unique column labels.
    pub headers: Vec<String>,
    /// Data rows. Short rows are allowed; missing cells read as empty.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a partition from a header row and data rows.
    pub fn new(partition: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable {
            partition: partition.to_string(),
            headers: dedup_headers(headers),
            rows,
        }
    }

    /// Index of the first column with the given label, if present.
    pub fn column(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    /// Cell at (row, col), empty string when the row is short.
    pub fn cell<'a>(&'a self, row: &'a [String], col: usize) -> &'a str {
        row.get(col).map(String::as_str).unwrap_or("")
    }
}

/// Make column labels unique: every occurrence after the first is renamed to
/// `"{label}_{positional_index}"`. The first occurrence keeps its label, so
/// typed parsing always reads the leftmost column of a duplicated name.
pub fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let n = seen.entry(h.clone()).or_insert(0);
            *n += 1;
            if *n > 1 {
                format!("{h}_{i}")
            } else {
                h
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Source A – workbook of named partitions
// ---------------------------------------------------------------------------

/// Anything that can hand out the boat sheets of a monitoring workbook.
///
/// The core is agnostic to transport; the spreadsheet service lives behind
/// this trait, and [`JsonWorkbook`] implements it for a local export so the
/// dashboard works offline.
pub trait WorkbookSource {
    /// All sheet names in the workbook, in source order.
    fn sheet_names(&self) -> Vec<String>;
    /// The raw grid of one sheet, first row = header.
    fn sheet(&self, name: &str) -> Result<Vec<Vec<String>>>;
}

/// A workbook exported as JSON: `{ "Boat 1": [["Date", ...], ["2024-01-05", ...]], ... }`.
pub struct JsonWorkbook {
    sheets: BTreeMap<String, Vec<Vec<String>>>,
    order: Vec<String>,
}

impl JsonWorkbook {
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let sheets: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)?;

        let mut grids = BTreeMap::new();
        let mut order = Vec::new();
        for (name, value) in sheets {
            let grid = json_grid(&name, &value)?;
            order.push(name.clone());
            grids.insert(name, grid);
        }
        Ok(JsonWorkbook {
            sheets: grids,
            order,
        })
    }
}

fn json_grid(sheet: &str, value: &serde_json::Value) -> Result<Vec<Vec<String>>> {
    let rows = value
        .as_array()
        .ok_or_else(|| IngestError::Malformed(format!("sheet '{sheet}' is not an array of rows")))?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row.as_array().ok_or_else(|| {
                IngestError::Malformed(format!("sheet '{sheet}' row {i} is not an array"))
            })?;
            Ok(cells.iter().map(json_cell).collect())
        })
        .collect()
}

/// Spreadsheet cells arrive as strings, but a hand-edited export may carry
/// bare numbers; render those as text rather than rejecting the sheet.
fn json_cell(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl WorkbookSource for JsonWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn sheet(&self, name: &str) -> Result<Vec<Vec<String>>> {
        self.sheets
            .get(name)
            .cloned()
            .ok_or_else(|| IngestError::Malformed(format!("no such sheet: {name}")))
    }
}

/// Pull every `boat*` sheet out of a workbook as a tagged partition.
///
/// Sheets whose name does not start with `boat` (case-insensitive) are
/// assumed to be notes or summaries and skipped. Empty sheets are skipped
/// too; a workbook with no usable boat sheet is `DataUnavailable`.
pub fn load_workbook(source: &dyn WorkbookSource) -> Result<Vec<RawTable>> {
    let mut partitions = Vec::new();

    for name in source.sheet_names() {
        if !name.to_ascii_lowercase().starts_with("boat") {
            continue;
        }
        let mut grid = source.sheet(&name)?;
        if grid.is_empty() {
            log::warn!("skipping empty sheet '{name}'");
            continue;
        }
        let headers = grid.remove(0);
        partitions.push(RawTable::new(&name, headers, grid));
    }

    if partitions.is_empty() {
        return Err(IngestError::DataUnavailable(
            "workbook contains no boat sheets".into(),
        ));
    }
    log::info!("loaded {} boat sheet(s) from workbook", partitions.len());
    Ok(partitions)
}

// ---------------------------------------------------------------------------
// Source B – uploaded delimited file
// ---------------------------------------------------------------------------

/// Read an uploaded CSV as a single partition labelled `"upload"`.
///
/// Schema is best-effort: normalization coerces only the species columns
/// that are actually present.
pub fn load_csv(path: &Path) -> Result<RawTable> {
    // Ragged rows happen in hand-edited exports; treat missing cells as empty.
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    log::info!("loaded {} row(s) from {}", rows.len(), path.display());
    Ok(RawTable::new("upload", headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_headers_renamed_by_position() {
        let headers = vec!["Date", "Shark", "Panel Type", "Shark"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(
            dedup_headers(headers),
            vec!["Date", "Shark", "Panel Type", "Shark_3"]
        );
    }

    #[test]
    fn first_occurrence_keeps_label() {
        let headers = vec!["a", "a", "a"].into_iter().map(str::to_string).collect();
        assert_eq!(dedup_headers(headers), vec!["a", "a_1", "a_2"]);
    }

    struct FakeWorkbook(Vec<(String, Vec<Vec<String>>)>);

    impl WorkbookSource for FakeWorkbook {
        fn sheet_names(&self) -> Vec<String> {
            self.0.iter().map(|(n, _)| n.clone()).collect()
        }
        fn sheet(&self, name: &str) -> Result<Vec<Vec<String>>> {
            self.0
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, g)| g.clone())
                .ok_or_else(|| IngestError::Malformed(name.into()))
        }
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn only_boat_sheets_become_partitions() {
        let wb = FakeWorkbook(vec![
            ("Summary".into(), grid(&[&["x"], &["1"]])),
            ("Boat 1".into(), grid(&[&["Date"], &["2024-01-05"]])),
            ("boat 2".into(), grid(&[&["Date"], &["2024-01-06"]])),
        ]);
        let parts = load_workbook(&wb).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].partition, "Boat 1");
        assert_eq!(parts[1].partition, "boat 2");
    }

    #[test]
    fn workbook_without_boat_sheets_is_unavailable() {
        let wb = FakeWorkbook(vec![("Notes".into(), grid(&[&["x"]]))]);
        assert!(matches!(
            load_workbook(&wb),
            Err(IngestError::DataUnavailable(_))
        ));
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let t = RawTable::new(
            "Boat 1",
            vec!["Date".into(), "Shark".into()],
            vec![vec!["2024-01-05".into()]],
        );
        let col = t.column("Shark").unwrap();
        assert_eq!(t.cell(&t.rows[0], col), "");
    }

    #[test]
    fn json_workbook_round_trips_from_disk() {
        let path = std::env::temp_dir().join("bycatch_lens_test_workbook.json");
        std::fs::write(
            &path,
            r#"{
                "Boat 1": [["Date", "Panel Type", "Shark"],
                           ["2024-01-05", "Control", "2"]],
                "Notes": [["ignored"]]
            }"#,
        )
        .unwrap();

        let wb = JsonWorkbook::open(&path).unwrap();
        let parts = load_workbook(&wb).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].headers, vec!["Date", "Panel Type", "Shark"]);
        assert_eq!(parts[0].rows[0][2], "2");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn numeric_json_cells_render_as_text() {
        let path = std::env::temp_dir().join("bycatch_lens_test_numeric.json");
        std::fs::write(&path, r#"{"Boat 1": [["Date", "Shark"], ["2024-01-05", 3]]}"#).unwrap();

        let wb = JsonWorkbook::open(&path).unwrap();
        let parts = load_workbook(&wb).unwrap();
        assert_eq!(parts[0].rows[0][1], "3");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn csv_upload_is_one_partition() {
        let path = std::env::temp_dir().join("bycatch_lens_test_upload.csv");
        std::fs::write(&path, "Date,Panel Type,Turtle\n2024-01-05,Control,1\n").unwrap();

        let t = load_csv(&path).unwrap();
        assert_eq!(t.partition, "upload");
        assert_eq!(t.headers, vec!["Date", "Panel Type", "Turtle"]);
        assert_eq!(t.rows, vec![vec!["2024-01-05", "Control", "1"]]);

        std::fs::remove_file(&path).ok();
    }
}
