use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Species configuration
// ---------------------------------------------------------------------------

/// Bycatch species recorded on every trip sheet. Changing fishery or region
/// means editing these lists; they are never auto-discovered from the data.
pub const BYCATCH_SPECIES: [&str; 5] = ["Manta", "Turtle", "Dolphin", "Shark", "Bird"];

/// Target species the fishery intends to catch.
pub const TARGET_SPECIES: [&str; 3] = ["Yellowfin", "Skipjack", "Billfish"];

/// Panel-type label assigned when the source cell is blank.
pub const UNKNOWN_PANEL: &str = "Unknown";

// ---------------------------------------------------------------------------
// TripRecord – one row of the trip table
// ---------------------------------------------------------------------------

/// A single fishing trip. Counts are stored in arrays parallel to
/// [`BYCATCH_SPECIES`] and [`TARGET_SPECIES`].
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    /// Trip date; `None` when the source cell failed to parse. Such rows are
    /// kept (they still contribute to non-date aggregates) but can never
    /// satisfy a date-range filter.
    pub date: Option<NaiveDate>,
    /// Partition label: the boat sheet this row came from.
    pub boat: String,
    /// Net-modification treatment (e.g. Control, Subsurface, Illuminated).
    pub panel_type: String,
    /// Per-species bycatch counts, parallel to [`BYCATCH_SPECIES`].
    pub bycatch: [u32; 5],
    /// Per-species target counts, parallel to [`TARGET_SPECIES`].
    pub target: [u32; 3],
    /// Derived: sum of `bycatch`. Recomputed, never edited independently.
    pub total_bycatch: u32,
    /// Derived: sum of `target`. Recomputed, never edited independently.
    pub total_target: u32,
}

// ---------------------------------------------------------------------------
// TripTable – the normalized session dataset
// ---------------------------------------------------------------------------

/// The full normalized dataset held for the session. Read-only after
/// normalization; every filter change re-runs over this table in memory.
#[derive(Debug, Clone, Default)]
pub struct TripTable {
    /// All trips, sorted ascending by date (null dates first).
    pub records: Vec<TripRecord>,
    /// Distinct boat labels, for the boat selector.
    pub boats: BTreeSet<String>,
    /// Distinct panel-type labels, for the panel selector.
    pub panel_types: BTreeSet<String>,
}

impl TripTable {
    /// Build the boat / panel-type indices from a set of records.
    pub fn from_records(records: Vec<TripRecord>) -> Self {
        let boats = records.iter().map(|r| r.boat.clone()).collect();
        let panel_types = records.iter().map(|r| r.panel_type.clone()).collect();
        TripTable {
            records,
            boats,
            panel_types,
        }
    }

    /// Number of trips.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest parsed dates, skipping null-date rows.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some((min, max))
    }
}

// ---------------------------------------------------------------------------
// Aggregate output rows
// ---------------------------------------------------------------------------

/// Per-panel-type summary over a filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelAggregate {
    pub panel_type: String,
    /// Summed bycatch per species, parallel to [`BYCATCH_SPECIES`].
    pub bycatch: [u64; 5],
    pub total_bycatch: u64,
    pub total_target: u64,
    /// `total_bycatch / total_target`; `NAN` when the group caught no target
    /// fish, which is a legitimate observed state and not an error.
    pub bycatch_ratio: f64,
}

/// One (panel type, species) cell of the melted species breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesCount {
    pub panel_type: String,
    pub species: &'static str,
    pub count: u64,
}

/// One (date, panel type) point of the daily bycatch series.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBycatch {
    pub date: NaiveDate,
    pub panel_type: String,
    pub total_bycatch: u64,
}
