use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::TripTable;

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Boat predicate: the explicit "All boats" sentinel is distinct from
/// selecting every boat by hand, so newly ingested boats stay included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoatSelection {
    All,
    Only(BTreeSet<String>),
}

impl BoatSelection {
    fn matches(&self, boat: &str) -> bool {
        match self {
            BoatSelection::All => true,
            BoatSelection::Only(set) => set.contains(boat),
        }
    }
}

/// The analyst's current filter choices. All three predicates apply as a
/// conjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    /// Inclusive bounds, `start <= end`.
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub boats: BoatSelection,
    /// Selected panel-type labels. Empty means nothing passes.
    pub panels: BTreeSet<String>,
}

impl FilterParams {
    /// Everything selected, date range spanning the table (or today when the
    /// table has no parsed dates at all).
    pub fn covering(table: &TripTable) -> Self {
        let (start, end) = table
            .date_span()
            .unwrap_or_else(|| (NaiveDate::default(), NaiveDate::default()));
        FilterParams {
            start,
            end,
            boats: BoatSelection::All,
            panels: table.panel_types.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter application
// ---------------------------------------------------------------------------

/// Return indices of trips passing all three predicates.
///
/// Null-date rows never satisfy the inclusive date bounds and are excluded.
/// An empty result is a legitimate "no data for this filter" state, not an
/// error; callers must render it as such.
pub fn filtered_indices(table: &TripTable, params: &FilterParams) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            let in_range = match rec.date {
                Some(d) => params.start <= d && d <= params.end,
                None => false,
            };
            in_range
                && params.boats.matches(&rec.boat)
                && params.panels.contains(&rec.panel_type)
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{TripRecord, TripTable};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn trip(date: Option<&str>, boat: &str, panel: &str) -> TripRecord {
        TripRecord {
            date: date.map(d),
            boat: boat.into(),
            panel_type: panel.into(),
            bycatch: [0; 5],
            target: [0; 3],
            total_bycatch: 0,
            total_target: 0,
        }
    }

    fn table() -> TripTable {
        TripTable::from_records(vec![
            trip(None, "Boat 1", "Control"),
            trip(Some("2024-01-05"), "Boat 1", "Control"),
            trip(Some("2024-02-10"), "Boat 2", "Subsurface"),
            trip(Some("2024-03-15"), "Boat 2", "Illuminated"),
        ])
    }

    #[test]
    fn conjunction_of_all_three_predicates() {
        let t = table();
        let params = FilterParams {
            start: d("2024-01-01"),
            end: d("2024-02-28"),
            boats: BoatSelection::Only(["Boat 2".to_string()].into()),
            panels: ["Subsurface".to_string()].into(),
        };
        assert_eq!(filtered_indices(&t, &params), vec![2]);
    }

    #[test]
    fn null_dates_never_pass_the_date_predicate() {
        let t = table();
        let params = FilterParams::covering(&t);
        // Covering params span every parsed date, yet row 0 stays out.
        assert_eq!(filtered_indices(&t, &params), vec![1, 2, 3]);
    }

    #[test]
    fn all_boats_sentinel_includes_every_boat() {
        let t = table();
        let mut params = FilterParams::covering(&t);
        params.boats = BoatSelection::All;
        assert_eq!(filtered_indices(&t, &params).len(), 3);
    }

    #[test]
    fn range_outside_all_dates_is_empty_not_an_error() {
        let t = table();
        let mut params = FilterParams::covering(&t);
        params.start = d("2030-01-01");
        params.end = d("2030-12-31");
        assert!(filtered_indices(&t, &params).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let t = table();
        let params = FilterParams {
            start: d("2024-01-01"),
            end: d("2024-12-31"),
            boats: BoatSelection::All,
            panels: ["Control".to_string(), "Subsurface".to_string()].into(),
        };
        let once = filtered_indices(&t, &params);
        let twice = filtered_indices(&t, &params);
        assert_eq!(once, twice);
        assert_eq!(once, vec![1, 2]);
    }

    #[test]
    fn empty_panel_set_passes_nothing() {
        let t = table();
        let mut params = FilterParams::covering(&t);
        params.panels.clear();
        assert!(filtered_indices(&t, &params).is_empty());
    }

    #[test]
    fn bounds_are_inclusive() {
        let t = table();
        let params = FilterParams {
            start: d("2024-01-05"),
            end: d("2024-02-10"),
            boats: BoatSelection::All,
            panels: FilterParams::covering(&t).panels,
        };
        assert_eq!(filtered_indices(&t, &params), vec![1, 2]);
    }
}
