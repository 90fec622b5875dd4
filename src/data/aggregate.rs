use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{
    DailyBycatch, PanelAggregate, SpeciesCount, TripTable, BYCATCH_SPECIES,
};

// ---------------------------------------------------------------------------
// Panel summary
// ---------------------------------------------------------------------------

/// Group the filtered view by panel type and sum counts.
///
/// Only panel types present among `indices` produce a row; a panel filtered
/// out entirely yields no zero row. The ratio of a group with zero target
/// catch is `NAN`, which the UI renders as blank.
pub fn panel_summary(table: &TripTable, indices: &[usize]) -> Vec<PanelAggregate> {
    let mut groups: BTreeMap<&str, ([u64; 5], u64, u64)> = BTreeMap::new();

    for &i in indices {
        let rec = &table.records[i];
        let (species, bycatch, target) = groups.entry(&rec.panel_type).or_default();
        for (sum, &n) in species.iter_mut().zip(rec.bycatch.iter()) {
            *sum += u64::from(n);
        }
        *bycatch += u64::from(rec.total_bycatch);
        *target += u64::from(rec.total_target);
    }

    groups
        .into_iter()
        .map(|(panel, (species, bycatch, target))| PanelAggregate {
            panel_type: panel.to_string(),
            bycatch: species,
            total_bycatch: bycatch,
            total_target: target,
            bycatch_ratio: if target == 0 {
                f64::NAN
            } else {
                bycatch as f64 / target as f64
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Species breakdown (melted form)
// ---------------------------------------------------------------------------

/// Group by (panel type, species) for the caller's species sub-selection.
/// Output order: panel type, then the fixed species order.
pub fn species_breakdown(
    table: &TripTable,
    indices: &[usize],
    species: &[&'static str],
) -> Vec<SpeciesCount> {
    let mut groups: BTreeMap<(&str, usize), u64> = BTreeMap::new();

    for &i in indices {
        let rec = &table.records[i];
        for (si, name) in BYCATCH_SPECIES.iter().enumerate() {
            if species.contains(name) {
                *groups.entry((&rec.panel_type, si)).or_default() +=
                    u64::from(rec.bycatch[si]);
            }
        }
    }

    groups
        .into_iter()
        .map(|((panel, si), count)| SpeciesCount {
            panel_type: panel.to_string(),
            species: BYCATCH_SPECIES[si],
            count,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Daily series
// ---------------------------------------------------------------------------

/// Group by (date, panel type), summing `total_bycatch`. Null-date rows are
/// already excluded by the filter, so every point has a date.
pub fn daily_series(table: &TripTable, indices: &[usize]) -> Vec<DailyBycatch> {
    let mut groups: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();

    for &i in indices {
        let rec = &table.records[i];
        let Some(date) = rec.date else { continue };
        *groups.entry((date, &rec.panel_type)).or_default() += u64::from(rec.total_bycatch);
    }

    groups
        .into_iter()
        .map(|((date, panel), total)| DailyBycatch {
            date,
            panel_type: panel.to_string(),
            total_bycatch: total,
        })
        .collect()
}
