use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::color::PanelColors;
use crate::data::aggregate::panel_summary;
use crate::data::filter::{filtered_indices, BoatSelection, FilterParams};
use crate::data::ingest::{load_csv, load_workbook, JsonWorkbook};
use crate::data::model::{PanelAggregate, TripTable, BYCATCH_SPECIES};
use crate::data::normalize::normalize;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Data sources
// ---------------------------------------------------------------------------

/// Where the session's data came from. Used as the ingestion-cache key, so a
/// repeated selection of the same source never re-reads it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DataSource {
    /// Workbook export with one sheet per boat (source A).
    Workbook(PathBuf),
    /// Uploaded delimited file (source B).
    Csv(PathBuf),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Workbook(p) => format!("workbook {}", p.display()),
            DataSource::Csv(p) => format!("CSV {}", p.display()),
        }
    }

    fn ingest(&self) -> Result<TripTable> {
        match self {
            DataSource::Workbook(path) => {
                let workbook = JsonWorkbook::open(path)?;
                normalize(&load_workbook(&workbook)?)
            }
            DataSource::Csv(path) => normalize(std::slice::from_ref(&load_csv(path)?)),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    TotalBycatch,
    SpeciesBreakdown,
    BycatchRatio,
    Heatmap,
    OverTime,
}

pub const TABS: [(Tab, &str); 5] = [
    (Tab::TotalBycatch, "Total Bycatch"),
    (Tab::SpeciesBreakdown, "Species Breakdown"),
    (Tab::BycatchRatio, "Bycatch Ratio"),
    (Tab::Heatmap, "Heatmap"),
    (Tab::OverTime, "Over Time"),
];

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Session ingestion cache, keyed by source selection. Filter changes
    /// only ever touch the in-memory table; reload is explicit.
    cache: BTreeMap<DataSource, TripTable>,

    /// Which cached source is on screen.
    pub active: Option<DataSource>,

    /// Current filter choices (None until a source loads).
    pub params: Option<FilterParams>,

    /// Indices of trips passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Per-panel aggregates over the visible trips (cached).
    pub summary: Vec<PanelAggregate>,

    /// Species shown in the breakdown tab.
    pub species_selection: BTreeSet<&'static str>,

    /// Active chart tab.
    pub tab: Tab,

    /// Stable panel-type colours for every chart.
    pub panel_colors: PanelColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: BTreeMap::new(),
            active: None,
            params: None,
            visible_indices: Vec::new(),
            summary: Vec::new(),
            species_selection: BTreeSet::from(BYCATCH_SPECIES),
            tab: Tab::TotalBycatch,
            panel_colors: PanelColors::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// The active session table, if a source has been loaded.
    pub fn table(&self) -> Option<&TripTable> {
        self.active.as_ref().and_then(|src| self.cache.get(src))
    }

    /// Switch to a source, ingesting it only when not already cached.
    /// On failure the session is left without data and the message is shown;
    /// downstream stages never run on a partial table.
    pub fn select_source(&mut self, source: DataSource) {
        if !self.cache.contains_key(&source) {
            match source.ingest() {
                Ok(table) => {
                    log::info!(
                        "ingested {} trip(s) from {}",
                        table.len(),
                        source.describe()
                    );
                    self.cache.insert(source.clone(), table);
                }
                Err(e) => {
                    log::error!("failed to load {}: {e}", source.describe());
                    self.active = None;
                    self.params = None;
                    self.visible_indices.clear();
                    self.summary.clear();
                    self.status_message = Some(format!("Error loading data: {e}"));
                    return;
                }
            }
        }

        self.active = Some(source);
        self.status_message = None;
        let table = self.table().cloned().unwrap_or_default();
        self.params = Some(FilterParams::covering(&table));
        self.panel_colors = PanelColors::new(&table.panel_types);
        self.refilter();
    }

    /// Explicit cache invalidation: drop the active entry and ingest again.
    pub fn reload(&mut self) {
        if let Some(source) = self.active.take() {
            self.cache.remove(&source);
            self.select_source(source);
        }
    }

    /// Recompute visible indices and aggregates after a parameter change.
    pub fn refilter(&mut self) {
        let (Some(table), Some(params)) = (
            self.active.as_ref().and_then(|s| self.cache.get(s)),
            self.params.as_ref(),
        ) else {
            self.visible_indices.clear();
            self.summary.clear();
            return;
        };
        self.visible_indices = filtered_indices(table, params);
        self.summary = panel_summary(table, &self.visible_indices);
    }

    /// Toggle one boat in an explicit selection; the "All boats" sentinel is
    /// handled separately by the side panel.
    pub fn toggle_boat(&mut self, boat: &str) {
        let Some(params) = self.params.as_mut() else { return };
        let mut set = match &params.boats {
            BoatSelection::All => self
                .active
                .as_ref()
                .and_then(|s| self.cache.get(s))
                .map(|t| t.boats.clone())
                .unwrap_or_default(),
            BoatSelection::Only(set) => set.clone(),
        };
        if !set.remove(boat) {
            set.insert(boat.to_string());
        }
        params.boats = BoatSelection::Only(set);
        self.refilter();
    }

    /// Toggle one panel type in the selection.
    pub fn toggle_panel(&mut self, panel: &str) {
        let Some(params) = self.params.as_mut() else { return };
        if !params.panels.remove(panel) {
            params.panels.insert(panel.to_string());
        }
        self.refilter();
    }

    /// Select every panel type / no panel type.
    pub fn select_all_panels(&mut self) {
        let all = self.table().map(|t| t.panel_types.clone()).unwrap_or_default();
        if let Some(params) = self.params.as_mut() {
            params.panels = all;
        }
        self.refilter();
    }

    pub fn select_no_panels(&mut self) {
        if let Some(params) = self.params.as_mut() {
            params.panels.clear();
        }
        self.refilter();
    }
}
