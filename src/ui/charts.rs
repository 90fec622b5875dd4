use std::collections::BTreeMap;

use chrono::NaiveDate;
use eframe::egui::{self, Align2, FontId, RichText, Sense, Ui, vec2};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::color::{heat_color, heat_text_color};
use crate::data::aggregate::{daily_series, species_breakdown};
use crate::data::model::{PanelAggregate, BYCATCH_SPECIES};
use crate::state::{AppState, Tab, TABS};

// ---------------------------------------------------------------------------
// Central panel – overview, tabs, charts
// ---------------------------------------------------------------------------

/// Render the central dashboard panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.table() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a data source to begin  (Data → Open workbook… / Open CSV…)");
        });
        return;
    };

    // Precompute the overview numbers so the table borrow ends before the
    // tab widgets need to mutate state.
    let n_visible = state.visible_indices.len();
    let span = {
        let mut dates = state
            .visible_indices
            .iter()
            .filter_map(|&i| table.records[i].date);
        dates.next().map(|first| {
            dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
        })
    };

    if n_visible == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data available with the selected filters.");
        });
        return;
    }

    let total_bycatch: u64 = state.summary.iter().map(|a| a.total_bycatch).sum();
    let total_target: u64 = state.summary.iter().map(|a| a.total_target).sum();

    // ---- Overview strip ----
    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Trips", &n_visible.to_string());
        if let Some((lo, hi)) = span {
            metric(ui, "Date range", &format!("{lo} to {hi}"));
        }
        metric(ui, "Total bycatch", &total_bycatch.to_string());
        metric(ui, "Total target catch", &total_target.to_string());
    });
    ui.separator();

    // ---- Tab selector ----
    ui.horizontal(|ui: &mut Ui| {
        for (tab, label) in TABS {
            if ui.selectable_label(state.tab == tab, label).clicked() {
                state.tab = tab;
            }
        }
    });
    ui.separator();

    match state.tab {
        Tab::TotalBycatch => total_bycatch_tab(ui, state),
        Tab::SpeciesBreakdown => species_breakdown_tab(ui, state),
        Tab::BycatchRatio => ratio_tab(ui, state),
        Tab::Heatmap => heatmap_tab(ui, &state.summary),
        Tab::OverTime => over_time_tab(ui, state),
    }
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak().small());
        ui.label(RichText::new(value).strong().size(18.0));
    });
    ui.add_space(24.0);
}

// ---------------------------------------------------------------------------
// Tab 1: total bycatch per panel type
// ---------------------------------------------------------------------------

fn total_bycatch_tab(ui: &mut Ui, state: &AppState) {
    let bars: Vec<Bar> = state
        .summary
        .iter()
        .enumerate()
        .map(|(i, agg)| {
            Bar::new(i as f64, agg.total_bycatch as f64)
                .name(&agg.panel_type)
                .fill(state.panel_colors.color_for(&agg.panel_type))
                .width(0.6)
        })
        .collect();
    panel_bar_chart(ui, "total_bycatch_chart", "Total bycatch", bars, &state.summary);

    ui.add_space(8.0);
    egui::Grid::new("total_bycatch_table")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Panel type");
            ui.strong("Total bycatch");
            ui.end_row();
            for agg in &state.summary {
                ui.label(&agg.panel_type);
                ui.label(agg.total_bycatch.to_string());
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Tab 2: bycatch by species and panel type
// ---------------------------------------------------------------------------

fn species_breakdown_tab(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Species:");
        for name in BYCATCH_SPECIES {
            let mut on = state.species_selection.contains(name);
            if ui.checkbox(&mut on, name).changed() {
                if on {
                    state.species_selection.insert(name);
                } else {
                    state.species_selection.remove(name);
                }
            }
        }
    });

    let selection: Vec<&'static str> = state.species_selection.iter().copied().collect();
    if selection.is_empty() {
        ui.label("Select at least one species.");
        return;
    }

    let Some(table) = state.table() else { return };
    let rows = species_breakdown(table, &state.visible_indices, &selection);

    // One bar cluster per species, one bar per panel type within it.
    let panels: Vec<String> = state.summary.iter().map(|a| a.panel_type.clone()).collect();
    let cluster = (panels.len() + 1) as f64;
    let bars: Vec<Bar> = rows
        .iter()
        .map(|row| {
            let si = selection.iter().position(|s| *s == row.species).unwrap_or(0);
            let pi = panels.iter().position(|p| *p == row.panel_type).unwrap_or(0);
            Bar::new(si as f64 * cluster + pi as f64, row.count as f64)
                .name(format!("{} – {}", row.species, row.panel_type))
                .fill(state.panel_colors.color_for(&row.panel_type))
                .width(0.8)
        })
        .collect();

    let labels: Vec<String> = selection.iter().map(|s| s.to_string()).collect();
    let offset = (panels.len() as f64 - 1.0) / 2.0;
    Plot::new("species_breakdown_chart")
        .height(320.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let slot = (mark.value - offset) / cluster;
            let idx = slot.round();
            if (slot - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Bycatch by species"));
        });

    ui.add_space(8.0);
    egui::Grid::new("species_breakdown_table")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Panel type");
            ui.strong("Species");
            ui.strong("Count");
            ui.end_row();
            for row in &rows {
                ui.label(&row.panel_type);
                ui.label(row.species);
                ui.label(row.count.to_string());
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Tab 3: bycatch ratio per panel type
// ---------------------------------------------------------------------------

fn ratio_tab(ui: &mut Ui, state: &AppState) {
    // NAN ratios (no target catch in the group) get no bar; the table shows
    // a dash instead.
    let bars: Vec<Bar> = state
        .summary
        .iter()
        .enumerate()
        .filter(|(_, agg)| agg.bycatch_ratio.is_finite())
        .map(|(i, agg)| {
            Bar::new(i as f64, agg.bycatch_ratio)
                .name(&agg.panel_type)
                .fill(state.panel_colors.color_for(&agg.panel_type))
                .width(0.6)
        })
        .collect();
    panel_bar_chart(ui, "ratio_chart", "Bycatch / target", bars, &state.summary);

    ui.add_space(8.0);
    egui::Grid::new("ratio_table")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Panel type");
            ui.strong("Bycatch ratio");
            ui.end_row();
            for agg in &state.summary {
                ui.label(&agg.panel_type);
                if agg.bycatch_ratio.is_finite() {
                    ui.label(format!("{:.4}", agg.bycatch_ratio));
                } else {
                    ui.label("—");
                }
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Tab 4: species × panel-type heatmap
// ---------------------------------------------------------------------------

fn heatmap_tab(ui: &mut Ui, summary: &[PanelAggregate]) {
    let max = summary
        .iter()
        .flat_map(|a| a.bycatch.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    egui::Grid::new("heatmap_grid")
        .spacing([4.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for agg in summary {
                ui.strong(&agg.panel_type);
            }
            ui.end_row();

            for (si, species) in BYCATCH_SPECIES.iter().enumerate() {
                ui.strong(*species);
                for agg in summary {
                    let count = agg.bycatch[si];
                    heat_cell(ui, count, count as f64 / max);
                }
                ui.end_row();
            }
        });
}

fn heat_cell(ui: &mut Ui, count: u64, t: f64) {
    let (rect, _) = ui.allocate_exact_size(vec2(72.0, 30.0), Sense::hover());
    ui.painter().rect_filled(rect, 3.0, heat_color(t));
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        count.to_string(),
        FontId::proportional(13.0),
        heat_text_color(t),
    );
}

// ---------------------------------------------------------------------------
// Tab 5: daily bycatch over time
// ---------------------------------------------------------------------------

fn over_time_tab(ui: &mut Ui, state: &AppState) {
    let Some(table) = state.table() else { return };
    let series = daily_series(table, &state.visible_indices);

    // One line per panel type, x = days since CE epoch.
    let mut per_panel: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for point in &series {
        per_panel
            .entry(point.panel_type.as_str())
            .or_default()
            .push([day_number(point.date), point.total_bycatch as f64]);
    }

    Plot::new("daily_bycatch_chart")
        .height(360.0)
        .legend(egui_plot::Legend::default())
        .x_axis_formatter(|mark, _range| {
            NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .y_axis_label("Total bycatch")
        .show(ui, |plot_ui| {
            for (panel, points) in per_panel {
                let line = Line::new(PlotPoints::from(points))
                    .name(panel)
                    .color(state.panel_colors.color_for(panel))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

fn day_number(date: NaiveDate) -> f64 {
    use chrono::Datelike;
    date.num_days_from_ce() as f64
}

// ---------------------------------------------------------------------------
// Shared: bar chart keyed by panel type
// ---------------------------------------------------------------------------

fn panel_bar_chart(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    bars: Vec<Bar>,
    summary: &[PanelAggregate],
) {
    let labels: Vec<String> = summary.iter().map(|a| a.panel_type.clone()).collect();
    Plot::new(id.to_string())
        .height(320.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .y_axis_label(y_label.to_string())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(y_label));
        });
}
