use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::BoatSelection;
use crate::state::{AppState, DataSource};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match state.table() {
        Some(t) => t,
        None => {
            ui.label("No data loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the widgets.
    let boats: Vec<String> = dataset.boats.iter().cloned().collect();
    let panels: Vec<String> = dataset.panel_types.iter().cloned().collect();
    let date_span = dataset.date_span();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Date range");
            if let (Some(params), Some((min_date, max_date))) =
                (state.params.as_mut(), date_span)
            {
                let mut changed = false;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    changed |= ui
                        .add(DatePickerButton::new(&mut params.start).id_salt("start_date"))
                        .changed();
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    changed |= ui
                        .add(DatePickerButton::new(&mut params.end).id_salt("end_date"))
                        .changed();
                });
                if changed {
                    // Keep the bounds ordered and inside the data's span.
                    params.start = params.start.clamp(min_date, max_date);
                    params.end = params.end.clamp(min_date, max_date);
                    if params.start > params.end {
                        params.end = params.start;
                    }
                    state.refilter();
                }
            } else {
                ui.label("No parseable dates in this dataset.");
            }
            ui.separator();

            // ---- Boat selection ----
            ui.strong(format!("Boats ({})", boats.len()));
            let all_selected = matches!(
                state.params.as_ref().map(|p| &p.boats),
                Some(BoatSelection::All)
            );
            let mut all_checked = all_selected;
            if ui.checkbox(&mut all_checked, "All boats").changed() {
                if let Some(params) = state.params.as_mut() {
                    params.boats = if all_checked {
                        BoatSelection::All
                    } else {
                        BoatSelection::Only(Default::default())
                    };
                    state.refilter();
                }
            }
            for boat in &boats {
                let checked = match state.params.as_ref().map(|p| &p.boats) {
                    Some(BoatSelection::All) => true,
                    Some(BoatSelection::Only(set)) => set.contains(boat),
                    None => false,
                };
                let mut now = checked;
                if ui.checkbox(&mut now, boat).changed() {
                    state.toggle_boat(boat);
                }
            }
            ui.separator();

            // ---- Panel types ----
            ui.strong(format!("Panel types ({})", panels.len()));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_panels();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_panels();
                }
            });
            for panel in &panels {
                let checked = state
                    .params
                    .as_ref()
                    .map(|p| p.panels.contains(panel))
                    .unwrap_or(false);
                let text =
                    RichText::new(panel).color(state.panel_colors.color_for(panel));
                let mut now = checked;
                if ui.checkbox(&mut now, text).changed() {
                    state.toggle_panel(panel);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Data", |ui: &mut Ui| {
            if ui.button("Open workbook…").clicked() {
                open_workbook_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open CSV…").clicked() {
                open_csv_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = state.table() {
            ui.label(format!(
                "{} trips loaded, {} in filter",
                table.len(),
                state.visible_indices.len()
            ));
            if let Some(source) = &state.active {
                ui.label(RichText::new(source.describe()).weak());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn open_workbook_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open monitoring workbook")
        .add_filter("Workbook JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.select_source(DataSource::Workbook(path));
    }
}

fn open_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open bycatch CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.select_source(DataSource::Csv(path));
    }
}
