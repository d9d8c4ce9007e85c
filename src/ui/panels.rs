use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use raman_glass::config::{Delimiter, Method, ReductionConfig};
use raman_glass::data::export::export_results;
use raman_glass::water::WaterAnalysis;

use crate::state::{AppState, Status, ViewMode};

// ---------------------------------------------------------------------------
// Left side panel – settings, actions and sample list
// ---------------------------------------------------------------------------

/// Render the left side panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("Settings").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| settings(ui, &mut state.config));
            ui.separator();

            actions(ui, state);
            ui.separator();

            ui.strong("View");
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for mode in ViewMode::ALL {
                    if ui.selectable_label(state.view == mode, mode.label()).clicked() {
                        state.view = mode;
                    }
                }
            });
            ui.checkbox(&mut state.show_rois, "Show ROIs");
            ui.separator();

            sample_list(ui, state);
        });
}

fn settings(ui: &mut Ui, config: &mut ReductionConfig) {
    egui::Grid::new("settings_grid")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("Method");
            egui::ComboBox::from_id_salt("method")
                .selected_text(config.method.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for method in [Method::Ll2012, Method::Dg2017] {
                        ui.selectable_value(&mut config.method, method, method.to_string());
                    }
                });
            ui.end_row();

            ui.label("Delimiter");
            egui::ComboBox::from_id_salt("delimiter")
                .selected_text(config.delimiter.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for d in Delimiter::ALL {
                        ui.selectable_value(&mut config.delimiter, d, d.to_string());
                    }
                });
            ui.end_row();

            ui.label("Header line");
            ui.checkbox(&mut config.skip_header, "skip");
            ui.end_row();

            ui.label("Laser (nm)");
            ui.add(egui::DragValue::new(&mut config.laser_nm).speed(0.1).range(200.0..=1100.0));
            ui.end_row();

            ui.label("Temperature (°C)");
            ui.add(egui::DragValue::new(&mut config.temperature_c).speed(0.5).range(-273.0..=2000.0));
            ui.end_row();

            ui.label("Spline smoothing");
            ui.add(
                egui::DragValue::new(&mut config.spline_smoothing)
                    .speed(0.0005)
                    .range(0.0..=10.0)
                    .max_decimals(5),
            );
            ui.end_row();

            ui.label("Poly order");
            ui.add(egui::DragValue::new(&mut config.poly_order).range(1..=6));
            ui.end_row();
        });
}

fn actions(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Actions");
    let loaded = state.analysis.is_some();
    let reduced = state
        .analysis
        .as_ref()
        .is_some_and(|a| a.reduction.is_some());

    ui.horizontal_wrapped(|ui: &mut Ui| {
        if ui.add_enabled(loaded, egui::Button::new("Reduce")).clicked() {
            state.reduce();
        }
        if ui.add_enabled(reduced, egui::Button::new("Calibrate")).clicked() {
            state.calibrate();
        }
        if ui.add_enabled(reduced, egui::Button::new("Predict")).clicked() {
            state.predict();
        }
        if ui.add_enabled(loaded, egui::Button::new("External…")).clicked() {
            if let Some(dir) = rfd::FileDialog::new()
                .set_title("Folder with reference spectra")
                .pick_folder()
            {
                state.external_calibration(&dir);
            }
        }
    });

    match &state.calibration_set {
        Some(set) => {
            ui.label(format!("Calibration set: {} standards", set.samples.len()));
            if ui.small_button("Use own samples").clicked() {
                state.calibration_set = None;
            }
        }
        None => {
            ui.label("Calibration on own samples");
        }
    }
    if let Some(c) = state.analysis.as_ref().and_then(|a| a.calibration) {
        ui.label(RichText::new(c.to_string()).monospace());
    }
}

fn sample_list(ui: &mut Ui, state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        ui.label("No sample list loaded.");
        return;
    };
    let labels: Vec<String> = analysis.samples.iter().map(|s| s.label().to_string()).collect();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Samples ({})", labels.len()));
        if ui.small_button("All").clicked() {
            state.select_all(true);
        }
        if ui.small_button("None").clicked() {
            state.select_all(false);
        }
    });

    for (idx, label) in labels.iter().enumerate() {
        let mut text = RichText::new(label).color(state.color(idx));
        if state.raw.get(idx).is_some_and(Option::is_none) {
            text = text.strikethrough();
        }
        if let Some(v) = state.visible.get_mut(idx) {
            ui.checkbox(v, text);
        }
    }
}

// ---------------------------------------------------------------------------
// Bottom panel – results table
// ---------------------------------------------------------------------------

pub fn results_table(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        return;
    };
    let Some(reduction) = &analysis.reduction else {
        ui.label("Reduce the spectra to see results.");
        return;
    };
    let external = |label: &str| {
        analysis
            .external
            .as_ref()
            .and_then(|ext| ext.iter().find(|(name, _)| name == label))
            .map(|(_, e)| e.water)
    };
    let fmt = |v: Option<f64>, decimals: usize| v.map_or_else(|| "–".to_string(), |v| format!("{v:.decimals$}"));

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(120.0))
        .columns(Column::auto().at_least(70.0), 6)
        .header(20.0, |mut header| {
            for title in ["Sample", "H2O (wt%)", "Predicted", "External", "Aw", "As", "Rws"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for (idx, (name, r)) in reduction.names.iter().zip(&reduction.spectra).enumerate() {
                let sample = &analysis.samples[idx];
                let predicted = analysis.predicted.as_ref().and_then(|p| p.get(idx).copied());
                let cells = [
                    fmt(sample.water, 2),
                    fmt(predicted, 2),
                    fmt(external(name), 2),
                    format!("{:.4}", r.rw),
                    format!("{:.4}", r.rs),
                    format!("{:.4}", r.rws),
                ];
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new(name).color(state.color(idx)));
                    });
                    for cell in &cells {
                        row.col(|ui: &mut Ui| {
                            ui.monospace(cell);
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open sample list…").clicked() {
                open_sample_list_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.analysis.is_some(), egui::Button::new("Spectra folder…"))
                .clicked()
            {
                if let Some(dir) = rfd::FileDialog::new().set_title("Spectra folder").pick_folder() {
                    state.set_spectra_dir(dir);
                }
                ui.close_menu();
            }
            if ui.button("Open calibration set…").clicked() {
                open_calibration_set_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Load settings…").clicked() {
                load_settings_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save settings…").clicked() {
                save_settings_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let reduced = state
                .analysis
                .as_ref()
                .is_some_and(|a| a.reduction.is_some());
            if ui.add_enabled(reduced, egui::Button::new("Export results…")).clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(analysis) = &state.analysis {
            let shown = state.visible.iter().filter(|v| **v).count();
            ui.label(format!(
                "{} samples, {} visible",
                analysis.samples.len(),
                shown
            ));
        }

        ui.separator();

        if ui
            .selectable_label(state.minmax_scaling, "Min-Max Scaling")
            .clicked()
        {
            state.minmax_scaling = !state.minmax_scaling;
        }

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn sample_list_dialog(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Sample lists", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file()
}

pub fn open_sample_list_dialog(state: &mut AppState) {
    let Some(path) = sample_list_dialog("Open sample list") else {
        return;
    };
    match WaterAnalysis::open(&path, None) {
        Ok(analysis) => state.set_analysis(analysis),
        Err(e) => state.error(e.context(format!("loading {}", path.display()))),
    }
}

fn open_calibration_set_dialog(state: &mut AppState) {
    let Some(path) = sample_list_dialog("Open calibration set") else {
        return;
    };
    match state.load_calibration_set(&path) {
        Ok(n) => state.info(format!("calibration set with {n} standards loaded")),
        Err(e) => state.error(e),
    }
}

fn load_settings_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Load settings")
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };
    match ReductionConfig::load(&path) {
        Ok(config) => {
            state.config = config;
            state.reload_raw();
            state.info(format!("settings loaded from {}", path.display()));
        }
        Err(e) => state.error(e),
    }
}

fn save_settings_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save settings")
        .set_file_name("settings.json")
        .add_filter("JSON", &["json"])
        .save_file()
    else {
        return;
    };
    if let Err(e) = state.config.save(&path) {
        state.error(e);
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export results")
        .set_file_name("results.parquet")
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };
    let Some(analysis) = &state.analysis else {
        return;
    };
    let Some(reduction) = &analysis.reduction else {
        return;
    };
    let result = export_results(&path, &analysis.samples, reduction, analysis.predicted.as_deref());
    match result {
        Ok(()) => state.info(format!("results written to {}", path.display())),
        Err(e) => state.error(e),
    }
}
