use eframe::egui::{Color32, Ui};
use egui_plot::{Line, LineStyle, Plot, PlotPoints, PlotUi, VLine};

use crate::color::baseline_color;
use crate::state::{AppState, ViewMode};

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// Gaps wider than this (cm⁻¹) split a curve into separate segments.
const GAP: f64 = 50.0;

/// Render the spectral plot in the central panel.
pub fn spectral_plot(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sample list to view spectra  (File → Open sample list…)");
        });
        return;
    };

    Plot::new("spectral_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Raman shift (cm⁻¹)")
        .y_axis_label(if state.minmax_scaling { "Scaled intensity" } else { "Intensity" })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| match state.view {
            ViewMode::Raw => {
                for (idx, sample) in analysis.samples.iter().enumerate() {
                    let Some(Some(sp)) = state.raw.get(idx) else {
                        continue;
                    };
                    if !state.is_visible(idx) {
                        continue;
                    }
                    let color = state.color(idx);
                    curve(plot_ui, state, sample.label(), &sp.x, &sp.y, color, false);
                    if state.show_rois {
                        for roi in &sample.rois {
                            for edge in [roi.start, roi.end] {
                                plot_ui.vline(
                                    VLine::new(edge)
                                        .color(color.gamma_multiply(0.5))
                                        .style(LineStyle::dotted_dense()),
                                );
                            }
                        }
                    }
                }
            }
            ViewMode::Baseline | ViewMode::Corrected => {
                let Some(reduction) = &analysis.reduction else {
                    return;
                };
                for (idx, (name, r)) in reduction.names.iter().zip(&reduction.spectra).enumerate() {
                    if !state.is_visible(idx) {
                        continue;
                    }
                    let color = state.color(idx);
                    if state.view == ViewMode::Baseline {
                        curve(plot_ui, state, name, &reduction.x, &r.y, color, false);
                        let base_name = format!("{name} baseline");
                        curve(plot_ui, state, &base_name, &reduction.x, &r.baseline, baseline_color(color), true);
                    } else {
                        curve(plot_ui, state, name, &reduction.x, &r.corrected, color, false);
                    }
                }
            }
            ViewMode::External => {
                let Some(external) = &analysis.external else {
                    return;
                };
                for (idx, sample) in analysis.samples.iter().enumerate() {
                    if !state.is_visible(idx) {
                        continue;
                    }
                    let label = sample.label();
                    let Some((_, est)) = external.iter().find(|(name, _)| name == label) else {
                        continue;
                    };
                    let color = state.color(idx);
                    curve(plot_ui, state, label, &est.sample.x, &est.sample.y, color, false);
                    let base_name = format!("{label} baseline");
                    curve(plot_ui, state, &base_name, &est.sample.x, &est.sample_fit.baseline, baseline_color(color), true);
                    let ref_name = format!("{label} reference");
                    curve(plot_ui, state, &ref_name, &est.reference.x, &est.reference.y, Color32::GRAY, false);
                }
                if state.show_rois {
                    for bound in [state.external_options.low_bound, state.external_options.high_bound] {
                        plot_ui.vline(VLine::new(bound).color(Color32::DARK_GRAY).style(LineStyle::dashed_loose()));
                    }
                }
            }
        });
}

/// Plot one curve, split at axis gaps, optionally min–max scaled.
fn curve(plot_ui: &mut PlotUi, state: &AppState, name: &str, x: &[f64], y: &[f64], color: Color32, dashed: bool) {
    let y_values: Vec<f64> = if state.minmax_scaling {
        let min = y.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if range.abs() < f64::EPSILON {
            vec![0.0; y.len()]
        } else {
            y.iter().map(|&yi| (yi - min) / range).collect()
        }
    } else {
        y.to_vec()
    };

    let mut start = 0;
    for end in 1..=x.len() {
        if end < x.len() && x[end] - x[end - 1] <= GAP {
            continue;
        }
        let points: PlotPoints = x[start..end]
            .iter()
            .zip(&y_values[start..end])
            .map(|(&xi, &yi)| [xi, yi])
            .collect();
        let mut line = Line::new(points).name(name).color(color).width(1.5);
        if dashed {
            line = line.style(LineStyle::dashed_loose());
        }
        plot_ui.line(line);
        start = end;
    }
}
