use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};
use rusty_report::chart::{ChartKind, ChartSpec};

use super::color32;

// ---------------------------------------------------------------------------
// Chart plot
// ---------------------------------------------------------------------------

/// Interactive version of a chart. Bars and bubbles are placed at x = 0, 1,
/// 2, …; labels appear in the legend and on hover.
pub fn chart_plot(ui: &mut Ui, id: &str, spec: &ChartSpec) {
    ui.strong(&spec.title);
    if spec.is_empty() {
        ui.label("No numeric values to plot.");
        return;
    }

    let colors = spec.colors();
    let max_size = spec
        .points
        .iter()
        .filter_map(|p| p.size)
        .fold(0.0, f64::max);

    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label(spec.x_label.as_str())
        .y_axis_label(spec.y_label.as_str())
        .height(280.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| match spec.kind {
            ChartKind::Bar => {
                let bars: Vec<Bar> = spec
                    .points
                    .iter()
                    .zip(&colors)
                    .enumerate()
                    .map(|(i, (p, c))| {
                        Bar::new(i as f64, p.value)
                            .name(&p.label)
                            .fill(color32(*c))
                            .width(0.7)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&spec.y_label));
            }
            ChartKind::Bubble => {
                for (i, (p, c)) in spec.points.iter().zip(&colors).enumerate() {
                    let radius = match p.size {
                        Some(s) if max_size > 0.0 && s > 0.0 => 3.0 + 15.0 * (s / max_size) as f32,
                        _ => 3.0,
                    };
                    let point: PlotPoints = vec![[i as f64, p.value]].into();
                    plot_ui.points(
                        Points::new(point)
                            .radius(radius)
                            .color(color32(*c))
                            .name(&p.label),
                    );
                }
            }
        });
}
