use eframe::egui;
use rusty_report::config::AppConfig;
use rusty_report::state::AppState;

use crate::ui::{View, panels, plot, report, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyReportApp {
    pub state: AppState,
    pub view: View,
}

impl RustyReportApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
            view: View::default(),
        }
    }
}

impl eframe::App for RustyReportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &mut self.view);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("selector_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| match self.view {
                View::Explorer => panels::explorer_panel(ui, &mut self.state),
                View::Report => panels::report_panel(ui, &mut self.state),
            });

        // ---- Central panel: data and charts ----
        egui::CentralPanel::default().show(ctx, |ui| match self.view {
            View::Explorer => explorer_view(ui, &self.state),
            View::Report => report::report_view(ui, &self.state),
        });
    }
}

fn explorer_view(ui: &mut egui::Ui, state: &AppState) {
    let Some(display) = state.explorer_display() else {
        ui.centered_and_justified(|ui| {
            let hint = if state.explorer.source.is_some() {
                "No data available for the selected filters."
            } else {
                "Open a catalog to explore it  (File → Open catalog…)"
            };
            ui.heading(hint);
        });
        return;
    };

    let title = state
        .explorer
        .selections
        .iter()
        .map(|(col, v)| match v {
            Some(v) => format!("{col}: {v}"),
            None => format!("{col}: any"),
        })
        .collect::<Vec<_>>()
        .join("  –  ");
    ui.heading(format!("Data for {title}"));

    let grid_height = ui.available_height() * 0.5;
    egui::ScrollArea::horizontal()
        .id_salt("explorer_grid_scroll")
        .max_height(grid_height)
        .show(ui, |ui| table::data_grid(ui, "explorer_grid", &display));

    ui.separator();
    ui.heading("Data Visualization");
    match state.explorer_chart() {
        Some(Ok(spec)) => plot::chart_plot(ui, "explorer_chart", &spec),
        Some(Err(e)) => {
            ui.label(e.to_string());
        }
        None => {
            ui.label("Select a column to chart.");
        }
    }
}
