use eframe::egui::{self, RichText, ScrollArea, Ui};
use rusty_report::report::Block;
use rusty_report::state::AppState;

use super::plot;

/// The generated report followed by the course charts.
pub fn report_view(ui: &mut Ui, state: &AppState) {
    let Some(report) = &state.report.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = if state.report.course_details.is_some() {
                "Select a course and country to generate the report."
            } else {
                "Open a course details workbook  (File → Open course details…)"
            };
            ui.heading(hint);
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new(&report.title).size(26.0));
            for (s, section) in report.sections.iter().enumerate() {
                ui.add_space(8.0);
                ui.label(RichText::new(&section.heading).size(20.0).strong());
                for (b, block) in section.blocks.iter().enumerate() {
                    match block {
                        Block::Paragraph(text) => {
                            ui.label(text.replace("**", ""));
                        }
                        Block::Table { headers, rows } => {
                            egui::Grid::new(("report_table", s, b))
                                .striped(true)
                                .show(ui, |ui: &mut Ui| {
                                    for h in headers {
                                        ui.strong(h);
                                    }
                                    ui.end_row();
                                    for row in rows {
                                        for cell in row {
                                            ui.label(cell.replace("**", ""));
                                        }
                                        ui.end_row();
                                    }
                                });
                        }
                    }
                }
            }

            if !state.report.charts.is_empty() {
                ui.add_space(12.0);
                ui.label(RichText::new("Graphs and Visualizations").size(20.0).strong());
                for (i, spec) in state.report.charts.iter().enumerate() {
                    plot::chart_plot(ui, &format!("course_chart_{i}"), spec);
                }
            }
        });
}
