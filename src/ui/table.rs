use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};
use rusty_report::data::Table;

const ROW_HEIGHT: f32 = 18.0;

/// Read-only grid of a table: bold header row, one line per data row.
pub fn data_grid(ui: &mut Ui, id: &str, table: &Table) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0).clip(true), table.width())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let Some(values) = table.row(row.index()) else {
                        return;
                    };
                    for value in values.values() {
                        row.col(|ui: &mut Ui| {
                            ui.label(value.to_string());
                        });
                    }
                });
            });
    });
}
