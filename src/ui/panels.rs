use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_report::data::CellValue;
use rusty_report::export::{ExportArtifact, TableFormat};
use rusty_report::report::TemplateKind;
use rusty_report::state::{AppState, ReportFormat};

use super::View;

const SPREADSHEETS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];
const TABLE_FILES: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods", "csv", "json", "parquet", "pq"];

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, view: &mut View) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open catalog…").clicked() {
                ui.close_menu();
                if let Some(path) = pick_file("Open course catalog", TABLE_FILES) {
                    let outcome = state.load_catalog(&path);
                    state.report_outcome("Loading catalog", outcome);
                    *view = View::Explorer;
                }
            }
            ui.separator();
            if ui.button("Open course details…").clicked() {
                ui.close_menu();
                if let Some(path) = pick_file("Open course details", SPREADSHEETS) {
                    let outcome = state.load_course_file(&path);
                    state.report_outcome("Loading course details", outcome);
                    *view = View::Report;
                }
            }
            if ui.button("Open collections…").clicked() {
                ui.close_menu();
                if let Some(path) = pick_file("Open collection workbook", SPREADSHEETS) {
                    let outcome = state.load_collections(&path);
                    state.report_outcome("Loading collections", outcome);
                }
            }
            if ui.button("Open university details…").clicked() {
                ui.close_menu();
                if let Some(path) = pick_file("Open university details", SPREADSHEETS) {
                    let outcome = state.load_university_details(&path);
                    state.report_outcome("Loading university details", outcome);
                }
            }
        });

        ui.menu_button("Export", |ui: &mut Ui| {
            ui.label(RichText::new("Filtered data").strong());
            for format in TableFormat::ALL {
                let enabled = state.explorer.result.is_some();
                if ui.add_enabled(enabled, egui::Button::new(format.label())).clicked() {
                    ui.close_menu();
                    let artifact = state.export_explorer(format);
                    save(state, artifact);
                }
            }
            ui.separator();
            ui.label(RichText::new("Report").strong());
            for format in [ReportFormat::Docx, ReportFormat::Html] {
                let enabled = state.report.report.is_some();
                if ui.add_enabled(enabled, egui::Button::new(format.label())).clicked() {
                    ui.close_menu();
                    let artifact = state.export_report(format);
                    save(state, artifact);
                }
            }
        });

        ui.separator();
        ui.selectable_value(view, View::Explorer, "Explorer");
        ui.selectable_value(view, View::Report, "Report");
        ui.separator();

        match view {
            View::Explorer => {
                if let (Some(name), Some(source)) = (&state.explorer.source_name, &state.explorer.source) {
                    let visible = state.explorer.result.as_ref().map_or(0, |t| t.len());
                    ui.label(format!("{name}: {} rows, {visible} matching", source.len()));
                }
            }
            View::Report => {
                if let Some(table) = &state.report.course_details {
                    ui.label(format!(
                        "{} courses, {} collections",
                        table.len(),
                        state.report.collections.len()
                    ));
                }
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – explorer selectors
// ---------------------------------------------------------------------------

pub fn explorer_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    if state.explorer.source.is_none() {
        ui.label("No catalog loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the loop.
    let columns: Vec<String> = state.explorer.selections.keys().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                let options = state.filter_options(col);
                let current = state.explorer.selections.get(col).cloned().flatten();

                ui.strong(format!("Select {col}"));
                let mut picked: Option<Option<CellValue>> = None;
                egui::ComboBox::from_id_salt(("filter", col))
                    .selected_text(current.as_ref().map_or("(any)".to_string(), |v| v.to_string()))
                    .show_ui(ui, |ui: &mut Ui| {
                        if ui.selectable_label(current.is_none(), "(any)").clicked() {
                            picked = Some(None);
                        }
                        for value in &options {
                            if ui
                                .selectable_label(current.as_ref() == Some(value), value.to_string())
                                .clicked()
                            {
                                picked = Some(Some(value.clone()));
                            }
                        }
                    });
                if let Some(value) = picked {
                    state.select_filter(col, value);
                }
                ui.add_space(4.0);
            }

            ui.separator();
            ui.strong("Select column for chart");
            let current = state.explorer.chart_column.clone().unwrap_or_default();
            let chart_columns = state.config.chart_columns.clone();
            egui::ComboBox::from_id_salt("chart_column")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &chart_columns {
                        if ui.selectable_label(current == *col, col).clicked() {
                            state.explorer.chart_column = Some(col.clone());
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Left side panel – report selectors
// ---------------------------------------------------------------------------

pub fn report_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Report");
    ui.separator();

    let Some(workbook) = &state.report.course_workbook else {
        ui.label("No course details loaded.");
        return;
    };
    let sheets: Vec<String> = workbook.sheet_names().into_iter().map(str::to_string).collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Sheet");
            let current = state.report.course_sheet.clone().unwrap_or_default();
            let mut picked_sheet = None;
            egui::ComboBox::from_id_salt("course_sheet")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for sheet in &sheets {
                        if ui.selectable_label(current == *sheet, sheet).clicked() {
                            picked_sheet = Some(sheet.clone());
                        }
                    }
                });
            if let Some(sheet) = picked_sheet {
                let outcome = state.select_course_sheet(&sheet).map_err(anyhow::Error::from);
                state.report_outcome("Selecting sheet", outcome);
            }
            ui.add_space(4.0);

            if state.report.course_details.is_none() {
                ui.label("The selected sheet is not a course details sheet.");
                return;
            }

            let course = value_selector(ui, "Course Name", state.report.course_name.as_ref(), &state.course_options());
            if let Some(v) = course {
                state.select_course(v);
            }
            let country = value_selector(ui, "Country", state.report.country.as_ref(), &state.country_options());
            if let Some(v) = country {
                state.select_country(v);
            }

            ui.strong("Template");
            let current = state.report.template;
            let mut picked_template = None;
            egui::ComboBox::from_id_salt("template")
                .selected_text(current.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in TemplateKind::ALL {
                        if ui.selectable_label(current == kind, kind.label()).clicked() {
                            picked_template = Some(kind);
                        }
                    }
                });
            if let Some(kind) = picked_template {
                state.set_template(kind);
            }

            ui.separator();
            ui.label(format!("Collections: {}", state.report.collections.len()));
            for skipped in &state.report.skipped {
                ui.label(
                    RichText::new(format!(
                        "Skipped '{}': missing {}",
                        skipped.sheet_name,
                        skipped.missing.join(", ")
                    ))
                    .color(Color32::YELLOW),
                );
            }
            ui.label(if state.report.details.is_some() {
                "University details loaded"
            } else {
                "No university details"
            });
        });
}

fn value_selector(ui: &mut Ui, label: &str, current: Option<&CellValue>, options: &[CellValue]) -> Option<CellValue> {
    ui.strong(format!("Select {label}"));
    let mut picked = None;
    egui::ComboBox::from_id_salt(label)
        .selected_text(current.map(|v| v.to_string()).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for value in options {
                if ui.selectable_label(current == Some(value), value.to_string()).clicked() {
                    picked = Some(value.clone());
                }
            }
        });
    ui.add_space(4.0);
    picked
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_file(title: &str, extensions: &[&str]) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", extensions)
        .pick_file()
}

fn save(state: &mut AppState, artifact: anyhow::Result<ExportArtifact>) {
    let Some(artifact) = state.report_outcome("Export", artifact) else {
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save export")
        .set_file_name(&artifact.file_name)
        .add_filter(artifact.mime, &[artifact.extension()])
        .save_file()
    else {
        return;
    };
    let outcome = artifact.write_to(&path);
    if state.report_outcome("Export", outcome).is_some() {
        state.status_message = Some(format!("Saved {}", path.display()));
    }
}
