use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::chart::{self, ChartSpec, RenderedChart, column_chart, course_charts};
use crate::config::AppConfig;
use crate::data::clean::{clean_table, drop_zero_columns, transpose};
use crate::data::filter::{FilterCriteria, ensure_not_empty};
use crate::data::{CellValue, Table, Workbook, loader};
use crate::error::{DataError, DataResult};
use crate::export::{self, ExportArtifact, TableFormat};
use crate::report::{
    Collection, CourseContext, Report, SkippedSheet, TemplateKind, UniversityDetails,
    collections_from_workbook, validate_course_details,
};
use crate::report::templates::{COUNTRY, COURSE_NAME};

// ---------------------------------------------------------------------------
// Explorer: filter one catalog table, chart a column, export the result
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ExplorerState {
    /// Loaded catalog (None until the user opens a file).
    pub source: Option<Table>,
    pub source_name: Option<String>,

    /// Selected value per filter column; `None` matches every row.
    pub selections: BTreeMap<String, Option<CellValue>>,

    /// Column plotted below the grid.
    pub chart_column: Option<String>,

    /// Filtered and cleaned rows, before any transposition (cached).
    pub result: Option<Table>,
}

// ---------------------------------------------------------------------------
// Report builder: course details + collections + university details
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ReportState {
    pub course_workbook: Option<Workbook>,
    pub course_sheet: Option<String>,
    /// The selected course sheet, once it passed validation.
    pub course_details: Option<Table>,

    pub collections: Vec<Collection>,
    pub skipped: Vec<SkippedSheet>,
    pub details: Option<UniversityDetails>,

    pub course_name: Option<CellValue>,
    pub country: Option<CellValue>,
    pub template: TemplateKind,

    /// Last successful render for the current selection.
    pub report: Option<Report>,
    pub charts: Vec<ChartSpec>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Every pipeline step reads its
/// inputs from here and writes its output back; nothing is hidden in widgets.
pub struct AppState {
    pub config: AppConfig,
    pub explorer: ExplorerState,
    pub report: ReportState,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let report = ReportState {
            template: config.default_template,
            ..ReportState::default()
        };
        Self {
            config,
            explorer: ExplorerState::default(),
            report,
            status_message: None,
        }
    }

    /// Record the outcome of a user action as the status line.
    pub fn report_outcome<T>(&mut self, action: &str, outcome: Result<T>) -> Option<T> {
        match outcome {
            Ok(v) => Some(v),
            Err(e) => {
                log::error!("{action} failed: {e:#}");
                self.status_message = Some(format!("{action} failed: {e:#}"));
                None
            }
        }
    }

    // -- Explorer ----------------------------------------------------------

    pub fn load_catalog(&mut self, path: &Path) -> Result<()> {
        let table = loader::load_table(path, None)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.set_catalog(name, table);
        Ok(())
    }

    /// Ingest a newly loaded catalog and reset the explorer selections.
    pub fn set_catalog(&mut self, name: String, table: Table) {
        self.explorer.selections = self
            .config
            .filter_columns
            .iter()
            .filter(|c| table.has_column(c))
            .map(|c| (c.clone(), None))
            .collect();
        self.explorer.chart_column = self.config.chart_columns.first().cloned();
        self.status_message = Some(format!("Loaded {name}: {} rows", table.len()));
        self.explorer.source = Some(table);
        self.explorer.source_name = Some(name);
        self.refresh_explorer();
    }

    /// Distinct non-missing values offered for a filter column.
    pub fn filter_options(&self, column: &str) -> Vec<CellValue> {
        self.explorer
            .source
            .as_ref()
            .and_then(|t| t.unique_values(column).ok())
            .map(|values| values.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn select_filter(&mut self, column: &str, value: Option<CellValue>) {
        self.explorer.selections.insert(column.to_string(), value);
        self.refresh_explorer();
    }

    pub fn explorer_criteria(&self) -> FilterCriteria {
        self.explorer
            .selections
            .iter()
            .fold(FilterCriteria::new(), |c, (col, value)| c.where_eq_opt(col.clone(), value.clone()))
    }

    /// Recompute the cached explorer result after a selection change.
    pub fn refresh_explorer(&mut self) {
        let Some(source) = &self.explorer.source else {
            return;
        };
        let criteria = self.explorer_criteria();
        match explore(source, &criteria, &self.config) {
            Ok(table) => {
                log::debug!("Explorer: {criteria} -> {} rows x {} columns", table.len(), table.width());
                self.explorer.result = Some(table);
            }
            Err(DataError::EmptyResult(_)) => {
                self.explorer.result = None;
                self.status_message = Some("No data available for the selected filters.".into());
            }
            Err(e) => {
                self.explorer.result = None;
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// The grid view of the explorer result, transposed when configured.
    pub fn explorer_display(&self) -> Option<Table> {
        let result = self.explorer.result.as_ref()?;
        Some(if self.config.transpose_explorer {
            transpose(result)
        } else {
            result.clone()
        })
    }

    /// Chart of the selected column over the explorer result. `None` when
    /// nothing is loaded or selected; an error when the column was dropped.
    pub fn explorer_chart(&self) -> Option<DataResult<ChartSpec>> {
        let result = self.explorer.result.as_ref()?;
        let column = self.explorer.chart_column.as_deref()?;
        Some(column_chart(result, column, Some(&self.config.chart_label_column)))
    }

    pub fn export_explorer(&self, format: TableFormat) -> Result<ExportArtifact> {
        let table = self
            .explorer_display()
            .ok_or_else(|| DataError::EmptyResult(self.explorer_criteria().to_string()))?;
        export::export_table(&table, format)
    }

    // -- Report ------------------------------------------------------------

    pub fn load_course_file(&mut self, path: &Path) -> Result<()> {
        let workbook = loader::load_file(path)?;
        self.set_course_workbook(workbook)?;
        Ok(())
    }

    /// Keep the workbook and select its first sheet. The workbook stays
    /// loaded when that sheet fails validation so another one can be picked.
    pub fn set_course_workbook(&mut self, workbook: Workbook) -> DataResult<()> {
        let first = workbook.first().map(|s| s.name.clone());
        self.report.course_workbook = Some(workbook);
        match first {
            Some(name) => self.select_course_sheet(&name),
            None => Err(DataError::MissingSheet("(any)".into())),
        }
    }

    pub fn select_course_sheet(&mut self, name: &str) -> DataResult<()> {
        self.report.course_sheet = Some(name.to_string());
        self.report.course_details = None;
        self.report.report = None;
        self.report.charts.clear();

        let workbook = self
            .report
            .course_workbook
            .as_ref()
            .ok_or_else(|| DataError::MissingSheet(name.to_string()))?;
        let table = workbook.sheet(name)?.clone();
        validate_course_details(&table)?;

        self.report.charts = match course_charts(&table) {
            Ok(charts) => charts,
            Err(e) => {
                log::warn!("Course charts unavailable: {e}");
                Vec::new()
            }
        };
        self.report.course_name = first_value(&table, COURSE_NAME);
        self.report.country = first_value(&table, COUNTRY);
        self.report.course_details = Some(table);
        self.status_message = Some(format!("Course details loaded from sheet '{name}'"));
        self.regenerate_report();
        Ok(())
    }

    pub fn load_collections(&mut self, path: &Path) -> Result<()> {
        let workbook = loader::load_file(path)?;
        self.set_collections_workbook(&workbook);
        Ok(())
    }

    pub fn set_collections_workbook(&mut self, workbook: &Workbook) {
        let (collections, skipped) = collections_from_workbook(workbook);
        self.status_message = Some(if skipped.is_empty() {
            format!("Loaded {} collection sheets", collections.len())
        } else {
            let names: Vec<&str> = skipped.iter().map(|s| s.sheet_name.as_str()).collect();
            format!(
                "Loaded {} collection sheets; skipped {} (missing columns)",
                collections.len(),
                names.join(", ")
            )
        });
        self.report.collections = collections;
        self.report.skipped = skipped;
        self.regenerate_report();
    }

    pub fn load_university_details(&mut self, path: &Path) -> Result<()> {
        let workbook = loader::load_file(path)?;
        self.set_university_workbook(&workbook)?;
        Ok(())
    }

    pub fn set_university_workbook(&mut self, workbook: &Workbook) -> DataResult<()> {
        let details = UniversityDetails::from_workbook(workbook)?;
        self.report.details = Some(details);
        self.status_message = Some("University details loaded".into());
        self.regenerate_report();
        Ok(())
    }

    pub fn course_options(&self) -> Vec<CellValue> {
        self.report_column_options(COURSE_NAME)
    }

    pub fn country_options(&self) -> Vec<CellValue> {
        self.report_column_options(COUNTRY)
    }

    fn report_column_options(&self, column: &str) -> Vec<CellValue> {
        self.report
            .course_details
            .as_ref()
            .and_then(|t| t.unique_values(column).ok())
            .map(|values| values.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn select_course(&mut self, value: CellValue) {
        self.report.course_name = Some(value);
        self.regenerate_report();
    }

    pub fn select_country(&mut self, value: CellValue) {
        self.report.country = Some(value);
        self.regenerate_report();
    }

    pub fn set_template(&mut self, template: TemplateKind) {
        self.report.template = template;
        self.regenerate_report();
    }

    /// Re-render the report for the current selection. Failures clear the
    /// report and land in the status line.
    pub fn regenerate_report(&mut self) {
        match self.render_report() {
            Ok(Some(report)) => self.report.report = Some(report),
            Ok(None) => self.report.report = None,
            Err(e) => {
                self.report.report = None;
                self.status_message = Some(match e {
                    DataError::EmptyResult(_) => {
                        "No course details found for the selected course and country.".into()
                    }
                    other => other.to_string(),
                });
            }
        }
    }

    /// Render without touching state. `None` until a course sheet, course
    /// and country are all chosen.
    pub fn render_report(&self) -> DataResult<Option<Report>> {
        let r = &self.report;
        let (Some(table), Some(course), Some(country)) = (&r.course_details, &r.course_name, &r.country) else {
            return Ok(None);
        };
        let ctx = CourseContext::select(table, course, country, r.details.as_ref(), &r.collections)?;
        r.template.builder().render(&ctx).map(Some)
    }

    pub fn report_markdown(&self) -> Option<String> {
        self.report.report.as_ref().map(Report::to_markdown)
    }

    pub fn render_charts(&self) -> Result<Vec<RenderedChart>> {
        self.report
            .charts
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| chart::render(c, self.config.chart_width, self.config.chart_height))
            .collect()
    }

    pub fn export_report(&self, format: ReportFormat) -> Result<ExportArtifact> {
        let report = self.report.report.as_ref().ok_or_else(|| {
            DataError::EmptyResult(format!(
                "{} = '{}' and {} = '{}'",
                COURSE_NAME,
                self.report.course_name.as_ref().map(|v| v.to_string()).unwrap_or_default(),
                COUNTRY,
                self.report.country.as_ref().map(|v| v.to_string()).unwrap_or_default(),
            ))
        })?;
        let markdown = report.to_markdown();
        let charts = self.render_charts()?;
        let course = self
            .report
            .course_name
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();

        match format {
            ReportFormat::Docx => export::export_report_docx(&course, &markdown, &charts),
            ReportFormat::Html => Ok(export::export_report_html(&course, &markdown, &charts)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Docx,
    Html,
}

impl ReportFormat {
    pub fn label(self) -> &'static str {
        match self {
            ReportFormat::Docx => "Word (.docx)",
            ReportFormat::Html => "HTML (.html)",
        }
    }
}

/// The explorer pipeline: drop excluded columns, filter, drop empty (and
/// optionally all-zero) columns, then refuse an empty result.
pub fn explore(source: &Table, criteria: &FilterCriteria, config: &AppConfig) -> DataResult<Table> {
    let mut table = clean_table(source, criteria, &config.excluded())?;
    if config.drop_zero_columns {
        table = drop_zero_columns(&table);
    }
    ensure_not_empty(table, criteria)
}

fn first_value(table: &Table, column: &str) -> Option<CellValue> {
    table.unique_values(column).ok()?.into_iter().next()
}
