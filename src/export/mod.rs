//! Document exports: the final table or report text serialized into bytes
//! the user can save.
//!
//! Nothing here touches the filesystem; the dashboard writes the returned
//! [`ExportArtifact`] wherever the save dialog points.

pub mod csv;
pub mod docx;
pub mod html;
pub mod xlsx;

use std::path::Path;

use anyhow::{Context, Result};

use crate::chart::RenderedChart;
use crate::data::Table;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const HTML_MIME: &str = "text/html";
pub const CSV_MIME: &str = "text/csv";

/// Serialized document plus what a download needs to describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

impl ExportArtifact {
    /// File extension of the suggested name, used as the save-dialog filter.
    pub fn extension(&self) -> &str {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Exported {} ({} bytes) to {}", self.file_name, self.bytes.len(), path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Docx,
    Xlsx,
    Csv,
}

impl TableFormat {
    pub const ALL: [TableFormat; 3] = [TableFormat::Docx, TableFormat::Xlsx, TableFormat::Csv];

    pub fn label(self) -> &'static str {
        match self {
            TableFormat::Docx => "Word (.docx)",
            TableFormat::Xlsx => "Excel (.xlsx)",
            TableFormat::Csv => "CSV (.csv)",
        }
    }
}

/// Export a table as a one-table document named `filtered_data.<ext>`.
pub fn export_table(table: &Table, format: TableFormat) -> Result<ExportArtifact> {
    let artifact = match format {
        TableFormat::Docx => ExportArtifact {
            bytes: docx::table_to_docx(table)?,
            mime: DOCX_MIME,
            file_name: "filtered_data.docx".into(),
        },
        TableFormat::Xlsx => ExportArtifact {
            bytes: xlsx::table_to_xlsx("Filtered Data", table)?,
            mime: XLSX_MIME,
            file_name: "filtered_data.xlsx".into(),
        },
        TableFormat::Csv => ExportArtifact {
            bytes: csv::table_to_csv(table)?.into_bytes(),
            mime: CSV_MIME,
            file_name: "filtered_data.csv".into(),
        },
    };
    log::debug!("Built {} from {} rows x {} columns", artifact.file_name, table.len(), table.width());
    Ok(artifact)
}

/// Word version of a rendered report, charts appended as images.
pub fn export_report_docx(course_name: &str, markdown: &str, charts: &[RenderedChart]) -> Result<ExportArtifact> {
    Ok(ExportArtifact {
        bytes: docx::report_to_docx(markdown, charts)?,
        mime: DOCX_MIME,
        file_name: format!("{}_complete_with_rankings.docx", file_stem(course_name)),
    })
}

/// HTML version of a rendered report, charts appended as inline SVG.
pub fn export_report_html(course_name: &str, markdown: &str, charts: &[RenderedChart]) -> ExportArtifact {
    ExportArtifact {
        bytes: html::report_to_html(markdown, charts).into_bytes(),
        mime: HTML_MIME,
        file_name: format!("{}_complete_content.html", file_stem(course_name)),
    }
}

/// Course names end up in file names; keep them portable.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "report".into() } else { stem }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    fn table() -> Table {
        Table::new(
            vec!["college".into(), "Fees".into()],
            vec![vec!["A".into(), CellValue::Number(100.0)]],
        )
        .unwrap()
    }

    #[test]
    fn table_exports_carry_mime_and_name() {
        let docx = export_table(&table(), TableFormat::Docx).unwrap();
        assert_eq!(docx.mime, DOCX_MIME);
        assert_eq!(docx.file_name, "filtered_data.docx");
        assert_eq!(docx.extension(), "docx");
        assert_eq!(&docx.bytes[0..2], b"PK");

        let csv = export_table(&table(), TableFormat::Csv).unwrap();
        assert_eq!(String::from_utf8(csv.bytes).unwrap(), "college,Fees\nA,100\n");

        let xlsx = export_table(&table(), TableFormat::Xlsx).unwrap();
        assert_eq!(xlsx.mime, XLSX_MIME);
        assert_eq!(&xlsx.bytes[0..2], b"PK");
    }

    #[test]
    fn report_file_names_use_the_course() {
        let html = export_report_html("MS Data Science", "# T\n", &[]);
        assert_eq!(html.file_name, "MS_Data_Science_complete_content.html");
        assert_eq!(html.mime, HTML_MIME);

        let docx = export_report_docx("MS/CS", "# T\n", &[]).unwrap();
        assert_eq!(docx.file_name, "MS_CS_complete_with_rankings.docx");
    }

    #[test]
    fn write_to_saves_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let artifact = export_table(&table(), TableFormat::Csv).unwrap();
        artifact.write_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
    }
}
