use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

use crate::data::{CellValue, Table};

/// Write a table to a single-sheet workbook. Numbers stay numeric cells,
/// missing values leave the cell blank.
pub fn table_to_xlsx(sheet_name: &str, table: &Table) -> Result<Vec<u8>> {
    tables_to_xlsx(&[(sheet_name, table)])
}

/// Write several tables, one named sheet each.
pub fn tables_to_xlsx(sheets: &[(&str, &Table)]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for (sheet_name, table) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(*sheet_name)
            .with_context(|| format!("Failed to set sheet name: {sheet_name}"))?;

        for (col, header) in table.columns().iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, header, &header_format)
                .with_context(|| format!("Failed to write header at column {col}"))?;
        }

        for row in table.rows() {
            let excel_row = (row.index() + 1) as u32;
            for (col_idx, cell) in row.values().iter().enumerate() {
                match cell {
                    CellValue::Number(n) => {
                        worksheet
                            .write_number(excel_row, col_idx as u16, *n)
                            .with_context(|| format!("Failed to write number at ({excel_row}, {col_idx})"))?;
                    }
                    CellValue::String(s) => {
                        worksheet
                            .write_string(excel_row, col_idx as u16, s)
                            .with_context(|| format!("Failed to write string at ({excel_row}, {col_idx})"))?;
                    }
                    CellValue::Missing => {}
                }
            }
        }

        worksheet.autofit();
    }

    workbook
        .save_to_buffer()
        .context("Failed to save workbook to buffer")
}
