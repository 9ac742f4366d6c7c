use anyhow::{Context, Result};

use crate::data::Table;

/// CSV text of a table: header record, then one record per row. Missing
/// cells are written as empty fields.
pub fn table_to_csv(table: &Table) -> Result<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(table.columns())
        .context("Failed to write header record")?;

    for row in table.to_string_rows() {
        writer.write_record(&row).context("Failed to write data record")?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;

    String::from_utf8(bytes).context("CSV output contained invalid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    #[test]
    fn quotes_fields_with_commas() {
        let t = Table::new(
            vec!["Name".into(), "Location".into()],
            vec![vec!["Smith, John".into(), CellValue::Missing]],
        )
        .unwrap();
        let out = table_to_csv(&t).unwrap();
        assert_eq!(out, "Name,Location\n\"Smith, John\",\n");
    }
}
