use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt32Type,
    UInt64Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Sheet, Table, Workbook};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every sheet of a tabular file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – one table per sheet, first row is the header
/// * `.csv`     – header row plus records
/// * `.json`    – `[{ "column": value, ... }, ...]`
/// * `.parquet` – one table, column names from the schema
///
/// Single-table formats yield one sheet named after the file stem.
pub fn load_file(path: &Path) -> Result<Workbook> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let workbook = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_spreadsheet(path)?,
        "csv" => Workbook::single(stem(path), load_csv(path)?),
        "json" => Workbook::single(stem(path), load_json(path)?),
        "parquet" | "pq" => Workbook::single(stem(path), load_parquet(path)?),
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} with sheets {:?}",
        path.display(),
        workbook.sheet_names()
    );
    Ok(workbook)
}

/// Load one table: the named sheet, or the first one.
pub fn load_table(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let workbook = load_file(path)?;
    match sheet {
        Some(name) => Ok(workbook.sheet(name)?.clone()),
        None => workbook
            .sheets
            .into_iter()
            .next()
            .map(|s| s.table)
            .with_context(|| format!("{} contains no sheets", path.display())),
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path) -> Result<Workbook> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| anyhow!("opening workbook {}: {e}", path.display()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| anyhow!("reading sheet '{name}': {e}"))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header.iter().map(|d| data_to_cell(d).to_string()).collect(),
            None => Vec::new(),
        };
        let records: Vec<Vec<CellValue>> = rows
            .map(|r| r.iter().map(data_to_cell).collect())
            .collect();

        log::debug!("Sheet '{name}': {} columns, {} rows", headers.len(), records.len());
        sheets.push(Sheet {
            name,
            table: Table::from_raw(headers, records),
        });
    }

    Ok(Workbook { sheets })
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::number(*f),
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Bool(b) => CellValue::String(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => {
                let text = d.format("%Y-%m-%d %H:%M:%S").to_string();
                // Date-only cells carry a midnight time.
                let text = text.strip_suffix(" 00:00:00").map(str::to_string).unwrap_or(text);
                CellValue::String(text)
            }
            None => CellValue::number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(_) | Data::Empty => CellValue::Missing,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(CellValue::parse_loose).collect());
    }

    Ok(Table::from_raw(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "college": "A", "Course_name": "CS", "Fees": 100 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen key order; keys absent from a record are
/// missing values.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Missing))
                .collect()
        })
        .collect();

    Ok(Table::from_raw(headers, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::text(s.as_str()),
        JsonValue::Number(n) => n
            .as_f64()
            .map(CellValue::number)
            .unwrap_or_else(|| CellValue::String(n.to_string())),
        JsonValue::Bool(b) => CellValue::String(b.to_string()),
        JsonValue::Null => CellValue::Missing,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file as one table.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Primitive columns map to numbers or
/// text; anything else is rendered with Arrow's display formatter.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let mut values = Vec::with_capacity(batch.num_columns());
            for col in batch.columns() {
                values.push(
                    extract_cell(col, row)
                        .with_context(|| format!("Row {row}: failed to read cell"))?,
                );
            }
            rows.push(values);
        }
    }

    Ok(Table::from_raw(headers, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Missing);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => CellValue::text(col.as_string::<i64>().value(row)),
        DataType::Int8 => CellValue::Number(col.as_primitive::<Int8Type>().value(row) as f64),
        DataType::Int16 => CellValue::Number(col.as_primitive::<Int16Type>().value(row) as f64),
        DataType::Int32 => CellValue::Number(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => CellValue::Number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::UInt32 => CellValue::Number(col.as_primitive::<UInt32Type>().value(row) as f64),
        DataType::UInt64 => CellValue::Number(col.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::Float32 => {
            CellValue::number(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => CellValue::number(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::String(col.as_boolean().value(row).to_string()),
        _ => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(col.as_ref(), &options)
                .context("formatting parquet value")?;
            CellValue::text(formatter.value(row).to_string())
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn csv_loads_with_types_guessed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "ID,college,Course_name,Fees").unwrap();
        writeln!(f, "1,A,CS,100").unwrap();
        writeln!(f, "2,B,EE,").unwrap();
        drop(f);

        let wb = load_file(&path).unwrap();
        assert_eq!(wb.sheet_names(), vec!["courses"]);
        let t = &wb.sheets[0].table;
        assert_eq!(t.columns(), &["ID", "college", "Course_name", "Fees"]);
        assert_eq!(t.len(), 2);
        let row = t.row(1).unwrap();
        assert_eq!(row.get("ID").unwrap(), &CellValue::Number(2.0));
        assert!(row.get("Fees").unwrap().is_missing());
    }

    #[test]
    fn json_keeps_first_seen_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[{"college":"A","Fees":100},{"college":"B","Notes":null,"Extra":"x"}]"#,
        )
        .unwrap();

        let t = load_table(&path, None).unwrap();
        assert_eq!(t.columns(), &["college", "Fees", "Notes", "Extra"]);
        assert!(t.row(0).unwrap().get("Extra").unwrap().is_missing());
        assert_eq!(t.row(1).unwrap().get("Extra").unwrap(), &CellValue::from("x"));
    }

    #[test]
    fn xlsx_loads_every_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("details.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name("Tuition Fees").unwrap();
        ws.write_string(0, 0, "University Name").unwrap();
        ws.write_string(0, 1, "Tuition Fees (INR)").unwrap();
        ws.write_string(1, 0, "Alpha").unwrap();
        ws.write_number(1, 1, 1500000.0).unwrap();
        let ws = workbook.add_worksheet();
        ws.set_name("Important Deadlines").unwrap();
        ws.write_string(0, 0, "Event").unwrap();
        ws.write_string(1, 0, "Application opens").unwrap();
        workbook.save(&path).unwrap();

        let wb = load_file(&path).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Tuition Fees", "Important Deadlines"]);
        let fees = wb.sheet("Tuition Fees").unwrap();
        assert_eq!(fees.sum("Tuition Fees (INR)").unwrap(), 1500000.0);
        assert!(wb.sheet("Living Expenses").is_err());
    }

    #[test]
    fn parquet_loads_primitive_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("ID", arrow::datatypes::DataType::Int64, false),
            Field::new("college", arrow::datatypes::DataType::Utf8, true),
            Field::new("Fees", arrow::datatypes::DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec![Some("A"), None])),
                Arc::new(Float64Array::from(vec![Some(100.0), Some(200.5)])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let t = load_table(&path, None).unwrap();
        assert_eq!(t.columns(), &["ID", "college", "Fees"]);
        assert_eq!(t.row(0).unwrap().get("college").unwrap(), &CellValue::from("A"));
        assert!(t.row(1).unwrap().get("college").unwrap().is_missing());
        assert_eq!(t.row(1).unwrap().get("Fees").unwrap(), &CellValue::Number(200.5));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load_file(Path::new("notes.txt")).unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }
}
