use crate::error::DataResult;

use super::filter::{FilterCriteria, apply_filter};
use super::model::{CellValue, Table};

/// Remove the named columns. Names the table does not have are ignored.
pub fn drop_columns(table: &Table, names: &[&str]) -> Table {
    let keep: Vec<usize> = (0..table.width())
        .filter(|&i| !names.contains(&table.columns[i].as_str()))
        .collect();
    select_indices(table, &keep)
}

/// Remove every column whose values are all missing.
pub fn drop_empty_columns(table: &Table) -> Table {
    retain_columns(table, |v| !v.is_missing())
}

/// Remove every column whose values are all zero. A missing value counts as
/// non-zero, so a column mixing gaps and zeros is kept; run
/// [`drop_empty_columns`] first to remove all-missing columns.
pub fn drop_zero_columns(table: &Table) -> Table {
    retain_columns(table, |v| !v.is_zero())
}

/// Keep a column when at least one of its values satisfies `keep`.
fn retain_columns(table: &Table, keep: impl Fn(&CellValue) -> bool) -> Table {
    let kept: Vec<usize> = (0..table.width())
        .filter(|&i| table.rows.iter().any(|r| keep(&r[i])))
        .collect();
    if kept.len() < table.width() {
        log::debug!("Dropping {} empty columns", table.width() - kept.len());
    }
    select_indices(table, &kept)
}

fn select_indices(table: &Table, indices: &[usize]) -> Table {
    Table {
        columns: indices.iter().map(|&i| table.columns[i].clone()).collect(),
        rows: table
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect(),
    }
}

/// The filter/clean contract: excluded columns removed, rows not matching
/// `criteria` removed, and columns empty across the remaining rows removed.
///
/// A zero-row result is returned as-is; callers decide whether that is an
/// error (see [`super::filter::ensure_not_empty`]).
pub fn clean_table(table: &Table, criteria: &FilterCriteria, exclude: &[&str]) -> DataResult<Table> {
    let trimmed = drop_columns(table, exclude);
    let filtered = apply_filter(&trimmed, criteria)?;
    Ok(drop_empty_columns(&filtered))
}

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

/// One value that could not be read as a number and was replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionFailure {
    pub column: String,
    pub row: usize,
    pub original: String,
}

/// Result of [`coerce_numeric`]: the converted table plus every replacement
/// that happened on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub table: Table,
    pub failures: Vec<CoercionFailure>,
}

/// Convert the named columns to numbers. Numeric text is parsed; anything
/// else becomes missing. Row count never changes.
pub fn coerce_numeric(table: &Table, columns: &[&str]) -> DataResult<Coerced> {
    let indices: Vec<(usize, &str)> = columns
        .iter()
        .map(|c| table.require_column(c).map(|i| (i, *c)))
        .collect::<DataResult<_>>()?;

    let mut out = table.clone();
    let mut failures = Vec::new();
    for (row_no, row) in out.rows.iter_mut().enumerate() {
        for &(idx, name) in &indices {
            let cell = &mut row[idx];
            let converted = match cell.to_numeric() {
                Some(v) => CellValue::Number(v),
                None => {
                    if !cell.is_missing() {
                        failures.push(CoercionFailure {
                            column: name.to_string(),
                            row: row_no,
                            original: cell.to_string(),
                        });
                    }
                    CellValue::Missing
                }
            };
            *cell = converted;
        }
    }

    for f in &failures {
        log::warn!(
            "Column '{}' row {}: '{}' is not a number, treated as missing",
            f.column,
            f.row,
            f.original
        );
    }

    Ok(Coerced {
        table: out,
        failures,
    })
}

// ---------------------------------------------------------------------------
// Display reshaping
// ---------------------------------------------------------------------------

/// Turn columns into rows: the result has a `Field` column holding the old
/// column names and one `Value_{n}` column per old row.
pub fn transpose(table: &Table) -> Table {
    let mut columns = Vec::with_capacity(table.len() + 1);
    columns.push("Field".to_string());
    columns.extend((1..=table.len()).map(|n| format!("Value_{n}")));

    let rows = table
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let mut row = Vec::with_capacity(table.len() + 1);
            row.push(CellValue::String(name.clone()));
            row.extend(table.rows.iter().map(|r| r[c].clone()));
            row
        })
        .collect();

    Table { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    fn catalog() -> Table {
        Table::new(
            vec![
                "ID".into(),
                "college".into(),
                "Course_name".into(),
                "Fees".into(),
                "Scholarship".into(),
                "Waiver".into(),
            ],
            vec![
                vec![1.0.into(), "A".into(), "CS".into(), 100.0.into(), CellValue::Missing, 0.0.into()],
                vec![2.0.into(), "B".into(), "EE".into(), "call us".into(), 5.0.into(), 0.0.into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn drop_columns_ignores_unknown_names() {
        let t = drop_columns(&catalog(), &["ID", "Course_link"]);
        assert!(!t.has_column("ID"));
        assert_eq!(t.width(), 5);
    }

    #[test]
    fn clean_table_drops_columns_empty_after_filtering() {
        let criteria = FilterCriteria::new().where_eq("college", "A");
        let t = clean_table(&catalog(), &criteria, &["ID"]).unwrap();
        assert_eq!(t.len(), 1);
        // Scholarship only had a value in the filtered-out row.
        assert_eq!(t.columns(), &["college", "Course_name", "Fees", "Waiver"]);
    }

    #[test]
    fn drop_zero_columns_removes_all_zero() {
        let t = drop_zero_columns(&catalog());
        assert!(!t.has_column("Waiver"));
        assert!(t.has_column("Scholarship"));
    }

    #[test]
    fn drop_zero_columns_keeps_gaps_mixed_with_zeros() {
        let t = Table::new(
            vec!["a".into(), "Waiver".into(), "Empty".into()],
            vec![
                vec!["x".into(), CellValue::Missing, CellValue::Missing],
                vec!["y".into(), 0.0.into(), CellValue::Missing],
            ],
        )
        .unwrap();
        let out = drop_zero_columns(&t);
        assert_eq!(out.columns(), &["a", "Waiver", "Empty"]);
        assert_eq!(drop_zero_columns(&drop_empty_columns(&t)).columns(), &["a", "Waiver"]);
    }

    #[test]
    fn coerce_numeric_replaces_text_with_missing() {
        let coerced = coerce_numeric(&catalog(), &["Fees"]).unwrap();
        assert_eq!(coerced.table.len(), 2);
        assert!(coerced.table.row(1).unwrap().get("Fees").unwrap().is_missing());
        assert_eq!(coerced.failures.len(), 1);
        assert_eq!(coerced.failures[0].original, "call us");
    }

    #[test]
    fn coerce_numeric_parses_numeric_text() {
        let t = Table::new(vec!["Fees".into()], vec![vec![CellValue::String(" 12.5".into())]]).unwrap();
        let coerced = coerce_numeric(&t, &["Fees"]).unwrap();
        assert_eq!(coerced.table.row(0).unwrap().get("Fees").unwrap(), &CellValue::Number(12.5));
        assert!(coerced.failures.is_empty());
    }

    #[test]
    fn coerce_numeric_requires_the_column() {
        let err = coerce_numeric(&catalog(), &["TOEFL"]).unwrap_err();
        assert_eq!(err, DataError::MissingColumn("TOEFL".into()));
    }

    #[test]
    fn transpose_turns_fields_into_rows() {
        let t = transpose(&drop_columns(&catalog(), &["Scholarship", "Waiver"]));
        assert_eq!(t.columns(), &["Field", "Value_1", "Value_2"]);
        assert_eq!(t.len(), 4);
        let fees = t.row(3).unwrap();
        assert_eq!(fees.get("Field").unwrap(), &CellValue::from("Fees"));
        assert_eq!(fees.get("Value_1").unwrap(), &CellValue::Number(100.0));
    }
}
