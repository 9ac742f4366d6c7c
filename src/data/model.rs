use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::{DataError, DataResult};

// ---------------------------------------------------------------------------
// CellValue – a single loosely-typed spreadsheet cell
// ---------------------------------------------------------------------------

/// A spreadsheet cell: text, a number, or nothing.
///
/// Ordering is total (`Missing < Number < String`, numbers by `total_cmp`) so
/// values can live in `BTreeSet`s for the selector widgets.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Number(f64),
    Missing,
}

impl CellValue {
    /// Build a number cell; NaN becomes `Missing`.
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            CellValue::Missing
        } else {
            CellValue::Number(value)
        }
    }

    /// Build a text cell; blank text becomes `Missing`.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Missing
        } else {
            CellValue::String(value)
        }
    }

    /// Guess the type of a raw text field (CSV, JSON strings).
    pub fn parse_loose(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Missing;
        }
        match parse_finite(trimmed) {
            Some(v) => CellValue::Number(v),
            None => CellValue::String(raw.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Numeric view of the cell. Text is parsed; anything else is `None`.
    pub fn to_numeric(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::String(s) => parse_finite(s.trim()),
            CellValue::Missing => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, CellValue::Number(v) if *v == 0.0)
    }

    /// Display text, substituting `fallback` for a missing value.
    pub fn display_or(&self, fallback: &str) -> String {
        match self {
            CellValue::Missing => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Missing => 0,
                Number(_) => 1,
                String(_) => 2,
            }
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Number(v) => v.to_bits().hash(state),
            CellValue::Missing => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Missing => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

// ---------------------------------------------------------------------------
// Table – named columns × rows
// ---------------------------------------------------------------------------

/// An in-memory table. Column names are unique and every row is exactly as
/// wide as the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> DataResult<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(DataError::DuplicateColumn(name.clone()));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DataError::RaggedRow {
                    row: i,
                    found: row.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Table { columns, rows })
    }

    /// Build a table from a raw header row and raw records as spreadsheet
    /// readers hand them over: blank headers become `Unnamed: {i}`, repeated
    /// headers get `.1`, `.2` suffixes and short rows are padded.
    pub fn from_raw(headers: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(headers.len());

        let mut columns: Vec<String> = Vec::with_capacity(width);
        let mut seen: HashSet<String> = HashSet::new();
        for i in 0..width {
            let base = headers
                .get(i)
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| format!("Unnamed: {i}"));
            let mut name = base.clone();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{base}.{suffix}");
                suffix += 1;
            }
            seen.insert(name.clone());
            columns.push(name);
        }

        for row in &mut rows {
            row.resize(width, CellValue::Missing);
        }

        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_column(&self, name: &str) -> DataResult<usize> {
        self.column_index(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    /// Check that every name is present, reporting all absent ones at once.
    pub fn require_columns(&self, names: &[&str]) -> DataResult<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| !self.has_column(n))
            .map(|n| n.to_string())
            .collect();
        match missing.len() {
            0 => Ok(()),
            1 => Err(DataError::MissingColumn(missing[0].clone())),
            _ => Err(DataError::MissingColumns(missing)),
        }
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    pub fn column_values(&self, name: &str) -> DataResult<impl Iterator<Item = &CellValue>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Sorted distinct non-missing values of a column.
    pub fn unique_values(&self, name: &str) -> DataResult<BTreeSet<CellValue>> {
        Ok(self
            .column_values(name)?
            .filter(|v| !v.is_missing())
            .cloned()
            .collect())
    }

    /// Sum of the numeric values of a column; missing and non-numeric cells
    /// are skipped.
    pub fn sum(&self, name: &str) -> DataResult<f64> {
        Ok(self.column_values(name)?.filter_map(CellValue::to_numeric).sum())
    }

    /// Every cell rendered as text, row-major.
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| r.iter().map(|v| v.to_string()).collect())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Row – a borrowed view of one table row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn values(&self) -> &'a [CellValue] {
        &self.table.rows[self.index]
    }

    /// Look up a field by column name. An absent column is an error, never an
    /// empty string.
    pub fn get(&self, column: &str) -> DataResult<&'a CellValue> {
        let idx = self.table.require_column(column)?;
        Ok(&self.table.rows[self.index][idx])
    }

    /// Look up a field that is allowed to be absent.
    pub fn get_opt(&self, column: &str) -> Option<&'a CellValue> {
        self.table
            .column_index(column)
            .map(|idx| &self.table.rows[self.index][idx])
    }
}

// ---------------------------------------------------------------------------
// Workbook – named sheets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

/// All sheets of a loaded file, in file order. Single-table formats produce
/// one sheet named after the file stem.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn single(name: impl Into<String>, table: Table) -> Self {
        Workbook {
            sheets: vec![Sheet {
                name: name.into(),
                table,
            }],
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> DataResult<&Table> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.table)
            .ok_or_else(|| DataError::MissingSheet(name.to_string()))
    }

    pub fn require_sheets(&self, names: &[&str]) -> DataResult<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|n| self.sheet(n).is_err())
            .map(|n| n.to_string())
            .collect();
        match missing.len() {
            0 => Ok(()),
            1 => Err(DataError::MissingSheet(missing[0].clone())),
            _ => Err(DataError::MissingSheets(missing)),
        }
    }

    pub fn first(&self) -> Option<&Sheet> {
        self.sheets.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn courses() -> Table {
        Table::new(
            vec!["college".into(), "Fees".into()],
            vec![
                vec!["A".into(), 100.0.into()],
                vec!["B".into(), CellValue::Missing],
                vec!["A".into(), "n/a".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = Table::new(vec!["a".into(), "a".into()], vec![]).unwrap_err();
        assert_eq!(err, DataError::DuplicateColumn("a".into()));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Table::new(vec!["a".into()], vec![vec![1.0.into(), 2.0.into()]]).unwrap_err();
        assert!(matches!(err, DataError::RaggedRow { row: 0, found: 2, expected: 1 }));
    }

    #[test]
    fn from_raw_mangles_headers_and_pads_rows() {
        let t = Table::from_raw(
            vec!["Fees".into(), "".into(), "Fees".into()],
            vec![vec![1.0.into()], vec![1.0.into(), 2.0.into(), 3.0.into(), 4.0.into()]],
        );
        assert_eq!(t.columns(), &["Fees", "Unnamed: 1", "Fees.1", "Unnamed: 3"]);
        assert_eq!(t.row(0).unwrap().values().len(), 4);
        assert!(t.row(0).unwrap().values()[3].is_missing());
    }

    #[test]
    fn number_display_drops_integral_fraction() {
        assert_eq!(CellValue::Number(100.0).to_string(), "100");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Missing.to_string(), "");
        assert_eq!(CellValue::Missing.display_or("N/A"), "N/A");
    }

    #[test]
    fn parse_loose_guesses_types() {
        assert_eq!(CellValue::parse_loose(" 42 "), CellValue::Number(42.0));
        assert_eq!(CellValue::parse_loose(""), CellValue::Missing);
        assert_eq!(CellValue::parse_loose("NaN"), CellValue::String("NaN".into()));
        assert_eq!(CellValue::parse_loose("CS"), CellValue::String("CS".into()));
    }

    #[test]
    fn row_get_fails_on_absent_column() {
        let t = courses();
        let row = t.row(0).unwrap();
        assert_eq!(row.get("college").unwrap(), &CellValue::from("A"));
        assert_eq!(
            row.get("Country").unwrap_err(),
            DataError::MissingColumn("Country".into())
        );
        assert!(row.get_opt("Country").is_none());
    }

    #[test]
    fn unique_values_skip_missing() {
        let t = courses();
        let fees = t.unique_values("Fees").unwrap();
        assert_eq!(fees.len(), 2);
        assert!(!fees.contains(&CellValue::Missing));
    }

    #[test]
    fn sum_skips_non_numeric() {
        assert_eq!(courses().sum("Fees").unwrap(), 100.0);
    }

    #[test]
    fn require_columns_reports_all_missing() {
        let err = courses().require_columns(&["college", "x", "y"]).unwrap_err();
        assert_eq!(err, DataError::MissingColumns(vec!["x".into(), "y".into()]));
    }

    #[test]
    fn workbook_requires_sheets() {
        let wb = Workbook::single("Tuition Fees", courses());
        assert!(wb.require_sheets(&["Tuition Fees"]).is_ok());
        assert_eq!(
            wb.require_sheets(&["Tuition Fees", "Living Expenses"]).unwrap_err(),
            DataError::MissingSheet("Living Expenses".into())
        );
    }
}
