use crate::error::{DataError, DataResult};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Filter predicate: (column, value) equality constraints
// ---------------------------------------------------------------------------

/// Conjunctive equality constraints. An empty criteria set keeps every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    constraints: Vec<(String, CellValue)>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column == value`.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.constraints.push((column.into(), value.into()));
        self
    }

    /// Add `column == value` only when a value was selected.
    pub fn where_eq_opt(self, column: impl Into<String>, value: Option<CellValue>) -> Self {
        match value {
            Some(v) => self.where_eq(column, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl std::fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "(no filter)");
        }
        let parts: Vec<String> = self
            .constraints
            .iter()
            .map(|(c, v)| format!("{c} = '{v}'"))
            .collect();
        write!(f, "{}", parts.join(" and "))
    }
}

/// Return indices of rows that pass every constraint.
///
/// Constraining a column the table does not have is an error rather than an
/// empty result.
pub fn filtered_indices(table: &Table, criteria: &FilterCriteria) -> DataResult<Vec<usize>> {
    let resolved: Vec<(usize, &CellValue)> = criteria
        .constraints
        .iter()
        .map(|(col, val)| table.require_column(col).map(|idx| (idx, val)))
        .collect::<DataResult<_>>()?;

    Ok(table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| resolved.iter().all(|(idx, val)| &row[*idx] == *val))
        .map(|(i, _)| i)
        .collect())
}

/// Copy of `table` holding only the rows that pass `criteria`.
pub fn apply_filter(table: &Table, criteria: &FilterCriteria) -> DataResult<Table> {
    let keep = filtered_indices(table, criteria)?;
    log::debug!("Filter {criteria} kept {} of {} rows", keep.len(), table.len());
    Ok(Table {
        columns: table.columns.clone(),
        rows: keep.into_iter().map(|i| table.rows[i].clone()).collect(),
    })
}

/// Turn an empty result into `EmptyResult` so callers skip rendering and export.
pub fn ensure_not_empty(table: Table, criteria: &FilterCriteria) -> DataResult<Table> {
    if table.is_empty() {
        Err(DataError::EmptyResult(criteria.to_string()))
    } else {
        Ok(table)
    }
}
