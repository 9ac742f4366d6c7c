use thiserror::Error;

/// Errors raised by the table pipeline and the report renderer.
///
/// Loaders and exporters work on files and byte buffers and report through
/// `anyhow`; these variants are the ones the dashboard needs to tell apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("required columns are missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("required sheet '{0}' is missing")]
    MissingSheet(String),

    #[error("required sheets are missing: {}", .0.join(", "))]
    MissingSheets(Vec<String>),

    #[error("no rows match {0}")]
    EmptyResult(String),

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}

pub type DataResult<T> = Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_name() {
        let err = DataError::MissingColumns(vec!["Country".into(), "Stream".into()]);
        assert_eq!(err.to_string(), "required columns are missing: Country, Stream");
    }

    #[test]
    fn missing_column_names_the_column() {
        let err = DataError::MissingColumn("Top Employers".into());
        assert!(err.to_string().contains("'Top Employers'"));
    }
}
