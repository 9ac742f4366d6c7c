use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::TemplateKind;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "RUSTY_REPORT_CONFIG";

/// Config file picked up from the working directory when no override is set.
pub const DEFAULT_CONFIG_FILE: &str = "rusty-report.json";

/// Settings for the explorer and report views. Every field has a default, so
/// a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Columns removed before filtering in the explorer.
    pub excluded_columns: Vec<String>,
    /// Columns offered as equality filters in the explorer.
    pub filter_columns: Vec<String>,
    /// Columns offered in the chart selector.
    pub chart_columns: Vec<String>,
    /// Column used to label bars; row numbers when absent from the table.
    pub chart_label_column: String,
    /// Also drop columns that are all zero.
    pub drop_zero_columns: bool,
    /// Show the explorer result as Field / Value rows.
    pub transpose_explorer: bool,
    pub default_template: TemplateKind,
    pub chart_width: u32,
    pub chart_height: u32,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            excluded_columns: vec!["ID".into(), "Course_link".into()],
            filter_columns: vec!["college".into(), "Course_name".into()],
            chart_columns: vec![
                "Fees".into(),
                "Duration".into(),
                "TOEFL".into(),
                "IELTS".into(),
            ],
            chart_label_column: "Course_name".into(),
            drop_zero_columns: true,
            transpose_explorer: true,
            default_template: TemplateKind::Full,
            chart_width: 800,
            chart_height: 600,
            window_width: 1280.0,
            window_height: 860.0,
        }
    }
}

impl AppConfig {
    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config: `$RUSTY_REPORT_CONFIG`, then `./rusty-report.json`,
    /// then defaults. A file that exists but cannot be parsed is an error.
    pub fn load() -> Result<Self> {
        match Self::locate() {
            Some(path) => {
                log::info!("Using config {}", path.display());
                Self::from_file(&path)
            }
            None => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn locate() -> Option<PathBuf> {
        if let Some(p) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(p));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    pub fn excluded(&self) -> Vec<&str> {
        self.excluded_columns.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "chart_columns": ["Fees"], "default_template": "overview" }"#)
            .unwrap();

        let cfg = AppConfig::from_file(&path).unwrap();
        assert_eq!(cfg.chart_columns, vec!["Fees"]);
        assert_eq!(cfg.default_template, TemplateKind::Overview);
        assert_eq!(cfg.excluded_columns, vec!["ID", "Course_link"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }
}
