//! Course and university spreadsheet reports.
//!
//! The pipeline runs load → filter/clean → render → export:
//!
//! * [`data`] reads workbooks into [`data::Table`]s and filters and cleans them.
//! * [`report`] fills fixed narrative templates from a selected course row.
//! * [`chart`] describes and draws bar and bubble charts.
//! * [`export`] turns a table or report into DOCX, HTML, XLSX or CSV bytes.
//! * [`state`] holds every loaded table and user selection for the dashboard.

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod report;
pub mod state;
