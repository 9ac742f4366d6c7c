pub mod panels;
pub mod plot;
pub mod report;
pub mod table;

use eframe::egui::Color32;
use rusty_report::color::Rgb;

/// Which half of the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Explorer,
    Report,
}

pub fn color32([r, g, b]: Rgb) -> Color32 {
    Color32::from_rgb(r, g, b)
}
