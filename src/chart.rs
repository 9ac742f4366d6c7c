use std::collections::BTreeSet;
use std::io::Cursor;

use anyhow::{Context, Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::color::{ColorMap, DEFAULT_COLOR, Rgb};
use crate::data::{CellValue, Table};
use crate::error::DataResult;

// ---------------------------------------------------------------------------
// Chart description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One bar per point.
    Bar,
    /// One circle per point, radius scaled by `ChartPoint::size`.
    Bubble,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub size: Option<f64>,
}

/// Backend-independent description of a chart; the dashboard plots it with
/// egui_plot, exports draw it with plotters.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One colour per point. Bars share one colour; bubbles are coloured by
    /// label, so repeated labels share a colour.
    pub fn colors(&self) -> Vec<Rgb> {
        match self.kind {
            ChartKind::Bar => vec![DEFAULT_COLOR; self.points.len()],
            ChartKind::Bubble => {
                let labels: BTreeSet<CellValue> = self.points.iter().map(|p| CellValue::text(p.label.as_str())).collect();
                let map = ColorMap::new(&labels);
                self.points
                    .iter()
                    .map(|p| map.color_for(&CellValue::text(p.label.as_str())))
                    .collect()
            }
        }
    }
}

/// Bar chart of one column. Rows whose value is not numeric are left out.
/// Bars are labelled by `label_column` when the table has it, otherwise by
/// row number.
pub fn column_chart(table: &Table, value_column: &str, label_column: Option<&str>) -> DataResult<ChartSpec> {
    let value_idx = table.require_column(value_column)?;
    let label_idx = label_column.and_then(|c| table.column_index(c));

    let points = table
        .rows()
        .filter_map(|row| {
            let value = row.values()[value_idx].to_numeric()?;
            let label = match label_idx {
                Some(i) => row.values()[i].display_or(&format!("{}", row.index() + 1)),
                None => format!("{}", row.index() + 1),
            };
            Some(ChartPoint {
                label,
                value,
                size: None,
            })
        })
        .collect();

    Ok(ChartSpec {
        title: format!("Distribution of {value_column}"),
        x_label: label_idx
            .map(|_| label_column.unwrap_or_default().to_string())
            .unwrap_or_else(|| "Row".to_string()),
        y_label: "Values".to_string(),
        kind: ChartKind::Bar,
        points,
    })
}

pub const GRAPH_COLUMNS: &[&str] = &["University Name", "Tuition Fees (INR)", "Acceptance Rate (%)"];

/// The two course-details charts: tuition per university, and tuition with
/// acceptance rate as bubble size.
pub fn course_charts(course_details: &Table) -> DataResult<Vec<ChartSpec>> {
    course_details.require_columns(GRAPH_COLUMNS)?;

    let mut bars = Vec::new();
    let mut bubbles = Vec::new();
    for row in course_details.rows() {
        let Some(fees) = row.get(GRAPH_COLUMNS[1])?.to_numeric() else {
            continue;
        };
        let label = row.get(GRAPH_COLUMNS[0])?.display_or("N/A");
        let acceptance = row.get(GRAPH_COLUMNS[2])?.to_numeric();
        bars.push(ChartPoint {
            label: label.clone(),
            value: fees,
            size: None,
        });
        bubbles.push(ChartPoint {
            label,
            value: fees,
            size: acceptance,
        });
    }

    Ok(vec![
        ChartSpec {
            title: "Tuition Fees by University".into(),
            x_label: "University Name".into(),
            y_label: "Tuition Fees (INR)".into(),
            kind: ChartKind::Bar,
            points: bars,
        },
        ChartSpec {
            title: "Tuition Fees vs Acceptance Rate".into(),
            x_label: "University Name".into(),
            y_label: "Tuition Fees (INR)".into(),
            kind: ChartKind::Bubble,
            points: bubbles,
        },
    ])
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// A chart drawn for both export formats.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub title: String,
    /// Full chart with caption, axes and labels.
    pub svg: String,
    /// Shapes only; the DOCX exporter writes the caption as text.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn render(spec: &ChartSpec, width: u32, height: u32) -> Result<RenderedChart> {
    Ok(RenderedChart {
        title: spec.title.clone(),
        svg: render_svg(spec, width, height)?,
        png: render_png(spec, width, height)?,
        width,
        height,
    })
}

pub fn render_svg(spec: &ChartSpec, width: u32, height: u32) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw(&root, spec, true).map_err(|e| anyhow!("drawing chart '{}': {e}", spec.title))?;
    }
    Ok(svg)
}

/// Raster rendering without text: the bitmap backend has no font rasteriser
/// in this build.
pub fn render_png(spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        draw(&root, spec, false).map_err(|e| anyhow!("drawing chart '{}': {e}", spec.title))?;
    }

    let img = image::RgbImage::from_raw(width, height, buf).context("chart buffer size mismatch")?;
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png)
        .context("encoding chart PNG")?;
    Ok(png.into_inner())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    with_text: bool,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let n = spec.points.len().max(1);
    let max = spec.points.iter().map(|p| p.value).fold(0.0, f64::max);
    let min = spec.points.iter().map(|p| p.value).fold(0.0, f64::min);
    let top = if max > 0.0 { max * 1.1 } else { 1.0 };
    let bottom = if min < 0.0 { min * 1.1 } else { 0.0 };

    let mut builder = ChartBuilder::on(root);
    builder.margin(10);
    if with_text {
        builder
            .caption(&spec.title, ("sans-serif", 24).into_font())
            .x_label_area_size(40)
            .y_label_area_size(80);
    }
    let mut chart = builder.build_cartesian_2d((0..n).into_segmented(), bottom..top)?;

    if with_text {
        let labels: Vec<&str> = spec.points.iter().map(|p| p.label.as_str()).collect();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()?;
    }

    let colors = spec.colors();
    match spec.kind {
        ChartKind::Bar => {
            chart.draw_series(
                Histogram::vertical(&chart)
                    .margin(8)
                    .style_func(|x: &SegmentValue<usize>, _| {
                        let i = match x {
                            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => *i,
                            SegmentValue::Last => 0,
                        };
                        let [r, g, b] = colors.get(i).copied().unwrap_or(DEFAULT_COLOR);
                        RGBColor(r, g, b).filled()
                    })
                    .data(spec.points.iter().enumerate().map(|(i, p)| (i, p.value))),
            )?;
        }
        ChartKind::Bubble => {
            let max_size = spec
                .points
                .iter()
                .filter_map(|p| p.size)
                .fold(0.0, f64::max);
            chart.draw_series(spec.points.iter().enumerate().map(|(i, p)| {
                let [r, g, b] = colors[i];
                Circle::new(
                    (SegmentValue::CenterOf(i), p.value),
                    bubble_radius(p.size, max_size),
                    RGBColor(r, g, b).mix(0.7).filled(),
                )
            }))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Pixel radius between 4 and 24, proportional to `size / max_size`.
fn bubble_radius(size: Option<f64>, max_size: f64) -> i32 {
    match size {
        Some(s) if max_size > 0.0 && s > 0.0 => 4 + (20.0 * s / max_size).round() as i32,
        _ => 4,
    }
}
