//! # Chart Rendering
//!
//! Thin glue over `plotters`: the library is the external collaborator
//! that turns named numeric series into image files. Two chart shapes are
//! supported, matching what the pipeline needs:
//!
//! - a single-series line chart (latency per round), rendered to PNG;
//! - a dual-axis chart with latency on the left axis and one or more
//!   throughput series on the right axis, rendered to PNG or SVG.
//!
//! The x domain is always the round index. Axis ranges are computed from
//! the data with a small pad and guarded against empty or flat series, so
//! a family with no measurable spread still renders. Backend errors are
//! flattened into [`ChartError`] with their text preserved.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

/// Pixel dimensions of every rendered chart.
pub const CHART_SIZE: (u32, u32) = (800, 600);

/// Line color of left-axis latency series.
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);

/// Errors raised while rendering a chart.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// The plotting backend failed; the original error text is kept.
    #[error("failed to render {path}: {reason}")]
    Render {
        /// Output image path.
        path: PathBuf,
        /// Backend error description.
        reason: String,
    },
}

/// One named series destined for a chart axis.
#[derive(Debug, Clone)]
pub struct Series<'a> {
    /// Legend label.
    pub label: &'a str,
    /// Per-round values, index = round number.
    pub values: &'a [f64],
    /// Line color.
    pub color: RGBColor,
}

/// A dual-axis chart description: latency left, throughput right.
#[derive(Debug, Clone)]
pub struct DualAxisChart<'a> {
    /// Chart title.
    pub title: &'a str,
    /// Shared horizontal axis label.
    pub x_desc: &'a str,
    /// Left vertical axis label.
    pub left_desc: &'a str,
    /// Right vertical axis label.
    pub right_desc: &'a str,
    /// The single left-axis series.
    pub left: Series<'a>,
    /// The right-axis series, drawn in order.
    pub right: Vec<Series<'a>>,
}

/// Render a single-series line chart to a PNG file.
pub fn render_line_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[f64],
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    draw_line_chart(&root, title, x_desc, y_desc, series).map_err(|e| render_error(path, e))
}

/// Render a dual-axis chart to a PNG file.
pub fn render_dual_axis_png(path: &Path, chart: &DualAxisChart<'_>) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    draw_dual_axis_chart(&root, chart).map_err(|e| render_error(path, e))
}

/// Render a dual-axis chart to an SVG file (the vector artifact).
pub fn render_dual_axis_svg(path: &Path, chart: &DualAxisChart<'_>) -> Result<(), ChartError> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    draw_dual_axis_chart(&root, chart).map_err(|e| render_error(path, e))
}

fn draw_line_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[f64],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (y_min, y_max) = padded_range(&[series]);
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_end(series.len()), y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(LineSeries::new(points(series), &BLUE))?;

    root.present()?;
    Ok(())
}

fn draw_dual_axis_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &DualAxisChart<'_>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let rounds = layout
        .right
        .iter()
        .map(|s| s.values.len())
        .chain(std::iter::once(layout.left.values.len()))
        .max()
        .unwrap_or(0);
    let (l_min, l_max) = padded_range(&[layout.left.values]);
    let right_values: Vec<&[f64]> = layout.right.iter().map(|s| s.values).collect();
    let (r_min, r_max) = padded_range(&right_values);

    let mut chart = ChartBuilder::on(root)
        .caption(layout.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d(0.0..x_end(rounds), l_min..l_max)?
        .set_secondary_coord(0.0..x_end(rounds), r_min..r_max);

    chart
        .configure_mesh()
        .x_desc(layout.x_desc)
        .y_desc(layout.left_desc)
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc(layout.right_desc)
        .draw()?;

    let left_color = layout.left.color;
    chart
        .draw_series(LineSeries::new(points(layout.left.values), &left_color))?
        .label(layout.left.label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], left_color));

    for series in &layout.right {
        let color = series.color;
        chart
            .draw_secondary_series(LineSeries::new(points(series.values), &color))?
            .label(series.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn points(series: &[f64]) -> impl Iterator<Item = (f64, f64)> + '_ {
    series.iter().enumerate().map(|(i, &v)| (i as f64, v))
}

/// Last x coordinate of the round axis; at least 1 so degenerate series
/// still produce a valid coordinate range.
fn x_end(rounds: usize) -> f64 {
    rounds.saturating_sub(1).max(1) as f64
}

/// Data-driven y range with a 5% pad.
///
/// Non-finite values (e.g. an infinite throughput from a zero-length round)
/// are ignored; empty or flat inputs fall back to a unit-wide range.
fn padded_range(series: &[&[f64]]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for values in series {
        for &v in *values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if (max - min).abs() < 1e-9 {
        return (min - 0.5, max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn render_error(path: &Path, error: impl std::fmt::Display) -> ChartError {
    ChartError::Render {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn non_empty(path: &Path) {
        let len = std::fs::metadata(path).unwrap().len();
        assert!(len > 0, "{} is empty", path.display());
    }

    #[test]
    fn line_chart_writes_a_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latency.png");
        let series = [1.0, 2.5, 2.0, 3.0];

        render_line_chart(&path, "average latency of send2echo", "Round", "sec", &series).unwrap();
        non_empty(&path);
    }

    #[test]
    fn line_chart_tolerates_empty_and_flat_series() {
        let dir = tempdir().unwrap();

        let empty = dir.path().join("empty.png");
        render_line_chart(&empty, "empty", "Round", "sec", &[]).unwrap();
        non_empty(&empty);

        let flat = dir.path().join("flat.png");
        render_line_chart(&flat, "flat", "Round", "sec", &[2.0, 2.0, 2.0]).unwrap();
        non_empty(&flat);
    }

    #[test]
    fn dual_axis_chart_writes_png_and_svg() {
        let dir = tempdir().unwrap();
        let latency = [0.5, 0.6, 0.4];
        let total = [30.0, 28.0, 32.0];
        let settled = [25.0, 24.0, 26.0];
        let layout = DualAxisChart {
            title: "Average Throughput of each round",
            x_desc: "Round",
            left_desc: "latency (sec)",
            right_desc: "throughput (MB/sec)",
            left: Series {
                label: "avg round latency",
                values: &latency,
                color: ORANGE,
            },
            right: vec![
                Series {
                    label: "avg total thruput",
                    values: &total,
                    color: RED,
                },
                Series {
                    label: "avg final thruput",
                    values: &settled,
                    color: BLUE,
                },
            ],
        };

        let png = dir.path().join("thruput.png");
        render_dual_axis_png(&png, &layout).unwrap();
        non_empty(&png);

        let svg = dir.path().join("thruput.svg");
        render_dual_axis_svg(&svg, &layout).unwrap();
        non_empty(&svg);
    }

    #[test]
    fn padded_range_guards_degenerate_inputs() {
        assert_eq!(padded_range(&[&[]]), (0.0, 1.0));
        assert_eq!(padded_range(&[&[f64::INFINITY]]), (0.0, 1.0));
        assert_eq!(padded_range(&[&[5.0, 5.0]]), (4.5, 5.5));

        let (min, max) = padded_range(&[&[0.0, 10.0]]);
        assert!(min < 0.0 && max > 10.0);
    }
}
