//! # Pipeline Driver
//!
//! Fixed, synchronous sequence wiring discovery, parsing, averaging, and
//! rendering for every configured metric family: first the scalar-line
//! latency families, then the per-round throughput family, then the
//! per-node throughput family.
//!
//! The run fails fast on the first unreadable or malformed trial file;
//! charts already written by earlier families stay on disk. A family
//! whose prefix matches no files is the explicit "no data" outcome: its
//! chart is skipped with a warning and the run continues.

use log::{info, warn};

use crate::aggregate::{self, AggregateError};
use crate::chart::{self, ChartError, DualAxisChart, Series, ORANGE};
use crate::config::PipelineConfig;

use plotters::style::colors::{BLUE, RED};

/// Errors raised by a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Aggregating a family failed (I/O or malformed trial file).
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// Rendering a chart failed.
    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// Run the whole pipeline described by `config`.
pub fn run(config: &PipelineConfig) -> Result<(), PipelineError> {
    for family in &config.latency {
        let series = match aggregate::latency_family(&config.input_dir, &family.prefix) {
            Ok(series) => series,
            Err(err @ AggregateError::NoData { .. }) => {
                warn!("{err}; skipping chart");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let output = config.output_dir.join(family.output_file());
        info!(
            "rendering {} ({} rounds averaged)",
            output.display(),
            series.len()
        );
        chart::render_line_chart(
            &output,
            &family.title(),
            "Round",
            "average latency (sec)",
            &series,
        )?;
    }

    if let Some(family) = &config.round_throughput {
        match aggregate::round_throughput_family(&config.input_dir, &family.prefix) {
            Ok(series) => {
                let title = family.title();
                let layout = DualAxisChart {
                    title: &title,
                    x_desc: "Round",
                    left_desc: "Average latency of each round (sec)",
                    right_desc: "Average Throughput (MB/sec)",
                    left: Series {
                        label: "avg round latency",
                        values: &series.latency_secs,
                        color: ORANGE,
                    },
                    right: vec![
                        Series {
                            label: "avg total thruput",
                            values: &series.total_mb_per_sec,
                            color: RED,
                        },
                        Series {
                            label: "avg final thruput",
                            values: &series.settled_mb_per_sec,
                            color: BLUE,
                        },
                    ],
                };
                let output = config.output_dir.join(family.output_file());
                info!(
                    "rendering {} ({} rounds averaged)",
                    output.display(),
                    series.latency_secs.len()
                );
                chart::render_dual_axis_png(&output, &layout)?;
            }
            Err(err @ AggregateError::NoData { .. }) => warn!("{err}; skipping chart"),
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(family) = &config.node_throughput {
        match aggregate::node_family(&config.input_dir, &family.prefix) {
            Ok(series) => {
                let title = family.title();
                let layout = DualAxisChart {
                    title: &title,
                    x_desc: "Round (roughly 1 second)",
                    left_desc: "average latency of msg delivered (ms)",
                    right_desc: "average throughput (MB/sec)",
                    left: Series {
                        label: "avg delivered latency",
                        values: &series.latency_ms,
                        color: ORANGE,
                    },
                    right: vec![
                        Series {
                            label: "avg sent (MB)",
                            values: &series.sent_mb,
                            color: RED,
                        },
                        Series {
                            label: "avg recv (MB)",
                            values: &series.recv_mb,
                            color: BLUE,
                        },
                    ],
                };
                let png = config.output_dir.join(family.png_file());
                let svg = config.output_dir.join(family.svg_file());
                info!(
                    "rendering {} and {} ({} rounds averaged)",
                    png.display(),
                    svg.display(),
                    series.latency_ms.len()
                );
                chart::render_dual_axis_png(&png, &layout)?;
                chart::render_dual_axis_svg(&svg, &layout)?;
            }
            Err(err @ AggregateError::NoData { .. }) => warn!("{err}; skipping chart"),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}
