//! # evalplot - Benchmark Log Averaging and Chart Rendering
//!
//! `evalplot` is an offline batch tool for the plain-text trial logs our
//! broadcast experiments write: it discovers the trial files of each
//! metric family by file name prefix, parses them, averages every round
//! across trials, and renders line charts to image files.
//!
//! The whole system is one linear pipeline:
//!
//! ```text
//! discover files → parse lines → average across trials → derive metrics → plot
//! ```
//!
//! ## Key Properties
//!
//! - **Explicit record formats**: each family declares one of three line
//!   grammars ([`reader::RecordFormat`]) up front; nothing is inferred
//!   from file content.
//!
//! - **Positional round alignment**: round *i* of one trial is averaged
//!   with round *i* of every other trial in the family, truncated to the
//!   shortest trial. No timestamp alignment is attempted.
//!
//! - **Fail-fast batch semantics**: the first unreadable or malformed
//!   trial file aborts the run; charts already rendered stay on disk. A
//!   prefix matching zero files is an explicit "no data" outcome, not a
//!   crash.
//!
//! - **Deterministic outputs**: image names, titles, and axis labels
//!   derive from the family definitions in [`config::PipelineConfig`],
//!   and existing images are overwritten on each run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evalplot::config::PipelineConfig;
//! use evalplot::pipeline;
//!
//! let mut config = PipelineConfig::default();
//! config.input_dir = "eval".into();
//! config.output_dir = "charts".into();
//! pipeline::run(&config)?;
//! # Ok::<(), evalplot::pipeline::PipelineError>(())
//! ```
//!
//! With the default configuration this renders one latency chart per
//! send-to-event family (`image_send2echo.png`, `image_send2fin.png`,
//! `image_fin2fin.png`, `image_send2delivered.png`), the dual-axis
//! per-round throughput chart (`image_thruput.png`), and the per-node
//! throughput chart in raster and vector form (`measurement.png`,
//! `measurement.svg`).
//!
//! ## Architecture
//!
//! - [`reader`]: one dedicated parser per trial-file line grammar
//! - [`metrics`]: pointwise unit scaling and throughput derivation
//! - [`aggregate`]: prefix-based discovery and cross-trial averaging
//! - [`chart`]: line and dual-axis chart rendering over `plotters`
//! - [`config`]: explicit, TOML-loadable pipeline configuration
//! - [`pipeline`]: the fixed driver sequence

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod reader;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aggregate::{
        latency_family, mean_by_round, node_family, round_throughput_family, trial_files,
        AggregateError, NodeSeries, RoundThroughputSeries,
    };
    pub use crate::chart::{
        render_dual_axis_png, render_dual_axis_svg, render_line_chart, ChartError, DualAxisChart,
        Series,
    };
    pub use crate::config::{
        ConfigError, LatencyFamily, NodeThroughputFamily, PipelineConfig, RoundThroughputFamily,
    };
    pub use crate::metrics::{INF_LATENCY_MS, SETTLED_WINDOW};
    pub use crate::pipeline::PipelineError;
    pub use crate::reader::{
        read_scalar_trial, read_sentinel_trial, read_tuple_trial, NodeSample, ReadError,
        RecordFormat, RoundTuple,
    };
}
