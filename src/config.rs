//! # Pipeline Configuration
//!
//! The driver takes an explicit [`PipelineConfig`] instead of baked-in
//! paths and titles. The `Default` implementation reproduces the original
//! experiment layout exactly: trial files under `../eval`, four
//! send-to-event latency families, one per-round throughput family, and
//! one per-node throughput family. A configuration can also be loaded
//! from a TOML file; omitted fields keep their defaults.
//!
//! Output file names, chart titles, and axis labels derive
//! deterministically from each family definition, so two runs over the
//! same inputs always overwrite the same images.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors raised while loading or serializing a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// One scalar-line latency family: repeated trials of a single
/// measurement point, plotted as one line chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyFamily {
    /// File name prefix identifying the family's trial files.
    pub prefix: String,
    /// Output image name; defaults to `image_<prefix>.png`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl LatencyFamily {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            output: None,
        }
    }

    /// Output image file name for this family.
    pub fn output_file(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("image_{}.png", self.prefix)))
    }

    /// Chart title.
    pub fn title(&self) -> String {
        format!("average latency of {}", self.prefix)
    }
}

/// The whitespace-tuple throughput family: per-round elapsed time plus
/// per-event byte counts, plotted on a dual-axis chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundThroughputFamily {
    /// File name prefix identifying the family's trial files.
    pub prefix: String,
    /// Output image name; defaults to `image_<prefix>.png`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl RoundThroughputFamily {
    /// Output image file name for this family.
    pub fn output_file(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("image_{}.png", self.prefix)))
    }

    /// Chart title.
    pub fn title(&self) -> String {
        "Average Throughput of each round".to_string()
    }
}

/// The sentinel-tuple node family: per-node delivered latency and traffic,
/// plotted on a dual-axis chart in both raster and vector form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeThroughputFamily {
    /// File name prefix identifying the family's trial files (one per node).
    pub prefix: String,
    /// Base name of the output images; defaults to `measurement`.
    #[serde(default = "default_node_output")]
    pub output_base: String,
}

fn default_node_output() -> String {
    "measurement".to_string()
}

impl NodeThroughputFamily {
    /// Raster output image name (`<base>.png`).
    pub fn png_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.png", self.output_base))
    }

    /// Vector output image name (`<base>.svg`).
    pub fn svg_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.svg", self.output_base))
    }

    /// Chart title.
    pub fn title(&self) -> String {
        "average throughput and latency".to_string()
    }
}

/// Everything the pipeline driver needs: input location, family
/// definitions, and output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned for trial files.
    pub input_dir: PathBuf,
    /// Directory the images are written into.
    pub output_dir: PathBuf,
    /// Scalar-line latency families, charted in order.
    pub latency: Vec<LatencyFamily>,
    /// The per-round throughput family, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_throughput: Option<RoundThroughputFamily>,
    /// The per-node throughput family, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_throughput: Option<NodeThroughputFamily>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("../eval"),
            output_dir: PathBuf::from("."),
            latency: ["send2echo", "send2fin", "fin2fin", "send2delivered"]
                .iter()
                .map(|prefix| LatencyFamily::new(prefix))
                .collect(),
            round_throughput: Some(RoundThroughputFamily {
                prefix: "thruput".to_string(),
                output: None,
            }),
            node_throughput: Some(NodeThroughputFamily {
                prefix: "node_".to_string(),
                output_base: default_node_output(),
            }),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file; omitted fields default.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Serialize this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
