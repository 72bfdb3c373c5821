//! # Cross-Trial Aggregation
//!
//! A *family* is the set of trial files in one directory whose names share
//! a prefix; each file holds one repeated run of the same experiment. This
//! module discovers a family's files, reads each trial with the parser for
//! the family's [`RecordFormat`](crate::reader::RecordFormat), derives the
//! per-round metrics, and averages them element-wise across trials.
//!
//! Rounds are aligned positionally: round *i* of one trial corresponds to
//! round *i* of every other trial, and averaging truncates to the shortest
//! trial's length. A prefix matching zero files is the distinct
//! [`AggregateError::NoData`] outcome, never a division by zero.

use std::path::{Path, PathBuf};

use log::debug;

use crate::metrics;
use crate::reader::{self, ReadError, RecordFormat};

/// Errors raised while aggregating a family of trial files.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The input directory could not be listed.
    #[error("failed to scan directory {path}: {source}")]
    Scan {
        /// Directory that was being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// One of the family's trial files failed to read or parse.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The prefix matched no files in the directory.
    #[error("no trial files match prefix '{prefix}' in {dir}")]
    NoData {
        /// Family-identifying file name prefix.
        prefix: String,
        /// Directory that was scanned.
        dir: PathBuf,
    },
}

/// Averaged per-round series of one whitespace-tuple throughput family.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundThroughputSeries {
    /// Mean elapsed time per round, in seconds.
    pub latency_secs: Vec<f64>,
    /// Mean total throughput per round, in MB/sec.
    pub total_mb_per_sec: Vec<f64>,
    /// Mean settled throughput per round, in MB/sec.
    pub settled_mb_per_sec: Vec<f64>,
}

/// Averaged per-round series of one sentinel-tuple node family.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSeries {
    /// Mean delivered-message latency per round, in milliseconds.
    pub latency_ms: Vec<f64>,
    /// Mean bytes sent per round, in megabytes.
    pub sent_mb: Vec<f64>,
    /// Mean bytes received per round, in megabytes.
    pub recv_mb: Vec<f64>,
}

/// List the files in `dir` whose names start with `prefix`, sorted by name.
///
/// The sort only makes logs and tests deterministic; averaging itself is
/// order-independent.
pub fn trial_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, AggregateError> {
    let scan_error = |source| AggregateError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(scan_error)? {
        let entry = entry.map_err(scan_error)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(prefix) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Element-wise mean across trials, truncated to the shortest trial.
///
/// Zero trials yields an empty series; family-level callers reject that
/// case up front as [`AggregateError::NoData`].
pub fn mean_by_round(trials: &[Vec<f64>]) -> Vec<f64> {
    let Some(min_len) = trials.iter().map(Vec::len).min() else {
        return Vec::new();
    };
    let count = trials.len() as f64;
    (0..min_len)
        .map(|round| trials.iter().map(|trial| trial[round]).sum::<f64>() / count)
        .collect()
}

/// Averaged latency in seconds for one scalar-line family.
pub fn latency_family(dir: &Path, prefix: &str) -> Result<Vec<f64>, AggregateError> {
    let files = discover(dir, prefix, RecordFormat::ScalarLine)?;
    let mut trials = Vec::with_capacity(files.len());
    for path in &files {
        let raw = reader::read_scalar_trial(path)?;
        trials.push(raw.into_iter().map(metrics::latency_secs).collect());
    }
    Ok(mean_by_round(&trials))
}

/// Averaged latency and throughput series for one whitespace-tuple family.
pub fn round_throughput_family(
    dir: &Path,
    prefix: &str,
) -> Result<RoundThroughputSeries, AggregateError> {
    let files = discover(dir, prefix, RecordFormat::WhitespaceTuple)?;
    let mut latency = Vec::with_capacity(files.len());
    let mut total = Vec::with_capacity(files.len());
    let mut settled = Vec::with_capacity(files.len());
    for path in &files {
        let rounds = reader::read_tuple_trial(path)?;
        latency.push(rounds.iter().map(metrics::round_latency_secs).collect());
        total.push(rounds.iter().map(metrics::total_throughput).collect());
        settled.push(rounds.iter().map(metrics::settled_throughput).collect());
    }
    Ok(RoundThroughputSeries {
        latency_secs: mean_by_round(&latency),
        total_mb_per_sec: mean_by_round(&total),
        settled_mb_per_sec: mean_by_round(&settled),
    })
}

/// Averaged latency and traffic series for one sentinel-tuple node family.
pub fn node_family(dir: &Path, prefix: &str) -> Result<NodeSeries, AggregateError> {
    let files = discover(dir, prefix, RecordFormat::SentinelTuple)?;
    let mut latency = Vec::with_capacity(files.len());
    let mut sent = Vec::with_capacity(files.len());
    let mut recv = Vec::with_capacity(files.len());
    for path in &files {
        let samples = reader::read_sentinel_trial(path)?;
        latency.push(samples.iter().map(|s| s.latency_ms).collect());
        sent.push(samples.iter().map(metrics::sent_megabytes).collect());
        recv.push(samples.iter().map(metrics::recv_megabytes).collect());
    }
    Ok(NodeSeries {
        latency_ms: mean_by_round(&latency),
        sent_mb: mean_by_round(&sent),
        recv_mb: mean_by_round(&recv),
    })
}

/// Discover a family's files and reject the empty-family case.
fn discover(
    dir: &Path,
    prefix: &str,
    format: RecordFormat,
) -> Result<Vec<PathBuf>, AggregateError> {
    let files = trial_files(dir, prefix)?;
    if files.is_empty() {
        return Err(AggregateError::NoData {
            prefix: prefix.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    debug!(
        "family '{}': {} trial file(s), format {}",
        prefix,
        files.len(),
        format
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "expected {e}, got {a}");
        }
    }

    #[test]
    fn mean_truncates_to_shortest_trial() {
        let trials = vec![vec![1.0; 10], vec![3.0; 12]];
        let mean = mean_by_round(&trials);
        assert_eq!(mean.len(), 10);
        assert_close(&mean, &[2.0; 10]);
    }

    #[test]
    fn mean_of_no_trials_is_empty() {
        assert!(mean_by_round(&[]).is_empty());
    }

    #[test]
    fn mean_of_empty_trials_is_empty() {
        assert!(mean_by_round(&[Vec::new(), vec![1.0, 2.0]]).is_empty());
    }

    #[test]
    fn trial_files_filters_and_sorts_by_prefix() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("thruput_1"), "").unwrap();
        fs::write(dir.path().join("thruput_0"), "").unwrap();
        fs::write(dir.path().join("node_0"), "").unwrap();

        let files = trial_files(dir.path(), "thruput").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["thruput_0", "thruput_1"]);
    }

    #[test]
    fn empty_family_is_a_no_data_error() {
        let dir = tempdir().unwrap();
        let err = latency_family(dir.path(), "send2echo").unwrap_err();
        match err {
            AggregateError::NoData { prefix, .. } => assert_eq!(prefix, "send2echo"),
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[test]
    fn missing_directory_is_a_scan_error() {
        let err = trial_files(Path::new("/nonexistent-eval-dir"), "x").unwrap_err();
        assert!(matches!(err, AggregateError::Scan { .. }));
    }

    #[test]
    fn latency_family_averages_across_trials_in_seconds() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("send2fin_0"), "a: 1000\nb: 3000\n").unwrap();
        fs::write(dir.path().join("send2fin_1"), "a: 3000\nb: 3000\nc: 9000\n").unwrap();

        let mean = latency_family(dir.path(), "send2fin").unwrap();
        // Truncated to the 2-round trial; values scaled to seconds.
        assert_close(&mean, &[2.0, 3.0]);
    }

    #[test]
    fn bad_trial_file_fails_the_family() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("send2fin_0"), "a: 1000\n").unwrap();
        fs::write(dir.path().join("send2fin_1"), "garbage\n").unwrap();

        let err = latency_family(dir.path(), "send2fin").unwrap_err();
        assert!(matches!(err, AggregateError::Read(_)));
    }

    #[test]
    fn round_throughput_family_derives_all_three_series() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("thruput_0"), "100 2000000 1000000\n").unwrap();
        fs::write(dir.path().join("thruput_1"), "100 4000000 1000000\n").unwrap();

        let series = round_throughput_family(dir.path(), "thruput").unwrap();
        assert_close(&series.latency_secs, &[0.1]);
        assert_close(&series.total_mb_per_sec, &[40.0]);
        assert_close(&series.settled_mb_per_sec, &[40.0]);
    }

    #[test]
    fn node_family_averages_latency_and_traffic() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("node_0"),
            "h\nh\nr0: INF 2000000 1000000\nr1: 100 1000000 1000000\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("node_1"),
            "h\nh\nr0: 500 4000000 3000000\nr1: 300 3000000 1000000\n",
        )
        .unwrap();

        let series = node_family(dir.path(), "node_").unwrap();
        assert_close(&series.latency_ms, &[750.0, 200.0]);
        assert_close(&series.sent_mb, &[3.0, 2.0]);
        assert_close(&series.recv_mb, &[2.0, 1.0]);
    }

    proptest! {
        /// Permuting the trial set never changes the averaged series.
        #[test]
        fn mean_is_order_independent(
            trials in prop::collection::vec(
                prop::collection::vec(-1.0e6..1.0e6f64, 0..20),
                1..6,
            ),
            rotation in 0usize..6,
        ) {
            let mut permuted = trials.clone();
            permuted.rotate_left(rotation % trials.len());
            permuted.reverse();

            let a = mean_by_round(&trials);
            let b = mean_by_round(&permuted);
            prop_assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(&b) {
                prop_assert!((x - y).abs() < 1e-6);
            }
        }
    }
}
