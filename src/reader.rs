//! # Trial File Parsing
//!
//! Each experiment writes one text file per trial. This module turns one
//! trial file into an ordered sequence of raw numeric records.
//!
//! A family of trial files uses exactly one of three line grammars,
//! selected up front via [`RecordFormat`] rather than sniffed from the
//! content:
//!
//! 1. **ScalarLine**: `"label: 3000"`, one labeled integer per line.
//! 2. **WhitespaceTuple**: `"100 2000000 1000000 ..."`, elapsed
//!    milliseconds for the round followed by per-event byte counts.
//! 3. **SentinelTuple**: a two-line header, then `"label: INF 500 700"`:
//!    a latency in milliseconds (or the literal `INF` for rounds where no
//!    delivery was measured) followed by sent and received byte counts.
//!
//! Parsers are purely lexical: they return raw integers and leave every
//! unit conversion to [`crate::metrics`]. A malformed line fails the whole
//! file with a [`ReadError`] carrying the path and 1-based line number;
//! callers treat one bad trial file as fatal for its family.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::metrics::INF_LATENCY_MS;

/// Number of header lines skipped at the top of a [`RecordFormat::SentinelTuple`] file.
pub const SENTINEL_HEADER_LINES: usize = 2;

/// Token standing in for an unmeasured latency in sentinel-tuple files.
pub const SENTINEL_TOKEN: &str = "INF";

/// Line grammar of a trial file, chosen once per metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// `"label: integer"` per line.
    ScalarLine,
    /// Whitespace-separated integers per line; elapsed ms first, then byte counts.
    WhitespaceTuple,
    /// Two header lines, then `"label: latency sent recv"` with an `INF` sentinel.
    SentinelTuple,
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordFormat::ScalarLine => write!(f, "scalar-line"),
            RecordFormat::WhitespaceTuple => write!(f, "whitespace-tuple"),
            RecordFormat::SentinelTuple => write!(f, "sentinel-tuple"),
        }
    }
}

/// Errors raised while reading a trial file.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// I/O failure opening or reading the file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the trial file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line that does not match the family's record format.
    #[error("{path}:{line}: malformed {format} record: {reason}")]
    Malformed {
        /// Path of the trial file.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
        /// Record format the file was read as.
        format: RecordFormat,
        /// What was wrong with the line.
        reason: String,
    },
}

/// One round of a whitespace-tuple trial: elapsed time plus per-event byte counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTuple {
    /// Elapsed time for the round, in milliseconds.
    pub elapsed_ms: i64,
    /// Byte counts for the sub-events of the round, in file column order.
    pub payload_bytes: Vec<i64>,
}

/// One round of a sentinel-tuple trial.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSample {
    /// Delivered-message latency in milliseconds; `INF` maps to
    /// [`INF_LATENCY_MS`] instead of failing the parse.
    pub latency_ms: f64,
    /// Bytes sent during the round.
    pub sent_bytes: i64,
    /// Bytes received during the round.
    pub recv_bytes: i64,
}

/// Read a [`RecordFormat::ScalarLine`] trial file into raw per-round integers.
///
/// No unit conversion is applied; see [`crate::metrics::latency_secs`].
pub fn read_scalar_trial(path: &Path) -> Result<Vec<i64>, ReadError> {
    let reader = open(path)?;
    let mut values = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| io_error(path, source))?;
        let rest = value_part(path, idx, RecordFormat::ScalarLine, &line)?;
        let value = rest.trim().parse::<i64>().map_err(|_| {
            malformed(
                path,
                idx,
                RecordFormat::ScalarLine,
                format!("invalid integer '{}'", rest.trim()),
            )
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Read a [`RecordFormat::WhitespaceTuple`] trial file.
///
/// Each line must carry at least the elapsed-time column.
pub fn read_tuple_trial(path: &Path) -> Result<Vec<RoundTuple>, ReadError> {
    let reader = open(path)?;
    let mut rounds = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| io_error(path, source))?;
        let mut columns = Vec::new();
        for token in line.split_whitespace() {
            let value = token.parse::<i64>().map_err(|_| {
                malformed(
                    path,
                    idx,
                    RecordFormat::WhitespaceTuple,
                    format!("invalid integer '{}'", token),
                )
            })?;
            columns.push(value);
        }
        if columns.is_empty() {
            return Err(malformed(
                path,
                idx,
                RecordFormat::WhitespaceTuple,
                "expected at least the elapsed-time column".to_string(),
            ));
        }
        let elapsed_ms = columns.remove(0);
        rounds.push(RoundTuple {
            elapsed_ms,
            payload_bytes: columns,
        });
    }
    Ok(rounds)
}

/// Read a [`RecordFormat::SentinelTuple`] trial file, skipping its
/// [`SENTINEL_HEADER_LINES`]-line header.
pub fn read_sentinel_trial(path: &Path) -> Result<Vec<NodeSample>, ReadError> {
    let reader = open(path)?;
    let mut samples = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| io_error(path, source))?;
        if idx < SENTINEL_HEADER_LINES {
            continue;
        }
        let rest = value_part(path, idx, RecordFormat::SentinelTuple, &line)?;
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(malformed(
                path,
                idx,
                RecordFormat::SentinelTuple,
                format!("expected 3 values after the label, found {}", tokens.len()),
            ));
        }
        let latency_ms = if tokens[0] == SENTINEL_TOKEN {
            INF_LATENCY_MS
        } else {
            tokens[0].parse::<i64>().map_err(|_| {
                malformed(
                    path,
                    idx,
                    RecordFormat::SentinelTuple,
                    format!("invalid latency '{}'", tokens[0]),
                )
            })? as f64
        };
        let sent_bytes = parse_byte_column(path, idx, tokens[1], "sent")?;
        let recv_bytes = parse_byte_column(path, idx, tokens[2], "recv")?;
        samples.push(NodeSample {
            latency_ms,
            sent_bytes,
            recv_bytes,
        });
    }
    Ok(samples)
}

/// Open a trial file for buffered line reading.
///
/// The handle lives only as long as the returned reader, so it is released
/// as soon as the calling parser returns, success or failure.
fn open(path: &Path) -> Result<BufReader<File>, ReadError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    Ok(BufReader::new(file))
}

/// Split a `"label: value"` line and return the value part.
fn value_part<'a>(
    path: &Path,
    idx: usize,
    format: RecordFormat,
    line: &'a str,
) -> Result<&'a str, ReadError> {
    line.split_once(':')
        .map(|(_, rest)| rest)
        .ok_or_else(|| malformed(path, idx, format, "missing ':' separator".to_string()))
}

fn parse_byte_column(path: &Path, idx: usize, token: &str, which: &str) -> Result<i64, ReadError> {
    token.parse::<i64>().map_err(|_| {
        malformed(
            path,
            idx,
            RecordFormat::SentinelTuple,
            format!("invalid {} byte count '{}'", which, token),
        )
    })
}

fn io_error(path: &Path, source: std::io::Error) -> ReadError {
    ReadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn malformed(path: &Path, idx: usize, format: RecordFormat, reason: String) -> ReadError {
    ReadError::Malformed {
        path: path.to_path_buf(),
        line: idx + 1,
        format,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn scalar_trial_parses_labeled_integers() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "send2echo_0.log", "round0: 1000\nround1: 3000\n");

        let values = read_scalar_trial(&path).unwrap();
        assert_eq!(values, vec![1000, 3000]);
    }

    #[test]
    fn scalar_trial_rejects_missing_separator() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "send2echo_0.log", "round0: 1000\n2500\n");

        let err = read_scalar_trial(&path).unwrap_err();
        match err {
            ReadError::Malformed { line, format, .. } => {
                assert_eq!(line, 2);
                assert_eq!(format, RecordFormat::ScalarLine);
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn scalar_trial_rejects_non_numeric_value() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "send2echo_0.log", "round0: fast\n");

        let err = read_scalar_trial(&path).unwrap_err();
        assert!(err.to_string().contains("invalid integer 'fast'"));
    }

    #[test]
    fn tuple_trial_splits_elapsed_from_payload_columns() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "thruput_0.log", "100 2000000 1000000\n250 1 2 3 4 5\n");

        let rounds = read_tuple_trial(&path).unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].elapsed_ms, 100);
        assert_eq!(rounds[0].payload_bytes, vec![2_000_000, 1_000_000]);
        assert_eq!(rounds[1].elapsed_ms, 250);
        assert_eq!(rounds[1].payload_bytes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn tuple_trial_rejects_empty_line() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "thruput_0.log", "100 200\n\n");

        let err = read_tuple_trial(&path).unwrap_err();
        assert!(err.to_string().contains("elapsed-time column"));
    }

    #[test]
    fn tuple_trial_rejects_non_numeric_column() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "thruput_0.log", "100 many\n");

        let err = read_tuple_trial(&path).unwrap_err();
        assert!(err.to_string().contains("invalid integer 'many'"));
    }

    #[test]
    fn sentinel_trial_skips_header_and_maps_inf() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "node_0.log",
            "node 0 listening\nround latency sent recv\nr0: INF 500000 700000\nr1: 42 2000000 3000000\n",
        );

        let samples = read_sentinel_trial(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].latency_ms, INF_LATENCY_MS);
        assert_eq!(samples[0].sent_bytes, 500_000);
        assert_eq!(samples[0].recv_bytes, 700_000);
        assert_eq!(samples[1].latency_ms, 42.0);
    }

    #[test]
    fn sentinel_trial_rejects_wrong_column_count() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "node_0.log", "h1\nh2\nr0: 42 100\n");

        let err = read_sentinel_trial(&path).unwrap_err();
        match err {
            ReadError::Malformed { line, .. } => assert_eq!(line, 3),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn sentinel_trial_rejects_unknown_sentinel() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "node_0.log", "h1\nh2\nr0: NAN 100 200\n");

        let err = read_sentinel_trial(&path).unwrap_err();
        assert!(err.to_string().contains("invalid latency 'NAN'"));
    }

    #[test]
    fn missing_file_surfaces_io_error_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.log");

        let err = read_scalar_trial(&path).unwrap_err();
        match err {
            ReadError::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn empty_files_parse_to_empty_series() {
        let dir = tempdir().unwrap();
        let scalar = write_file(&dir, "a.log", "");
        let tuple = write_file(&dir, "b.log", "");

        assert!(read_scalar_trial(&scalar).unwrap().is_empty());
        assert!(read_tuple_trial(&tuple).unwrap().is_empty());
    }
}
