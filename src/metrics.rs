//! Pointwise metric derivation from raw trial records.
//!
//! All unit scaling lives here so the parsers in [`crate::reader`] stay
//! purely lexical. Every function is a stateless transform of one round's
//! record; there is no cross-round state.

use crate::reader::{NodeSample, RoundTuple};

/// Latency substituted for rounds where no delivery was measured, in ms.
///
/// Sentinel-tuple files write the literal `INF` for such rounds; the plots
/// clamp them to this constant instead of treating them as missing data.
pub const INF_LATENCY_MS: f64 = 1000.0;

/// Number of leading payload columns counted as steady-state completion.
///
/// The settled ("final") throughput sums only the first four byte-count
/// columns of a round; the remaining columns carry in-flight event types.
pub const SETTLED_WINDOW: usize = 4;

/// Bytes per megabyte (decimal, matching the units the logs were written in).
pub const BYTES_PER_MB: f64 = 1_000_000.0;

/// Milliseconds per second.
pub const MS_PER_SEC: f64 = 1000.0;

/// Convert a raw scalar-line value to seconds.
pub fn latency_secs(raw: i64) -> f64 {
    raw as f64 / MS_PER_SEC
}

/// Elapsed time of one round, in seconds.
pub fn round_latency_secs(tuple: &RoundTuple) -> f64 {
    tuple.elapsed_ms as f64 / MS_PER_SEC
}

/// Total throughput of one round in MB/sec, over every payload column.
///
/// A zero elapsed time yields `f64::INFINITY` rather than an error.
pub fn total_throughput(tuple: &RoundTuple) -> f64 {
    throughput_over(tuple, tuple.payload_bytes.len())
}

/// Settled throughput of one round in MB/sec, over the first
/// [`SETTLED_WINDOW`] payload columns (or fewer, if the row is short).
pub fn settled_throughput(tuple: &RoundTuple) -> f64 {
    throughput_over(tuple, SETTLED_WINDOW)
}

fn throughput_over(tuple: &RoundTuple, columns: usize) -> f64 {
    let bytes: i64 = tuple.payload_bytes.iter().take(columns).sum();
    (bytes as f64 / BYTES_PER_MB) / (tuple.elapsed_ms as f64 / MS_PER_SEC)
}

/// Bytes sent during one sentinel-tuple round, in megabytes.
pub fn sent_megabytes(sample: &NodeSample) -> f64 {
    sample.sent_bytes as f64 / BYTES_PER_MB
}

/// Bytes received during one sentinel-tuple round, in megabytes.
pub fn recv_megabytes(sample: &NodeSample) -> f64 {
    sample.recv_bytes as f64 / BYTES_PER_MB
}
