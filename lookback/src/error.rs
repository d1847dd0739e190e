//! Error types for the lookback query-time sample streams.

use std::sync::Arc;

use thiserror::Error;

/// The main error type for all lookback operations.
///
/// Iteration itself never returns this type: iterators report a terminal
/// [`ReadError`] through their `err()` accessor. `LookbackError` covers the
/// fallible edges around them, such as configuration and fixture loading.
#[derive(Error, Debug)]
pub enum LookbackError {
    /// An underlying iterator failed to produce a sample.
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    /// A constructor was given an invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A JSON fixture could not be loaded.
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),
}

/// A read failure reported by a series iterator.
///
/// This is the only runtime failure the stream layer knows about. It is
/// produced by storage collaborators and passed through wrapping iterators
/// unchanged, which is why it is `Clone`: the I/O source is shared behind an
/// [`Arc`].
#[derive(Error, Debug, Clone)]
pub enum ReadError {
    /// The storage backing a series could not be read.
    #[error("failed to read series {series}: {source}")]
    Io {
        /// Label set of the series being read, in display form.
        series: String,
        /// The underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The stored samples of a series are not decodable.
    #[error("series {series} is corrupted: {reason}")]
    Corrupted {
        /// Label set of the series being read, in display form.
        series: String,
        /// Description of the corruption.
        reason: String,
    },
}

impl ReadError {
    /// Wraps an I/O error raised while reading `series`.
    pub fn io(series: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            series: series.into(),
            source: Arc::new(source),
        }
    }

    /// Reports undecodable data for `series`.
    pub fn corrupted(series: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupted {
            series: series.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur when validating iterator configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The look-back window width is negative.
    #[error("invalid delta {delta}: look-back window must not be negative")]
    NegativeDelta {
        /// The rejected delta.
        delta: i64,
    },

    /// An explicit ring size hint of zero was given.
    #[error("invalid size hint: ring must be able to hold at least one sample")]
    ZeroSizeHint,

    /// The nominal sampling interval is not positive.
    #[error("invalid nominal interval {interval}: must be > 0")]
    InvalidNominalInterval {
        /// The rejected interval.
        interval: i64,
    },
}

/// Errors that can occur while loading a JSON fixture.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("failed to read fixture '{}': {source}", path.display())]
    Read {
        /// The fixture path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The fixture is not valid JSON or does not match the fixture layout.
    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_json::Error),

    /// Series are not in strictly ascending label set order.
    #[error("series {index} with labels {labels} is not sorted after its predecessor")]
    UnsortedSeries {
        /// Position of the offending series in the fixture.
        index: usize,
        /// Display form of the offending label set.
        labels: String,
    },

    /// Samples of a series are not strictly increasing in time.
    #[error("series {labels}: sample at {timestamp} does not follow {previous}")]
    UnorderedSamples {
        /// Display form of the offending label set.
        labels: String,
        /// Timestamp of the preceding sample.
        previous: i64,
        /// Timestamp that is not greater than `previous`.
        timestamp: i64,
    },
}

/// Type alias for `Result<T, LookbackError>`.
pub type Result<T> = std::result::Result<T, LookbackError>;
