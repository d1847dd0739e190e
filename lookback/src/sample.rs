//! The sample primitive shared by every stream in this crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One `(timestamp, value)` observation of a series.
///
/// Samples are serialized as a two element array `[t, v]`, which keeps
/// fixture files compact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64)", into = "(i64, f64)")]
pub struct Sample {
    /// Timestamp. Units are chosen by the storage layer (milliseconds in practice).
    pub t: i64,
    /// Observed value.
    pub v: f64,
}

impl Sample {
    /// Creates a new sample.
    pub fn new(t: i64, v: f64) -> Self {
        Self { t, v }
    }
}

impl From<(i64, f64)> for Sample {
    fn from((t, v): (i64, f64)) -> Self {
        Self { t, v }
    }
}

impl From<Sample> for (i64, f64) {
    fn from(s: Sample) -> Self {
        (s.t, s.v)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.t, self.v)
    }
}
