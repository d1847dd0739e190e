//! Configuration for look-back buffering.
//!
//! The stream layer has no files or environment of its own; its only knobs
//! are constructor parameters. [`BufferConfig`] groups the ones a
//! [`BufferedSeriesIterator`](crate::buffer::BufferedSeriesIterator) needs so
//! query engines can carry them in their own (serde-based) configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Sampling interval assumed when sizing a ring from its delta.
///
/// 15 seconds in milliseconds, the most common scrape interval.
pub const DEFAULT_NOMINAL_INTERVAL: i64 = 15_000;

/// Smallest initial ring allocation.
pub const MIN_RING_SIZE: usize = 16;

/// Largest initial ring allocation derived from a delta. Rings still grow
/// beyond this when a window actually holds more samples.
pub const MAX_INITIAL_RING_SIZE: usize = 4096;

/// Look-back window configuration.
///
/// # Example
///
/// ```rust
/// use lookback::config::BufferConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config: BufferConfig = serde_json::from_str(r#"{ "delta": 300000 }"#)?;
/// config.validate()?;
///
/// // 5 minutes at a 15s nominal interval.
/// assert_eq!(config.ring_size(), 21);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Width of the look-back window, in timestamp units.
    pub delta: i64,

    /// Expected number of samples in a window.
    ///
    /// Only sizes the initial ring allocation. When absent it is derived from
    /// `delta` and `nominal_interval`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_hint: Option<usize>,

    /// Assumed spacing between samples, in timestamp units.
    #[serde(default = "default_nominal_interval")]
    pub nominal_interval: i64,
}

fn default_nominal_interval() -> i64 {
    DEFAULT_NOMINAL_INTERVAL
}

impl BufferConfig {
    /// Creates a configuration for window width `delta` with default sizing.
    pub fn new(delta: i64) -> Self {
        Self {
            delta,
            size_hint: None,
            nominal_interval: DEFAULT_NOMINAL_INTERVAL,
        }
    }

    /// Sets an explicit ring size hint.
    #[must_use]
    pub fn with_size_hint(mut self, size_hint: usize) -> Self {
        self.size_hint = Some(size_hint);
        self
    }

    /// Sets the nominal sampling interval used to derive the ring size.
    #[must_use]
    pub fn with_nominal_interval(mut self, interval: i64) -> Self {
        self.nominal_interval = interval;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `delta` is negative
    /// - `size_hint` is `Some(0)`
    /// - `nominal_interval` is not positive
    pub fn validate(&self) -> Result<()> {
        if self.delta < 0 {
            return Err(ConfigError::NegativeDelta { delta: self.delta }.into());
        }

        if self.size_hint == Some(0) {
            return Err(ConfigError::ZeroSizeHint.into());
        }

        if self.nominal_interval <= 0 {
            return Err(ConfigError::InvalidNominalInterval {
                interval: self.nominal_interval,
            }
            .into());
        }

        Ok(())
    }

    /// Returns the initial ring allocation for this configuration.
    ///
    /// An explicit `size_hint` is used as is. Otherwise this is the number of
    /// nominal intervals in `delta` plus one, clamped to
    /// [`MIN_RING_SIZE`]..=[`MAX_INITIAL_RING_SIZE`].
    pub fn ring_size(&self) -> usize {
        if let Some(hint) = self.size_hint {
            return hint.max(1);
        }

        self.delta
            .checked_div(self.nominal_interval)
            .and_then(|n| usize::try_from(n).ok())
            .map_or(MIN_RING_SIZE, |n| n.saturating_add(1))
            .clamp(MIN_RING_SIZE, MAX_INITIAL_RING_SIZE)
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
