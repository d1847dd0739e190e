//! Buffered iteration: a current-sample cursor plus its look-back window.
//!
//! [`BufferedSeriesIterator`] wraps a [`SeriesIterator`] and feeds every
//! sample it steps past into a [`SampleRing`]. Range functions such as rates
//! can then read the current sample with [`SeriesIterator::at`] and the
//! samples preceding it with [`BufferedSeriesIterator::buffer`], without
//! rescanning the underlying series.
//!
//! # Example
//!
//! ```rust
//! use lookback::buffer::BufferedSeriesIterator;
//! use lookback::iterator::{ListSeriesIterator, SeriesIterator};
//! use lookback::sample::Sample;
//!
//! let samples: Vec<Sample> = (1..=6).map(|t| Sample::new(t * 10, t as f64)).collect();
//! let mut it = BufferedSeriesIterator::new(ListSeriesIterator::new(samples), 20);
//!
//! assert!(it.seek(45));
//! assert_eq!(it.at().t, 50);
//!
//! let mut window = it.buffer();
//! let mut history = Vec::new();
//! while window.next() {
//!     history.push(window.at().t);
//! }
//! assert_eq!(history, vec![30, 40]);
//! ```

use tracing::trace;

use crate::config::BufferConfig;
use crate::error::{ReadError, Result};
use crate::iterator::SeriesIterator;
use crate::ring::{SampleRing, SampleRingIterator};
use crate::sample::Sample;

/// Cursor state of a buffered iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No `next`/`seek` has succeeded yet.
    Unstarted,
    /// `cur` holds a valid sample.
    Positioned,
    /// The underlying iterator returned `false`. `cur` keeps the last valid
    /// sample, if there was one.
    Exhausted,
}

/// A series iterator that keeps a trailing window of the samples it passed.
///
/// The ring holds samples strictly before the current one, within `delta` of
/// the newest buffered sample. It is mutated only by this iterator's own
/// `next`/`seek` calls.
#[derive(Debug)]
pub struct BufferedSeriesIterator<I> {
    it: I,
    buf: SampleRing,
    cur: Sample,
    state: State,
}

impl<I: SeriesIterator> BufferedSeriesIterator<I> {
    /// Wraps `it` with a look-back window of width `delta`.
    ///
    /// The ring is sized from `delta` at the default nominal interval. A
    /// negative `delta` behaves as zero; use [`Self::with_config`] to reject
    /// it instead.
    pub fn new(it: I, delta: i64) -> Self {
        let config = BufferConfig::new(delta);
        Self::from_ring(it, SampleRing::new(delta, config.ring_size()))
    }

    /// Wraps `it` using a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::error::ConfigError) if the
    /// configuration is invalid.
    pub fn with_config(it: I, config: &BufferConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_ring(
            it,
            SampleRing::new(config.delta, config.ring_size()),
        ))
    }

    fn from_ring(it: I, buf: SampleRing) -> Self {
        Self {
            it,
            buf,
            cur: Sample::new(i64::MIN, 0.0),
            state: State::Unstarted,
        }
    }

    /// Returns the look-back window width.
    pub fn delta(&self) -> i64 {
        self.buf.delta()
    }

    /// Returns an iterator over the buffered samples, oldest first.
    ///
    /// The current sample is not included. The returned iterator borrows
    /// `self`, so the window cannot change while it is being read.
    pub fn buffer(&self) -> SampleRingIterator<'_> {
        self.buf.iterator()
    }

    /// Returns the newest buffered sample, i.e. the one right before the
    /// current sample if it is still inside the window.
    pub fn peek_back(&self) -> Option<Sample> {
        self.buf.last()
    }

    /// Returns the wrapped iterator.
    pub fn into_inner(self) -> I {
        self.it
    }

    /// Records the outcome of moving the underlying iterator.
    fn settle(&mut self, ok: bool) -> bool {
        if ok {
            self.cur = self.it.at();
            self.state = State::Positioned;
        } else {
            self.state = State::Exhausted;
        }
        ok
    }
}

impl<I: SeriesIterator> SeriesIterator for BufferedSeriesIterator<I> {
    /// Advances to the first sample at or after `t`, buffering on the way.
    ///
    /// When the window start `t - delta` lies beyond the current sample, the
    /// ring is cleared and the underlying iterator seeks directly to
    /// `t - delta`. The remaining distance is covered by buffered `next`
    /// calls, so the ring ends up holding only samples from `t - delta` on.
    ///
    /// This is not the same as stepping to `t` with `next`: the ring evicts
    /// relative to its newest sample, so a `next` loop keeps samples older
    /// than `t - delta` until the following `add`, while a jump drops them.
    fn seek(&mut self, t: i64) -> bool {
        if self.state == State::Exhausted {
            return false;
        }

        let window_start = t.saturating_sub(self.buf.delta());
        if self.state == State::Unstarted || window_start > self.cur.t {
            if self.state == State::Positioned {
                trace!(from = self.cur.t, to = window_start, "buffered seek jumps underlying iterator");
            }
            self.buf.reset();
            let ok = self.it.seek(window_start);
            if !self.settle(ok) {
                return false;
            }
        }

        if self.cur.t >= t {
            return true;
        }
        while self.next() {
            if self.cur.t >= t {
                return true;
            }
        }
        false
    }

    fn at(&self) -> Sample {
        self.cur
    }

    fn next(&mut self) -> bool {
        match self.state {
            State::Exhausted => return false,
            State::Positioned => self.buf.add(self.cur.t, self.cur.v),
            State::Unstarted => {}
        }
        let ok = self.it.next();
        self.settle(ok)
    }

    fn err(&self) -> Option<&ReadError> {
        self.it.err()
    }
}
