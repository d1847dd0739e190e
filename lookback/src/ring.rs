//! Time-windowed sample ring for look-back evaluation.
//!
//! This module provides [`SampleRing`], a circular buffer that keeps the
//! trailing `delta` window of a series' samples. It is the storage behind
//! [`BufferedSeriesIterator`](crate::buffer::BufferedSeriesIterator), but is
//! usable on its own wherever a "last `delta` of history" view is needed.
//!
//! # Design
//!
//! The ring is an index-addressed backing vector plus head/newest/length
//! counters:
//! - `first` is the slot of the oldest buffered sample
//! - `newest` is the slot of the most recently added sample
//! - logical index `k` lives at slot `(first + k) % capacity`
//!
//! Adding a sample first frees the oldest entries that fall out of the window
//! `[t - delta, t]`, then appends. Only when every slot is still in use does
//! the backing vector double, relocating the live window to the front. The
//! capacity never shrinks, so a ring that has seen its widest window stops
//! allocating.

use tracing::trace;

use crate::error::ReadError;
use crate::iterator::SeriesIterator;
use crate::sample::Sample;

/// Placeholder stored in unused slots.
const EMPTY: Sample = Sample { t: 0, v: 0.0 };

/// A bounded, auto-growing circular buffer of the samples within `delta` of
/// the newest one.
///
/// Samples must be added in non-decreasing timestamp order. This is a
/// precondition supplied by the caller and is not verified.
///
/// # Examples
///
/// ```rust
/// use lookback::ring::SampleRing;
///
/// let mut ring = SampleRing::new(2, 1);
/// for t in 1..=5 {
///     ring.add(t, t as f64);
/// }
/// let ts: Vec<i64> = ring.samples().map(|s| s.t).collect();
/// assert_eq!(ts, vec![3, 4, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct SampleRing {
    /// Window width; samples older than `newest.t - delta` are freed.
    delta: i64,
    /// Backing storage. Its length is the ring capacity.
    buf: Vec<Sample>,
    /// Slot of the oldest buffered sample.
    first: usize,
    /// Slot of the newest buffered sample. Meaningless while `len == 0`.
    newest: usize,
    /// Number of buffered samples.
    len: usize,
}

impl SampleRing {
    /// Creates a ring for window width `delta`.
    ///
    /// `size_hint` is the expected number of samples in a window and only
    /// sizes the initial allocation; the ring grows past it as needed. A hint
    /// of zero is treated as one, and a negative `delta` as zero.
    pub fn new(delta: i64, size_hint: usize) -> Self {
        Self {
            delta: delta.max(0),
            buf: vec![EMPTY; size_hint.max(1)],
            first: 0,
            newest: 0,
            len: 0,
        }
    }

    /// Returns the window width.
    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// Returns the number of buffered samples.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the ring holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of samples the ring can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Drops all buffered samples, keeping the allocation.
    pub fn reset(&mut self) {
        self.len = 0;
        self.first = 0;
        self.newest = 0;
    }

    /// Adds `(t, v)` as the newest sample and frees every sample with a
    /// timestamp below `t - delta`.
    ///
    /// Samples exactly at `t - delta` are kept.
    pub fn add(&mut self, t: i64, v: f64) {
        let min_t = t.saturating_sub(self.delta);
        while self.len > 0 && self.buf[self.first].t < min_t {
            self.first = (self.first + 1) % self.buf.len();
            self.len -= 1;
        }

        let cap = self.buf.len();
        if self.len == 0 {
            self.first = 0;
            self.newest = 0;
        } else if self.len == cap {
            self.grow();
            self.newest = cap;
        } else {
            self.newest = (self.newest + 1) % cap;
        }

        self.buf[self.newest] = Sample { t, v };
        self.len += 1;
    }

    /// Doubles the backing storage, moving the live window to the front.
    fn grow(&mut self) {
        let cap = self.buf.len();
        let mut buf = Vec::with_capacity(cap * 2);
        buf.extend_from_slice(&self.buf[self.first..]);
        buf.extend_from_slice(&self.buf[..self.first]);
        buf.resize(cap * 2, EMPTY);

        trace!(old_capacity = cap, new_capacity = cap * 2, "growing sample ring");

        self.buf = buf;
        self.first = 0;
    }

    /// Returns the sample at logical index `k` (0 = oldest).
    #[inline]
    fn get(&self, k: usize) -> Sample {
        self.buf[(self.first + k) % self.buf.len()]
    }

    /// Returns the newest buffered sample.
    pub fn last(&self) -> Option<Sample> {
        (self.len > 0).then(|| self.buf[self.newest])
    }

    /// Returns the buffered samples from oldest to newest.
    ///
    /// This is a read-only view; it does not disturb the ring.
    pub fn samples(&self) -> Samples<'_> {
        Samples {
            ring: self,
            front: 0,
            back: self.len,
        }
    }

    /// Copies the buffered samples into a vector, oldest first.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples().collect()
    }

    /// Returns a [`SeriesIterator`] over the buffered samples.
    ///
    /// The iterator borrows the ring, so it always observes the contents as
    /// of the call.
    pub fn iterator(&self) -> SampleRingIterator<'_> {
        SampleRingIterator {
            ring: self,
            cur: None,
        }
    }
}

/// Standard iterator over a ring's samples, oldest first.
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    ring: &'a SampleRing,
    front: usize,
    back: usize,
}

impl Iterator for Samples<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.front == self.back {
            return None;
        }
        let s = self.ring.get(self.front);
        self.front += 1;
        Some(s)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Samples<'_> {
    fn next_back(&mut self) -> Option<Sample> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.ring.get(self.back))
    }
}

impl ExactSizeIterator for Samples<'_> {}

/// A [`SeriesIterator`] over the contents of a [`SampleRing`].
#[derive(Debug, Clone)]
pub struct SampleRingIterator<'a> {
    ring: &'a SampleRing,
    /// Logical index of the current sample.
    cur: Option<usize>,
}

impl SeriesIterator for SampleRingIterator<'_> {
    fn seek(&mut self, t: i64) -> bool {
        let len = self.ring.len;
        let (mut lo, mut hi) = (self.cur.unwrap_or(0).min(len), len);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.ring.get(mid).t < t {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        self.cur = Some(lo);
        lo < len
    }

    fn at(&self) -> Sample {
        self.ring.get(self.cur.unwrap_or(0))
    }

    fn next(&mut self) -> bool {
        let idx = self.cur.map_or(0, |i| (i + 1).min(self.ring.len));
        self.cur = Some(idx);
        idx < self.ring.len
    }

    fn err(&self) -> Option<&ReadError> {
        None
    }
}
