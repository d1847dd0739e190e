//! The series iterator protocol.
//!
//! Every stream in this crate is read through [`SeriesIterator`]: a pull-based
//! cursor over one series' samples in strictly ascending timestamp order.
//! Storage-backed iterators, the in-memory [`ListSeriesIterator`], chained
//! iterators produced by partition merges, and the buffered iterator all share
//! this protocol, so they can wrap one another freely.
//!
//! # Protocol
//!
//! - A fresh iterator is unpositioned. [`SeriesIterator::at`] may only be
//!   called after `next` or `seek` returned `true`.
//! - `next` and `seek` return `false` when the series is exhausted *or* a read
//!   failed; [`SeriesIterator::err`] tells the two apart.
//! - `seek` never moves backwards. Seeking to a timestamp at or before the
//!   current sample leaves the cursor where it is.

use std::sync::Arc;

use crate::error::ReadError;
use crate::sample::Sample;

/// A forward-only cursor over the samples of a single series.
pub trait SeriesIterator {
    /// Advances to the first sample with timestamp `>= t`.
    ///
    /// The search starts at the current position, so a target at or before
    /// the current sample is a no-op that returns `true`. Returns `false` if
    /// no such sample exists.
    fn seek(&mut self, t: i64) -> bool;

    /// Returns the sample at the current position.
    ///
    /// Calling this before a successful `next`/`seek` is a protocol violation
    /// and the result is unspecified.
    fn at(&self) -> Sample;

    /// Advances by exactly one sample. Returns `false` when exhausted.
    fn next(&mut self) -> bool;

    /// Returns the terminal read error, if iteration stopped because of one.
    fn err(&self) -> Option<&ReadError>;
}

impl<I: SeriesIterator + ?Sized> SeriesIterator for Box<I> {
    fn seek(&mut self, t: i64) -> bool {
        (**self).seek(t)
    }

    fn at(&self) -> Sample {
        (**self).at()
    }

    fn next(&mut self) -> bool {
        (**self).next()
    }

    fn err(&self) -> Option<&ReadError> {
        (**self).err()
    }
}

impl<I: SeriesIterator + ?Sized> SeriesIterator for &mut I {
    fn seek(&mut self, t: i64) -> bool {
        (**self).seek(t)
    }

    fn at(&self) -> Sample {
        (**self).at()
    }

    fn next(&mut self) -> bool {
        (**self).next()
    }

    fn err(&self) -> Option<&ReadError> {
        (**self).err()
    }
}

/// Drains an iterator into a vector.
///
/// # Errors
///
/// Returns the iterator's terminal [`ReadError`] if iteration stopped on a
/// read failure rather than clean exhaustion.
///
/// # Examples
///
/// ```rust
/// use lookback::iterator::{expand_series_iterator, ListSeriesIterator};
/// use lookback::sample::Sample;
///
/// let mut it = ListSeriesIterator::new(vec![Sample::new(1, 1.0), Sample::new(2, 4.0)]);
/// let samples = expand_series_iterator(&mut it)?;
/// assert_eq!(samples.len(), 2);
/// # Ok::<(), lookback::error::ReadError>(())
/// ```
pub fn expand_series_iterator<I>(it: &mut I) -> Result<Vec<Sample>, ReadError>
where
    I: SeriesIterator + ?Sized,
{
    let mut out = Vec::new();
    while it.next() {
        out.push(it.at());
    }
    match it.err() {
        Some(err) => Err(err.clone()),
        None => Ok(out),
    }
}

/// An iterator over an in-memory, time-sorted list of samples.
///
/// Seeks binary-search the unconsumed tail of the list. Cloning the backing
/// list is an `Arc` bump, so a [`ListSeries`](crate::series::ListSeries) can
/// hand out any number of independent iterators.
#[derive(Debug, Clone)]
pub struct ListSeriesIterator {
    list: Arc<[Sample]>,
    /// Index of the current sample; `None` before the first `next`/`seek`.
    cur: Option<usize>,
}

impl ListSeriesIterator {
    /// Creates an iterator over `samples`, which must be sorted by timestamp.
    pub fn new(samples: impl Into<Arc<[Sample]>>) -> Self {
        Self {
            list: samples.into(),
            cur: None,
        }
    }
}

impl SeriesIterator for ListSeriesIterator {
    fn seek(&mut self, t: i64) -> bool {
        let start = self.cur.unwrap_or(0).min(self.list.len());
        let idx = start + self.list[start..].partition_point(|s| s.t < t);
        self.cur = Some(idx);
        idx < self.list.len()
    }

    /// # Panics
    ///
    /// Panics if the iterator is not positioned on a sample.
    fn at(&self) -> Sample {
        match self.cur {
            Some(i) => self.list[i],
            None => panic!("ListSeriesIterator::at called before next or seek"),
        }
    }

    fn next(&mut self) -> bool {
        let idx = self.cur.map_or(0, |i| (i + 1).min(self.list.len()));
        self.cur = Some(idx);
        idx < self.list.len()
    }

    fn err(&self) -> Option<&ReadError> {
        None
    }
}
