//! Series and series sets.
//!
//! A [`Series`] is a label set plus a way to construct fresh iterators over
//! its samples. A [`SeriesSet`] is a forward-only stream of series in
//! ascending label set order, which is what storage hands to the query layer
//! for each partition.
//!
//! # Overview
//!
//! - [`ListSeries`] / [`ListSeriesSet`] - in-memory implementations, used
//!   for fixtures and tests and by storage layers that materialize results
//! - [`EmptySeriesSet`] - a set with no series
//! - [`FailedSeriesSet`] - a set that could not be opened; reports its error
//!   through [`SeriesSet::err`]
//!
//! Merging of partition sets lives in [`merge`](crate::merge).

use std::fmt;
use std::sync::Arc;

use crate::error::ReadError;
use crate::iterator::{ListSeriesIterator, SeriesIterator};
use crate::labels::Labels;
use crate::sample::Sample;

/// A single series: its identity and access to its samples.
pub trait Series {
    /// Returns the label set identifying this series.
    fn labels(&self) -> &Labels;

    /// Returns a new iterator over the series' samples.
    ///
    /// Each call yields an independent iterator starting before the first
    /// sample, so a series can be replayed.
    fn iterator(&self) -> Box<dyn SeriesIterator + '_>;
}

impl<S: Series + ?Sized> Series for Box<S> {
    fn labels(&self) -> &Labels {
        (**self).labels()
    }

    fn iterator(&self) -> Box<dyn SeriesIterator + '_> {
        (**self).iterator()
    }
}

/// A forward-only stream of series in ascending label set order.
///
/// Iteration ends at `None` both on exhaustion and on failure; callers check
/// [`SeriesSet::err`] afterwards to tell the two apart.
pub trait SeriesSet: Iterator<Item = Box<dyn Series>> {
    /// Returns the error that stopped this set, if any.
    fn err(&self) -> Option<&ReadError> {
        None
    }
}

impl<S: SeriesSet + ?Sized> SeriesSet for Box<S> {
    fn err(&self) -> Option<&ReadError> {
        (**self).err()
    }
}

/// An in-memory series.
#[derive(Debug, Clone)]
pub struct ListSeries {
    labels: Labels,
    samples: Arc<[Sample]>,
}

impl ListSeries {
    /// Creates a series from time-sorted samples.
    pub fn new(labels: Labels, samples: impl Into<Arc<[Sample]>>) -> Self {
        Self {
            labels,
            samples: samples.into(),
        }
    }

    /// Returns the samples of this series.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl Series for ListSeries {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn iterator(&self) -> Box<dyn SeriesIterator + '_> {
        Box::new(ListSeriesIterator::new(Arc::clone(&self.samples)))
    }
}

/// An in-memory series set.
///
/// The series must already be in ascending label set order; the set does not
/// sort them.
pub struct ListSeriesSet {
    series: std::vec::IntoIter<Box<dyn Series>>,
}

impl ListSeriesSet {
    /// Creates a set from series in ascending label set order.
    pub fn new(series: Vec<Box<dyn Series>>) -> Self {
        Self {
            series: series.into_iter(),
        }
    }

    /// Creates a set from in-memory series in ascending label set order.
    pub fn from_list(series: Vec<ListSeries>) -> Self {
        Self::new(
            series
                .into_iter()
                .map(|s| Box::new(s) as Box<dyn Series>)
                .collect(),
        )
    }
}

impl fmt::Debug for ListSeriesSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListSeriesSet")
            .field("remaining", &self.series.len())
            .finish_non_exhaustive()
    }
}

impl Iterator for ListSeriesSet {
    type Item = Box<dyn Series>;

    fn next(&mut self) -> Option<Self::Item> {
        self.series.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.series.size_hint()
    }
}

impl SeriesSet for ListSeriesSet {}

/// A series set without series.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySeriesSet;

impl Iterator for EmptySeriesSet {
    type Item = Box<dyn Series>;

    fn next(&mut self) -> Option<Self::Item> {
        None
    }
}

impl SeriesSet for EmptySeriesSet {}

/// A series set whose source failed before producing any series.
#[derive(Debug, Clone)]
pub struct FailedSeriesSet {
    err: ReadError,
}

impl FailedSeriesSet {
    /// Creates a set that yields nothing and reports `err`.
    pub fn new(err: ReadError) -> Self {
        Self { err }
    }
}

impl Iterator for FailedSeriesSet {
    type Item = Box<dyn Series>;

    fn next(&mut self) -> Option<Self::Item> {
        None
    }
}

impl SeriesSet for FailedSeriesSet {
    fn err(&self) -> Option<&ReadError> {
        Some(&self.err)
    }
}
