//! Merging of time-partitioned series sets.
//!
//! Storage is split into partitions covering disjoint, consecutive time
//! ranges. Each partition yields its own label-sorted [`SeriesSet`];
//! [`PartitionSeriesSet`] joins two of them into one label-sorted stream.
//!
//! # Algorithm
//!
//! The merge keeps one lookahead series from each input and compares their
//! label sets:
//!
//! - lower label set on either side: emit it unchanged, advance that side
//! - equal label sets: emit a [`ChainedSeries`] whose samples are the older
//!   side's followed by the newer side's, advance both
//! - one side exhausted: pass the other through
//!
//! Chaining is a concatenation, not a time-merge. The caller guarantees that
//! for every shared label set all samples in `b` are strictly newer than all
//! samples in `a`; this is not checked at runtime.
//!
//! [`merge_partitions`] folds any number of partitions, oldest first, into
//! nested partition sets.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::error::ReadError;
use crate::iterator::SeriesIterator;
use crate::labels::Labels;
use crate::sample::Sample;
use crate::series::{EmptySeriesSet, Series, SeriesSet};

/// Merge-join of two label-sorted series sets covering consecutive time
/// ranges.
///
/// # Example
///
/// ```rust
/// use lookback::labels::Labels;
/// use lookback::merge::PartitionSeriesSet;
/// use lookback::sample::Sample;
/// use lookback::series::{ListSeries, ListSeriesSet};
///
/// let older = ListSeriesSet::from_list(vec![
///     ListSeries::new(Labels::from_pairs([("a", "a")]), vec![Sample::new(1, 1.0)]),
/// ]);
/// let newer = ListSeriesSet::from_list(vec![
///     ListSeries::new(Labels::from_pairs([("a", "a")]), vec![Sample::new(2, 2.0)]),
///     ListSeries::new(Labels::from_pairs([("b", "b")]), vec![Sample::new(1, 1.0)]),
/// ]);
///
/// let merged: Vec<String> = PartitionSeriesSet::new(older, newer)
///     .map(|s| s.labels().to_string())
///     .collect();
/// assert_eq!(merged, vec![r#"{a="a"}"#, r#"{b="b"}"#]);
/// ```
pub struct PartitionSeriesSet<A, B> {
    a: A,
    b: B,
    /// Lookahead from `a`; `None` once `a` is exhausted.
    cur_a: Option<Box<dyn Series>>,
    /// Lookahead from `b`; `None` once `b` is exhausted.
    cur_b: Option<Box<dyn Series>>,
}

impl<A: SeriesSet, B: SeriesSet> PartitionSeriesSet<A, B> {
    /// Creates a merge of `a` (older samples) and `b` (newer samples).
    ///
    /// Both inputs must be sorted by label set, and for each label set they
    /// share, every sample in `b` must be newer than every sample in `a`.
    pub fn new(mut a: A, mut b: B) -> Self {
        let cur_a = a.next();
        let cur_b = b.next();
        Self { a, b, cur_a, cur_b }
    }

    fn advance_a(&mut self) -> Option<Box<dyn Series>> {
        let next = self.a.next();
        std::mem::replace(&mut self.cur_a, next)
    }

    fn advance_b(&mut self) -> Option<Box<dyn Series>> {
        let next = self.b.next();
        std::mem::replace(&mut self.cur_b, next)
    }
}

impl<A: SeriesSet, B: SeriesSet> Iterator for PartitionSeriesSet<A, B> {
    type Item = Box<dyn Series>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.err().is_some() {
            return None;
        }

        let order = match (&self.cur_a, &self.cur_b) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.labels().cmp(b.labels()),
        };

        match order {
            Ordering::Less => self.advance_a(),
            Ordering::Greater => self.advance_b(),
            Ordering::Equal => {
                let a = self.advance_a()?;
                let b = self.advance_b()?;
                trace!(labels = %a.labels(), "chaining series across partitions");
                Some(Box::new(ChainedSeries::new(a, b)))
            }
        }
    }
}

impl<A: SeriesSet, B: SeriesSet> SeriesSet for PartitionSeriesSet<A, B> {
    fn err(&self) -> Option<&ReadError> {
        self.a.err().or_else(|| self.b.err())
    }
}

/// Folds partition sets, ordered oldest to newest, into one merged set.
///
/// No input yields an [`EmptySeriesSet`]; a single input is returned as is.
pub fn merge_partitions<I>(sets: I) -> Box<dyn SeriesSet>
where
    I: IntoIterator<Item = Box<dyn SeriesSet>>,
{
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return Box::new(EmptySeriesSet);
    };
    let mut partitions = 1_usize;
    let merged = sets.fold(first, |merged, newer| -> Box<dyn SeriesSet> {
        partitions += 1;
        Box::new(PartitionSeriesSet::new(merged, newer))
    });
    debug!(partitions, "merging partition series sets");
    merged
}

/// A series present in two consecutive partitions.
///
/// Its iterator yields the older series' samples, then the newer one's.
pub struct ChainedSeries {
    a: Box<dyn Series>,
    b: Box<dyn Series>,
}

impl ChainedSeries {
    /// Chains `a` (older) and `b` (newer). Both must share a label set.
    pub fn new(a: Box<dyn Series>, b: Box<dyn Series>) -> Self {
        Self { a, b }
    }
}

impl Series for ChainedSeries {
    fn labels(&self) -> &Labels {
        self.a.labels()
    }

    fn iterator(&self) -> Box<dyn SeriesIterator + '_> {
        Box::new(ChainedSeriesIterator::new(self.a.iterator(), self.b.iterator()))
    }
}

/// Which of the chained iterators is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    First,
    Second,
}

/// Concatenation of two series iterators.
///
/// Reads `a` until it is exhausted, then `b`. If `a` fails, iteration stops
/// there and [`SeriesIterator::err`] reports `a`'s error; `b` is never read.
#[derive(Debug)]
pub struct ChainedSeriesIterator<A, B> {
    a: A,
    b: B,
    phase: Phase,
}

impl<A: SeriesIterator, B: SeriesIterator> ChainedSeriesIterator<A, B> {
    /// Creates an iterator over `a` followed by `b`.
    pub fn new(a: A, b: B) -> Self {
        Self {
            a,
            b,
            phase: Phase::First,
        }
    }
}

impl<A: SeriesIterator, B: SeriesIterator> SeriesIterator for ChainedSeriesIterator<A, B> {
    fn seek(&mut self, t: i64) -> bool {
        if self.phase == Phase::First {
            if self.a.seek(t) {
                return true;
            }
            if self.a.err().is_some() {
                return false;
            }
            self.phase = Phase::Second;
        }
        self.b.seek(t)
    }

    fn at(&self) -> Sample {
        match self.phase {
            Phase::First => self.a.at(),
            Phase::Second => self.b.at(),
        }
    }

    fn next(&mut self) -> bool {
        if self.phase == Phase::First {
            if self.a.next() {
                return true;
            }
            if self.a.err().is_some() {
                return false;
            }
            self.phase = Phase::Second;
        }
        self.b.next()
    }

    fn err(&self) -> Option<&ReadError> {
        match self.phase {
            Phase::First => self.a.err(),
            Phase::Second => self.b.err(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::{ListSeriesIterator, expand_series_iterator};
    use crate::series::{FailedSeriesSet, ListSeries, ListSeriesSet};

    fn list(ts: &[i64]) -> ListSeriesIterator {
        ListSeriesIterator::new(ts.iter().map(|&t| Sample::new(t, 0.0)).collect::<Vec<_>>())
    }

    fn times(it: &mut dyn SeriesIterator) -> Vec<i64> {
        expand_series_iterator(it)
            .unwrap()
            .into_iter()
            .map(|s| s.t)
            .collect()
    }

    fn set(names: &[&str]) -> ListSeriesSet {
        ListSeriesSet::from_list(
            names
                .iter()
                .map(|n| ListSeries::new(Labels::from_pairs([("n", *n)]), vec![Sample::new(1, 1.0)]))
                .collect(),
        )
    }

    fn names(set: impl SeriesSet) -> Vec<String> {
        set.map(|s| s.labels().get("n").unwrap_or_default().to_string())
            .collect()
    }

    /// Iterator that fails immediately.
    struct Broken(ReadError);

    impl SeriesIterator for Broken {
        fn seek(&mut self, _t: i64) -> bool {
            false
        }
        fn at(&self) -> Sample {
            Sample::new(0, 0.0)
        }
        fn next(&mut self) -> bool {
            false
        }
        fn err(&self) -> Option<&ReadError> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_chain_concatenates() {
        let mut it = ChainedSeriesIterator::new(list(&[1, 2]), list(&[3, 4]));
        assert_eq!(times(&mut it), vec![1, 2, 3, 4]);
        assert!(it.err().is_none());
    }

    #[test]
    fn test_chain_with_empty_sides() {
        let mut it = ChainedSeriesIterator::new(list(&[]), list(&[3]));
        assert_eq!(times(&mut it), vec![3]);
        let mut it = ChainedSeriesIterator::new(list(&[1]), list(&[]));
        assert_eq!(times(&mut it), vec![1]);
    }

    #[test]
    fn test_chain_seek_across_phases() {
        let mut it = ChainedSeriesIterator::new(list(&[1, 2, 3]), list(&[10, 11]));
        assert!(it.seek(2));
        assert_eq!(it.at().t, 2);
        assert!(it.seek(5));
        assert_eq!(it.at().t, 10);
        assert!(it.seek(1));
        assert_eq!(it.at().t, 10);
        assert!(it.next());
        assert_eq!(it.at().t, 11);
        assert!(!it.seek(12));
    }

    #[test]
    fn test_chain_stops_on_first_error() {
        let err = ReadError::corrupted("{}", "bad chunk");
        let mut it = ChainedSeriesIterator::new(Broken(err), list(&[3]));
        assert!(!it.next());
        assert!(matches!(it.err(), Some(ReadError::Corrupted { .. })));
        assert!(!it.seek(0));
    }

    #[test]
    fn test_chain_reports_second_error() {
        let err = ReadError::io("{}", std::io::Error::other("disk gone"));
        let mut it = ChainedSeriesIterator::new(list(&[1]), Broken(err));
        assert!(it.next());
        assert!(!it.next());
        assert!(matches!(it.err(), Some(ReadError::Io { .. })));
    }

    #[test]
    fn test_disjoint_sets_interleave_by_labels() {
        let merged = PartitionSeriesSet::new(set(&["a", "c", "e"]), set(&["b", "d"]));
        assert_eq!(names(merged), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_one_side_empty() {
        assert_eq!(names(PartitionSeriesSet::new(set(&[]), set(&["a"]))), vec!["a"]);
        assert_eq!(names(PartitionSeriesSet::new(set(&["a"]), set(&[]))), vec!["a"]);
        assert!(names(PartitionSeriesSet::new(set(&[]), set(&[]))).is_empty());
    }

    #[test]
    fn test_equal_labels_merge_once() {
        let merged = PartitionSeriesSet::new(set(&["a", "b"]), set(&["a", "b"]));
        assert_eq!(names(merged), vec!["a", "b"]);
    }

    #[test]
    fn test_input_error_stops_merge() {
        let failed = FailedSeriesSet::new(ReadError::corrupted("{}", "bad index"));
        let mut merged = PartitionSeriesSet::new(set(&["a"]), failed);
        assert!(merged.next().is_none());
        assert!(merged.err().is_some());
    }

    #[test]
    fn test_merge_partitions() {
        assert!(merge_partitions(Vec::<Box<dyn SeriesSet>>::new()).next().is_none());

        let single = merge_partitions(vec![Box::new(set(&["a"])) as Box<dyn SeriesSet>]);
        assert_eq!(names(single), vec!["a"]);

        let merged = merge_partitions(vec![
            Box::new(set(&["b"])) as Box<dyn SeriesSet>,
            Box::new(set(&["a", "b"])),
            Box::new(set(&["c"])),
        ]);
        assert_eq!(names(merged), vec!["a", "b", "c"]);
    }
}
