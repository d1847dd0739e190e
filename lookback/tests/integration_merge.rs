//! Integration tests for merging partitioned series sets.

use std::collections::BTreeMap;

use lookback::error::ReadError;
use lookback::iterator::{ListSeriesIterator, SeriesIterator, expand_series_iterator};
use lookback::labels::Labels;
use lookback::merge::{PartitionSeriesSet, merge_partitions};
use lookback::sample::Sample;
use lookback::series::{ListSeries, ListSeriesSet, Series, SeriesSet};

fn series(labels: &[(&str, &str)], samples: &[(i64, f64)]) -> ListSeries {
    ListSeries::new(
        Labels::from_pairs(labels.iter().copied()),
        samples
            .iter()
            .map(|&(t, v)| Sample::new(t, v))
            .collect::<Vec<_>>(),
    )
}

/// Compares two sets series by series: labels, samples, and sample errors.
fn assert_sets_equal(mut exp: impl SeriesSet, mut res: impl SeriesSet) {
    loop {
        let (e, r) = (exp.next(), res.next());
        assert_eq!(e.is_some(), r.is_some(), "next");
        let (Some(e), Some(r)) = (e, r) else {
            break;
        };

        assert_eq!(e.labels(), r.labels(), "labels");

        let smpl_exp = expand_series_iterator(&mut e.iterator()).unwrap();
        let smpl_res = expand_series_iterator(&mut r.iterator()).unwrap();
        assert_eq!(smpl_exp, smpl_res, "samples");
    }
    assert!(res.err().is_none());
}

#[test]
fn test_partition_series_set_single_label() {
    let a = ListSeriesSet::from_list(vec![series(&[("a", "a")], &[(1, 1.0)])]);
    let b = ListSeriesSet::from_list(vec![
        series(&[("a", "a")], &[(2, 2.0)]),
        series(&[("b", "b")], &[(1, 1.0)]),
    ]);
    let exp = ListSeriesSet::from_list(vec![
        series(&[("a", "a")], &[(1, 1.0), (2, 2.0)]),
        series(&[("b", "b")], &[(1, 1.0)]),
    ]);

    assert_sets_equal(exp, PartitionSeriesSet::new(a, b));
}

#[test]
fn test_partition_series_set_multi_label() {
    let a = ListSeriesSet::from_list(vec![
        series(
            &[("handler", "prometheus"), ("instance", "127.0.0.1:9090")],
            &[(1, 1.0)],
        ),
        series(
            &[("handler", "prometheus"), ("instance", "localhost:9090")],
            &[(1, 2.0)],
        ),
    ]);
    let b = ListSeriesSet::from_list(vec![
        series(
            &[("handler", "prometheus"), ("instance", "127.0.0.1:9090")],
            &[(2, 1.0)],
        ),
        series(
            &[("handler", "query"), ("instance", "localhost:9090")],
            &[(2, 2.0)],
        ),
    ]);
    let exp = ListSeriesSet::from_list(vec![
        series(
            &[("handler", "prometheus"), ("instance", "127.0.0.1:9090")],
            &[(1, 1.0), (2, 1.0)],
        ),
        series(
            &[("handler", "prometheus"), ("instance", "localhost:9090")],
            &[(1, 2.0)],
        ),
        series(
            &[("handler", "query"), ("instance", "localhost:9090")],
            &[(2, 2.0)],
        ),
    ]);

    assert_sets_equal(exp, PartitionSeriesSet::new(a, b));
}

#[test]
fn test_merge_many_partitions_matches_concatenation() {
    // Three partitions of 10 time units each; series "x" is in all of them,
    // "y" only in the middle one, "z" in the first and last.
    let part = |start: i64, names: &[&str]| -> Box<dyn SeriesSet> {
        Box::new(ListSeriesSet::from_list(
            names
                .iter()
                .map(|n| {
                    let samples: Vec<(i64, f64)> =
                        (start..start + 10).step_by(3).map(|t| (t, 1.0)).collect();
                    series(&[("name", *n)], &samples)
                })
                .collect(),
        ))
    };

    let merged = merge_partitions(vec![
        part(0, &["x", "z"]),
        part(10, &["x", "y"]),
        part(20, &["x", "z"]),
    ]);

    let mut got: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    let mut order = Vec::new();
    for s in merged {
        let name = s.labels().get("name").unwrap().to_string();
        let ts = expand_series_iterator(&mut s.iterator())
            .unwrap()
            .into_iter()
            .map(|s| s.t)
            .collect();
        order.push(name.clone());
        got.insert(name, ts);
    }

    assert_eq!(order, vec!["x", "y", "z"]);
    assert_eq!(got["x"], vec![0, 3, 6, 9, 10, 13, 16, 19, 20, 23, 26, 29]);
    assert_eq!(got["y"], vec![10, 13, 16, 19]);
    assert_eq!(got["z"], vec![0, 3, 6, 9, 20, 23, 26, 29]);

    // Every merged series is strictly increasing in time.
    for ts in got.values() {
        assert!(ts.windows(2).all(|w| w[0] < w[1]));
    }
}

/// A series whose iterator fails after yielding its samples.
struct FailingSeries {
    labels: Labels,
    samples: Vec<Sample>,
}

struct FailingIterator {
    inner: ListSeriesIterator,
    err: Option<ReadError>,
    series: String,
}

impl SeriesIterator for FailingIterator {
    fn seek(&mut self, t: i64) -> bool {
        self.inner.seek(t) || self.fail()
    }

    fn at(&self) -> Sample {
        self.inner.at()
    }

    fn next(&mut self) -> bool {
        self.inner.next() || self.fail()
    }

    fn err(&self) -> Option<&ReadError> {
        self.err.as_ref()
    }
}

impl FailingIterator {
    fn fail(&mut self) -> bool {
        self.err = Some(ReadError::io(
            self.series.clone(),
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "chunk truncated"),
        ));
        false
    }
}

impl Series for FailingSeries {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn iterator(&self) -> Box<dyn SeriesIterator + '_> {
        Box::new(FailingIterator {
            inner: ListSeriesIterator::new(self.samples.clone()),
            err: None,
            series: self.labels.to_string(),
        })
    }
}

#[test]
fn test_read_error_surfaces_through_chained_series() {
    let labels = Labels::from_pairs([("job", "api")]);
    let a = ListSeriesSet::new(vec![Box::new(FailingSeries {
        labels: labels.clone(),
        samples: vec![Sample::new(1, 1.0)],
    }) as Box<dyn Series>]);
    let b = ListSeriesSet::from_list(vec![ListSeries::new(labels, vec![Sample::new(2, 2.0)])]);

    let mut merged = PartitionSeriesSet::new(a, b);
    let chained = merged.next().unwrap();

    let mut it = chained.iterator();
    assert!(it.next());
    assert_eq!(it.at(), Sample::new(1, 1.0));
    assert!(!it.next());
    match it.err() {
        Some(ReadError::Io { series, .. }) => assert_eq!(series, r#"{job="api"}"#),
        other => panic!("expected I/O error, got {other:?}"),
    }

    // The merge itself is unaffected.
    assert!(merged.next().is_none());
    assert!(merged.err().is_none());
}
