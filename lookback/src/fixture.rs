//! JSON fixtures for series sets.
//!
//! A fixture is a JSON array of series, each with a label object and a list
//! of `[timestamp, value]` pairs:
//!
//! ```json
//! [
//!   { "labels": { "job": "api" }, "samples": [[1, 0.5], [2, 0.75]] },
//!   { "labels": { "job": "db" },  "samples": [[1, 3.0]] }
//! ]
//! ```
//!
//! Loading validates the orderings every [`SeriesSet`](crate::series::SeriesSet)
//! relies on: label sets strictly ascending and timestamps strictly
//! increasing within each series.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FixtureError, ReadError, Result};
use crate::iterator::expand_series_iterator;
use crate::labels::Labels;
use crate::sample::Sample;
use crate::series::{ListSeries, ListSeriesSet, Series};

/// One series in a fixture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesFixture {
    /// Label set of the series.
    pub labels: Labels,
    /// Samples in ascending timestamp order.
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl SeriesFixture {
    /// Materializes a series by reading its iterator to the end.
    ///
    /// # Errors
    ///
    /// Returns the series iterator's [`ReadError`] if reading fails.
    pub fn from_series(series: &dyn Series) -> std::result::Result<Self, ReadError> {
        let samples = expand_series_iterator(&mut series.iterator())?;
        Ok(Self {
            labels: series.labels().clone(),
            samples,
        })
    }
}

/// Checks label and timestamp ordering of parsed fixtures.
///
/// # Errors
///
/// Returns [`FixtureError::UnsortedSeries`] or
/// [`FixtureError::UnorderedSamples`] on the first violation found.
pub fn validate(series: &[SeriesFixture]) -> Result<()> {
    for (i, pair) in series.windows(2).enumerate() {
        if pair[0].labels >= pair[1].labels {
            return Err(FixtureError::UnsortedSeries {
                index: i + 1,
                labels: pair[1].labels.to_string(),
            }
            .into());
        }
    }

    for s in series {
        for pair in s.samples.windows(2) {
            if pair[0].t >= pair[1].t {
                return Err(FixtureError::UnorderedSamples {
                    labels: s.labels.to_string(),
                    previous: pair[0].t,
                    timestamp: pair[1].t,
                }
                .into());
            }
        }
    }

    Ok(())
}

/// Parses and validates fixtures from a reader.
///
/// # Errors
///
/// Returns [`FixtureError`] if the JSON is malformed or the ordering checks
/// fail.
pub fn parse<R: Read>(reader: R) -> Result<Vec<SeriesFixture>> {
    let series: Vec<SeriesFixture> = serde_json::from_reader(reader).map_err(FixtureError::from)?;
    validate(&series)?;
    Ok(series)
}

/// Parses a fixture into an in-memory series set.
///
/// # Errors
///
/// See [`parse`].
pub fn load_series_set<R: Read>(reader: R) -> Result<ListSeriesSet> {
    let series = parse(reader)?
        .into_iter()
        .map(|f| ListSeries::new(f.labels, f.samples))
        .collect();
    Ok(ListSeriesSet::from_list(series))
}

/// Reads a fixture file into an in-memory series set.
///
/// # Errors
///
/// Returns [`FixtureError::Read`] if the file cannot be opened, otherwise
/// see [`parse`].
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<ListSeriesSet> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_series_set(std::io::BufReader::new(file))
}
