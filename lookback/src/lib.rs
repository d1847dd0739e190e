//! # lookback
//!
//! Query-time sample streams for time-series storage.
//!
//! lookback is the layer between stored series and a query evaluator. It
//! merges the label-sorted series sets of time-partitioned storage into one
//! stream, and gives each series a cursor that remembers a trailing window of
//! samples for range functions (rates, increases, `*_over_time`).
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Pull-based, synchronous cursors: no threads, no suspension points
//! - Linear, streaming merge of partitions without materializing series
//! - Look-back rings that reuse their allocation and grow only when a window
//!   outgrows them
//! - Read failures are surfaced unchanged through every wrapping iterator
//!
//! ## Quick Start
//!
//! ```rust
//! use lookback::{BufferedSeriesIterator, Labels, ListSeries, ListSeriesSet, Sample, Series, SeriesIterator};
//! use lookback::merge::merge_partitions;
//! use lookback::series::SeriesSet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let labels = Labels::from_pairs([("job", "api")]);
//! let older = ListSeriesSet::from_list(vec![ListSeries::new(
//!     labels.clone(),
//!     vec![Sample::new(10, 1.0), Sample::new(20, 2.0)],
//! )]);
//! let newer = ListSeriesSet::from_list(vec![ListSeries::new(
//!     labels,
//!     vec![Sample::new(30, 3.0), Sample::new(40, 4.0)],
//! )]);
//!
//! let partitions: Vec<Box<dyn SeriesSet>> = vec![Box::new(older), Box::new(newer)];
//! for series in merge_partitions(partitions) {
//!     let mut it = BufferedSeriesIterator::new(series.iterator(), 15);
//!     if it.seek(35) {
//!         let current = it.at();
//!         let previous = it.peek_back();
//!         println!("{} at {current}, previous {previous:?}", series.labels());
//!     }
//!     if let Some(err) = it.err() {
//!         return Err(err.clone().into());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`SeriesIterator`] - cursor protocol every sample stream implements
//! - [`SampleRing`] - growable circular buffer of the trailing `delta` window
//! - [`BufferedSeriesIterator`] - cursor plus look-back window
//! - [`SeriesSet`] - label-sorted stream of series
//! - [`PartitionSeriesSet`] - merge-join of two consecutive partitions
//!
//! ## Modules
//!
//! - [`sample`] - The `(t, v)` sample type
//! - [`labels`] - Label sets and their canonical order
//! - [`iterator`] - Iterator protocol and the in-memory list iterator
//! - [`ring`] - Look-back sample ring
//! - [`buffer`] - Buffered series iterator
//! - [`series`] - Series and series set traits and in-memory sets
//! - [`merge`] - Partition merge-join and chained series
//! - [`config`] - Buffer configuration
//! - [`fixture`] - JSON fixtures for series sets
//! - [`error`] - Error types

pub mod buffer;
pub mod config;
pub mod error;
pub mod fixture;
pub mod iterator;
pub mod labels;
pub mod merge;
pub mod ring;
pub mod sample;
pub mod series;

// Re-export primary API types at crate root for convenience.
pub use buffer::BufferedSeriesIterator;
pub use config::BufferConfig;
pub use error::{LookbackError, ReadError, Result};
pub use iterator::{ListSeriesIterator, SeriesIterator};
pub use labels::{Label, Labels};
pub use merge::{ChainedSeries, PartitionSeriesSet};
pub use ring::SampleRing;
pub use sample::Sample;
pub use series::{ListSeries, ListSeriesSet, Series, SeriesSet};
