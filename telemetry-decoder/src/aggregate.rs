//! Per-signal time series accumulation
//!
//! Groups decoded samples by signal name and, at finalization, sorts each
//! series by timestamp. Frame order in a recording is usually chronological
//! but not guaranteed, so the explicit sort is unconditional.

use crate::types::{DecodedSample, SignalValue};
use std::collections::BTreeMap;

/// A finished but not yet normalized series: values may still be
/// named/enumerated rather than numeric
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    /// Engineering unit captured from the first sample seen for this name
    pub unit: String,
    /// Sample timestamps in seconds, ascending after `finalize`
    pub times: Vec<f64>,
    /// Sample values, parallel to `times`
    pub values: Vec<SignalValue>,
}

/// Accumulates decoded samples into per-name series
///
/// Same-name signals from different message IDs land in the same series;
/// the catalog does not enforce global name uniqueness and the merge
/// matches how recordings are consumed downstream.
#[derive(Debug, Default)]
pub struct SignalAggregator {
    series: BTreeMap<String, RawSeries>,
}

impl SignalAggregator {
    /// Create a new empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of decoded samples in arrival order
    pub fn ingest(&mut self, samples: impl IntoIterator<Item = DecodedSample>) {
        for sample in samples {
            let entry = self
                .series
                .entry(sample.name)
                .or_insert_with(|| RawSeries {
                    unit: sample.unit,
                    times: Vec::new(),
                    values: Vec::new(),
                });
            entry.times.push(sample.timestamp);
            entry.values.push(sample.value);
        }
    }

    /// Number of distinct signal names accumulated so far
    pub fn signal_count(&self) -> usize {
        self.series.len()
    }

    /// Sort every series by ascending timestamp and hand them out
    ///
    /// The sort is stable: samples with equal timestamps keep their
    /// arrival order.
    pub fn finalize(self) -> BTreeMap<String, RawSeries> {
        let mut out = BTreeMap::new();

        for (name, series) in self.series {
            let mut order: Vec<usize> = (0..series.times.len()).collect();
            order.sort_by(|&a, &b| {
                series.times[a]
                    .partial_cmp(&series.times[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let times = order.iter().map(|&i| series.times[i]).collect();
            let values = order.iter().map(|&i| series.values[i].clone()).collect();

            out.insert(
                name,
                RawSeries {
                    unit: series.unit,
                    times,
                    values,
                },
            );
        }

        out
    }
}
