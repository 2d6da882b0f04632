//! Series normalization
//!
//! Converts finished raw series into numeric-only series. Named values fall
//! back to their underlying raw magnitude; a value with no numeric backing
//! drops that single sample from both the time and value vectors rather
//! than failing the whole series.

use crate::aggregate::RawSeries;
use crate::types::{SignalSeries, TelemetryError};

/// Normalizes raw series into numeric-only series
pub struct SeriesNormalizer;

impl SeriesNormalizer {
    /// Produce the numeric series for one signal
    ///
    /// Returns the series together with the number of samples dropped
    /// because they had no numeric representation.
    pub fn normalize(name: &str, raw: RawSeries) -> (SignalSeries, usize) {
        let mut times = Vec::with_capacity(raw.times.len());
        let mut values = Vec::with_capacity(raw.values.len());
        let mut dropped = 0usize;

        for (ts, value) in raw.times.into_iter().zip(raw.values.into_iter()) {
            match value.as_f64() {
                Some(v) => {
                    times.push(ts);
                    values.push(v);
                }
                None => {
                    let err = TelemetryError::Unnormalizable {
                        signal: name.to_string(),
                        value: value.to_string(),
                    };
                    log::warn!("Dropping sample at t={}: {}", ts, err);
                    dropped += 1;
                }
            }
        }

        // Parallel-vector invariant must survive the drops
        debug_assert_eq!(times.len(), values.len());

        (
            SignalSeries {
                unit: raw.unit,
                times,
                values,
            },
            dropped,
        )
    }
}
