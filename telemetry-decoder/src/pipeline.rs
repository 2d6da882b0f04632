//! Offline pipeline driver
//!
//! Streams a frame log through decode, aggregation, and normalization and
//! writes the resulting per-signal series artifact. Per-frame failures
//! (unknown IDs, short data, malformed log lines) skip the frame and keep
//! going; only catalog load and artifact write failures abort the run.

use crate::aggregate::SignalAggregator;
use crate::catalog::MessageCatalog;
use crate::formats::{FrameSource, JsonlFrameLog};
use crate::frame_decoder::FrameDecoder;
use crate::normalize::SeriesNormalizer;
use crate::types::{Frame, Result, SignalSeries, TelemetryError};
use crate::writer::SeriesWriter;
use std::collections::BTreeMap;
use std::path::Path;

/// Counters reported by a pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Frame records read from the log, including malformed ones
    pub frames_read: usize,
    /// Frames that produced at least one sample
    pub frames_decoded: usize,
    /// Frames skipped: unknown ID, short data, or malformed record
    pub frames_skipped: usize,
    /// Samples dropped during normalization
    pub samples_dropped: usize,
    /// Signal series written to the artifact
    pub signals_written: usize,
}

/// Decode a JSON-lines frame log into a per-signal series artifact
pub fn convert(log: &Path, dbc: &Path, output: &Path) -> Result<ConvertStats> {
    let catalog = MessageCatalog::from_dbc_file(dbc)?;
    let cat_stats = catalog.stats();
    log::info!(
        "Catalog loaded: {} messages, {} signals",
        cat_stats.num_messages,
        cat_stats.num_signals
    );

    let frames = JsonlFrameLog::open(log)?;
    let (series, mut stats) = decode_and_aggregate(frames, &catalog);

    stats.signals_written = series.len();
    SeriesWriter::write(&series, output)?;

    log::info!(
        "Converted {} frames ({} skipped) into {} series",
        stats.frames_read,
        stats.frames_skipped,
        stats.signals_written
    );
    Ok(stats)
}

/// Run the decode/aggregate/normalize steps over any frame iterator
pub fn decode_and_aggregate(
    frames: impl Iterator<Item = Result<Frame>>,
    catalog: &MessageCatalog,
) -> (BTreeMap<String, SignalSeries>, ConvertStats) {
    let mut stats = ConvertStats::default();
    let mut aggregator = SignalAggregator::new();

    for frame in frames {
        stats.frames_read += 1;

        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Skipping malformed frame record: {}", e);
                stats.frames_skipped += 1;
                continue;
            }
        };

        match FrameDecoder::decode(&frame, catalog) {
            Ok(samples) => {
                stats.frames_decoded += 1;
                aggregator.ingest(samples);
            }
            Err(TelemetryError::UnknownId(id)) => {
                log::debug!("Skipping frame with unknown ID 0x{:X}", id);
                stats.frames_skipped += 1;
            }
            Err(e) => {
                log::warn!("Skipping frame: {}", e);
                stats.frames_skipped += 1;
            }
        }
    }

    let mut series = BTreeMap::new();
    for (name, raw) in aggregator.finalize() {
        let (normalized, dropped) = SeriesNormalizer::normalize(&name, raw);
        stats.samples_dropped += dropped;
        series.insert(name, normalized);
    }

    (series, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ByteOrder, MessageDef, SignalDef, ValueType};

    fn rpm_catalog() -> MessageCatalog {
        let mut catalog = MessageCatalog::new();
        catalog.add_message(MessageDef {
            id: 0x100,
            name: "EngineData".to_string(),
            size: 2,
            signals: vec![SignalDef {
                name: "RPM".to_string(),
                start_bit: 0,
                length: 16,
                byte_order: ByteOrder::LittleEndian,
                value_type: ValueType::Unsigned,
                factor: 1.0,
                offset: 0.0,
                unit: Some("rpm".to_string()),
                value_table: None,
                multiplexer_info: None,
            }],
            is_multiplexed: false,
            multiplexer_signal: None,
        });
        catalog
    }

    fn frame(ts: f64, id: u32, data: Vec<u8>) -> Result<Frame> {
        Ok(Frame {
            timestamp: ts,
            id,
            dlc: data.len() as u8,
            data,
        })
    }

    #[test]
    fn test_unknown_id_isolated() {
        let catalog = rpm_catalog();
        let frames = vec![
            frame(0.0, 0x100, vec![0x0A, 0x00]),
            frame(0.1, 0x200, vec![0; 8]), // unknown ID
            frame(0.2, 0x100, vec![0x14, 0x00]),
        ];

        let (series, stats) = decode_and_aggregate(frames.into_iter(), &catalog);

        assert_eq!(stats.frames_read, 3);
        assert_eq!(stats.frames_decoded, 2);
        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(series["RPM"].values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_out_of_order_frames_sorted() {
        let catalog = rpm_catalog();
        let frames = vec![
            frame(5.0, 0x100, vec![0x02, 0x00]),
            frame(2.0, 0x100, vec![0x01, 0x00]),
        ];

        let (series, _) = decode_and_aggregate(frames.into_iter(), &catalog);

        assert_eq!(series["RPM"].times, vec![2.0, 5.0]);
        assert_eq!(series["RPM"].values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_malformed_record_isolated() {
        let catalog = rpm_catalog();
        let frames = vec![
            Err(TelemetryError::LogParse("line 1: bad record".to_string())),
            frame(0.1, 0x100, vec![0x0A, 0x00]),
        ];

        let (series, stats) = decode_and_aggregate(frames.into_iter(), &catalog);

        assert_eq!(stats.frames_skipped, 1);
        assert_eq!(series["RPM"].values, vec![10.0]);
    }
}
