//! Telemetry Decoder Library
//!
//! Ingests automotive bus telemetry through two pipelines:
//!
//! - **Offline**: decodes frame-based CAN recordings against a DBC message
//!   catalog into per-signal time series and writes them as one JSON
//!   artifact.
//! - **Live**: receives named telemetry values as JSON-over-UDP datagrams
//!   and routes each value to the subscribers registered for its name.
//!
//! Failure isolation is the organizing principle: a bad frame, a sample
//! with no numeric form, or a malformed datagram is contained at that
//! granularity and never disturbs other signals or subscribers. Only a
//! missing catalog, a failed artifact write, or a failed socket bind stops
//! a pipeline.
//!
//! # Example Usage
//!
//! ```no_run
//! use telemetry_decoder::pipeline;
//! use std::path::Path;
//!
//! let stats = pipeline::convert(
//!     Path::new("frames.jsonl"),
//!     Path::new("chassis.dbc"),
//!     Path::new("signals.json"),
//! ).unwrap();
//! println!("{} series written", stats.signals_written);
//! ```
//!
//! Rendering widgets, configuration dialogs, and window layout live in the
//! application layer; this library only decodes and routes.

// Public modules
pub mod aggregate;
pub mod catalog;
pub mod formats;
pub mod frame_decoder;
pub mod live;
pub mod normalize;
pub mod pipeline;
pub mod types;
pub mod writer;

// Re-export main types for convenience
pub use aggregate::{RawSeries, SignalAggregator};
pub use catalog::{CatalogStats, MessageCatalog, MessageDef, SignalDef};
pub use frame_decoder::FrameDecoder;
pub use live::{DatagramListener, PacketParser, SignalRouter, SignalSink, SubscriberId};
pub use normalize::SeriesNormalizer;
pub use pipeline::ConvertStats;
pub use types::{
    DecodedSample, Frame, Result, SignalSeries, SignalValue, TelemetryError, TelemetryPacket,
};
pub use writer::SeriesWriter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
