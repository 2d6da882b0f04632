//! Core types for the telemetry decoder library
//!
//! This module defines the fundamental types flowing through both pipelines:
//! raw frames in, decoded samples and time series out on the offline side,
//! telemetry packets on the live side.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Raw CAN frame as read from a frame log
///
/// This represents a single CAN frame before any signal decoding.
/// Timestamps are seconds relative to the start of the recording;
/// they are usually, but not guaranteed to be, monotonic.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Timestamp in seconds
    pub timestamp: f64,
    /// CAN message ID (11-bit or 29-bit)
    pub id: u32,
    /// Data length code declared by the frame (0-8)
    pub dlc: u8,
    /// Frame data bytes; must be at least `dlc` bytes long
    pub data: Vec<u8>,
}

/// Errors that can occur in either pipeline
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to load message catalog: {0}")]
    CatalogLoad(String),

    #[error("Failed to parse frame log: {0}")]
    LogParse(String),

    #[error("No message definition for CAN ID 0x{0:X}")]
    UnknownId(u32),

    #[error("Frame 0x{id:X} declares dlc {dlc} but carries only {len} data bytes")]
    DataLength { id: u32, dlc: u8, len: usize },

    #[error("Signal '{signal}' has no numeric representation for value '{value}'")]
    Unnormalizable { signal: String, value: String },

    #[error("Failed to write output artifact: {0}")]
    Write(String),

    #[error("Failed to bind datagram socket on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Malformed telemetry packet: {0}")]
    PacketParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded signal value before normalization
///
/// Value-table hits keep both the label and the raw magnitude so the
/// normalizer can fall back to the number when producing numeric series.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    /// Signed integer value (no scaling applied in the definition)
    Integer(i64),
    /// Floating-point value (after scaling/offset)
    Float(f64),
    /// Boolean value (single bit, no scaling)
    Bool(bool),
    /// Value-table hit: label plus the raw value it stands for
    Named { label: String, raw: i64 },
    /// Textual value with no numeric backing
    Text(String),
}

impl SignalValue {
    /// Numeric magnitude of this value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Integer(v) => Some(*v as f64),
            SignalValue::Float(v) => Some(*v),
            SignalValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            SignalValue::Named { raw, .. } => Some(*raw as f64),
            SignalValue::Text(_) => None,
        }
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Integer(v) => write!(f, "{}", v),
            SignalValue::Float(v) => write!(f, "{:.3}", v),
            SignalValue::Bool(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            SignalValue::Named { label, .. } => write!(f, "{}", label),
            SignalValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One decoded signal sample, produced by the frame decoder and consumed
/// immediately by the aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSample {
    /// Timestamp of the frame this sample came from
    pub timestamp: f64,
    /// Signal name from the message definition
    pub name: String,
    /// Decoded value
    pub value: SignalValue,
    /// Engineering unit (e.g., "rpm", "V"), empty if none
    pub unit: String,
}

/// A finished, numeric-only per-signal time series
///
/// `times` is non-decreasing and `times.len() == values.len()` always
/// holds; both are enforced by the aggregation and normalization steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    /// Engineering unit, empty if none
    pub unit: String,
    /// Sample timestamps in seconds, ascending
    pub times: Vec<f64>,
    /// Sample values, parallel to `times`
    pub values: Vec<f64>,
}

/// One decoded live telemetry packet: the named values it carried
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPacket {
    pub entries: Vec<(String, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_value_magnitudes() {
        assert_eq!(SignalValue::Integer(42).as_f64(), Some(42.0));
        assert_eq!(SignalValue::Float(3.14).as_f64(), Some(3.14));
        assert_eq!(SignalValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(
            SignalValue::Named {
                label: "Reverse".to_string(),
                raw: 2
            }
            .as_f64(),
            Some(2.0)
        );
        assert_eq!(SignalValue::Text("n/a".to_string()).as_f64(), None);
    }

    #[test]
    fn test_signal_value_display() {
        assert_eq!(format!("{}", SignalValue::Integer(42)), "42");
        assert_eq!(format!("{}", SignalValue::Float(3.14159)), "3.142");
        assert_eq!(
            format!(
                "{}",
                SignalValue::Named {
                    label: "Park".to_string(),
                    raw: 0
                }
            ),
            "Park"
        );
    }
}
