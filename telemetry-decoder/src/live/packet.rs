//! Telemetry packet parsing
//!
//! A payload is a UTF-8 JSON object mapping signal names to numbers, e.g.
//! `{"RPM": 1500, "OilPress": 40}`. Anything else is a packet-scoped
//! `PacketParse` error: the caller drops that packet and keeps listening.

use crate::types::{Result, TelemetryPacket, TelemetryError};
use serde_json::Value;

/// Parses datagram payloads into telemetry packets
pub struct PacketParser;

impl PacketParser {
    /// Parse one datagram payload
    pub fn parse(payload: &[u8]) -> Result<TelemetryPacket> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| TelemetryError::PacketParse(format!("invalid JSON: {}", e)))?;

        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(TelemetryError::PacketParse(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let mut entries = Vec::with_capacity(map.len());
        for (name, value) in map {
            let number = match &value {
                Value::Number(n) => n.as_f64().ok_or_else(|| {
                    TelemetryError::PacketParse(format!(
                        "value for '{}' is not representable as f64",
                        name
                    ))
                })?,
                // Flag signals arrive as 0/1, senders occasionally emit bools
                Value::Bool(b) => {
                    if *b {
                        1.0
                    } else {
                        0.0
                    }
                }
                other => {
                    return Err(TelemetryError::PacketParse(format!(
                        "value for '{}' is {} rather than a number",
                        name,
                        json_type_name(other)
                    )))
                }
            };
            entries.push((name, number));
        }

        Ok(TelemetryPacket { entries })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
