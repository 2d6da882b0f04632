//! Frame decoding engine
//!
//! Extracts signal values from raw CAN frames based on the signal layouts
//! in the message catalog. Handles bit extraction, endianness, multiplexing,
//! and physical value conversion.

use crate::catalog::{ByteOrder, MessageCatalog, SignalDef, ValueType};
use crate::types::{DecodedSample, Frame, Result, SignalValue, TelemetryError};

/// Frame decoder - extracts signal samples from CAN frames
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode one frame into its signal samples
    ///
    /// Fails with `UnknownId` when the catalog has no definition for the
    /// frame's ID and with `DataLength` when the frame carries fewer data
    /// bytes than its declared DLC. Both are frame-scoped: callers skip
    /// the frame and continue. A signal whose bit range does not fit the
    /// available data is skipped without failing the frame's other signals.
    pub fn decode(frame: &Frame, catalog: &MessageCatalog) -> Result<Vec<DecodedSample>> {
        let message_def = catalog
            .lookup(frame.id)
            .ok_or(TelemetryError::UnknownId(frame.id))?;

        if frame.data.len() < frame.dlc as usize {
            return Err(TelemetryError::DataLength {
                id: frame.id,
                dlc: frame.dlc,
                len: frame.data.len(),
            });
        }
        let data = &frame.data[..frame.dlc as usize];

        // For multiplexed messages, first extract the multiplexer signal value
        let mut multiplexer_value: Option<u64> = None;
        if message_def.is_multiplexed {
            if let Some(ref mux_signal_name) = message_def.multiplexer_signal {
                if let Some(mux_signal) = message_def
                    .signals
                    .iter()
                    .find(|s| s.name == *mux_signal_name)
                {
                    if let Some(value) = Self::extract_signal_value(data, mux_signal) {
                        multiplexer_value = Some(value as u64);
                    }
                }
            }
        }

        let mut samples = Vec::new();

        for signal in &message_def.signals {
            // Check if signal should be decoded based on multiplexer
            if let Some(ref mux_info) = signal.multiplexer_info {
                match multiplexer_value {
                    Some(current) if mux_info.multiplexer_values.contains(&current) => {}
                    // Multiplexer value absent or not selecting this signal
                    _ => continue,
                }
            }

            if let Some(value) = Self::decode_signal(data, signal) {
                samples.push(DecodedSample {
                    timestamp: frame.timestamp,
                    name: signal.name.clone(),
                    value,
                    unit: signal.unit.clone().unwrap_or_default(),
                });
            }
        }

        Ok(samples)
    }

    /// Decode a single signal from frame data
    fn decode_signal(data: &[u8], signal: &SignalDef) -> Option<SignalValue> {
        let raw_value = Self::extract_signal_value(data, signal)?;

        // Value-table hit wins: keep the label together with its raw magnitude
        if let Some(table) = &signal.value_table {
            if let Some(label) = table.get(&raw_value) {
                return Some(SignalValue::Named {
                    label: label.clone(),
                    raw: raw_value,
                });
            }
        }

        let physical_value = signal.offset + signal.factor * (raw_value as f64);

        let value = if signal.factor == 1.0 && signal.offset == 0.0 && signal.length == 1 {
            // Boolean signal (single bit, no scaling)
            SignalValue::Bool(raw_value != 0)
        } else if signal.factor != 1.0 || signal.offset != 0.0 {
            // Scaled signal - use float
            SignalValue::Float(physical_value)
        } else {
            // Integer signal (no scaling)
            SignalValue::Integer(raw_value)
        };

        Some(value)
    }

    /// Extract raw signal value from frame data
    ///
    /// Handles bit extraction with proper endianness support.
    fn extract_signal_value(data: &[u8], signal: &SignalDef) -> Option<i64> {
        let start_bit = signal.start_bit as usize;
        let length = signal.length as usize;

        // Validate signal fits within data. Little-endian signals occupy a
        // contiguous bit range from start_bit; big-endian signals start at
        // the MSB and walk the Motorola sawtooth, so the first byte only
        // contributes start_bit%8 + 1 bits.
        let required_bytes = match signal.byte_order {
            ByteOrder::LittleEndian => (start_bit + length + 7) / 8,
            ByteOrder::BigEndian => {
                let bits_in_first_byte = start_bit % 8 + 1;
                let remaining = length.saturating_sub(bits_in_first_byte);
                start_bit / 8 + 1 + (remaining + 7) / 8
            }
        };
        if required_bytes > data.len() {
            log::warn!(
                "Signal '{}' requires {} bytes but frame only has {} bytes",
                signal.name,
                required_bytes,
                data.len()
            );
            return None;
        }

        let raw_value = match signal.byte_order {
            ByteOrder::LittleEndian => Self::extract_little_endian(data, start_bit, length),
            ByteOrder::BigEndian => Self::extract_big_endian(data, start_bit, length),
        };

        let signed_value = match signal.value_type {
            ValueType::Unsigned => raw_value as i64,
            ValueType::Signed => Self::sign_extend(raw_value, length),
        };

        Some(signed_value)
    }

    /// Extract signal with little-endian (Intel) byte order
    ///
    /// Start bit points to the LSB; bits are numbered from LSB to MSB
    /// within each byte.
    fn extract_little_endian(data: &[u8], start_bit: usize, length: usize) -> u64 {
        let mut result: u64 = 0;

        for i in 0..length {
            let bit_pos = start_bit + i;
            let byte_idx = bit_pos / 8;
            let bit_in_byte = bit_pos % 8;

            if byte_idx < data.len() {
                let bit_value = (data[byte_idx] >> bit_in_byte) & 0x01;
                result |= (bit_value as u64) << i;
            }
        }

        result
    }

    /// Extract signal with big-endian (Motorola) byte order
    ///
    /// DBC convention: start bit marks the MSB of the signal using in-byte
    /// numbering where bit 7 is a byte's MSB. Extraction walks the sawtooth
    /// pattern, down within a byte and then wrapping to the MSB of the next
    /// byte, shifting the result left one bit per step.
    fn extract_big_endian(data: &[u8], start_bit: usize, length: usize) -> u64 {
        let mut result: u64 = 0;
        let mut pos = start_bit;

        for _ in 0..length {
            let byte_idx = pos / 8;
            let bit_in_byte = pos % 8;

            result <<= 1;
            if byte_idx < data.len() {
                result |= ((data[byte_idx] >> bit_in_byte) & 0x01) as u64;
            }

            pos = if pos % 8 == 0 { pos + 15 } else { pos - 1 };
        }

        result
    }

    /// Sign-extend a value from N bits to 64 bits
    fn sign_extend(value: u64, bit_length: usize) -> i64 {
        if bit_length >= 64 {
            return value as i64;
        }

        let sign_bit = 1u64 << (bit_length - 1);
        if (value & sign_bit) != 0 {
            let mask = !0u64 << bit_length;
            (value | mask) as i64
        } else {
            value as i64
        }
    }
}
