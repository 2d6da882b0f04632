//! DBC file parser
//!
//! Parses Vector DBC files and converts them into the catalog's internal
//! message definition format.

use crate::catalog::store::{ByteOrder, MessageDef, MultiplexerInfo, SignalDef, ValueType};
use crate::types::{Result, TelemetryError};
use std::collections::HashMap;
use std::path::Path;

/// Parse a DBC file and return message definitions
pub fn parse_dbc_file(path: &Path) -> Result<Vec<MessageDef>> {
    log::info!("Parsing DBC file: {:?}", path);

    // Read the DBC file as bytes first (handle non-UTF8 encodings)
    let bytes = std::fs::read(path).map_err(|e| {
        TelemetryError::CatalogLoad(format!("Failed to read file {:?}: {}", path, e))
    })?;

    // Try UTF-8 first, then fall back to Latin-1 (compatible with Windows-1252)
    let dbc_content = match String::from_utf8(bytes.clone()) {
        Ok(s) => s,
        Err(_) => {
            log::warn!("DBC file is not UTF-8, trying Latin-1 encoding");
            bytes.iter().map(|&b| b as char).collect()
        }
    };

    // Parse using can-dbc crate
    let dbc = can_dbc::DBC::from_slice(dbc_content.as_bytes()).map_err(|e| {
        TelemetryError::CatalogLoad(format!("Failed to parse DBC file {:?}: {:?}", path, e))
    })?;

    // Collect VAL_ sections up front, keyed by (message id, signal name)
    let value_tables = collect_value_tables(&dbc);

    // Convert to our internal format
    let mut messages = Vec::new();

    for dbc_msg in dbc.messages() {
        let message = convert_message(dbc_msg, &value_tables)?;
        messages.push(message);
    }

    log::info!("Parsed {} messages from {:?}", messages.len(), path);

    Ok(messages)
}

/// Extract all signal value tables (VAL_ sections) from the DBC
fn collect_value_tables(dbc: &can_dbc::DBC) -> HashMap<(u32, String), HashMap<i64, String>> {
    let mut tables: HashMap<(u32, String), HashMap<i64, String>> = HashMap::new();

    for desc in dbc.value_descriptions() {
        if let can_dbc::ValueDescription::Signal {
            message_id,
            signal_name,
            value_descriptions,
        } = desc
        {
            let table = tables
                .entry((message_id.0, signal_name.clone()))
                .or_default();
            for val_desc in value_descriptions {
                table.insert(*val_desc.a() as i64, val_desc.b().to_string());
            }
        }
    }

    tables
}

/// Convert a can-dbc message to our MessageDef
fn convert_message(
    dbc_msg: &can_dbc::Message,
    value_tables: &HashMap<(u32, String), HashMap<i64, String>>,
) -> Result<MessageDef> {
    let msg_id = dbc_msg.message_id().0; // Extract raw ID from MessageId tuple struct
    let mut signals = Vec::new();
    let mut is_multiplexed = false;
    let mut multiplexer_signal_name: Option<String> = None;

    // First pass: identify multiplexer signal
    for dbc_sig in dbc_msg.signals() {
        if let can_dbc::MultiplexIndicator::Multiplexor = dbc_sig.multiplexer_indicator() {
            is_multiplexed = true;
            multiplexer_signal_name = Some(dbc_sig.name().to_string());
            break;
        } else if matches!(
            dbc_sig.multiplexer_indicator(),
            can_dbc::MultiplexIndicator::MultiplexedSignal(_)
        ) {
            is_multiplexed = true;
        }
    }

    // Second pass: convert all signals
    for dbc_sig in dbc_msg.signals() {
        let value_table = value_tables
            .get(&(msg_id, dbc_sig.name().to_string()))
            .cloned();
        let signal = convert_signal(dbc_sig, multiplexer_signal_name.as_deref(), value_table)?;
        signals.push(signal);
    }

    Ok(MessageDef {
        id: msg_id,
        name: dbc_msg.message_name().to_string(),
        size: *dbc_msg.message_size() as usize,
        signals,
        is_multiplexed,
        multiplexer_signal: multiplexer_signal_name,
    })
}

/// Convert a can-dbc signal to our SignalDef
fn convert_signal(
    dbc_sig: &can_dbc::Signal,
    multiplexer_signal_name: Option<&str>,
    value_table: Option<HashMap<i64, String>>,
) -> Result<SignalDef> {
    let byte_order = match *dbc_sig.byte_order() {
        can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
        can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    let value_type = match *dbc_sig.value_type() {
        can_dbc::ValueType::Signed => ValueType::Signed,
        can_dbc::ValueType::Unsigned => ValueType::Unsigned,
    };

    // Handle multiplexer information
    let multiplexer_info = match *dbc_sig.multiplexer_indicator() {
        can_dbc::MultiplexIndicator::MultiplexedSignal(switch_value) => Some(MultiplexerInfo {
            multiplexer_signal: multiplexer_signal_name
                .ok_or_else(|| {
                    TelemetryError::CatalogLoad(format!(
                        "Multiplexed signal '{}' but no multiplexer found",
                        dbc_sig.name()
                    ))
                })?
                .to_string(),
            multiplexer_values: vec![switch_value as u64],
        }),
        _ => None,
    };

    Ok(SignalDef {
        name: dbc_sig.name().to_string(),
        start_bit: *dbc_sig.start_bit() as u16,
        length: *dbc_sig.signal_size() as u16,
        byte_order,
        value_type,
        factor: *dbc_sig.factor(),
        offset: *dbc_sig.offset(),
        unit: if dbc_sig.unit().is_empty() {
            None
        } else {
            Some(dbc_sig.unit().to_string())
        },
        value_table,
        multiplexer_info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_simple_dbc() {
        let dbc_content = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1 ECU2

BO_ 291 EngineData: 8 ECU1
 SG_ EngineSpeed : 0|16@1+ (1,0) [0|8000] "rpm" ECU2
 SG_ EngineTemp : 16|8@1+ (1,-40) [-40|215] "C" ECU2

BO_ 512 BatteryStatus: 8 ECU1
 SG_ BatteryVoltage : 0|16@1+ (0.01,0) [0|16] "V" ECU2
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(dbc_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let messages = parse_dbc_file(temp_file.path()).unwrap();

        assert_eq!(messages.len(), 2);

        let msg1 = &messages[0];
        assert_eq!(msg1.id, 291);
        assert_eq!(msg1.name, "EngineData");
        assert_eq!(msg1.size, 8);
        assert_eq!(msg1.signals.len(), 2);

        let sig1 = &msg1.signals[0];
        assert_eq!(sig1.name, "EngineSpeed");
        assert_eq!(sig1.start_bit, 0);
        assert_eq!(sig1.length, 16);
        assert_eq!(sig1.factor, 1.0);
        assert_eq!(sig1.offset, 0.0);
        assert_eq!(sig1.unit, Some("rpm".to_string()));
    }

    #[test]
    fn test_parse_value_table() {
        let dbc_content = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1

BO_ 768 GearboxStatus: 8 ECU1
 SG_ GearPos : 0|8@1+ (1,0) [0|3] "" ECU1

VAL_ 768 GearPos 0 "Park" 1 "Drive" 2 "Reverse" ;
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(dbc_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let messages = parse_dbc_file(temp_file.path()).unwrap();

        assert_eq!(messages.len(), 1);
        let table = messages[0].signals[0].value_table.as_ref().unwrap();
        assert_eq!(table.get(&0), Some(&"Park".to_string()));
        assert_eq!(table.get(&1), Some(&"Drive".to_string()));
        assert_eq!(table.get(&2), Some(&"Reverse".to_string()));
    }

    #[test]
    fn test_parse_multiplexed_signals() {
        let dbc_content = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1

BO_ 512 MultiplexedMsg: 8 ECU1
 SG_ Mode M : 0|8@1+ (1,0) [0|3] "" ECU1
 SG_ SignalA m0 : 8|16@1+ (1,0) [0|100] "%" ECU1
 SG_ SignalB m1 : 8|16@1+ (0.1,0) [0|1000] "mV" ECU1
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(dbc_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let messages = parse_dbc_file(temp_file.path()).unwrap();

        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert!(msg.is_multiplexed);
        assert_eq!(msg.multiplexer_signal, Some("Mode".to_string()));
        assert_eq!(msg.signals.len(), 3);

        let sig_a = msg.signals.iter().find(|s| s.name == "SignalA").unwrap();
        assert!(sig_a.multiplexer_info.is_some());
        assert_eq!(
            sig_a.multiplexer_info.as_ref().unwrap().multiplexer_signal,
            "Mode"
        );
    }

    #[test]
    fn test_latin1_dbc_falls_back() {
        // A degree sign as the single byte 0xB0 is Latin-1, not UTF-8;
        // the loader must still parse the file and recover the unit.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(
            b"VERSION \"\"\n\nNS_ :\n\nBS_:\n\nBU_: ECU1\n\nBO_ 291 EngineData: 8 ECU1\n SG_ EngineTemp : 0|8@1+ (1,-40) [-40|215] \"",
        );
        bytes.push(0xB0);
        bytes.extend_from_slice(b"C\" ECU1\n");
        assert!(String::from_utf8(bytes.clone()).is_err());

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&bytes).unwrap();
        temp_file.flush().unwrap();

        let messages = parse_dbc_file(temp_file.path()).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].signals[0].name, "EngineTemp");
        assert_eq!(messages[0].signals[0].unit, Some("\u{B0}C".to_string()));
    }

    #[test]
    fn test_unreadable_file_is_catalog_load_error() {
        let err = parse_dbc_file(Path::new("/nonexistent/defs.dbc")).unwrap_err();
        assert!(matches!(err, TelemetryError::CatalogLoad(_)));
    }
}
