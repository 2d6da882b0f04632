//! Message catalog
//!
//! Indexes message definitions by CAN ID so the frame decoder can look up
//! the signal layout for each incoming frame.

use std::collections::HashMap;

/// A complete CAN message definition
#[derive(Debug, Clone)]
pub struct MessageDef {
    /// CAN message ID
    pub id: u32,
    /// Message name
    pub name: String,
    /// Message size in bytes
    pub size: usize,
    /// All signals in this message
    pub signals: Vec<SignalDef>,
    /// True if this message has multiplexed signals
    pub is_multiplexed: bool,
    /// Multiplexer signal name (if multiplexed)
    pub multiplexer_signal: Option<String>,
}

/// A CAN signal definition
#[derive(Debug, Clone)]
pub struct SignalDef {
    /// Signal name; unique within one message, not across the catalog
    pub name: String,
    /// Start bit in the CAN frame
    pub start_bit: u16,
    /// Length in bits
    pub length: u16,
    /// Byte order for bit extraction
    pub byte_order: ByteOrder,
    /// Value type (signed/unsigned)
    pub value_type: ValueType,
    /// Scale factor to convert raw value to physical value
    pub factor: f64,
    /// Offset to add after scaling
    pub offset: f64,
    /// Engineering unit (e.g., "rpm", "V")
    pub unit: Option<String>,
    /// Value table for enum-like values (raw_value -> label)
    pub value_table: Option<HashMap<i64, String>>,
    /// Multiplexer info (None if not multiplexed)
    pub multiplexer_info: Option<MultiplexerInfo>,
}

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Value type for signal interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Signed integer
    Signed,
    /// Unsigned integer
    Unsigned,
}

/// Multiplexer information for multiplexed signals
#[derive(Debug, Clone)]
pub struct MultiplexerInfo {
    /// Name of the multiplexer signal that controls this signal
    pub multiplexer_signal: String,
    /// Multiplexer value(s) for which this signal is active
    pub multiplexer_values: Vec<u64>,
}

/// The message catalog: all loaded definitions, keyed by CAN ID
///
/// Two different IDs may each define a signal with the same name; the
/// catalog does not enforce global name uniqueness, and downstream
/// aggregation merges same-name signals into one series.
#[derive(Debug, Default)]
pub struct MessageCatalog {
    messages: HashMap<u32, MessageDef>,
}

impl MessageCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            messages: HashMap::new(),
        }
    }

    /// Add a message definition to the catalog
    ///
    /// A later definition for an already-known ID replaces the earlier one.
    pub fn add_message(&mut self, message: MessageDef) {
        if let Some(old) = self.messages.insert(message.id, message) {
            log::warn!(
                "Message 0x{:X} ('{}') redefined, keeping the later definition",
                old.id,
                old.name
            );
        }
    }

    /// Look up the message definition for a CAN ID
    ///
    /// Unknown IDs are an expected outcome, not an error.
    pub fn lookup(&self, id: u32) -> Option<&MessageDef> {
        self.messages.get(&id)
    }

    /// Get catalog statistics
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.values().map(|m| m.signals.len()).sum(),
        }
    }
}

/// Catalog statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    /// Total number of message definitions
    pub num_messages: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_message(id: u32, signal_name: &str) -> MessageDef {
        MessageDef {
            id,
            name: format!("Msg{:X}", id),
            size: 8,
            signals: vec![SignalDef {
                name: signal_name.to_string(),
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
        }
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = MessageCatalog::new();
        let stats = catalog.stats();
        assert_eq!(stats.num_messages, 0);
        assert_eq!(stats.num_signals, 0);
        assert!(catalog.lookup(0x123).is_none());
    }

    #[test]
    fn test_add_and_lookup() {
        let mut catalog = MessageCatalog::new();
        catalog.add_message(simple_message(0x123, "EngineSpeed"));

        let stats = catalog.stats();
        assert_eq!(stats.num_messages, 1);
        assert_eq!(stats.num_signals, 1);

        let msg = catalog.lookup(0x123).unwrap();
        assert_eq!(msg.name, "Msg123");
        assert_eq!(msg.signals[0].name, "EngineSpeed");
        assert!(catalog.lookup(0x456).is_none());
    }

    #[test]
    fn test_same_signal_name_in_two_messages() {
        // The catalog allows the same signal name under two IDs; the
        // aggregator later merges them into one series.
        let mut catalog = MessageCatalog::new();
        catalog.add_message(simple_message(0x100, "RPM"));
        catalog.add_message(simple_message(0x200, "RPM"));

        assert_eq!(catalog.stats().num_messages, 2);
        assert_eq!(catalog.lookup(0x100).unwrap().signals[0].name, "RPM");
        assert_eq!(catalog.lookup(0x200).unwrap().signals[0].name, "RPM");
    }
}
