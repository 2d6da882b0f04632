//! Message catalog: DBC loading and ID-indexed signal layouts

mod dbc;
mod store;

pub use store::{
    ByteOrder, CatalogStats, MessageCatalog, MessageDef, MultiplexerInfo, SignalDef, ValueType,
};

use crate::types::Result;
use std::path::Path;

impl MessageCatalog {
    /// Load a catalog from a single DBC file
    pub fn from_dbc_file(path: &Path) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.add_dbc_file(path)?;
        Ok(catalog)
    }

    /// Parse a DBC file and add its message definitions to this catalog
    pub fn add_dbc_file(&mut self, path: &Path) -> Result<()> {
        for message in dbc::parse_dbc_file(path)? {
            self.add_message(message);
        }
        Ok(())
    }
}
