//! Output artifact writer
//!
//! Serializes the finished series map into one JSON artifact. The write
//! goes to a temporary file in the destination directory and is atomically
//! renamed into place, so a failed run never leaves a partial artifact.

use crate::types::{Result, SignalSeries, TelemetryError};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Writes the per-signal series map to disk
pub struct SeriesWriter;

impl SeriesWriter {
    /// Write all series to `destination` as one JSON artifact
    ///
    /// The BTreeMap key order and serde_json's deterministic formatting
    /// make re-runs over the same input byte-identical.
    pub fn write(series: &BTreeMap<String, SignalSeries>, destination: &Path) -> Result<()> {
        // The temp file must live in the destination's own directory: a
        // rename out of $TMPDIR can cross filesystems and fail with EXDEV.
        // A bare filename has an empty parent component, which means the
        // current directory.
        let dir = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| TelemetryError::Write(format!("creating temporary file: {}", e)))?;

        serde_json::to_writer_pretty(&mut tmp, series)
            .map_err(|e| TelemetryError::Write(format!("serializing series: {}", e)))?;
        tmp.write_all(b"\n")
            .map_err(|e| TelemetryError::Write(format!("writing artifact: {}", e)))?;
        tmp.flush()
            .map_err(|e| TelemetryError::Write(format!("flushing artifact: {}", e)))?;

        tmp.persist(destination)
            .map_err(|e| TelemetryError::Write(format!("persisting {:?}: {}", destination, e)))?;

        log::info!("Wrote {} signal series to {:?}", series.len(), destination);
        Ok(())
    }
}
