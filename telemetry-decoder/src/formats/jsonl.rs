//! JSON-lines frame log parser
//!
//! One frame per line: `{"ts": 0.104, "id": 256, "dlc": 2, "data": "0A00"}`.
//! Data bytes are hex-encoded, two characters per byte.

use crate::formats::FrameSource;
use crate::types::{Frame, Result, TelemetryError};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// One frame record as it appears on disk
#[derive(Debug, Deserialize)]
struct FrameRecord {
    ts: f64,
    id: u32,
    dlc: u8,
    data: String,
}

/// Iterator over frames in a JSON-lines log file
pub struct JsonlFrameLog {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl FrameSource for JsonlFrameLog {
    fn open(path: &Path) -> Result<Self> {
        log::info!("Opening frame log: {:?}", path);
        let file = File::open(path).map_err(|e| {
            TelemetryError::LogParse(format!("Failed to open frame log {:?}: {}", path, e))
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl JsonlFrameLog {
    fn parse_line(&self, line: &str) -> Result<Frame> {
        let record: FrameRecord = serde_json::from_str(line)
            .map_err(|e| TelemetryError::LogParse(format!("line {}: {}", self.line_no, e)))?;

        if record.dlc > 8 {
            return Err(TelemetryError::LogParse(format!(
                "line {}: dlc {} exceeds the classic CAN maximum of 8",
                self.line_no, record.dlc
            )));
        }

        let data = decode_hex(&record.data).map_err(|e| {
            TelemetryError::LogParse(format!("line {}: bad data field: {}", self.line_no, e))
        })?;

        Ok(Frame {
            timestamp: record.ts,
            id: record.id,
            dlc: record.dlc,
            data,
        })
    }
}

impl Iterator for JsonlFrameLog {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            // Blank lines are tolerated, anything else must parse
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(&line));
        }
    }
}

/// Decode a hex string ("0A00FF") into bytes
fn decode_hex(s: &str) -> std::result::Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err(format!("odd-length hex string '{}'", s));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| format!("invalid hex byte '{}'", &s[i..i + 2]))
        })
        .collect()
}
