//! Frame log format parsers
//!
//! Each parser implements an iterator pattern over `Frame` objects. A
//! malformed record yields a per-frame error so the pipeline can skip it
//! and continue.

use crate::types::{Frame, Result};
use std::path::Path;

pub mod jsonl;

pub use jsonl::JsonlFrameLog;

/// Common trait for all frame log parsers
pub trait FrameSource: Iterator<Item = Result<Frame>> + Sized {
    /// Open a frame log and return an iterator over its CAN frames
    fn open(path: &Path) -> Result<Self>;
}
