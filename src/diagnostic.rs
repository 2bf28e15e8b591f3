//! Compiler diagnostics captured while indexing a translation unit.
//!
//! Grounded in `examples/original_source/modules/cppscanner/index/diagnostic.h`.

use serde::{Deserialize, Serialize};

use crate::types::{FileID, FilePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiagnosticLevel {
    Ignored = 0,
    Note = 1,
    Remark = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub file_id: FileID,
    pub position: FilePosition,
}
