//! A `#include` edge between two files.
//!
//! Grounded in `examples/original_source/modules/cppscanner/index/include.h`.

use serde::{Deserialize, Serialize};

use crate::types::FileID;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Include {
    pub file_id: FileID,
    pub line: u32,
    pub included_file_id: FileID,
}
