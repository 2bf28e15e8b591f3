//! Source locations of function-call arguments passed by reference.
//!
//! Grounded in `examples/original_source/modules/cppscanner/index/refarg.h`.

use serde::{Deserialize, Serialize};

use crate::types::{FileID, FilePosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArgumentPassedByReference {
    pub file_id: FileID,
    pub position: FilePosition,
}
