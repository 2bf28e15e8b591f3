//! A source file known to the scanner.
//!
//! Grounded in `examples/original_source/modules/cppscanner/index/file.h`.

use serde::{Deserialize, Serialize};

use crate::types::FileID;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: FileID,
    pub path: String,
    pub content: Option<String>,
    pub sha1: Option<String>,
}
