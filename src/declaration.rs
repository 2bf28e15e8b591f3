//! A symbol's declaration span within a file.
//!
//! Grounded in `examples/original_source/modules/cppscanner/index/declaration.h`.

use serde::{Deserialize, Serialize};

use crate::types::{FileID, FilePosition, SymbolID};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SymbolDeclaration {
    pub symbol_id: SymbolID,
    pub file_id: FileID,
    pub start_position: FilePosition,
    pub end_position: FilePosition,
    pub is_definition: bool,
}
