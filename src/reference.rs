//! Symbol references: a single textual occurrence of a symbol in a file.
//!
//! Grounded in `examples/original_source/modules/cppscanner/index/reference.h`;
//! flag bit values mirror libclang's `CXSymbolRole` and are fixed by
//! `static_assert`s in `snapshotwriter.cpp`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::{FileID, FilePosition, SymbolID};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ReferenceFlags: u32 {
        const DECLARATION = 1;
        const DEFINITION  = 2;
        const READ        = 4;
        const WRITE       = 8;
        const CALL        = 16;
        const DYNAMIC     = 32;
        const ADDRESS_OF  = 64;
        const IMPLICIT    = 128;
    }
}

impl ReferenceFlags {
    /// A "pure" reference is neither a declaration nor a definition.
    pub fn is_pure_reference(self) -> bool {
        !self.intersects(ReferenceFlags::DECLARATION | ReferenceFlags::DEFINITION)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SymbolReference {
    pub symbol_id: SymbolID,
    pub file_id: FileID,
    pub position: FilePosition,
    pub referenced_by_symbol_id: SymbolID,
    pub flags: ReferenceFlags,
}

impl SymbolReference {
    pub fn is_declaration(&self) -> bool {
        self.flags.contains(ReferenceFlags::DECLARATION)
    }

    pub fn is_definition(&self) -> bool {
        self.flags.contains(ReferenceFlags::DEFINITION)
    }
}
