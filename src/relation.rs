//! Inter-symbol relations: base/derived class edges and method overrides.
//!
//! Grounded in `examples/original_source/modules/cppscanner/index/{baseof,override,access}.h`.

use serde::{Deserialize, Serialize};

use crate::types::SymbolID;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AccessSpecifier {
    Invalid = 0,
    Public = 1,
    Protected = 2,
    Private = 3,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaseOf {
    pub base_class_id: SymbolID,
    pub derived_class_id: SymbolID,
    pub access: AccessSpecifier,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Override {
    pub base_method_id: SymbolID,
    pub override_method_id: SymbolID,
}
