//! Symbol records: kinds, flags, and the kind-specific "extra info" payloads.
//!
//! Grounded in `examples/original_source/modules/cppscanner/index/symbolrecords.h`
//! (the canonical, current record layout — not the older `symbol.h`, which
//! lacks `FromProject` and uses different bit assignments).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::types::SymbolID;

/// Mirrors the original `SymbolKind` enum
/// (`examples/original_source/modules/cppscanner/index/symbolkind.h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SymbolKind {
    Unknown = 0,
    Module = 1,
    Namespace = 2,
    NamespaceAlias = 3,
    Macro = 4,
    Enum = 5,
    Struct = 6,
    Class = 7,
    Union = 8,
    Lambda = 9,
    TypeAlias = 10,
    Function = 11,
    Variable = 12,
    Field = 13,
    EnumConstant = 14,
    InstanceMethod = 15,
    ClassMethod = 16,
    StaticMethod = 17,
    StaticProperty = 18,
    Constructor = 19,
    Destructor = 20,
    ConversionFunction = 21,
    Parameter = 22,
    Using = 23,
    TemplateTypeParameter = 24,
    TemplateTemplateParameter = 25,
    NonTypeTemplateParameter = 26,
    Concept = 27,
    /// A scoped (`enum class`/`enum struct`) enum; collected the same way
    /// as [`SymbolKind::Enum`], just remapped from it once the declaration
    /// is known to be scoped.
    EnumClass = 28,
    /// An overloaded operator; remapped from [`SymbolKind::Function`] or
    /// one of the method kinds once the declaration is known to be one.
    Operator = 29,
    /// An inline namespace; remapped from [`SymbolKind::Namespace`].
    InlineNamespace = 30,
}

impl SymbolKind {
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Function
                | SymbolKind::InstanceMethod
                | SymbolKind::ClassMethod
                | SymbolKind::StaticMethod
                | SymbolKind::Constructor
                | SymbolKind::Destructor
                | SymbolKind::ConversionFunction
                | SymbolKind::Operator
        )
    }

    pub fn is_variable_like(self) -> bool {
        matches!(
            self,
            SymbolKind::Variable | SymbolKind::Field | SymbolKind::StaticProperty
        )
    }

    pub fn is_class_like(self) -> bool {
        matches!(self, SymbolKind::Struct | SymbolKind::Class | SymbolKind::Union)
    }
}

bitflags! {
    /// Common symbol flags, shared by every kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SymbolFlags: u32 {
        const LOCAL        = 0x1;
        const FROM_PROJECT = 0x2;
        const PROTECTED    = 0x4;
        const PRIVATE      = 0x8;
        const RESERVED1    = 0x10;
    }
}

/// First bit available for kind-specific flags, as in `MinCustomFlag`.
pub const MIN_CUSTOM_FLAG: u32 = 0x20;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MacroFlags: u32 {
        const USED_AS_HEADER_GUARD = 0x20;
        const FUNCTION_LIKE        = 0x40;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct VariableFlags: u32 {
        const CONST        = 0x20;
        const CONSTEXPR     = 0x40;
        const STATIC        = 0x80;
        const MUTABLE       = 0x100;
        const THREAD_LOCAL  = 0x200;
        const INLINE        = 0x400;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FunctionFlags: u32 {
        const INLINE    = 0x20;
        const STATIC    = 0x40;
        const CONSTEXPR  = 0x80;
        const CONSTEVAL  = 0x100;
        const NOEXCEPT   = 0x200;
        const DEFAULT    = 0x400;
        const DELETE     = 0x800;
        const CONST     = 0x1000;
        const VIRTUAL   = 0x2000;
        const PURE      = 0x4000;
        const OVERRIDE  = 0x8000;
        const FINAL     = 0x10000;
        const EXPLICIT  = 0x20000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ClassFlags: u32 {
        const FINAL = 0x20;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub parameter_index: usize,
    pub r#type: String,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub return_type: String,
    pub parameters: Vec<SymbolID>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableInfo {
    pub r#type: String,
    pub init: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumInfo {
    pub underlying_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumConstantInfo {
    pub value: i64,
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacroInfo {
    pub definition: Option<String>,
    /// Carried straight from `MacroOccurrence::is_used_for_header_guard`;
    /// folded into `MacroFlags::USED_AS_HEADER_GUARD` at end-of-TU.
    pub is_used_for_header_guard: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceAliasInfo {
    pub value: String,
}

/// Kind-specific payload, replacing the C++ `std::variant` in
/// `examples/original_source/modules/cppscanner/indexer/indexersymbol.h`
/// with a plain Rust enum (see Design Notes: `SymbolExtra` over variant +
/// downcast).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SymbolExtra {
    None,
    Macro(MacroInfo),
    NamespaceAlias(NamespaceAliasInfo),
    Enum(EnumInfo),
    EnumConstant(EnumConstantInfo),
    Variable(VariableInfo),
    Parameter(ParameterInfo),
    Function(FunctionInfo),
}

impl Default for SymbolExtra {
    fn default() -> Self {
        SymbolExtra::None
    }
}

/// The on-disk/in-memory symbol record: identity, name, parent, flags and
/// kind-specific extra info. Mirrors `IndexerSymbol` (which itself extends
/// `SymbolRecord`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerSymbol {
    pub id: SymbolID,
    pub kind: SymbolKind,
    pub parent_id: SymbolID,
    pub name: String,
    pub display_name: Option<String>,
    pub flags: u32,
    pub extra_info: SymbolExtra,
}

impl IndexerSymbol {
    pub fn new(id: SymbolID, kind: SymbolKind, name: impl Into<String>) -> Self {
        IndexerSymbol {
            id,
            kind,
            parent_id: SymbolID::INVALID,
            name: name.into(),
            display_name: None,
            flags: 0,
            extra_info: SymbolExtra::None,
        }
    }

    pub fn test_flag(&self, bit: u32) -> bool {
        self.flags & bit != 0
    }

    pub fn set_flag(&mut self, bit: u32, value: bool) {
        if value {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }

    pub fn is_local(&self) -> bool {
        self.test_flag(SymbolFlags::LOCAL.bits())
    }

    pub fn set_local(&mut self, value: bool) {
        self.set_flag(SymbolFlags::LOCAL.bits(), value);
    }

    pub fn is_from_project(&self) -> bool {
        self.test_flag(SymbolFlags::FROM_PROJECT.bits())
    }

    /// Merge another record's flags into this one. Used by the snapshot
    /// aggregator: flags always OR-merge across translation units, while
    /// extra info is REPLACE (last writer wins).
    pub fn merge_flags(&mut self, other_flags: u32) {
        self.flags |= other_flags;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_helpers_round_trip() {
        let mut sym = IndexerSymbol::new(SymbolID::from_raw(1), SymbolKind::Function, "foo");
        assert!(!sym.is_local());
        sym.set_local(true);
        assert!(sym.is_local());
        sym.set_local(false);
        assert!(!sym.is_local());
    }

    #[test]
    fn merge_flags_is_or() {
        let mut sym = IndexerSymbol::new(SymbolID::from_raw(1), SymbolKind::Function, "foo");
        sym.flags = SymbolFlags::LOCAL.bits();
        sym.merge_flags(SymbolFlags::FROM_PROJECT.bits());
        assert!(sym.test_flag(SymbolFlags::LOCAL.bits()));
        assert!(sym.test_flag(SymbolFlags::FROM_PROJECT.bits()));
    }

    #[test]
    fn function_flags_start_at_min_custom_flag() {
        assert_eq!(FunctionFlags::INLINE.bits(), MIN_CUSTOM_FLAG);
    }

    #[test]
    fn symbol_kind_classification() {
        assert!(SymbolKind::Function.is_function_like());
        assert!(SymbolKind::InstanceMethod.is_function_like());
        assert!(!SymbolKind::Variable.is_function_like());
        assert!(SymbolKind::Struct.is_class_like());
    }
}
