//! Contract a C++ front end must satisfy to feed the indexer.
//!
//! Grounded in `examples/original_source/modules/cppscanner/indexer/astvisitor.h`
//! and `frontendactionfactory.h`: the original drives a libclang/Clang-LibTooling
//! `ASTConsumer`+`PPCallbacks` pair through a fixed event stream. Here that
//! is expressed as a trait with four occurrence callbacks plus end-of-TU
//! hooks, matching the "event-sink trait, not inheritance hierarchy" design
//! note.

use crate::relation::AccessSpecifier;
use crate::symbol::{SymbolExtra, SymbolKind};
use crate::types::{FileID, FilePosition, SymbolID};

/// Everything the collector needs to know about one declaration occurrence,
/// independent of which front end produced it.
#[derive(Debug, Clone)]
pub struct DeclOccurrence {
    pub usr: String,
    pub name: String,
    pub kind: SymbolKind,
    pub file_id: FileID,
    pub position: FilePosition,
    pub end_position: FilePosition,
    pub is_definition: bool,
    pub is_local: bool,
    pub parent_usr: Option<String>,
    pub access: AccessSpecifier,
    pub reference_flags: u32,
    pub extra: SymbolExtra,
    /// Present for method overrides: USR of the base method(s) overridden
    /// by this one.
    pub overrides: Vec<String>,
    /// Present for classes/structs: USRs of direct base classes with
    /// their access specifier.
    pub bases: Vec<(String, AccessSpecifier)>,
    /// Set when `kind` is `Enum` and the enum is scoped (`enum class`/
    /// `enum struct`); remaps the collected kind to `EnumClass`.
    pub is_scoped_enum: bool,
    /// Set when `kind` is `Function` or one of the method kinds and the
    /// declaration is an overloaded operator; remaps the collected kind
    /// to `Operator`.
    pub is_operator: bool,
    /// Set when `kind` is `Namespace` and the namespace is declared
    /// `inline`; remaps the collected kind to `InlineNamespace`.
    pub is_inline_namespace: bool,
}

#[derive(Debug, Clone)]
pub struct MacroOccurrence {
    pub usr: String,
    pub name: String,
    pub file_id: FileID,
    pub position: FilePosition,
    pub is_definition: bool,
    pub is_function_like: bool,
    pub definition: Option<String>,
    /// Set by a front end that recognizes the `#ifndef`/`#define`
    /// include-guard idiom spanning the whole file.
    pub is_used_for_header_guard: bool,
}

/// Acknowledged but not indexed: C++20 modules are out of scope (see
/// Non-goals), but the front end still reports them so the indexer can
/// account for every declaration it is shown.
#[derive(Debug, Clone)]
pub struct ModuleOccurrence {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct DiagnosticOccurrence {
    pub level: crate::diagnostic::DiagnosticLevel,
    pub message: String,
    pub file_id: FileID,
    pub position: FilePosition,
}

#[derive(Debug, Clone)]
pub struct IncludeOccurrence {
    pub file_id: FileID,
    pub line: u32,
    pub included_file_id: FileID,
}

#[derive(Debug, Clone)]
pub struct CallOccurrence {
    pub caller_usr: Option<String>,
    pub callee_usr: String,
    pub file_id: FileID,
    pub position: FilePosition,
    /// Positions of arguments to this call bound to reference parameters.
    pub by_reference_argument_positions: Vec<FilePosition>,
}

/// Event sink a front end drives while walking one translation unit. Kept
/// as a plain trait object contract (no generics, no associated types) so
/// the indexer can be written once against `dyn FrontEnd`.
pub trait FrontEnd {
    fn main_file(&self) -> FileID;

    /// Visit every declaration occurrence. Called once per occurrence
    /// (both references and definitions/declarations are surfaced; the
    /// indexer tells them apart via `DeclOccurrence::reference_flags`).
    fn visit_decls(&mut self, visit: &mut dyn FnMut(DeclOccurrence));

    fn visit_macros(&mut self, visit: &mut dyn FnMut(MacroOccurrence));

    fn visit_modules(&mut self, visit: &mut dyn FnMut(ModuleOccurrence));

    fn visit_diagnostics(&mut self, visit: &mut dyn FnMut(DiagnosticOccurrence));

    /// `#include` edges gathered from the preprocessing record.
    fn visit_includes(&mut self, visit: &mut dyn FnMut(IncludeOccurrence));

    /// Call expressions, used to find arguments passed by reference.
    fn visit_calls(&mut self, visit: &mut dyn FnMut(CallOccurrence));

    /// Resolve a USR to the `SymbolID` the indexer should use. Front ends
    /// are expected to call `SymbolID::from_usr` themselves, but the
    /// indirection lets a test double short-circuit this.
    fn symbol_id_for_usr(&self, usr: &str) -> SymbolID {
        SymbolID::from_usr(usr)
    }
}
