//! Per-translation-unit accumulator fed by the [`crate::indexer::Indexer`]
//! and later folded into a snapshot by [`crate::aggregator::SnapshotAggregator`].

use std::collections::{HashMap, HashSet};

use crate::declaration::SymbolDeclaration;
use crate::diagnostic::Diagnostic;
use crate::include::Include;
use crate::refarg::ArgumentPassedByReference;
use crate::reference::SymbolReference;
use crate::relation::{BaseOf, Override};
use crate::symbol::IndexerSymbol;
use crate::types::{FileID, SymbolID};

/// Everything gathered while indexing one translation unit.
#[derive(Debug, Default)]
pub struct TranslationUnitIndex {
    pub main_file_id: FileID,
    pub symbols: HashMap<SymbolID, IndexerSymbol>,
    pub references: Vec<SymbolReference>,
    pub declarations: Vec<SymbolDeclaration>,
    pub base_of: Vec<BaseOf>,
    pub overrides: Vec<Override>,
    pub diagnostics: Vec<Diagnostic>,
    pub includes: Vec<Include>,
    pub arguments_by_reference: Vec<ArgumentPassedByReference>,
    /// Files this TU has content for / has seen at all, used to gate
    /// what `finish()` sweeps look at and what the aggregator marks as
    /// "indexed".
    pub indexed_files: HashSet<FileID>,
    /// Set by the indexer if the front end reported the TU as failed
    /// (fatal diagnostic, parse abort, ...). A failed TU's symbol table
    /// may still be partially useful, but its per-file completeness
    /// bookkeeping must not be trusted.
    pub is_error: bool,
}

impl TranslationUnitIndex {
    pub fn new(main_file_id: FileID) -> Self {
        TranslationUnitIndex {
            main_file_id,
            ..Default::default()
        }
    }

    /// Insert or update a symbol record: flags OR-merge, extra info
    /// replaces (matches the aggregator's own merge rule, applied here at
    /// TU scope in case the same symbol is referenced more than once by
    /// one front end pass).
    pub fn upsert_symbol(&mut self, symbol: IndexerSymbol) {
        match self.symbols.entry(symbol.id) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                let existing = e.get_mut();
                existing.merge_flags(symbol.flags);
                existing.extra_info = symbol.extra_info;
                if symbol.display_name.is_some() {
                    existing.display_name = symbol.display_name;
                }
            }
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(symbol);
            }
        }
    }

    pub fn add_reference(&mut self, reference: SymbolReference) {
        self.indexed_files.insert(reference.file_id);
        self.references.push(reference);
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        use crate::diagnostic::DiagnosticLevel;
        if diagnostic.level >= DiagnosticLevel::Fatal {
            self.is_error = true;
        }
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{SymbolFlags, SymbolKind};

    #[test]
    fn upsert_merges_flags_and_replaces_extra() {
        let mut tu = TranslationUnitIndex::new(FileID::new(1));
        let id = SymbolID::from_raw(42);
        let mut first = IndexerSymbol::new(id, SymbolKind::Function, "f");
        first.flags = SymbolFlags::LOCAL.bits();
        tu.upsert_symbol(first);

        let mut second = IndexerSymbol::new(id, SymbolKind::Function, "f");
        second.flags = SymbolFlags::FROM_PROJECT.bits();
        tu.upsert_symbol(second);

        let merged = tu.symbols.get(&id).unwrap();
        assert!(merged.test_flag(SymbolFlags::LOCAL.bits()));
        assert!(merged.test_flag(SymbolFlags::FROM_PROJECT.bits()));
    }
}
