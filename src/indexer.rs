//! Drives one translation unit's [`FrontEnd`] event stream into a
//! [`TranslationUnitIndex`], gating each file against the scanner's
//! [`Arbiter`].
//!
//! Grounded in `examples/original_source/modules/cppscanner/indexer/indexer.cpp`.

use std::sync::Arc;

use crate::arbiter::{Arbiter, IndexerId};
use crate::collector::collect_symbol;
use crate::declaration::SymbolDeclaration;
use crate::diagnostic::Diagnostic;
use crate::fileid::ThreadSafeFileIdentificator;
use crate::include::Include;
use crate::reference::{ReferenceFlags, SymbolReference};
use crate::relation::{BaseOf, Override};
use crate::refarg::ArgumentPassedByReference;
use crate::frontend::FrontEnd;
use crate::tu_index::TranslationUnitIndex;
use crate::types::SymbolID;

pub struct Indexer {
    id: IndexerId,
    arbiter: Arc<Arbiter>,
    files: Arc<ThreadSafeFileIdentificator>,
    index_local_symbols: bool,
}

impl Indexer {
    pub fn new(id: IndexerId, arbiter: Arc<Arbiter>, files: Arc<ThreadSafeFileIdentificator>) -> Self {
        Indexer {
            id,
            arbiter,
            files,
            index_local_symbols: true,
        }
    }

    pub fn set_index_local_symbols(&mut self, value: bool) -> &mut Self {
        self.index_local_symbols = value;
        self
    }

    fn should_index(&self, file_id: crate::types::FileID) -> bool {
        let path = self.files.path(file_id).unwrap_or_default();
        self.arbiter.should_index(file_id, &path, Some(self.id))
    }

    /// Walk every event the front end reports for its main file and fold
    /// the ones that pass arbitration into a fresh [`TranslationUnitIndex`].
    pub fn run(&mut self, frontend: &mut dyn FrontEnd) -> TranslationUnitIndex {
        let mut tu = TranslationUnitIndex::new(frontend.main_file());

        frontend.visit_decls(&mut |decl| {
            if !self.should_index(decl.file_id) {
                return;
            }
            if !self.index_local_symbols && decl.is_local {
                return;
            }
            let symbol = collect_symbol(&decl);
            let symbol_id = symbol.id;
            let parent_id = symbol.parent_id;

            for (base_usr, access) in &decl.bases {
                tu.base_of.push(BaseOf {
                    base_class_id: SymbolID::from_usr(base_usr),
                    derived_class_id: symbol_id,
                    access: *access,
                });
            }
            for base_method_usr in &decl.overrides {
                tu.overrides.push(Override {
                    base_method_id: SymbolID::from_usr(base_method_usr),
                    override_method_id: symbol_id,
                });
            }

            let mut flags = decl.reference_flags;
            if decl.is_definition {
                flags |= ReferenceFlags::DEFINITION.bits();
            } else {
                flags |= ReferenceFlags::DECLARATION.bits();
            }
            tu.add_reference(SymbolReference {
                symbol_id,
                file_id: decl.file_id,
                position: decl.position,
                referenced_by_symbol_id: parent_id,
                flags: ReferenceFlags::from_bits_truncate(flags),
            });

            tu.declarations.push(SymbolDeclaration {
                symbol_id,
                file_id: decl.file_id,
                start_position: decl.position,
                end_position: decl.end_position,
                is_definition: decl.is_definition,
            });

            tu.upsert_symbol(symbol);
        });

        frontend.visit_macros(&mut |macro_occ| {
            if !self.should_index(macro_occ.file_id) {
                return;
            }
            use crate::symbol::{IndexerSymbol, MacroFlags, SymbolExtra, SymbolKind};
            let id = SymbolID::from_usr(&macro_occ.usr);
            let mut symbol = IndexerSymbol::new(id, SymbolKind::Macro, macro_occ.name.clone());
            if macro_occ.is_function_like {
                symbol.flags |= MacroFlags::FUNCTION_LIKE.bits();
            }
            symbol.extra_info = SymbolExtra::Macro(crate::symbol::MacroInfo {
                definition: macro_occ.definition.clone(),
                is_used_for_header_guard: macro_occ.is_used_for_header_guard,
            });
            tu.upsert_symbol(symbol);

            let mut ref_flags = ReferenceFlags::empty();
            if macro_occ.is_definition {
                ref_flags |= ReferenceFlags::DEFINITION;
            }
            tu.add_reference(SymbolReference {
                symbol_id: id,
                file_id: macro_occ.file_id,
                position: macro_occ.position,
                referenced_by_symbol_id: SymbolID::INVALID,
                flags: ref_flags,
            });
        });

        frontend.visit_modules(&mut |_module_occ| {
            // Acknowledged but intentionally not indexed (C++20 modules are
            // a Non-goal); presence here just proves the event was seen.
        });

        frontend.visit_diagnostics(&mut |diag_occ| {
            tu.add_diagnostic(Diagnostic {
                level: diag_occ.level,
                message: diag_occ.message,
                file_id: diag_occ.file_id,
                position: diag_occ.position,
            });
        });

        frontend.visit_includes(&mut |inc| {
            tu.includes.push(Include {
                file_id: inc.file_id,
                line: inc.line,
                included_file_id: inc.included_file_id,
            });
        });

        frontend.visit_calls(&mut |call| {
            for position in &call.by_reference_argument_positions {
                tu.arguments_by_reference.push(ArgumentPassedByReference {
                    file_id: call.file_id,
                    position: *position,
                });
            }
        });

        self.finish(&mut tu);
        tu
    }

    /// End-of-TU sweep: mark header guards, dedup `#include`s per file,
    /// and record which files this TU actually touched.
    fn finish(&self, tu: &mut TranslationUnitIndex) {
        use crate::symbol::{MacroFlags, SymbolExtra};

        tu.includes.sort_by_key(|inc| (inc.file_id.value(), inc.line));
        tu.includes.dedup_by_key(|inc| (inc.file_id.value(), inc.line));

        // A non-function-like macro the front end recognized as the
        // whole-file #ifndef/#define guard idiom gets its flag set here,
        // once, rather than while the macro is still being visited.
        for symbol in tu.symbols.values_mut() {
            if !matches!(symbol.kind, crate::symbol::SymbolKind::Macro) {
                continue;
            }
            let is_guard = matches!(
                &symbol.extra_info,
                SymbolExtra::Macro(info) if info.is_used_for_header_guard
            );
            if is_guard && !symbol.test_flag(MacroFlags::FUNCTION_LIKE.bits()) {
                symbol.flags |= MacroFlags::USED_AS_HEADER_GUARD.bits();
            }
        }

        for file_id in tu.includes.iter().map(|i| i.file_id) {
            tu.indexed_files.insert(file_id);
        }
        tu.indexed_files.insert(tu.main_file_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileid::ThreadSafeFileIdentificator;
    use crate::frontend::{DeclOccurrence, DiagnosticOccurrence, FrontEnd, MacroOccurrence};
    use crate::relation::AccessSpecifier;
    use crate::symbol::{SymbolExtra, SymbolKind};
    use crate::types::{FileID, FilePosition};

    struct FakeFrontEnd {
        main_file: FileID,
        decls: Vec<DeclOccurrence>,
        macros: Vec<MacroOccurrence>,
    }

    impl FrontEnd for FakeFrontEnd {
        fn main_file(&self) -> FileID {
            self.main_file
        }

        fn visit_decls(&mut self, visit: &mut dyn FnMut(DeclOccurrence)) {
            for d in self.decls.drain(..) {
                visit(d);
            }
        }

        fn visit_macros(&mut self, visit: &mut dyn FnMut(MacroOccurrence)) {
            for m in self.macros.drain(..) {
                visit(m);
            }
        }
        fn visit_modules(&mut self, _visit: &mut dyn FnMut(crate::frontend::ModuleOccurrence)) {}
        fn visit_diagnostics(&mut self, _visit: &mut dyn FnMut(DiagnosticOccurrence)) {}
        fn visit_includes(&mut self, _visit: &mut dyn FnMut(crate::frontend::IncludeOccurrence)) {}
        fn visit_calls(&mut self, _visit: &mut dyn FnMut(crate::frontend::CallOccurrence)) {}
    }

    #[test]
    fn indexer_respects_arbiter() {
        let files = Arc::new(ThreadSafeFileIdentificator::new());
        let main_file = files.get_or_create("/home/project/main.cpp");
        let external_file = files.get_or_create("/usr/include/stdio.h");

        let arbiter = Arc::new(Arbiter::inside_directory("/home/project"));
        let mut indexer = Indexer::new(1, arbiter, files);

        let mut frontend = FakeFrontEnd {
            main_file,
            decls: vec![
                DeclOccurrence {
                    usr: "c:@F@local#".into(),
                    name: "local".into(),
                    kind: SymbolKind::Function,
                    file_id: main_file,
                    position: FilePosition::new(1, 1),
                    end_position: FilePosition::new(1, 1),
                    is_definition: true,
                    is_local: false,
                    parent_usr: None,
                    access: AccessSpecifier::Invalid,
                    reference_flags: 0,
                    extra: SymbolExtra::None,
                    overrides: vec![],
                    bases: vec![],
                    is_scoped_enum: false,
                    is_operator: false,
                    is_inline_namespace: false,
                },
                DeclOccurrence {
                    usr: "c:@F@external#".into(),
                    name: "external".into(),
                    kind: SymbolKind::Function,
                    file_id: external_file,
                    position: FilePosition::new(1, 1),
                    end_position: FilePosition::new(1, 1),
                    is_definition: true,
                    is_local: false,
                    parent_usr: None,
                    access: AccessSpecifier::Invalid,
                    reference_flags: 0,
                    extra: SymbolExtra::None,
                    overrides: vec![],
                    bases: vec![],
                    is_scoped_enum: false,
                    is_operator: false,
                    is_inline_namespace: false,
                },
            ],
            macros: vec![],
        };

        let tu = indexer.run(&mut frontend);
        assert_eq!(tu.symbols.len(), 1);
        assert!(tu
            .symbols
            .values()
            .any(|s| s.name == "local"));
    }

    #[test]
    fn disabling_index_local_symbols_drops_local_declarations() {
        let files = Arc::new(ThreadSafeFileIdentificator::new());
        let main_file = files.get_or_create("/home/project/main.cpp");

        let arbiter = Arc::new(Arbiter::inside_directory("/home/project"));
        let mut indexer = Indexer::new(1, arbiter, files);
        indexer.set_index_local_symbols(false);

        let mut frontend = FakeFrontEnd {
            main_file,
            decls: vec![
                DeclOccurrence {
                    usr: "c:@F@static_helper#".into(),
                    name: "static_helper".into(),
                    kind: SymbolKind::Function,
                    file_id: main_file,
                    position: FilePosition::new(1, 1),
                    end_position: FilePosition::new(1, 1),
                    is_definition: true,
                    is_local: true,
                    parent_usr: None,
                    access: AccessSpecifier::Invalid,
                    reference_flags: 0,
                    extra: SymbolExtra::None,
                    overrides: vec![],
                    bases: vec![],
                    is_scoped_enum: false,
                    is_operator: false,
                    is_inline_namespace: false,
                },
                DeclOccurrence {
                    usr: "c:@F@exported#".into(),
                    name: "exported".into(),
                    kind: SymbolKind::Function,
                    file_id: main_file,
                    position: FilePosition::new(2, 1),
                    end_position: FilePosition::new(2, 1),
                    is_definition: true,
                    is_local: false,
                    parent_usr: None,
                    access: AccessSpecifier::Invalid,
                    reference_flags: 0,
                    extra: SymbolExtra::None,
                    overrides: vec![],
                    bases: vec![],
                    is_scoped_enum: false,
                    is_operator: false,
                    is_inline_namespace: false,
                },
            ],
            macros: vec![],
        };

        let tu = indexer.run(&mut frontend);
        assert_eq!(tu.symbols.len(), 1);
        assert!(tu.symbols.values().any(|s| s.name == "exported"));
    }

    #[test]
    fn header_guard_macro_gets_flag_set_at_finish() {
        use crate::symbol::MacroFlags;

        let files = Arc::new(ThreadSafeFileIdentificator::new());
        let main_file = files.get_or_create("/home/project/widget.h");

        let arbiter = Arc::new(Arbiter::inside_directory("/home/project"));
        let mut indexer = Indexer::new(1, arbiter, files);

        let mut frontend = FakeFrontEnd {
            main_file,
            decls: vec![],
            macros: vec![MacroOccurrence {
                usr: "c:@macro@WIDGET_H".into(),
                name: "WIDGET_H".into(),
                file_id: main_file,
                position: FilePosition::new(1, 1),
                is_definition: true,
                is_function_like: false,
                definition: None,
                is_used_for_header_guard: true,
            }],
        };

        let tu = indexer.run(&mut frontend);
        let guard = tu
            .symbols
            .values()
            .find(|s| s.name == "WIDGET_H")
            .expect("guard macro should be indexed");
        assert!(guard.test_flag(MacroFlags::USED_AS_HEADER_GUARD.bits()));
    }
}
