//! A reference [`FrontEnd`] adapter over `tree-sitter-cpp`.
//!
//! This is explicitly NOT a conformant C++ semantic front end: tree-sitter
//! is a syntactic parser with no type resolution, so USRs are synthesized
//! from lexical scope + name rather than mangled/resolved types. It exists
//! to exercise [`crate::indexer::Indexer`] in tests and demos without
//! depending on libclang.
//!
//! Built on the same `tree-sitter`/`tree-sitter-cpp` combination used
//! elsewhere for syntax-tree walking.

use tree_sitter::{Node, Parser};

use crate::diagnostic::DiagnosticLevel;
use crate::frontend::{
    CallOccurrence, DeclOccurrence, DiagnosticOccurrence, FrontEnd, IncludeOccurrence,
    MacroOccurrence, ModuleOccurrence,
};
use crate::relation::AccessSpecifier;
use crate::symbol::{SymbolExtra, SymbolKind};
use crate::types::{FileID, FilePosition};

pub struct TreeSitterFrontEnd {
    main_file: FileID,
    source: String,
    scope_prefix: String,
}

impl TreeSitterFrontEnd {
    pub fn new(main_file: FileID, source: impl Into<String>) -> Self {
        TreeSitterFrontEnd {
            main_file,
            source: source.into(),
            scope_prefix: String::new(),
        }
    }

    fn parse(&self) -> Option<tree_sitter::Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .ok()?;
        parser.parse(&self.source, None)
    }

    fn position_of(&self, node: Node) -> FilePosition {
        let p = node.start_position();
        FilePosition::new(p.row as u32 + 1, p.column as u32 + 1)
    }

    fn end_position_of(&self, node: Node) -> FilePosition {
        let p = node.end_position();
        FilePosition::new(p.row as u32 + 1, p.column as u32 + 1)
    }

    fn text_of<'a>(&'a self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn usr_for(&self, name: &str) -> String {
        format!("ts:{}{}", self.scope_prefix, name)
    }
}

impl FrontEnd for TreeSitterFrontEnd {
    fn main_file(&self) -> FileID {
        self.main_file
    }

    fn visit_decls(&mut self, visit: &mut dyn FnMut(DeclOccurrence)) {
        let Some(tree) = self.parse() else { return };
        let mut cursor = tree.walk();
        self.walk_decls(tree.root_node(), &mut cursor, visit);
    }

    fn visit_macros(&mut self, _visit: &mut dyn FnMut(MacroOccurrence)) {
        // tree-sitter-cpp does not expand the preprocessor; macro
        // occurrences are left to a real libclang-backed front end.
    }

    fn visit_modules(&mut self, _visit: &mut dyn FnMut(ModuleOccurrence)) {}

    fn visit_diagnostics(&mut self, visit: &mut dyn FnMut(DiagnosticOccurrence)) {
        let Some(tree) = self.parse() else { return };
        let mut stack = vec![tree.root_node()];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                visit(DiagnosticOccurrence {
                    level: DiagnosticLevel::Error,
                    message: format!("syntax error near '{}'", self.text_of(node)),
                    file_id: self.main_file,
                    position: self.position_of(node),
                });
            }
            for child in node.children(&mut node.walk()) {
                stack.push(child);
            }
        }
    }

    fn visit_includes(&mut self, visit: &mut dyn FnMut(IncludeOccurrence)) {
        let Some(tree) = self.parse() else { return };
        let mut stack = vec![tree.root_node()];
        while let Some(node) = stack.pop() {
            if node.kind() == "preproc_include" {
                if let Some(path_node) = node.child(1) {
                    let line = node.start_position().row as u32 + 1;
                    let included_name = self
                        .text_of(path_node)
                        .trim_matches(|c| c == '"' || c == '<' || c == '>');
                    visit(IncludeOccurrence {
                        file_id: self.main_file,
                        line,
                        // Without a resolver, an included file's id is its
                        // own identificator entry keyed by the raw spelling.
                        included_file_id: FileID::new(
                            (crate::types::SymbolID::from_usr(included_name).raw() as u32) | 1,
                        ),
                    });
                }
            }
            for child in node.children(&mut node.walk()) {
                stack.push(child);
            }
        }
    }

    fn visit_calls(&mut self, visit: &mut dyn FnMut(CallOccurrence)) {
        let Some(tree) = self.parse() else { return };
        let mut stack = vec![tree.root_node()];
        while let Some(node) = stack.pop() {
            if node.kind() == "call_expression" {
                if let Some(callee) = node.child_by_field_name("function") {
                    visit(CallOccurrence {
                        caller_usr: None,
                        callee_usr: self.usr_for(self.text_of(callee)),
                        file_id: self.main_file,
                        position: self.position_of(node),
                        by_reference_argument_positions: vec![],
                    });
                }
            }
            for child in node.children(&mut node.walk()) {
                stack.push(child);
            }
        }
    }
}

impl TreeSitterFrontEnd {
    fn walk_decls(
        &mut self,
        node: Node,
        _cursor: &mut tree_sitter::TreeCursor,
        visit: &mut dyn FnMut(DeclOccurrence),
    ) {
        match node.kind() {
            "function_definition" => {
                if let Some(declarator) = node.child_by_field_name("declarator") {
                    if let Some(name_node) = function_name_node(declarator) {
                        let name = self.text_of(name_node).to_string();
                        let usr = self.usr_for(&name);
                        let is_operator = name.starts_with("operator");
                        visit(DeclOccurrence {
                            usr,
                            name,
                            kind: SymbolKind::Function,
                            file_id: self.main_file,
                            position: self.position_of(node),
                            end_position: self.end_position_of(node),
                            is_definition: true,
                            is_local: !self.scope_prefix.is_empty(),
                            parent_usr: None,
                            access: AccessSpecifier::Invalid,
                            reference_flags: 0,
                            extra: SymbolExtra::None,
                            overrides: vec![],
                            bases: vec![],
                            is_scoped_enum: false,
                            is_operator,
                            is_inline_namespace: false,
                        });
                    }
                }
            }
            "struct_specifier" | "class_specifier" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    let name = self.text_of(name_node).to_string();
                    let usr = self.usr_for(&name);
                    let kind = if node.kind() == "class_specifier" {
                        SymbolKind::Class
                    } else {
                        SymbolKind::Struct
                    };
                    visit(DeclOccurrence {
                        usr,
                        name,
                        kind,
                        file_id: self.main_file,
                        position: self.position_of(node),
                        end_position: self.end_position_of(node),
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
                    });
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk_decls(child, &mut node.walk(), visit);
        }
    }
}

fn function_name_node(declarator: Node) -> Option<Node> {
    if declarator.kind() == "function_declarator" {
        return declarator.child_by_field_name("declarator");
    }
    let mut cursor = declarator.walk();
    for child in declarator.children(&mut cursor) {
        if let Some(found) = function_name_node(child) {
            return Some(found);
        }
    }
    None
}
