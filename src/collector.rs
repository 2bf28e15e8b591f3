//! Pure name/flag/extra-info synthesis rules, factored out of the indexer
//! so they can be unit tested without a real front end.
//!
//! Grounded in `examples/original_source/modules/cppscanner/indexer/astvisitor.cpp`'s
//! naming helpers (display name synthesis for lambdas, anonymous unions and
//! enums, parameter type formatting).

use crate::frontend::DeclOccurrence;
use crate::symbol::{IndexerSymbol, SymbolExtra, SymbolFlags, SymbolKind};
use crate::types::SymbolID;

/// Collapse a C++ reference/pointer parameter type's spacing the way the
/// original does: `int &` -> `int&`, `const Foo &` -> `const Foo&`.
pub fn normalize_type_spelling(spelling: &str) -> String {
    let mut out = String::with_capacity(spelling.len());
    let mut chars = spelling.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ' ' {
            if matches!(chars.peek(), Some('&') | Some('*')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Synthesize a display name for an unnamed construct, mirroring the
/// `__lambda_<hex>` convention used for lambdas and anonymous
/// structs/unions: derived deterministically from the occurrence's USR so
/// repeated visits of the same declaration produce the same name.
pub fn synthesize_anonymous_name(kind: SymbolKind, usr: &str) -> String {
    let id = SymbolID::from_usr(usr);
    let tag = match kind {
        SymbolKind::Lambda => "lambda",
        SymbolKind::Union => "anon_union",
        SymbolKind::Struct | SymbolKind::Class => "anon_struct",
        SymbolKind::Enum | SymbolKind::EnumClass => "anon_enum",
        _ => "anon",
    };
    format!("__{tag}_{:08x}", id.raw() & 0xffff_ffff)
}

/// Build a function-like signature string `name(type1, type2, ...)` the
/// way the original front end prints it for display purposes.
pub fn build_function_signature(name: &str, parameter_types: &[String]) -> String {
    let params: Vec<String> = parameter_types
        .iter()
        .map(|t| normalize_type_spelling(t))
        .collect();
    format!("{name}({})", params.join(", "))
}

/// Convert a raw [`DeclOccurrence`] into the record stored in the symbol
/// table: resolves the display name (synthesizing one for anonymous
/// constructs), derives the symbol id, and assigns the common flags.
/// Scoped enums change kind from `Enum` to `EnumClass`. Overloaded operators
/// change kind from `Function`/a method kind to `Operator`. Inline
/// namespaces change kind from `Namespace` to `InlineNamespace`.
fn transform_kind(decl: &DeclOccurrence) -> SymbolKind {
    if decl.kind == SymbolKind::Enum && decl.is_scoped_enum {
        return SymbolKind::EnumClass;
    }
    if decl.is_operator
        && matches!(
            decl.kind,
            SymbolKind::Function
                | SymbolKind::InstanceMethod
                | SymbolKind::ClassMethod
                | SymbolKind::StaticMethod
        )
    {
        return SymbolKind::Operator;
    }
    if decl.kind == SymbolKind::Namespace && decl.is_inline_namespace {
        return SymbolKind::InlineNamespace;
    }
    decl.kind
}

pub fn collect_symbol(decl: &DeclOccurrence) -> IndexerSymbol {
    let id = SymbolID::from_usr(&decl.usr);
    let kind = transform_kind(decl);
    let name = if decl.name.is_empty() {
        synthesize_anonymous_name(kind, &decl.usr)
    } else {
        decl.name.clone()
    };

    let mut symbol = IndexerSymbol::new(id, kind, name);
    symbol.parent_id = decl
        .parent_usr
        .as_deref()
        .map(SymbolID::from_usr)
        .unwrap_or(SymbolID::INVALID);

    let mut flags = 0u32;
    if decl.is_local {
        flags |= SymbolFlags::LOCAL.bits();
    }
    use crate::relation::AccessSpecifier;
    match decl.access {
        AccessSpecifier::Protected => flags |= SymbolFlags::PROTECTED.bits(),
        AccessSpecifier::Private => flags |= SymbolFlags::PRIVATE.bits(),
        _ => {}
    }
    symbol.flags = flags;
    symbol.extra_info = decl.extra.clone();
    symbol
}

/// Whether `extra` matches the shape expected for `kind`, used by tests
/// and by the aggregator's write path to pick the right SQL table. Mirrors
/// the kind ranges asserted by `symbolrecords.h`'s views (e.g.
/// `functionRecord` is `kind BETWEEN 18 AND 24`).
pub fn extra_info_matches_kind(kind: SymbolKind, extra: &SymbolExtra) -> bool {
    matches!(
        (kind, extra),
        (SymbolKind::Macro, SymbolExtra::Macro(_))
            | (SymbolKind::NamespaceAlias, SymbolExtra::NamespaceAlias(_))
            | (SymbolKind::Enum, SymbolExtra::Enum(_))
            | (SymbolKind::EnumClass, SymbolExtra::Enum(_))
            | (SymbolKind::EnumConstant, SymbolExtra::EnumConstant(_))
            | (SymbolKind::Parameter, SymbolExtra::Parameter(_))
            | (_, SymbolExtra::None)
    ) || (kind.is_variable_like() && matches!(extra, SymbolExtra::Variable(_)))
        || (kind.is_function_like() && matches!(extra, SymbolExtra::Function(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::AccessSpecifier;
    use crate::types::{FileID, FilePosition};

    fn base_decl(name: &str, usr: &str, kind: SymbolKind) -> DeclOccurrence {
        DeclOccurrence {
            usr: usr.to_string(),
            name: name.to_string(),
            kind,
            file_id: FileID::new(1),
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
        }
    }

    #[test]
    fn normalize_type_spelling_collapses_reference_spacing() {
        assert_eq!(normalize_type_spelling("int &"), "int&");
        assert_eq!(normalize_type_spelling("const Foo &"), "const Foo&");
        assert_eq!(normalize_type_spelling("int *"), "int*");
        assert_eq!(normalize_type_spelling("int"), "int");
    }

    #[test]
    fn anonymous_name_is_deterministic() {
        let a = synthesize_anonymous_name(SymbolKind::Lambda, "c:@lambda#1");
        let b = synthesize_anonymous_name(SymbolKind::Lambda, "c:@lambda#1");
        assert_eq!(a, b);
        assert!(a.starts_with("__lambda_"));
    }

    #[test]
    fn function_signature_formats_parameters() {
        let sig = build_function_signature("foo", &["int &".to_string(), "const Foo &".to_string()]);
        assert_eq!(sig, "foo(int&, const Foo&)");
    }

    #[test]
    fn collect_symbol_assigns_protected_flag() {
        let mut decl = base_decl("m", "c:@m", SymbolKind::Field);
        decl.access = AccessSpecifier::Protected;
        let symbol = collect_symbol(&decl);
        assert!(symbol.test_flag(SymbolFlags::PROTECTED.bits()));
    }

    #[test]
    fn collect_symbol_remaps_scoped_enum_to_enum_class() {
        let mut decl = base_decl("Color", "c:@E@Color", SymbolKind::Enum);
        decl.is_scoped_enum = true;
        let symbol = collect_symbol(&decl);
        assert_eq!(symbol.kind, SymbolKind::EnumClass);
    }

    #[test]
    fn collect_symbol_remaps_overloaded_operator_to_operator() {
        let mut decl = base_decl("operator==", "c:@F@operator==#", SymbolKind::Function);
        decl.is_operator = true;
        let symbol = collect_symbol(&decl);
        assert_eq!(symbol.kind, SymbolKind::Operator);
    }

    #[test]
    fn collect_symbol_remaps_inline_namespace() {
        let mut decl = base_decl("detail", "c:@N@detail", SymbolKind::Namespace);
        decl.is_inline_namespace = true;
        let symbol = collect_symbol(&decl);
        assert_eq!(symbol.kind, SymbolKind::InlineNamespace);
    }

    #[test]
    fn collect_symbol_synthesizes_name_for_anonymous_decl() {
        let decl = base_decl("", "c:@lambda#2", SymbolKind::Lambda);
        let symbol = collect_symbol(&decl);
        assert!(symbol.name.starts_with("__lambda_"));
    }

    #[test]
    fn extra_info_kind_matching() {
        assert!(extra_info_matches_kind(
            SymbolKind::Macro,
            &SymbolExtra::Macro(crate::symbol::MacroInfo {
                definition: None,
                is_used_for_header_guard: false
            })
        ));
        assert!(!extra_info_matches_kind(
            SymbolKind::Macro,
            &SymbolExtra::Enum(crate::symbol::EnumInfo {
                underlying_type: "int".into()
            })
        ));
    }
}
