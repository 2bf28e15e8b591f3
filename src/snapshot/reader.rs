//! Reads a snapshot database back into in-memory records, for the merger
//! and for snapshot inspection.

use rusqlite::{params, Connection, OptionalExtension};

use crate::diagnostic::{Diagnostic, DiagnosticLevel};
use crate::file::File;
use crate::include::Include;
use crate::reference::{ReferenceFlags, SymbolReference};
use crate::relation::{AccessSpecifier, BaseOf, Override};
use crate::refarg::ArgumentPassedByReference;
use crate::symbol::{IndexerSymbol, SymbolExtra, SymbolKind};
use crate::types::{FileID, FilePosition, SymbolID};

pub struct SnapshotReader {
    conn: Connection,
}

impl SnapshotReader {
    pub fn open(path: &std::path::Path) -> rusqlite::Result<Self> {
        Ok(SnapshotReader {
            conn: Connection::open(path)?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn project_home(&self) -> rusqlite::Result<Option<String>> {
        self.info("project.home")
    }

    pub fn info(&self, key: &str) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM info WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
    }

    pub fn files(&self) -> rusqlite::Result<Vec<File>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, path, content, sha1 FROM file ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(File {
                id: FileID::new(row.get(0)?),
                path: row.get(1)?,
                content: row.get(2)?,
                sha1: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    pub fn symbols(&self) -> rusqlite::Result<Vec<IndexerSymbol>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, kind, parent, name, flags FROM symbol ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let kind_raw: i64 = row.get(1)?;
            let parent_raw: Option<i64> = row.get(2)?;
            Ok(IndexerSymbol {
                id: SymbolID::from_raw(row.get::<_, i64>(0)? as u64),
                kind: kind_from_i64(kind_raw),
                parent_id: parent_raw
                    .map(|v| SymbolID::from_raw(v as u64))
                    .unwrap_or(SymbolID::INVALID),
                name: row.get(3)?,
                display_name: None,
                flags: row.get(4)?,
                extra_info: SymbolExtra::None,
            })
        })?;
        let mut symbols: Vec<IndexerSymbol> = rows.collect::<rusqlite::Result<_>>()?;
        for symbol in symbols.iter_mut() {
            symbol.extra_info = self.load_extra_info(symbol.id, symbol.kind)?;
        }
        Ok(symbols)
    }

    fn load_extra_info(&self, id: SymbolID, kind: SymbolKind) -> rusqlite::Result<SymbolExtra> {
        let raw = id.raw() as i64;
        let extra = match kind {
            SymbolKind::Macro => self
                .conn
                .query_row(
                    "SELECT definition FROM macroInfo WHERE id = ?1",
                    params![raw],
                    |r| {
                        Ok(SymbolExtra::Macro(crate::symbol::MacroInfo {
                            definition: r.get(0)?,
                            is_used_for_header_guard: false,
                        }))
                    },
                )
                .optional()?,
            SymbolKind::Enum | SymbolKind::EnumClass => self
                .conn
                .query_row(
                    "SELECT integerType FROM enumInfo WHERE id = ?1",
                    params![raw],
                    |r| {
                        Ok(SymbolExtra::Enum(crate::symbol::EnumInfo {
                            underlying_type: r.get(0)?,
                        }))
                    },
                )
                .optional()?,
            SymbolKind::EnumConstant => self
                .conn
                .query_row(
                    "SELECT value, expression FROM enumConstantInfo WHERE id = ?1",
                    params![raw],
                    |r| {
                        Ok(SymbolExtra::EnumConstant(crate::symbol::EnumConstantInfo {
                            value: r.get(0)?,
                            expression: r.get(1)?,
                        }))
                    },
                )
                .optional()?,
            k if k.is_function_like() => self
                .conn
                .query_row(
                    "SELECT returnType FROM functionInfo WHERE id = ?1",
                    params![raw],
                    |r| {
                        Ok(SymbolExtra::Function(crate::symbol::FunctionInfo {
                            return_type: r.get(0)?,
                            parameters: vec![],
                        }))
                    },
                )
                .optional()?,
            k if k.is_variable_like() => self
                .conn
                .query_row(
                    "SELECT type, init FROM variableInfo WHERE id = ?1",
                    params![raw],
                    |r| {
                        Ok(SymbolExtra::Variable(crate::symbol::VariableInfo {
                            r#type: r.get(0)?,
                            init: r.get(1)?,
                        }))
                    },
                )
                .optional()?,
            _ => None,
        };
        Ok(extra.unwrap_or(SymbolExtra::None))
    }

    pub fn references(&self) -> rusqlite::Result<Vec<SymbolReference>> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol_id, file_id, line, col, parent_symbol_id, flags FROM symbolReference",
        )?;
        let rows = stmt.query_map([], |row| {
            let parent: Option<i64> = row.get(4)?;
            Ok(SymbolReference {
                symbol_id: SymbolID::from_raw(row.get::<_, i64>(0)? as u64),
                file_id: FileID::new(row.get(1)?),
                position: FilePosition::new(row.get(2)?, row.get(3)?),
                referenced_by_symbol_id: parent
                    .map(|v| SymbolID::from_raw(v as u64))
                    .unwrap_or(SymbolID::INVALID),
                flags: ReferenceFlags::from_bits_truncate(row.get(5)?),
            })
        })?;
        rows.collect()
    }

    pub fn includes(&self) -> rusqlite::Result<Vec<Include>> {
        let mut stmt = self
            .conn
            .prepare("SELECT file_id, line, included_file_id FROM include")?;
        let rows = stmt.query_map([], |row| {
            Ok(Include {
                file_id: FileID::new(row.get(0)?),
                line: row.get(1)?,
                included_file_id: FileID::new(row.get(2)?),
            })
        })?;
        rows.collect()
    }

    pub fn base_of(&self) -> rusqlite::Result<Vec<BaseOf>> {
        let mut stmt = self
            .conn
            .prepare("SELECT baseClassID, derivedClassID, access FROM baseOf")?;
        let rows = stmt.query_map([], |row| {
            Ok(BaseOf {
                base_class_id: SymbolID::from_raw(row.get::<_, i64>(0)? as u64),
                derived_class_id: SymbolID::from_raw(row.get::<_, i64>(1)? as u64),
                access: access_from_i64(row.get(2)?),
            })
        })?;
        rows.collect()
    }

    pub fn overrides(&self) -> rusqlite::Result<Vec<Override>> {
        let mut stmt = self
            .conn
            .prepare("SELECT overrideMethodID, baseMethodID FROM override")?;
        let rows = stmt.query_map([], |row| {
            Ok(Override {
                override_method_id: SymbolID::from_raw(row.get::<_, i64>(0)? as u64),
                base_method_id: SymbolID::from_raw(row.get::<_, i64>(1)? as u64),
            })
        })?;
        rows.collect()
    }

    pub fn diagnostics(&self) -> rusqlite::Result<Vec<(FileID, Diagnostic)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT level, fileID, line, column, message FROM diagnostic")?;
        let rows = stmt.query_map([], |row| {
            let file_id = FileID::new(row.get(1)?);
            Ok((
                file_id,
                Diagnostic {
                    level: level_from_i64(row.get(0)?),
                    message: row.get(4)?,
                    file_id,
                    position: FilePosition::new(row.get(2)?, row.get(3)?),
                },
            ))
        })?;
        rows.collect()
    }

    pub fn arguments_by_reference(&self) -> rusqlite::Result<Vec<ArgumentPassedByReference>> {
        let mut stmt = self
            .conn
            .prepare("SELECT file_id, line, column FROM argumentPassedByReference")?;
        let rows = stmt.query_map([], |row| {
            Ok(ArgumentPassedByReference {
                file_id: FileID::new(row.get(0)?),
                position: FilePosition::new(row.get(1)?, row.get(2)?),
            })
        })?;
        rows.collect()
    }
}

fn kind_from_i64(v: i64) -> SymbolKind {
    // SAFETY-free decode: SymbolKind's discriminants are a small dense
    // range starting at 0, matching what the writer stored; an unknown
    // value degrades to `Unknown` rather than panicking on a foreign DB.
    match v {
        0 => SymbolKind::Unknown,
        1 => SymbolKind::Module,
        2 => SymbolKind::Namespace,
        3 => SymbolKind::NamespaceAlias,
        4 => SymbolKind::Macro,
        5 => SymbolKind::Enum,
        6 => SymbolKind::Struct,
        7 => SymbolKind::Class,
        8 => SymbolKind::Union,
        9 => SymbolKind::Lambda,
        10 => SymbolKind::TypeAlias,
        11 => SymbolKind::Function,
        12 => SymbolKind::Variable,
        13 => SymbolKind::Field,
        14 => SymbolKind::EnumConstant,
        15 => SymbolKind::InstanceMethod,
        16 => SymbolKind::ClassMethod,
        17 => SymbolKind::StaticMethod,
        18 => SymbolKind::StaticProperty,
        19 => SymbolKind::Constructor,
        20 => SymbolKind::Destructor,
        21 => SymbolKind::ConversionFunction,
        22 => SymbolKind::Parameter,
        23 => SymbolKind::Using,
        24 => SymbolKind::TemplateTypeParameter,
        25 => SymbolKind::TemplateTemplateParameter,
        26 => SymbolKind::NonTypeTemplateParameter,
        27 => SymbolKind::Concept,
        28 => SymbolKind::EnumClass,
        29 => SymbolKind::Operator,
        30 => SymbolKind::InlineNamespace,
        _ => SymbolKind::Unknown,
    }
}

fn access_from_i64(v: i64) -> AccessSpecifier {
    match v {
        1 => AccessSpecifier::Public,
        2 => AccessSpecifier::Protected,
        3 => AccessSpecifier::Private,
        _ => AccessSpecifier::Invalid,
    }
}

fn level_from_i64(v: i64) -> DiagnosticLevel {
    match v {
        1 => DiagnosticLevel::Note,
        2 => DiagnosticLevel::Remark,
        3 => DiagnosticLevel::Warning,
        4 => DiagnosticLevel::Error,
        5 => DiagnosticLevel::Fatal,
        _ => DiagnosticLevel::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::writer::SnapshotWriter;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_back_what_the_writer_wrote() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path();
        {
            let writer = SnapshotWriter::create(path).unwrap();
            writer
                .upsert_file(&File {
                    id: FileID::new(1),
                    path: "/a.cpp".into(),
                    content: None,
                    sha1: None,
                })
                .unwrap();
            writer
                .insert_symbol(&IndexerSymbol::new(SymbolID::from_raw(9), SymbolKind::Function, "f"))
                .unwrap();
        }
        let reader = SnapshotReader::open(path).unwrap();
        let files = reader.files().unwrap();
        assert_eq!(files.len(), 1);
        let symbols = reader.symbols().unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "f");
    }
}
