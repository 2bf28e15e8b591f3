//! Writes indexed data into a snapshot database.
//!
//! Grounded in `examples/other_examples/534b943d_dwalleck-rivets__crates-tethys-src-db-files.rs.rs`'s
//! rusqlite transaction idiom (`conn.transaction()`, batch `tx.execute`,
//! `tx.commit()`) and in `examples/original_source/modules/cppscanner/indexer/snapshotwriter.cpp`
//! for the table layout ([`super::schema`]).

use rusqlite::{params, Connection, OptionalExtension};

use crate::declaration::SymbolDeclaration;
use crate::diagnostic::Diagnostic;
use crate::file::File;
use crate::include::Include;
use crate::reference::SymbolReference;
use crate::relation::{BaseOf, Override};
use crate::refarg::ArgumentPassedByReference;
use crate::symbol::IndexerSymbol;
use crate::tu_index::TranslationUnitIndex;
use crate::types::{FileID, SymbolID};

use super::schema;

pub struct SnapshotWriter {
    conn: Connection,
}

impl SnapshotWriter {
    pub fn create(path: &std::path::Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        let writer = SnapshotWriter { conn };
        writer.init_schema()?;
        Ok(writer)
    }

    pub fn in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let writer = SnapshotWriter { conn };
        writer.init_schema()?;
        Ok(writer)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(schema::CREATE_STATEMENTS)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO info(key, value) VALUES ('schemaVersion', ?1)",
            params![schema::SCHEMA_VERSION.to_string()],
        )?;
        for (value, name) in schema::ACCESS_SPECIFIER_ROWS {
            self.conn.execute(
                "INSERT OR IGNORE INTO accessSpecifier(value, name) VALUES (?1, ?2)",
                params![value, name],
            )?;
        }
        for (value, name) in schema::DIAGNOSTIC_LEVEL_ROWS {
            self.conn.execute(
                "INSERT OR IGNORE INTO diagnosticLevel(value, name) VALUES (?1, ?2)",
                params![value, name],
            )?;
        }
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn set_project_home(&self, home: &str) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO info(key, value) VALUES ('project.home', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![home],
        )?;
        Ok(())
    }

    pub fn project_home(&self) -> rusqlite::Result<Option<String>> {
        self.info("project.home")
    }

    /// Record one of the "optional consistent" scanner properties
    /// (`scanner.indexLocalSymbols`, `scanner.indexExternalFiles`,
    /// `scanner.root`) alongside `project.home` in the `info` table.
    pub fn set_info(&self, key: &str, value: &str) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO info(key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn info(&self, key: &str) -> rusqlite::Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM info WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
    }

    pub fn upsert_file(&self, file: &File) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO file(id, path, content, sha1) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
               path = excluded.path,
               content = COALESCE(excluded.content, file.content),
               sha1 = COALESCE(excluded.sha1, file.sha1)",
            params![file.id.value(), file.path, file.content, file.sha1],
        )?;
        Ok(())
    }

    pub fn mark_file_indexed(&self, file_id: FileID) -> rusqlite::Result<()> {
        self.conn.execute(
            "UPDATE file SET indexed = 1 WHERE id = ?1",
            params![file_id.value()],
        )?;
        Ok(())
    }

    pub fn insert_symbol(&self, symbol: &IndexerSymbol) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO symbol(id, kind, parent, name, flags) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET flags = symbol.flags | excluded.flags, name = excluded.name",
            params![
                symbol.id.raw() as i64,
                symbol.kind as i64,
                non_zero_symbol(symbol.parent_id),
                symbol.name,
                symbol.flags,
            ],
        )?;
        self.insert_extra_info(symbol)?;
        Ok(())
    }

    fn insert_extra_info(&self, symbol: &IndexerSymbol) -> rusqlite::Result<()> {
        use crate::symbol::SymbolExtra;
        let id = symbol.id.raw() as i64;
        match &symbol.extra_info {
            SymbolExtra::None => {}
            SymbolExtra::Macro(info) => {
                self.conn.execute(
                    "INSERT INTO macroInfo(id, definition) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET definition = excluded.definition",
                    params![id, info.definition],
                )?;
            }
            SymbolExtra::NamespaceAlias(info) => {
                self.conn.execute(
                    "INSERT INTO namespaceAliasInfo(id, value) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET value = excluded.value",
                    params![id, info.value],
                )?;
            }
            SymbolExtra::Enum(info) => {
                self.conn.execute(
                    "INSERT INTO enumInfo(id, integerType) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET integerType = excluded.integerType",
                    params![id, info.underlying_type],
                )?;
            }
            SymbolExtra::EnumConstant(info) => {
                self.conn.execute(
                    "INSERT INTO enumConstantInfo(id, value, expression) VALUES (?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET value = excluded.value, expression = excluded.expression",
                    params![id, info.value, info.expression],
                )?;
            }
            SymbolExtra::Variable(info) => {
                self.conn.execute(
                    "INSERT INTO variableInfo(id, type, init) VALUES (?1, ?2, ?3)
                     ON CONFLICT(id) DO UPDATE SET type = excluded.type, init = excluded.init",
                    params![id, info.r#type, info.init],
                )?;
            }
            SymbolExtra::Parameter(info) => {
                self.conn.execute(
                    "INSERT INTO parameterInfo(id, parameterIndex, type, defaultValue) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO UPDATE SET parameterIndex = excluded.parameterIndex, type = excluded.type, defaultValue = excluded.defaultValue",
                    params![id, info.parameter_index as i64, info.r#type, info.default_value],
                )?;
            }
            SymbolExtra::Function(info) => {
                self.conn.execute(
                    "INSERT INTO functionInfo(id, returnType) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET returnType = excluded.returnType",
                    params![id, info.return_type],
                )?;
            }
        }
        Ok(())
    }

    pub fn insert_reference(&self, reference: &SymbolReference) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO symbolReference(symbol_id, file_id, line, col, parent_symbol_id, flags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                reference.symbol_id.raw() as i64,
                reference.file_id.value(),
                reference.position.line(),
                reference.position.column(),
                non_zero_symbol(reference.referenced_by_symbol_id),
                reference.flags.bits(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_declaration(&self, decl: &SymbolDeclaration) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO symbolDeclaration(symbol_id, file_id, startPosition, endPosition, isDefinition)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(symbol_id, file_id, startPosition) DO UPDATE SET
               endPosition = excluded.endPosition, isDefinition = excluded.isDefinition",
            params![
                decl.symbol_id.raw() as i64,
                decl.file_id.value(),
                decl.start_position.bits(),
                decl.end_position.bits(),
                decl.is_definition,
            ],
        )?;
        Ok(())
    }

    pub fn insert_include(&self, include: &Include) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO include(file_id, line, included_file_id) VALUES (?1, ?2, ?3)",
            params![include.file_id.value(), include.line, include.included_file_id.value()],
        )?;
        Ok(())
    }

    pub fn insert_base_of(&self, base_of: &BaseOf) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO baseOf(baseClassID, derivedClassID, access) VALUES (?1, ?2, ?3)",
            params![
                base_of.base_class_id.raw() as i64,
                base_of.derived_class_id.raw() as i64,
                base_of.access as i64,
            ],
        )?;
        Ok(())
    }

    pub fn insert_override(&self, override_: &Override) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO override(overrideMethodID, baseMethodID) VALUES (?1, ?2)",
            params![
                override_.override_method_id.raw() as i64,
                override_.base_method_id.raw() as i64,
            ],
        )?;
        Ok(())
    }

    pub fn insert_diagnostic(&self, diagnostic: &Diagnostic) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO diagnostic(level, fileID, line, column, message) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                diagnostic.level as i64,
                diagnostic.file_id.value(),
                diagnostic.position.line(),
                diagnostic.position.column(),
                diagnostic.message,
            ],
        )?;
        Ok(())
    }

    pub fn insert_argument_by_reference(&self, arg: &ArgumentPassedByReference) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO argumentPassedByReference(file_id, line, column) VALUES (?1, ?2, ?3)",
            params![arg.file_id.value(), arg.position.line(), arg.position.column()],
        )?;
        Ok(())
    }

    /// Write every row of a single translation unit's index inside one
    /// transaction.
    pub fn write_translation_unit(&mut self, tu: &TranslationUnitIndex) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;
        {
            for symbol in tu.symbols.values() {
                insert_symbol_tx(&tx, symbol)?;
            }
            for reference in &tu.references {
                insert_reference_tx(&tx, reference)?;
            }
            for decl in &tu.declarations {
                insert_declaration_tx(&tx, decl)?;
            }
            for include in &tu.includes {
                insert_include_tx(&tx, include)?;
            }
            for base_of in &tu.base_of {
                insert_base_of_tx(&tx, base_of)?;
            }
            for override_ in &tu.overrides {
                insert_override_tx(&tx, override_)?;
            }
            for diagnostic in &tu.diagnostics {
                insert_diagnostic_tx(&tx, diagnostic)?;
            }
            for arg in &tu.arguments_by_reference {
                insert_argument_by_reference_tx(&tx, arg)?;
            }
            for file_id in &tu.indexed_files {
                tx.execute(
                    "UPDATE file SET indexed = 1 WHERE id = ?1",
                    params![file_id.value()],
                )?;
            }
        }
        tx.commit()
    }
}

fn non_zero_symbol(id: SymbolID) -> Option<i64> {
    id.is_valid().then_some(id.raw() as i64)
}

fn insert_symbol_tx(tx: &rusqlite::Transaction, symbol: &IndexerSymbol) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO symbol(id, kind, parent, name, flags) VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET flags = symbol.flags | excluded.flags, name = excluded.name",
        params![
            symbol.id.raw() as i64,
            symbol.kind as i64,
            non_zero_symbol(symbol.parent_id),
            symbol.name,
            symbol.flags,
        ],
    )?;
    Ok(())
}

fn insert_reference_tx(tx: &rusqlite::Transaction, reference: &SymbolReference) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO symbolReference(symbol_id, file_id, line, col, parent_symbol_id, flags)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            reference.symbol_id.raw() as i64,
            reference.file_id.value(),
            reference.position.line(),
            reference.position.column(),
            non_zero_symbol(reference.referenced_by_symbol_id),
            reference.flags.bits(),
        ],
    )?;
    Ok(())
}

fn insert_declaration_tx(tx: &rusqlite::Transaction, decl: &SymbolDeclaration) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO symbolDeclaration(symbol_id, file_id, startPosition, endPosition, isDefinition)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(symbol_id, file_id, startPosition) DO UPDATE SET
           endPosition = excluded.endPosition, isDefinition = excluded.isDefinition",
        params![
            decl.symbol_id.raw() as i64,
            decl.file_id.value(),
            decl.start_position.bits(),
            decl.end_position.bits(),
            decl.is_definition,
        ],
    )?;
    Ok(())
}

fn insert_include_tx(tx: &rusqlite::Transaction, include: &Include) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO include(file_id, line, included_file_id) VALUES (?1, ?2, ?3)",
        params![include.file_id.value(), include.line, include.included_file_id.value()],
    )?;
    Ok(())
}

fn insert_base_of_tx(tx: &rusqlite::Transaction, base_of: &BaseOf) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO baseOf(baseClassID, derivedClassID, access) VALUES (?1, ?2, ?3)",
        params![
            base_of.base_class_id.raw() as i64,
            base_of.derived_class_id.raw() as i64,
            base_of.access as i64,
        ],
    )?;
    Ok(())
}

fn insert_override_tx(tx: &rusqlite::Transaction, override_: &Override) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO override(overrideMethodID, baseMethodID) VALUES (?1, ?2)",
        params![
            override_.override_method_id.raw() as i64,
            override_.base_method_id.raw() as i64,
        ],
    )?;
    Ok(())
}

fn insert_diagnostic_tx(tx: &rusqlite::Transaction, diagnostic: &Diagnostic) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO diagnostic(level, fileID, line, column, message) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            diagnostic.level as i64,
            diagnostic.file_id.value(),
            diagnostic.position.line(),
            diagnostic.position.column(),
            diagnostic.message,
        ],
    )?;
    Ok(())
}

fn insert_argument_by_reference_tx(
    tx: &rusqlite::Transaction,
    arg: &ArgumentPassedByReference,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO argumentPassedByReference(file_id, line, column) VALUES (?1, ?2, ?3)",
        params![arg.file_id.value(), arg.position.line(), arg.position.column()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolKind;

    #[test]
    fn create_schema_succeeds_in_memory() {
        let writer = SnapshotWriter::in_memory().expect("schema creation should succeed");
        let count: i64 = writer
            .connection()
            .query_row("SELECT COUNT(*) FROM accessSpecifier", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn upsert_file_then_insert_symbol_round_trips() {
        let writer = SnapshotWriter::in_memory().unwrap();
        let file = File {
            id: FileID::new(1),
            path: "/a.cpp".into(),
            content: None,
            sha1: None,
        };
        writer.upsert_file(&file).unwrap();

        let symbol = IndexerSymbol::new(SymbolID::from_raw(42), SymbolKind::Function, "foo");
        writer.insert_symbol(&symbol).unwrap();

        let name: String = writer
            .connection()
            .query_row("SELECT name FROM symbol WHERE id = ?1", params![42i64], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "foo");
    }

    #[test]
    fn insert_symbol_ors_flags_on_conflict() {
        let writer = SnapshotWriter::in_memory().unwrap();
        let id = SymbolID::from_raw(7);
        let mut s1 = IndexerSymbol::new(id, SymbolKind::Function, "f");
        s1.flags = crate::symbol::SymbolFlags::LOCAL.bits();
        writer.insert_symbol(&s1).unwrap();

        let mut s2 = IndexerSymbol::new(id, SymbolKind::Function, "f");
        s2.flags = crate::symbol::SymbolFlags::FROM_PROJECT.bits();
        writer.insert_symbol(&s2).unwrap();

        let flags: u32 = writer
            .connection()
            .query_row("SELECT flags FROM symbol WHERE id = ?1", params![7i64], |r| r.get(0))
            .unwrap();
        assert_eq!(
            flags,
            crate::symbol::SymbolFlags::LOCAL.bits() | crate::symbol::SymbolFlags::FROM_PROJECT.bits()
        );
    }
}
