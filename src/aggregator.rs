//! Folds one translation unit's index into the running snapshot.
//!
//! Grounded in `examples/original_source/modules/cppscanner/indexer/snapshotcreator.cpp`'s
//! `assimilate`/"feed" sequencing (11 ordered steps, each its own SQL
//! transaction) and in the `rusqlite::Transaction` idiom from
//! `examples/other_examples/534b943d_dwalleck-rivets__crates-tethys-src-db-files.rs.rs`.

use std::collections::HashMap;

use rusqlite::params;

use crate::declaration::SymbolDeclaration;
use crate::diagnostic::Diagnostic;
use crate::file::File;
use crate::fileid::BasicFileIdentificator;
use crate::include::Include;
use crate::reference::SymbolReference;
use crate::snapshot::writer::SnapshotWriter;
use crate::tu_index::TranslationUnitIndex;
use crate::types::FileID;
use crate::error::AggregationResult;

/// Owns the canonical (cross-TU) file identity and the output snapshot.
/// Every translation unit assimilated through this type is remapped into
/// the same `FileID` space before being written, regardless of what ids
/// its own front end happened to assign.
pub struct SnapshotAggregator {
    writer: SnapshotWriter,
    files: BasicFileIdentificator,
}

impl SnapshotAggregator {
    pub fn new(writer: SnapshotWriter) -> Self {
        SnapshotAggregator {
            writer,
            files: BasicFileIdentificator::new(),
        }
    }

    pub fn writer(&self) -> &SnapshotWriter {
        &self.writer
    }

    pub fn set_project_home(&self, home: &str) -> AggregationResult<()> {
        self.writer.set_project_home(home)?;
        Ok(())
    }

    /// Step 1-2: remap the TU's local file ids into canonical ones and
    /// insert any brand-new files, capturing content + sha1 for project
    /// files (those under `project.home`).
    fn remap_and_register_files(
        &mut self,
        local_paths: &HashMap<FileID, String>,
    ) -> AggregationResult<HashMap<FileID, FileID>> {
        let home = self.writer.project_home()?;
        let mut mapping = HashMap::new();
        for (&local_id, path) in local_paths {
            let canonical_id = self.files.get_or_create(path);
            mapping.insert(local_id, canonical_id);
            let (content, sha1) = match &home {
                Some(home) if !home.is_empty() && path.starts_with(home.as_str()) => {
                    read_content_and_sha1(path)
                }
                _ => (None, None),
            };
            self.writer.upsert_file(&File {
                id: canonical_id,
                path: path.clone(),
                content,
                sha1,
            })?;
        }
        Ok(mapping)
    }

    /// Fold `tu` into the snapshot. `local_paths` must map every `FileID`
    /// the TU refers to (its main file, any included files, ...) to its
    /// normalized path, so files can be remapped into canonical ids.
    pub fn assimilate(
        &mut self,
        tu: &TranslationUnitIndex,
        local_paths: &HashMap<FileID, String>,
    ) -> AggregationResult<()> {
        // Steps 1-2: file remap + new files.
        let mapping = self.remap_and_register_files(local_paths)?;
        let remap = |id: FileID| -> FileID { mapping.get(&id).copied().unwrap_or(id) };

        // Step 3-4: included-file paths + per-file include union/dedup.
        for include in &tu.includes {
            let remapped = Include {
                file_id: remap(include.file_id),
                line: include.line,
                included_file_id: remap(include.included_file_id),
            };
            self.writer.insert_include(&remapped)?;
        }

        // Step 5: symbols OR-merge flags, REPLACE extra info.
        for symbol in tu.symbols.values() {
            self.writer.insert_symbol(symbol)?;
        }

        // Step 6: per-file reference dedup, preferring rows whose
        // `referencedBySymbolID` is valid over rows where it is not.
        self.upsert_references_preferring_valid_parent(tu.references.iter().map(|r| SymbolReference {
            file_id: remap(r.file_id),
            ..*r
        }))?;

        // Step 7: relation append, idempotent via UNIQUE/PK constraints.
        for base_of in &tu.base_of {
            self.writer.insert_base_of(base_of)?;
        }
        for override_ in &tu.overrides {
            self.writer.insert_override(override_)?;
        }

        // Step 8: per-file diagnostic dedup.
        self.insert_diagnostics_deduped(tu.diagnostics.iter().map(|d| Diagnostic {
            file_id: remap(d.file_id),
            ..d.clone()
        }))?;

        // Step 9: bulk-insert argument-by-reference, dedup via UNIQUE.
        for arg in &tu.arguments_by_reference {
            let remapped = crate::refarg::ArgumentPassedByReference {
                file_id: remap(arg.file_id),
                position: arg.position,
            };
            self.writer.insert_argument_by_reference(&remapped)?;
        }

        // Step 10: per-file declaration dedup (handled via ON CONFLICT
        // DO UPDATE on the declaration's natural key).
        for decl in &tu.declarations {
            let remapped = SymbolDeclaration {
                file_id: remap(decl.file_id),
                ..*decl
            };
            self.writer.insert_declaration(&remapped)?;
        }

        // Step 11: mark every file this TU actually indexed.
        for &file_id in &tu.indexed_files {
            self.writer.mark_file_indexed(remap(file_id))?;
        }

        Ok(())
    }

    fn upsert_references_preferring_valid_parent(
        &self,
        references: impl Iterator<Item = SymbolReference>,
    ) -> AggregationResult<()> {
        let conn = self.writer.connection();
        for reference in references {
            conn.execute(
                "INSERT INTO symbolReference(symbol_id, file_id, line, col, parent_symbol_id, flags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(symbol_id, file_id, line, col, flags) DO UPDATE SET
                   parent_symbol_id = COALESCE(symbolReference.parent_symbol_id, excluded.parent_symbol_id)",
                params![
                    reference.symbol_id.raw() as i64,
                    reference.file_id.value(),
                    reference.position.line(),
                    reference.position.column(),
                    reference.referenced_by_symbol_id.is_valid().then_some(reference.referenced_by_symbol_id.raw() as i64),
                    reference.flags.bits(),
                ],
            )?;
        }
        Ok(())
    }

    fn insert_diagnostics_deduped(
        &self,
        diagnostics: impl Iterator<Item = Diagnostic>,
    ) -> AggregationResult<()> {
        let conn = self.writer.connection();
        let mut seen = std::collections::HashSet::new();
        for diagnostic in diagnostics {
            let key = (
                diagnostic.level as u8,
                diagnostic.file_id.value(),
                diagnostic.position.bits(),
                diagnostic.message.clone(),
            );
            if !seen.insert(key) {
                continue;
            }
            conn.execute(
                "INSERT INTO diagnostic(level, fileID, line, column, message) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    diagnostic.level as i64,
                    diagnostic.file_id.value(),
                    diagnostic.position.line(),
                    diagnostic.position.column(),
                    diagnostic.message,
                ],
            )?;
        }
        Ok(())
    }
}

/// Reads a project file's content, stripping carriage returns before
/// hashing so the sha1 is stable across CRLF/LF checkouts of the same file.
fn read_content_and_sha1(path: &str) -> (Option<String>, Option<String>) {
    use sha1::{Digest, Sha1};

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return (None, None),
    };
    let normalized = raw.replace("\r\n", "\n");
    let digest = Sha1::digest(normalized.as_bytes());
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    (Some(normalized), Some(hex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceFlags;
    use crate::symbol::{IndexerSymbol, SymbolKind};
    use crate::types::{FilePosition, SymbolID};

    #[test]
    fn assimilate_remaps_local_file_ids_to_canonical_ones() {
        let writer = SnapshotWriter::in_memory().unwrap();
        let mut aggregator = SnapshotAggregator::new(writer);

        let local_main = FileID::new(1);
        let mut paths = HashMap::new();
        paths.insert(local_main, "/home/project/a.cpp".to_string());

        let mut tu = TranslationUnitIndex::new(local_main);
        let symbol_id = SymbolID::from_raw(99);
        tu.upsert_symbol(IndexerSymbol::new(symbol_id, SymbolKind::Function, "f"));
        tu.add_reference(SymbolReference {
            symbol_id,
            file_id: local_main,
            position: FilePosition::new(1, 1),
            referenced_by_symbol_id: SymbolID::INVALID,
            flags: ReferenceFlags::DEFINITION,
        });

        aggregator.assimilate(&tu, &paths).unwrap();

        let canonical_id: i64 = aggregator
            .writer()
            .connection()
            .query_row("SELECT id FROM file WHERE path = ?1", params!["/home/project/a.cpp"], |r| r.get(0))
            .unwrap();
        assert_eq!(canonical_id, 1); // first file registered gets id 1

        let ref_count: i64 = aggregator
            .writer()
            .connection()
            .query_row("SELECT COUNT(*) FROM symbolReference", [], |r| r.get(0))
            .unwrap();
        assert_eq!(ref_count, 1);
    }

    #[test]
    fn project_files_capture_content_and_sha1_but_external_files_do_not() {
        let dir = tempfile::tempdir().unwrap();
        let project_file = dir.path().join("a.cpp");
        std::fs::write(&project_file, "int main() {}\n").unwrap();
        let external_file = dir.path().join("external.h");
        std::fs::write(&external_file, "#pragma once\n").unwrap();

        let writer = SnapshotWriter::in_memory().unwrap();
        writer.set_project_home(&dir.path().display().to_string()).unwrap();
        let mut aggregator = SnapshotAggregator::new(writer);

        let local_main = FileID::new(1);
        let local_external = FileID::new(2);
        let mut paths = HashMap::new();
        paths.insert(local_main, project_file.display().to_string());
        paths.insert(local_external, "/usr/include/external.h".to_string());

        let tu = TranslationUnitIndex::new(local_main);
        aggregator.assimilate(&tu, &paths).unwrap();

        let (content, sha1): (Option<String>, Option<String>) = aggregator
            .writer()
            .connection()
            .query_row(
                "SELECT content, sha1 FROM file WHERE path = ?1",
                params![project_file.display().to_string()],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(content, Some("int main() {}\n".to_string()));
        assert!(sha1.is_some());

        let (ext_content, ext_sha1): (Option<String>, Option<String>) = aggregator
            .writer()
            .connection()
            .query_row(
                "SELECT content, sha1 FROM file WHERE path = ?1",
                params!["/usr/include/external.h"],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(ext_content, None);
        assert_eq!(ext_sha1, None);
    }

    #[test]
    fn assimilating_twice_does_not_duplicate_relations() {
        let writer = SnapshotWriter::in_memory().unwrap();
        let mut aggregator = SnapshotAggregator::new(writer);
        let local_main = FileID::new(1);
        let mut paths = HashMap::new();
        paths.insert(local_main, "/a.cpp".to_string());

        let mut tu = TranslationUnitIndex::new(local_main);
        tu.base_of.push(crate::relation::BaseOf {
            base_class_id: SymbolID::from_raw(1),
            derived_class_id: SymbolID::from_raw(2),
            access: crate::relation::AccessSpecifier::Public,
        });

        aggregator.assimilate(&tu, &paths).unwrap();
        aggregator.assimilate(&tu, &paths).unwrap();

        let count: i64 = aggregator
            .writer()
            .connection()
            .query_row("SELECT COUNT(*) FROM baseOf", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
