//! Combines several independently-produced snapshots into one.
//!
//! Two explicit passes: first build a single unified `FileID` table
//! (in-project files first, in original insertion order, then external
//! files), then stream every table from every input through that input's
//! own remap and into the output.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::error::AggregationResult;
use crate::file::File;
use crate::fileid::BasicFileIdentificator;
use crate::snapshot::reader::SnapshotReader;
use crate::snapshot::writer::SnapshotWriter;
use crate::types::FileID;

pub struct SnapshotMerger {
    output: SnapshotWriter,
}

impl SnapshotMerger {
    pub fn new(output: SnapshotWriter) -> Self {
        SnapshotMerger { output }
    }

    pub fn writer(&self) -> &SnapshotWriter {
        &self.output
    }

    pub fn merge(&mut self, input_paths: &[impl AsRef<Path>]) -> AggregationResult<()> {
        let mut inputs = Vec::new();
        for path in input_paths {
            inputs.push(SnapshotReader::open(path.as_ref())?);
        }

        // Pass 1: unified FileID table.
        let mut unified = BasicFileIdentificator::new();
        let mut per_input_map: Vec<HashMap<FileID, FileID>> = Vec::with_capacity(inputs.len());

        // In-project files first, preserving each input's own insertion
        // order, before any external file across all inputs. Each input is
        // partitioned against its *own* project.home, not a shared one.
        let mut input_homes: Vec<Option<String>> = Vec::with_capacity(inputs.len());
        let mut in_project: Vec<Vec<(FileID, File)>> = Vec::with_capacity(inputs.len());
        let mut external: Vec<Vec<(FileID, File)>> = Vec::with_capacity(inputs.len());

        for reader in &inputs {
            let home = reader.project_home()?;
            let files = reader.files()?;
            let mut local_in_project = Vec::new();
            let mut local_external = Vec::new();
            for file in files {
                match &home {
                    Some(home) if !home.is_empty() && file.path.starts_with(home.as_str()) => {
                        local_in_project.push((file.id, file));
                    }
                    _ => local_external.push((file.id, file)),
                }
            }
            in_project.push(local_in_project);
            external.push(local_external);
            input_homes.push(home);
        }

        for files in in_project.iter().chain(external.iter()) {
            for (_, file) in files {
                unified.get_or_create(&file.path);
            }
        }

        for input_index in 0..inputs.len() {
            let mut mapping = HashMap::new();
            for (local_id, file) in in_project[input_index].iter().chain(external[input_index].iter()) {
                let canonical = unified
                    .get(&file.path)
                    .expect("every file was registered in the unification pass above");
                mapping.insert(*local_id, canonical);
                self.output.upsert_file(&File {
                    id: canonical,
                    path: file.path.clone(),
                    content: file.content.clone(),
                    sha1: file.sha1.clone(),
                })?;
            }
            per_input_map.push(mapping);
        }

        let known_homes: Vec<&String> = input_homes.iter().filter_map(|h| h.as_ref()).collect();
        if !known_homes.is_empty() {
            let first = known_homes[0];
            if known_homes.iter().all(|h| *h == first) {
                self.output.set_project_home(first)?;
            } else {
                warn!(
                    "input snapshots disagree on project.home ({:?}); leaving it unset",
                    known_homes
                );
            }
        }

        // "Optional consistent" scanner properties: carried into the
        // merged output only if every input that set them agrees.
        for key in ["scanner.indexLocalSymbols", "scanner.indexExternalFiles", "scanner.root"] {
            self.merge_consistent_info(&inputs, key)?;
        }

        // Pass 2: stream + remap every other table.
        for (input_index, reader) in inputs.iter().enumerate() {
            let remap = |id: FileID| -> FileID {
                per_input_map[input_index].get(&id).copied().unwrap_or(id)
            };

            for symbol in reader.symbols()? {
                // Symbol extra info is last-writer-wins across inputs: a
                // later input's `insert_symbol` call simply overwrites it.
                self.output.insert_symbol(&symbol)?;
            }

            for reference in reader.references()? {
                let remapped = crate::reference::SymbolReference {
                    file_id: remap(reference.file_id),
                    ..reference
                };
                self.output.insert_reference(&remapped)?;
            }

            for include in reader.includes()? {
                let remapped = crate::include::Include {
                    file_id: remap(include.file_id),
                    included_file_id: remap(include.included_file_id),
                    ..include
                };
                self.output.insert_include(&remapped)?;
            }

            for base_of in reader.base_of()? {
                self.output.insert_base_of(&base_of)?;
            }

            for over in reader.overrides()? {
                self.output.insert_override(&over)?;
            }

            for (file_id, diagnostic) in reader.diagnostics()? {
                let remapped = crate::diagnostic::Diagnostic {
                    file_id: remap(file_id),
                    ..diagnostic
                };
                self.output.insert_diagnostic(&remapped)?;
            }

            for arg in reader.arguments_by_reference()? {
                let remapped = crate::refarg::ArgumentPassedByReference {
                    file_id: remap(arg.file_id),
                    position: arg.position,
                };
                self.output.insert_argument_by_reference(&remapped)?;
            }
        }

        Ok(())
    }

    fn merge_consistent_info(&self, inputs: &[SnapshotReader], key: &str) -> AggregationResult<()> {
        let mut values = Vec::new();
        for reader in inputs {
            if let Some(value) = reader.info(key)? {
                values.push(value);
            }
        }
        if values.is_empty() {
            return Ok(());
        }
        let first = &values[0];
        if values.iter().all(|v| v == first) {
            self.output.set_info(key, first)?;
        } else {
            warn!("input snapshots disagree on {key} ({values:?}); leaving it unset");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{IndexerSymbol, SymbolKind};
    use crate::types::SymbolID;
    use rusqlite::params;
    use tempfile::NamedTempFile;

    fn write_snapshot(path: &Path, file_path: &str, symbol_name: &str) {
        let writer = SnapshotWriter::create(path).unwrap();
        writer
            .upsert_file(&File {
                id: FileID::new(1),
                path: file_path.to_string(),
                content: None,
                sha1: None,
            })
            .unwrap();
        writer
            .insert_symbol(&IndexerSymbol::new(SymbolID::from_raw(1), SymbolKind::Function, symbol_name))
            .unwrap();
    }

    #[test]
    fn merge_combines_files_from_both_inputs() {
        let a = NamedTempFile::new().unwrap();
        let b = NamedTempFile::new().unwrap();
        write_snapshot(a.path(), "/proj/a.cpp", "fa");
        write_snapshot(b.path(), "/proj/b.cpp", "fb");

        let out = NamedTempFile::new().unwrap();
        let writer = SnapshotWriter::create(out.path()).unwrap();
        let mut merger = SnapshotMerger::new(writer);
        merger.merge(&[a.path(), b.path()]).unwrap();

        let file_count: i64 = merger
            .writer()
            .connection()
            .query_row("SELECT COUNT(*) FROM file", [], |r| r.get(0))
            .unwrap();
        assert_eq!(file_count, 2);
    }

    #[test]
    fn each_input_is_partitioned_by_its_own_project_home() {
        // Input `a` has no project.home; input `b` does. Before the fix,
        // `a`'s files were checked against whatever home a later input
        // pushed, which could misclassify them as in-project.
        let a = NamedTempFile::new().unwrap();
        let b = NamedTempFile::new().unwrap();

        write_snapshot(a.path(), "/other/a.cpp", "fa");

        {
            let writer = SnapshotWriter::create(b.path()).unwrap();
            writer.set_project_home("/proj").unwrap();
            writer
                .upsert_file(&File {
                    id: FileID::new(1),
                    path: "/proj/b.cpp".to_string(),
                    content: Some("int b() {}".to_string()),
                    sha1: Some("deadbeef".to_string()),
                })
                .unwrap();
            writer
                .insert_symbol(&IndexerSymbol::new(SymbolID::from_raw(1), SymbolKind::Function, "fb"))
                .unwrap();
        }

        let out = NamedTempFile::new().unwrap();
        let writer = SnapshotWriter::create(out.path()).unwrap();
        let mut merger = SnapshotMerger::new(writer);
        merger.merge(&[a.path(), b.path()]).unwrap();

        let (content, sha1): (Option<String>, Option<String>) = merger
            .writer()
            .connection()
            .query_row(
                "SELECT content, sha1 FROM file WHERE path = ?1",
                params!["/other/a.cpp"],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(content, None);
        assert_eq!(sha1, None);

        let home: Option<String> = merger.writer().project_home().unwrap();
        assert_eq!(home.as_deref(), Some("/proj"), "the one input with a home should still win");
    }
}
