//! Top-level orchestrator: turns a compile-command source into a snapshot.
//!
//! Grounded in `examples/original_source/modules/cppscanner/indexer/scanner.{cpp,h}`
//! for the public setter surface and the arbiter-assembly/worker-pool shape.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::aggregator::SnapshotAggregator;
use crate::arbiter::Arbiter;
use crate::error::{AggregationResult, ScanError, ScanResult};
use crate::fileid::ThreadSafeFileIdentificator;
use crate::frontend_treesitter::TreeSitterFrontEnd;
use crate::indexer::Indexer;
use crate::queue::{ResultQueue, ToolInvocation, WorkQueue};
use crate::snapshot::writer::SnapshotWriter;

/// Where to source compile commands from. Mirrors the three entry points
/// `Scanner::scan` supports in the original.
pub enum CompileCommandSource {
    CompileCommandsJson(PathBuf),
    Inputs(Vec<String>),
    CMakeBuildDir(PathBuf),
}

pub struct Scanner {
    home_dir: Option<String>,
    root_dir: Option<String>,
    index_external_files: bool,
    index_local_symbols: bool,
    filters: Vec<String>,
    translation_unit_filters: Vec<String>,
    number_of_parsing_threads: usize,
    extra_compilation_arguments: Vec<String>,
    result_poll_timeout: Duration,
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner {
            home_dir: None,
            root_dir: None,
            index_external_files: false,
            index_local_symbols: true,
            filters: Vec::new(),
            translation_unit_filters: Vec::new(),
            number_of_parsing_threads: 1,
            extra_compilation_arguments: Vec::new(),
            result_poll_timeout: Duration::from_millis(250),
        }
    }
}

impl Scanner {
    pub fn new() -> Self {
        Scanner::default()
    }

    pub fn set_home_dir(&mut self, dir: impl Into<String>) -> &mut Self {
        self.home_dir = Some(dir.into());
        self
    }

    pub fn set_root_dir(&mut self, dir: impl Into<String>) -> &mut Self {
        self.root_dir = Some(dir.into());
        self
    }

    pub fn set_index_external_files(&mut self, value: bool) -> &mut Self {
        self.index_external_files = value;
        self
    }

    pub fn set_index_local_symbols(&mut self, value: bool) -> &mut Self {
        self.index_local_symbols = value;
        self
    }

    pub fn set_filters(&mut self, filters: Vec<String>) -> &mut Self {
        self.filters = filters;
        self
    }

    pub fn set_translation_unit_filters(&mut self, filters: Vec<String>) -> &mut Self {
        self.translation_unit_filters = filters;
        self
    }

    pub fn set_number_of_parsing_threads(&mut self, n: usize) -> &mut Self {
        self.number_of_parsing_threads = n.max(1);
        self
    }

    pub fn set_compilation_arguments(&mut self, args: Vec<String>) -> &mut Self {
        self.extra_compilation_arguments = args;
        self
    }

    fn build_arbiter(&self) -> Arbiter {
        let mut children = vec![Arbiter::index_once()];

        let boundary_dir = if self.index_external_files {
            self.root_dir.clone()
        } else {
            self.home_dir.clone()
        };
        if let Some(dir) = boundary_dir {
            children.push(Arbiter::inside_directory(dir));
        }

        if !self.filters.is_empty() {
            children.push(Arbiter::matches_pattern(self.filters.clone()));
        }

        let composite = Arbiter::composite(children);
        if self.number_of_parsing_threads > 1 {
            composite.thread_safe()
        } else {
            composite
        }
    }

    fn matches_tu_filters(&self, source_file: &str) -> bool {
        if self.translation_unit_filters.is_empty() {
            return true;
        }
        self.translation_unit_filters
            .iter()
            .any(|p| crate::arbiter::glob_match(source_file, p))
    }

    fn collect_invocations(&self, source: CompileCommandSource) -> ScanResult<Vec<ToolInvocation>> {
        match source {
            CompileCommandSource::CompileCommandsJson(path) => {
                crate::compile_commands::read_compile_commands(&path)
            }
            CompileCommandSource::Inputs(inputs) => {
                let files = crate::walker::expand_inputs(&inputs);
                Ok(files
                    .into_iter()
                    .map(|f| ToolInvocation {
                        source_file: f,
                        arguments: vec![],
                        directory: ".".to_string(),
                    })
                    .collect())
            }
            CompileCommandSource::CMakeBuildDir(build_dir) => {
                crate::cmake::read_compile_commands(&build_dir)
            }
        }
    }

    /// Run the full scan and write results into a freshly-created snapshot
    /// at `output_path`.
    pub fn scan(
        &mut self,
        source: CompileCommandSource,
        output_path: &Path,
    ) -> Result<(), crate::error::IndexError> {
        let invocations = self.collect_invocations(source)?;
        let invocations: Vec<ToolInvocation> = invocations
            .into_iter()
            .filter(|inv| self.matches_tu_filters(&inv.source_file))
            .collect();
        info!(count = invocations.len(), "collected translation units");

        let arbiter = Arc::new(self.build_arbiter());
        let files = Arc::new(ThreadSafeFileIdentificator::new());
        let work_queue = Arc::new(WorkQueue::new(invocations));
        let result_queue = Arc::new(ResultQueue::new());
        let extra_args = self.extra_compilation_arguments.clone();

        let mut handles = Vec::new();
        for worker_id in 0..self.number_of_parsing_threads {
            let work_queue = Arc::clone(&work_queue);
            let result_sender = result_queue.writer();
            let arbiter = Arc::clone(&arbiter);
            let files = Arc::clone(&files);
            let extra_args = extra_args.clone();
            let index_local_symbols = self.index_local_symbols;
            handles.push(thread::spawn(move || {
                let mut indexer = Indexer::new(worker_id as u32 + 1, arbiter, Arc::clone(&files));
                indexer.set_index_local_symbols(index_local_symbols);
                // extra_args would be forwarded to a real libclang-backed
                // front end; the reference tree-sitter adapter ignores them.
                let _ = &extra_args;
                while let Some(invocation) = work_queue.next() {
                    let main_file_id = files.get_or_create_shared(&invocation.source_file);
                    let content = match std::fs::read_to_string(&invocation.source_file) {
                        Ok(c) => c,
                        Err(e) => {
                            warn!(file = %invocation.source_file, error = %e, "failed to read source file");
                            continue;
                        }
                    };
                    let mut frontend = TreeSitterFrontEnd::new(main_file_id, content);
                    let tu = indexer.run(&mut frontend);
                    debug!(file = %invocation.source_file, symbols = tu.symbols.len(), "indexed translation unit");
                    if result_sender.send(tu).is_err() {
                        break;
                    }
                }
            }));
        }

        let writer = SnapshotWriter::create(output_path).map_err(crate::error::AggregationError::from)?;
        writer
            .set_info("scanner.indexLocalSymbols", bool_str(self.index_local_symbols))
            .map_err(crate::error::AggregationError::from)?;
        writer
            .set_info("scanner.indexExternalFiles", bool_str(self.index_external_files))
            .map_err(crate::error::AggregationError::from)?;
        if let Some(root) = &self.root_dir {
            writer.set_info("scanner.root", root).map_err(crate::error::AggregationError::from)?;
        }
        let mut aggregator = SnapshotAggregator::new(writer);
        if let Some(home) = &self.home_dir {
            aggregator.set_project_home(home)?;
        }

        loop {
            match result_queue.try_read(self.result_poll_timeout) {
                Some(tu) => {
                    let paths = collect_local_paths(&tu, &files);
                    self.assimilate(&mut aggregator, &tu, &paths)?;
                }
                None => {
                    if handles.iter().all(|h| h.is_finished()) {
                        // Drain anything that raced the finished check.
                        while let Some(tu) = result_queue.try_read(Duration::from_millis(1)) {
                            let paths = collect_local_paths(&tu, &files);
                            self.assimilate(&mut aggregator, &tu, &paths)?;
                        }
                        break;
                    }
                }
            }
        }

        for handle in handles {
            let _ = handle.join();
        }

        Ok(())
    }

    fn assimilate(
        &self,
        aggregator: &mut SnapshotAggregator,
        tu: &crate::tu_index::TranslationUnitIndex,
        paths: &HashMap<crate::types::FileID, String>,
    ) -> AggregationResult<()> {
        aggregator.assimilate(tu, paths)
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn collect_local_paths(
    tu: &crate::tu_index::TranslationUnitIndex,
    files: &ThreadSafeFileIdentificator,
) -> HashMap<crate::types::FileID, String> {
    let mut paths = HashMap::new();
    let mut add = |id: crate::types::FileID| {
        if id.is_valid() && !paths.contains_key(&id) {
            if let Some(path) = files.path(id) {
                paths.insert(id, path);
            }
        }
    };
    add(tu.main_file_id);
    for reference in &tu.references {
        add(reference.file_id);
    }
    for include in &tu.includes {
        add(include.file_id);
        add(include.included_file_id);
    }
    for decl in &tu.declarations {
        add(decl.file_id);
    }
    for file_id in &tu.indexed_files {
        add(*file_id);
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn scan_indexes_a_single_file() {
        let dir = tempdir().unwrap();
        let main_cpp = dir.path().join("main.cpp");
        let mut f = std::fs::File::create(&main_cpp).unwrap();
        writeln!(f, "int add(int a, int b) {{ return a + b; }}").unwrap();

        let output = dir.path().join("snapshot.db");
        let mut scanner = Scanner::new();
        scanner
            .set_home_dir(dir.path().display().to_string())
            .set_root_dir(dir.path().display().to_string());

        scanner
            .scan(
                CompileCommandSource::Inputs(vec![main_cpp.display().to_string()]),
                &output,
            )
            .expect("scan should succeed");

        let reader = crate::snapshot::reader::SnapshotReader::open(&output).unwrap();
        let symbols = reader.symbols().unwrap();
        assert!(symbols.iter().any(|s| s.name == "add"));
    }
}
