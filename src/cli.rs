//! Command-line interface: `run` (scan and produce a snapshot) and `merge`
//! (combine snapshots).
//!
//! Grounded in `examples/bartolli-codanna/src/main.rs`'s `clap` derive
//! style (`Cli` + `Commands` enum) and in
//! `examples/original_source/apps/scanner/{run,merge}.cpp` for the flag
//! surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::error::IndexError;
use crate::scanner::{CompileCommandSource, Scanner};

#[derive(Debug, Parser)]
#[command(name = "cppscanner", version, about = "Index C++ codebases into a queryable snapshot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML configuration file; defaults to discovering
    /// `.cppscanner/config.toml` in an ancestor directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a project and write a snapshot.
    Run {
        #[arg(long)]
        home: Option<String>,
        #[arg(long)]
        root: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        compile_commands: Option<PathBuf>,
        #[arg(long)]
        cmake_build_dir: Option<PathBuf>,
        #[arg(long = "filter")]
        filters: Vec<String>,
        #[arg(long = "tu-filter")]
        translation_unit_filters: Vec<String>,
        #[arg(long)]
        index_external_files: bool,
        #[arg(long)]
        index_local_symbols: bool,
        #[arg(long)]
        jobs: Option<usize>,
        /// Literal list of files/directories to scan, when not using
        /// `--compile-commands` or `--cmake-build-dir`.
        inputs: Vec<String>,
        /// Raw arguments forwarded to every compile command, after `--`.
        #[arg(last = true)]
        extra_args: Vec<String>,
    },
    /// Merge several snapshots into one.
    Merge {
        #[arg(long)]
        output: PathBuf,
        inputs: Vec<PathBuf>,
    },
}

pub fn run(cli: Cli) -> Result<(), IndexError> {
    let settings = Settings::load(cli.config.as_deref()).map_err(IndexError::from)?;
    crate::logging::init_with_config(&settings.logging);

    match cli.command {
        Command::Run {
            home,
            root,
            output,
            compile_commands,
            cmake_build_dir,
            filters,
            translation_unit_filters,
            index_external_files,
            index_local_symbols,
            jobs,
            inputs,
            extra_args,
        } => {
            let mut scanner = Scanner::new();
            let home = home.or_else(|| settings.home.as_ref().map(|p| p.display().to_string()));
            let root = root.or_else(|| settings.root.as_ref().map(|p| p.display().to_string()));
            if let Some(home) = home {
                scanner.set_home_dir(home);
            }
            if let Some(root) = root {
                scanner.set_root_dir(root);
            }
            scanner.set_index_external_files(index_external_files || settings.indexing.index_external_files);
            scanner.set_index_local_symbols(index_local_symbols || settings.indexing.index_local_symbols);
            scanner.set_filters(if filters.is_empty() {
                settings.indexing.filters.clone()
            } else {
                filters
            });
            scanner.set_translation_unit_filters(if translation_unit_filters.is_empty() {
                settings.indexing.translation_unit_filters.clone()
            } else {
                translation_unit_filters
            });
            scanner.set_number_of_parsing_threads(jobs.unwrap_or(settings.indexing.parallel_threads));
            scanner.set_compilation_arguments(extra_args);

            let source = if let Some(path) = compile_commands {
                CompileCommandSource::CompileCommandsJson(path)
            } else if let Some(dir) = cmake_build_dir {
                CompileCommandSource::CMakeBuildDir(dir)
            } else {
                CompileCommandSource::Inputs(inputs)
            };

            let output_path = output.unwrap_or_else(|| PathBuf::from(&settings.output));
            scanner.scan(source, &output_path)?;
            Ok(())
        }
        Command::Merge { output, inputs } => {
            let writer =
                crate::snapshot::writer::SnapshotWriter::create(&output).map_err(crate::error::AggregationError::from)?;
            let mut merger = crate::merger::SnapshotMerger::new(writer);
            merger.merge(&inputs)?;
            Ok(())
        }
    }
}
