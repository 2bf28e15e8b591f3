//! Walks a literal list of files/directories looking for C++ sources.
//!
//! Grounded in `examples/bartolli-codanna/src/indexing/walker.rs`'s
//! `ignore::WalkBuilder` configuration (respect `.gitignore`, don't follow
//! symlinks, no depth limit).

use ignore::WalkBuilder;

const CPP_EXTENSIONS: &[&str] = &["cpp", "cc", "cxx", "c++", "C"];

fn is_cpp_source(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CPP_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Expand `inputs` (a mix of files and directories) into a flat list of
/// C++ source file paths, walking directories with `ignore` so that
/// `.gitignore`d files are skipped by default.
pub fn expand_inputs(inputs: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for input in inputs {
        let path = std::path::Path::new(input);
        if path.is_file() {
            out.push(input.clone());
            continue;
        }
        if !path.is_dir() {
            continue;
        }
        let walker = WalkBuilder::new(path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .max_depth(None)
            .require_git(false)
            .build();
        for entry in walker.flatten() {
            if entry.file_type().is_some_and(|t| t.is_file()) && is_cpp_source(entry.path()) {
                out.push(entry.path().display().to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn expand_inputs_finds_cpp_files_recursively() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.cpp"), "").unwrap();
        fs::write(dir.path().join("sub/b.cc"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = expand_inputs(&[dir.path().display().to_string()]);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn expand_inputs_passes_through_literal_files() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.cpp");
        fs::write(&file, "").unwrap();
        let found = expand_inputs(&[file.display().to_string()]);
        assert_eq!(found, vec![file.display().to_string()]);
    }
}
