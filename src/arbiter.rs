//! Deciding whether a given file should be (re-)indexed.
//!
//! Grounded in `examples/original_source/modules/cppscanner/indexer/fileindexingarbiter.cpp`
//! and `.../base/glob.h` + `.../indexer/glob.cpp`.
//!
//! This is a tagged enum with a single dispatch function rather than a
//! trait-object hierarchy: there is a small, closed set of variants and
//! no plugin point for new ones.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use regex::Regex;

use crate::fileid::ThreadSafeFileIdentificator;
use crate::types::FileID;

/// A glob contains a wildcard/path separator, or contains no `.` at all (a
/// dotless pattern is always treated as a directory-component glob even
/// without wildcards). Mirrors `is_glob_pattern` in `glob.h`.
pub fn is_glob_pattern(s: &str) -> bool {
    s.contains('/') || s.contains('?') || s.contains('*') || !s.contains('.')
}

/// Translate a glob into an anchored regex, mirroring `glob2regex` in
/// `glob.cpp`: `.` is escaped, `?` becomes `.`, `*` becomes `.*`.
pub fn glob_to_regex(glob: &str) -> Regex {
    let mut pattern = String::with_capacity(glob.len() * 2 + 2);
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '.' => pattern.push_str(r"\."),
            '?' => pattern.push('.'),
            '*' => pattern.push_str(".*"),
            '/' => pattern.push_str(r"[\\/]"),
            '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\' => {
                pattern.push('\\');
                pattern.push(c);
            }
            c => pattern.push(c),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).expect("generated glob regex is always valid")
}

/// Suffix match against just the filename component, for non-glob patterns.
/// Mirrors `filename_match()` in `fileindexingarbiter.cpp`.
pub fn filename_match(path: &str, pattern: &str) -> bool {
    if pattern.len() > path.len() {
        return false;
    }
    let tail = &path[path.len() - pattern.len()..];
    tail == pattern
}

pub fn glob_match(path: &str, pattern: &str) -> bool {
    if is_glob_pattern(pattern) {
        glob_to_regex(pattern).is_match(path)
    } else {
        filename_match(path, pattern)
    }
}

pub type IndexerId = u32;

/// Tagged dispatch over every arbiter flavor. Construct with the
/// `Arbiter::index_once()` / `inside_directory()` / ... constructors and
/// combine with [`Arbiter::composite`] / [`Arbiter::thread_safe`].
pub enum Arbiter {
    /// First indexer to claim a file wins; later indexers for the same
    /// file are refused. Mirrors `IndexOnceFileIndexingArbiter`.
    IndexOnce {
        claimed: Mutex<HashMap<FileID, IndexerId>>,
    },
    /// Only files whose normalized path starts with `root` (as a `/`
    /// separated prefix) should be indexed.
    InsideDirectory { root: String },
    /// Only files matching at least one of `patterns` (glob or filename
    /// suffix) should be indexed.
    MatchesPattern { patterns: Vec<String> },
    /// All children must agree. Children must share the same
    /// `FileIdentificator`, matching the assertion in
    /// `CompositeFileIndexingArbiter`.
    Composite { children: Vec<Arbiter> },
    /// Wraps a delegate behind a mutex so it is safe to share across
    /// worker threads.
    ThreadSafe { delegate: Arc<Mutex<Arbiter>> },
}

impl Arbiter {
    pub fn index_once() -> Self {
        Arbiter::IndexOnce {
            claimed: Mutex::new(HashMap::new()),
        }
    }

    pub fn inside_directory(root: impl Into<String>) -> Self {
        Arbiter::InsideDirectory { root: root.into() }
    }

    pub fn matches_pattern(patterns: Vec<String>) -> Self {
        Arbiter::MatchesPattern { patterns }
    }

    pub fn composite(children: Vec<Arbiter>) -> Self {
        Arbiter::Composite { children }
    }

    pub fn thread_safe(self) -> Self {
        Arbiter::ThreadSafe {
            delegate: Arc::new(Mutex::new(self)),
        }
    }

    /// Decide whether `indexer` should index `file_id` (whose normalized
    /// path, when relevant, is `path`). Defaults to `true` for variants
    /// with no opinion, matching the base-class default in the C++
    /// original.
    pub fn should_index(&self, file_id: FileID, path: &str, indexer: Option<IndexerId>) -> bool {
        match self {
            Arbiter::IndexOnce { claimed } => {
                if !file_id.is_valid() {
                    return false;
                }
                let Some(indexer) = indexer else { return true };
                let mut map = claimed.lock();
                match map.get(&file_id) {
                    Some(&owner) => owner == indexer,
                    None => {
                        map.insert(file_id, indexer);
                        true
                    }
                }
            }
            Arbiter::InsideDirectory { root } => {
                let root = root.trim_end_matches('/');
                path == root || path.starts_with(&format!("{root}/"))
            }
            Arbiter::MatchesPattern { patterns } => {
                patterns.iter().any(|p| glob_match(path, p))
            }
            Arbiter::Composite { children } => children
                .iter()
                .all(|c| c.should_index(file_id, path, indexer)),
            Arbiter::ThreadSafe { delegate } => {
                delegate.lock().should_index(file_id, path, indexer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_pattern_detection() {
        assert!(is_glob_pattern("*.cpp"));
        assert!(is_glob_pattern("a/b"));
        assert!(is_glob_pattern("noext")); // dotless => treated as glob
        assert!(!is_glob_pattern("main.cpp"));
    }

    #[test]
    fn glob_matching() {
        assert!(glob_match("src/main.cpp", "*.cpp"));
        assert!(!glob_match("src/main.hpp", "*.cpp"));
        assert!(glob_match("/a/b/main.cpp", "main.cpp"));
    }

    #[test]
    fn index_once_first_wins() {
        let arbiter = Arbiter::index_once();
        let file = FileID::new(1);
        assert!(arbiter.should_index(file, "a.cpp", Some(1)));
        assert!(arbiter.should_index(file, "a.cpp", Some(1)));
        assert!(!arbiter.should_index(file, "a.cpp", Some(2)));
    }

    #[test]
    fn inside_directory_prefix_check() {
        let arbiter = Arbiter::inside_directory("/home/project");
        let file = FileID::new(1);
        assert!(arbiter.should_index(file, "/home/project/a.cpp", None));
        assert!(!arbiter.should_index(file, "/home/other/a.cpp", None));
        assert!(!arbiter.should_index(file, "/home/projectile/a.cpp", None));
    }

    #[test]
    fn composite_is_logical_and() {
        let file = FileID::new(1);
        let composite = Arbiter::composite(vec![
            Arbiter::inside_directory("/home/project"),
            Arbiter::matches_pattern(vec!["*.cpp".to_string()]),
        ]);
        assert!(composite.should_index(file, "/home/project/a.cpp", None));
        assert!(!composite.should_index(file, "/home/project/a.hpp", None));
        assert!(!composite.should_index(file, "/home/other/a.cpp", None));
    }

    #[test]
    fn thread_safe_wrapper_delegates() {
        let arbiter = Arbiter::index_once().thread_safe();
        let file = FileID::new(1);
        assert!(arbiter.should_index(file, "a.cpp", Some(1)));
        assert!(!arbiter.should_index(file, "a.cpp", Some(2)));
    }
}
