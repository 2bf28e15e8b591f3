//! File identity: mapping normalized paths to dense [`FileID`]s.
//!
//! Grounded in `examples/original_source/modules/cppscanner/indexer/{basicfileidentificator,fileidentificator}.{cpp,h}`.
//! The thread-safe wrapper uses `parking_lot::Mutex`, matching the
//! `parking_lot`-throughout style used elsewhere in this crate's indexing
//! pipeline, rather than `std::sync`.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::types::FileID;

/// Normalize a path the way the original scanner does: forward slashes
/// everywhere, and (on Windows) a drive letter `C:\x` rewritten to the
/// POSIX-ish `/c/x` form so that identifiers are platform-independent.
/// This is implemented as pure string logic so it is testable without
/// depending on the host OS.
pub fn normalize_path(path: &str) -> String {
    let mut s = path.replace('\\', "/");
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
            let drive = (bytes[0] as char).to_ascii_lowercase();
            s = format!("/{drive}{}", &s[2..]);
        }
    }
    s
}

/// Assigns dense [`FileID`]s to normalized paths, first-come first-served.
/// Mirrors `BasicFileIdentificator`.
#[derive(Debug, Default)]
pub struct BasicFileIdentificator {
    path_to_id: HashMap<String, FileID>,
    id_to_path: Vec<String>,
}

impl BasicFileIdentificator {
    pub fn new() -> Self {
        BasicFileIdentificator {
            path_to_id: HashMap::new(),
            // Index 0 is reserved for FileID::INVALID.
            id_to_path: vec![String::new()],
        }
    }

    /// Get or create the `FileID` for `path`. Idempotent: calling this
    /// repeatedly with the same path always yields the same id (the
    /// bijection invariant).
    pub fn get_or_create(&mut self, path: &str) -> FileID {
        let normalized = normalize_path(path);
        if let Some(&id) = self.path_to_id.get(&normalized) {
            return id;
        }
        let id = FileID::new(self.id_to_path.len() as u32);
        self.id_to_path.push(normalized.clone());
        self.path_to_id.insert(normalized, id);
        id
    }

    pub fn get(&self, path: &str) -> Option<FileID> {
        self.path_to_id.get(&normalize_path(path)).copied()
    }

    pub fn path(&self, id: FileID) -> Option<&str> {
        self.id_to_path.get(id.value() as usize).map(|s| s.as_str())
    }

    pub fn all_files(&self) -> impl Iterator<Item = (FileID, &str)> {
        self.id_to_path
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, p)| (FileID::new(i as u32), p.as_str()))
    }
}

/// Thread-safe wrapper delegating to an inner [`BasicFileIdentificator`]
/// under a `parking_lot::Mutex`.
#[derive(Debug, Default)]
pub struct ThreadSafeFileIdentificator {
    inner: Mutex<BasicFileIdentificator>,
}

impl ThreadSafeFileIdentificator {
    pub fn new() -> Self {
        ThreadSafeFileIdentificator {
            inner: Mutex::new(BasicFileIdentificator::new()),
        }
    }

    pub fn get_or_create(&self, path: &str) -> FileID {
        self.inner.lock().get_or_create(path)
    }

    pub fn get(&self, path: &str) -> Option<FileID> {
        self.inner.lock().get(path)
    }

    pub fn path(&self, id: FileID) -> Option<String> {
        self.inner.lock().path(id).map(ToOwned::to_owned)
    }

    pub fn all_files(&self) -> Vec<(FileID, String)> {
        self.inner
            .lock()
            .all_files()
            .map(|(id, p)| (id, p.to_owned()))
            .collect()
    }
}

/// Either identificator flavor, so the [`crate::scanner::Scanner`] can hold
/// one without generics leaking through its public API.
pub enum FileIdentificator {
    Basic(BasicFileIdentificator),
    ThreadSafe(ThreadSafeFileIdentificator),
}

impl FileIdentificator {
    /// Get or create the id for `path`. Takes `&self` in both variants:
    /// `Basic` is only ever used single-threaded by the scanner's setup
    /// code, which always has a mutable binding available, but callers
    /// that only hold a shared reference (worker threads) must use the
    /// `ThreadSafe` variant.
    pub fn get_or_create(&mut self, path: &str) -> FileID {
        match self {
            FileIdentificator::Basic(b) => b.get_or_create(path),
            FileIdentificator::ThreadSafe(t) => t.get_or_create(path),
        }
    }

    pub fn get_or_create_shared(&self, path: &str) -> FileID {
        match self {
            FileIdentificator::Basic(_) => {
                panic!("Basic FileIdentificator is not safe to share; wrap in ThreadSafe")
            }
            FileIdentificator::ThreadSafe(t) => t.get_or_create(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_converts_backslashes() {
        assert_eq!(normalize_path("a\\b\\c.cpp"), "a/b/c.cpp");
    }

    #[test]
    fn normalize_path_rewrites_drive_letters() {
        assert_eq!(normalize_path("C:\\src\\main.cpp"), "/c/src/main.cpp");
        assert_eq!(normalize_path("D:/src/main.cpp"), "/d/src/main.cpp");
    }

    #[test]
    fn normalize_path_passes_through_posix() {
        assert_eq!(normalize_path("/home/user/a.cpp"), "/home/user/a.cpp");
    }

    #[test]
    fn get_or_create_is_bijective() {
        let mut ident = BasicFileIdentificator::new();
        let id1 = ident.get_or_create("a.cpp");
        let id2 = ident.get_or_create("a.cpp");
        let id3 = ident.get_or_create("b.cpp");
        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(ident.path(id1), Some("a.cpp"));
    }

    #[test]
    fn thread_safe_wrapper_delegates() {
        let ident = ThreadSafeFileIdentificator::new();
        let id1 = ident.get_or_create("a.cpp");
        let id2 = ident.get_or_create("a.cpp");
        assert_eq!(id1, id2);
        assert_eq!(ident.path(id1), Some("a.cpp".to_string()));
    }
}
