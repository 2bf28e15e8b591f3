//! SQLite-backed snapshot: schema, writer and reader.
//!
//! Grounded in `examples/original_source/modules/cppscanner/indexer/{snapshotwriter,snapshotreader}.cpp`
//! for the wire format, and in `examples/other_examples/534b943d_dwalleck-rivets__crates-tethys-src-db-files.rs.rs`
//! for the `rusqlite` idiom.

pub mod reader;
pub mod schema;
pub mod writer;

pub use reader::SnapshotReader;
pub use writer::SnapshotWriter;
