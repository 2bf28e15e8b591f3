//! Core identifier and position types shared across the indexing pipeline.
//!
//! `FileID` and `SymbolID` are dense/opaque handles rather than raw strings so
//! that the rest of the pipeline can move them around cheaply and store them
//! as plain integers in SQLite. `FilePosition` is the packed `(line, column)`
//! representation used both in memory and on disk.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Dense identifier for a file known to a [`crate::fileid::FileIdentificator`].
///
/// `0` is reserved for "invalid" and is never issued by the identificator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileID(u32);

impl FileID {
    pub const INVALID: FileID = FileID(0);

    pub fn new(value: u32) -> Self {
        FileID(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for FileID {
    fn default() -> Self {
        FileID::INVALID
    }
}

/// Stable, cross-TU/cross-machine identifier for a symbol.
///
/// Derived by hashing the front-end's Unified Symbol Resolution (USR) string
/// with SHA-1 and taking the low 64 bits. `0` is invalid; two symbols whose
/// USR strings are equal collapse into a single record. Hash collisions
/// (two distinct USRs mapping to the same 64-bit value) are not handled
/// beyond this, matching the source system's documented limitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolID(u64);

impl SymbolID {
    pub const INVALID: SymbolID = SymbolID(0);

    pub fn from_raw(id: u64) -> Self {
        SymbolID(id)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Compute a `SymbolID` by hashing `usr` with SHA-1 and keeping the low
    /// 8 bytes (big-endian) of the digest.
    pub fn from_usr(usr: &str) -> Self {
        use sha1::{Digest, Sha1};

        let digest = Sha1::digest(usr.as_bytes());
        let low8: [u8; 8] = digest[12..20].try_into().expect("sha1 digest is 20 bytes");
        let raw = u64::from_be_bytes(low8);
        // Raw id 0 would collide with the invalid sentinel; this is
        // astronomically unlikely for real USR strings but guarded anyway.
        SymbolID(if raw == 0 { 1 } else { raw })
    }

    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl Default for SymbolID {
    fn default() -> Self {
        SymbolID::INVALID
    }
}

/// Packed `(line, column)` position: 20 bits for the line, 12 for the
/// column. Both saturate at their maxima rather than overflow/wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilePosition {
    bits: u32,
}

impl FilePosition {
    pub const COLUMN_BITS: u32 = 12;
    pub const MAX_LINE: u32 = (1 << (32 - Self::COLUMN_BITS)) - 1;
    pub const MAX_COLUMN: u32 = (1 << Self::COLUMN_BITS) - 1;

    pub fn new(line: u32, column: u32) -> Self {
        let line = line.min(Self::MAX_LINE);
        let column = column.min(Self::MAX_COLUMN);
        FilePosition {
            bits: (line << Self::COLUMN_BITS) | column,
        }
    }

    pub fn from_bits(bits: u32) -> Self {
        FilePosition { bits }
    }

    pub fn bits(self) -> u32 {
        self.bits
    }

    pub fn line(self) -> u32 {
        self.bits >> Self::COLUMN_BITS
    }

    /// Column extraction always masks with `MAX_COLUMN`, independent of how
    /// the packed integer was originally produced (see §9 open questions).
    pub fn column(self) -> u32 {
        self.bits & Self::MAX_COLUMN
    }

    pub fn overflows(self) -> bool {
        self.line() == Self::MAX_LINE || self.column() == Self::MAX_COLUMN
    }
}

impl PartialOrd for FilePosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FilePosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.line(), self.column()).cmp(&(other.line(), other.column()))
    }
}

/// Non-zero variant of [`SymbolID`], used where an API guarantees validity
/// at the type level (e.g. a freshly-inserted symbol record's key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidSymbolID(NonZeroU32, u32);

impl ValidSymbolID {
    pub fn try_from_symbol_id(id: SymbolID) -> Option<Self> {
        if !id.is_valid() {
            return None;
        }
        let raw = id.raw();
        let hi = (raw >> 32) as u32;
        let lo = NonZeroU32::new(raw as u32).or_else(|| NonZeroU32::new(hi))?;
        Some(ValidSymbolID(lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_invalid_is_zero() {
        assert!(!FileID::INVALID.is_valid());
        assert_eq!(FileID::default(), FileID::INVALID);
        assert!(FileID::new(1).is_valid());
    }

    #[test]
    fn symbol_id_from_usr_is_stable() {
        let a = SymbolID::from_usr("c:@F@main#");
        let b = SymbolID::from_usr("c:@F@main#");
        let c = SymbolID::from_usr("c:@F@other#");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_valid());
    }

    #[test]
    fn symbol_id_hex_is_16_chars() {
        let id = SymbolID::from_usr("c:@F@main#");
        assert_eq!(id.to_hex().len(), 16);
    }

    #[test]
    fn file_position_round_trip() {
        let p = FilePosition::new(42, 7);
        assert_eq!(p.line(), 42);
        assert_eq!(p.column(), 7);
        let restored = FilePosition::from_bits(p.bits());
        assert_eq!(restored, p);
    }

    #[test]
    fn file_position_saturates_on_overflow() {
        let p = FilePosition::new(FilePosition::MAX_LINE + 100, FilePosition::MAX_COLUMN + 5);
        assert_eq!(p.line(), FilePosition::MAX_LINE);
        assert_eq!(p.column(), FilePosition::MAX_COLUMN);
        assert!(p.overflows());
    }

    #[test]
    fn file_position_column_independent_of_packing() {
        // A position built directly from bits must still mask to MAX_COLUMN,
        // regardless of how those bits were produced.
        let bits = (10u32 << FilePosition::COLUMN_BITS) | FilePosition::MAX_COLUMN;
        let p = FilePosition::from_bits(bits);
        assert_eq!(p.column(), FilePosition::MAX_COLUMN);
        assert_eq!(p.line(), 10);
    }

    #[test]
    fn file_position_ordering_is_lexicographic() {
        let a = FilePosition::new(1, 5);
        let b = FilePosition::new(1, 10);
        let c = FilePosition::new(2, 0);
        assert!(a < b);
        assert!(b < c);
    }
}
