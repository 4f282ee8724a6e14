//! String table codec.
//!
//! A string table is a NUL-delimited byte region; each run between
//! terminators is recorded at its starting byte offset, empty runs included.
//! Lookups fall back to the closest preceding entry whose span contains the
//! requested offset, matching the compiler habit of pointing a name offset at
//! the suffix of a longer stored string.

use std::collections::BTreeMap;

use crate::ElfError;

/// Sentinel returned when a name offset cannot be resolved.
pub const UNRESOLVED_NAME: &str = "<error>";

/// Sentinel returned when the table is unavailable because the section
/// holding it is still compressed.
pub const COMPRESSED_NAME: &str = "<compressed>";

/// A decoded string table, keyed by byte offset within the section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    entries: BTreeMap<u32, String>,
}

impl StringTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans a NUL-delimited region, recording each run at `base + start`.
    ///
    /// A zero-length run between two terminators is recorded as the empty
    /// string, so offset 0 of a conventional table resolves exactly. Bytes
    /// after the final terminator are not recorded.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "string table offsets are u32 by format"
    )]
    pub fn scan(data: &[u8], base: u32) -> Self {
        let mut entries = BTreeMap::new();
        let mut start = 0usize;
        for (i, &byte) in data.iter().enumerate() {
            if byte == 0 {
                let value = String::from_utf8_lossy(&data[start..i]).into_owned();
                entries.insert(base + start as u32, value);
                start = i + 1;
            }
        }
        Self { entries }
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(offset, string)` pairs in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(&k, v)| (k, v.as_str()))
    }

    /// Inserts or replaces the string recorded at `offset`.
    pub fn insert(&mut self, offset: u32, value: impl Into<String>) {
        self.entries.insert(offset, value.into());
    }

    /// Looks up the string at `index`.
    ///
    /// An exact hit wins. Otherwise the recorded entries are walked downward
    /// from `index`; the highest starting offset whose span strictly contains
    /// `index` yields the suffix from that point. `None` means no entry
    /// covers the offset.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&str> {
        if let Some(value) = self.entries.get(&index) {
            return Some(value);
        }
        for (&start, value) in self.entries.range(..index).rev() {
            if u64::from(start) + value.len() as u64 > u64::from(index) {
                return Some(&value[(index - start) as usize..]);
            }
        }
        None
    }

    /// Serializes the table into a zeroed buffer of `size` bytes, writing
    /// each string and its NUL terminator at the entry's recorded offset.
    ///
    /// `section` is the owning section's index, used in error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::CorruptPack`] when a string does not fit within
    /// `size`, or when its starting byte was already written by a previous
    /// entry that ran over it.
    pub fn pack(&self, size: usize, section: usize) -> Result<Vec<u8>, ElfError> {
        let mut buf = vec![0u8; size];
        for (&offset, value) in &self.entries {
            let start = offset as usize;
            let end = start + value.len() + 1;
            if end > size || buf[start] != 0 {
                return Err(ElfError::CorruptPack { section, offset });
            }
            buf[start..start + value.len()].copy_from_slice(value.as_bytes());
        }
        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
