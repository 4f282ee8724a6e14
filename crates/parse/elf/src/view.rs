//! Endianness-aware primitive reads over raw image bytes.
//!
//! Every multi-byte read goes through [`ByteView`] so the byte order declared
//! in the ELF ident is applied uniformly. Reads are bounds-checked and return
//! `None` past the end of the buffer; callers map that to the error specific
//! to the structure being decoded.

use crate::ElfError;
use crate::header::Endianness;

/// A bounds-checked view over raw bytes with a fixed byte order.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a> {
    data: &'a [u8],
    endianness: Endianness,
}

impl<'a> ByteView<'a> {
    /// Creates a view over `data`, reading multi-byte values in `endianness`.
    #[must_use]
    pub fn new(data: &'a [u8], endianness: Endianness) -> Self {
        Self { data, endianness }
    }

    /// Length of the underlying buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A sub-view over `offset..offset + len`, keeping the byte order.
    #[must_use]
    pub fn slice(&self, offset: usize, len: usize) -> Option<ByteView<'a>> {
        let end = offset.checked_add(len)?;
        let data = self.data.get(offset..end)?;
        Some(ByteView {
            data,
            endianness: self.endianness,
        })
    }

    /// Reads a `u8` at `offset`.
    #[must_use]
    pub fn u8(&self, offset: usize) -> Option<u8> {
        self.data.get(offset).copied()
    }

    /// Reads a `u16` at `offset`.
    #[must_use]
    pub fn u16(&self, offset: usize) -> Option<u16> {
        let b = self.array::<2>(offset)?;
        Some(match self.endianness {
            Endianness::Little => u16::from_le_bytes(b),
            Endianness::Big => u16::from_be_bytes(b),
        })
    }

    /// Reads a `u32` at `offset`.
    #[must_use]
    pub fn u32(&self, offset: usize) -> Option<u32> {
        let b = self.array::<4>(offset)?;
        Some(match self.endianness {
            Endianness::Little => u32::from_le_bytes(b),
            Endianness::Big => u32::from_be_bytes(b),
        })
    }

    /// Reads a `u64` at `offset`.
    #[must_use]
    pub fn u64(&self, offset: usize) -> Option<u64> {
        let b = self.array::<8>(offset)?;
        Some(match self.endianness {
            Endianness::Little => u64::from_le_bytes(b),
            Endianness::Big => u64::from_be_bytes(b),
        })
    }

    /// Reads an `i32` at `offset`.
    #[must_use]
    pub fn i32(&self, offset: usize) -> Option<i32> {
        let b = self.array::<4>(offset)?;
        Some(match self.endianness {
            Endianness::Little => i32::from_le_bytes(b),
            Endianness::Big => i32::from_be_bytes(b),
        })
    }

    /// Reads an `i64` at `offset`.
    #[must_use]
    pub fn i64(&self, offset: usize) -> Option<i64> {
        let b = self.array::<8>(offset)?;
        Some(match self.endianness {
            Endianness::Little => i64::from_le_bytes(b),
            Endianness::Big => i64::from_be_bytes(b),
        })
    }

    fn array<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        let end = offset.checked_add(N)?;
        self.data.get(offset..end)?.try_into().ok()
    }
}

/// Narrows a 64-bit file quantity for use as a buffer index.
///
/// Offsets and sizes in 64-bit images are declared as `u64`; anything used to
/// index resident bytes must first prove it fits the host `usize`.
pub(crate) fn to_index(value: u64, what: &'static str) -> Result<usize, ElfError> {
    usize::try_from(value).map_err(|_| ElfError::ValueOutOfRange(what))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
