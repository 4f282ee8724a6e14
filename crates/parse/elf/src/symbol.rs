//! Symbol table codec.
//!
//! Decodes and encodes fixed-size symbol records for both word widths.
//! Binding, type, and visibility are derived from the packed `info` and
//! `other` bytes rather than stored separately.

use crate::header::{Class, Endianness};
use crate::view::ByteView;
use crate::{ElfError, SectionDefect};

/// Reserved section index marking an absolute symbol.
pub const SHN_ABS: u16 = 0xFFF1;

/// Size of an ELF32 symbol record.
const SYMBOL_SIZE_32: usize = 0x10;

/// Size of an ELF64 symbol record.
const SYMBOL_SIZE_64: usize = 0x18;

// ---------------------------------------------------------------------------
// Derived field enums
// ---------------------------------------------------------------------------

/// Linkage scope of a symbol, from the high nybble of `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolBinding {
    /// Not visible outside the object file.
    Local,
    /// Visible to all object files being combined.
    Global,
    /// Global, but overridable by a non-weak definition.
    Weak,
    /// Any value without a named variant.
    Unknown(u8),
}

impl From<u8> for SymbolBinding {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Local,
            1 => Self::Global,
            2 => Self::Weak,
            other => Self::Unknown(other),
        }
    }
}

impl SymbolBinding {
    /// Converts back to the nybble value.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Local => 0,
            Self::Global => 1,
            Self::Weak => 2,
            Self::Unknown(other) => other,
        }
    }
}

impl core::fmt::Display for SymbolBinding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Local => write!(f, "Local"),
            Self::Global => write!(f, "Global"),
            Self::Weak => write!(f, "Weak"),
            Self::Unknown(v) => write!(f, "Unknown ({v})"),
        }
    }
}

/// Kind of entity a symbol describes, from the low nybble of `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    /// No type.
    None,
    /// Data object.
    Object,
    /// Function or other executable code.
    Function,
    /// Section reference.
    Section,
    /// Source file name.
    File,
    /// Uninitialized common block.
    Common,
    /// Thread-local storage entity.
    ThreadLocal,
    /// Relocation expression.
    RelocationExpression,
    /// Signed relocation expression.
    SignedRelocationExpression,
    /// Any value without a named variant.
    Unknown(u8),
}

impl From<u8> for SymbolType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Object,
            2 => Self::Function,
            3 => Self::Section,
            4 => Self::File,
            5 => Self::Common,
            6 => Self::ThreadLocal,
            7 => Self::RelocationExpression,
            8 => Self::SignedRelocationExpression,
            other => Self::Unknown(other),
        }
    }
}

impl SymbolType {
    /// Converts back to the nybble value.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Object => 1,
            Self::Function => 2,
            Self::Section => 3,
            Self::File => 4,
            Self::Common => 5,
            Self::ThreadLocal => 6,
            Self::RelocationExpression => 7,
            Self::SignedRelocationExpression => 8,
            Self::Unknown(other) => other,
        }
    }
}

impl core::fmt::Display for SymbolType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Object => write!(f, "Object"),
            Self::Function => write!(f, "Function"),
            Self::Section => write!(f, "Section"),
            Self::File => write!(f, "File"),
            Self::Common => write!(f, "Common"),
            Self::ThreadLocal => write!(f, "Thread-Local"),
            Self::RelocationExpression => write!(f, "Relocation Expression"),
            Self::SignedRelocationExpression => write!(f, "Signed Relocation Expression"),
            Self::Unknown(v) => write!(f, "Unknown ({v})"),
        }
    }
}

/// Visibility of a symbol, from the low two bits of `other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolVisibility {
    /// Visibility follows the binding.
    Default,
    /// Reserved, processor specific.
    Internal,
    /// Not visible to other components.
    Hidden,
    /// Visible but not preemptable.
    Protected,
}

impl From<u8> for SymbolVisibility {
    fn from(value: u8) -> Self {
        match value & 0x3 {
            0 => Self::Default,
            1 => Self::Internal,
            2 => Self::Hidden,
            _ => Self::Protected,
        }
    }
}

impl core::fmt::Display for SymbolVisibility {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::Internal => write!(f, "Internal"),
            Self::Hidden => write!(f, "Hidden"),
            Self::Protected => write!(f, "Protected"),
        }
    }
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// A decoded symbol table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Name offset into the string table named by the owning section's
    /// `link` field.
    pub name_offset: u32,
    /// Address or section-relative offset, depending on the file type.
    pub value: u64,
    /// Size in bytes, if meaningful for the symbol's type.
    pub size: u64,
    /// Packed binding and type byte.
    pub info: u8,
    /// Packed visibility byte.
    pub other: u8,
    /// Owning section index, or a reserved value such as [`SHN_ABS`].
    pub shndx: u16,
    /// Resolved virtual address, computed after load. `None` when the
    /// symbol's section index resolves to neither a real section nor the
    /// absolute sentinel.
    pub virtual_address: Option<u64>,
}

impl Symbol {
    /// Linkage scope, from the high nybble of `info`.
    #[must_use]
    pub fn binding(&self) -> SymbolBinding {
        SymbolBinding::from(self.info >> 4)
    }

    /// Entity kind, from the low nybble of `info`.
    #[must_use]
    pub fn symbol_type(&self) -> SymbolType {
        SymbolType::from(self.info & 0xF)
    }

    /// Visibility, from the low two bits of `other`.
    #[must_use]
    pub fn visibility(&self) -> SymbolVisibility {
        SymbolVisibility::from(self.other)
    }

    /// Rewrites the binding nybble, keeping the type nybble.
    pub fn set_binding(&mut self, binding: SymbolBinding) {
        self.info = (binding.to_u8() << 4) | (self.info & 0xF);
    }

    /// Rewrites the type nybble, keeping the binding nybble.
    pub fn set_symbol_type(&mut self, symbol_type: SymbolType) {
        self.info = (self.info & 0xF0) | (symbol_type.to_u8() & 0xF);
    }
}

// ---------------------------------------------------------------------------
// Decode / encode
// ---------------------------------------------------------------------------

/// Decodes a symbol table payload into its records.
///
/// The record count is `data.len() / entry_size`; trailing bytes smaller
/// than one entry are ignored.
///
/// # Errors
///
/// Returns [`ElfError::MalformedSection`] when the entry size is zero or an
/// entry is too small for the declared word width.
pub fn decode_symbols(
    data: &[u8],
    class: Class,
    endianness: Endianness,
    entry_size: usize,
    section: usize,
) -> Result<Vec<Symbol>, ElfError> {
    if entry_size == 0 {
        return Err(ElfError::MalformedSection {
            section,
            defect: SectionDefect::ZeroEntrySize,
        });
    }
    let truncated = ElfError::MalformedSection {
        section,
        defect: SectionDefect::TruncatedEntry,
    };

    let view = ByteView::new(data, endianness);
    let count = data.len() / entry_size;
    let mut symbols = Vec::with_capacity(count);
    for i in 0..count {
        let entry = view.slice(i * entry_size, entry_size).ok_or(truncated)?;
        let symbol = match class {
            Class::Elf32 => Symbol {
                name_offset: entry.u32(0).ok_or(truncated)?,
                value: u64::from(entry.u32(4).ok_or(truncated)?),
                size: u64::from(entry.u32(8).ok_or(truncated)?),
                info: entry.u8(12).ok_or(truncated)?,
                other: entry.u8(13).ok_or(truncated)?,
                shndx: entry.u16(14).ok_or(truncated)?,
                virtual_address: None,
            },
            Class::Elf64 => Symbol {
                name_offset: entry.u32(0).ok_or(truncated)?,
                info: entry.u8(4).ok_or(truncated)?,
                other: entry.u8(5).ok_or(truncated)?,
                shndx: entry.u16(6).ok_or(truncated)?,
                value: entry.u64(8).ok_or(truncated)?,
                size: entry.u64(16).ok_or(truncated)?,
                virtual_address: None,
            },
        };
        symbols.push(symbol);
    }
    Ok(symbols)
}

/// Serializes symbol records back to ELF32 big-endian bytes at the declared
/// entry stride. Bytes past the fixed record within each entry stay zero.
///
/// # Errors
///
/// Returns [`ElfError::ValueOutOfRange`] when a value or size does not fit
/// the 32-bit record layout, and [`ElfError::MalformedSection`] when the
/// entry size is zero or smaller than one record.
pub fn pack_symbols(
    symbols: &[Symbol],
    entry_size: usize,
    section: usize,
) -> Result<Vec<u8>, ElfError> {
    if entry_size < SYMBOL_SIZE_32 {
        return Err(ElfError::MalformedSection {
            section,
            defect: if entry_size == 0 {
                SectionDefect::ZeroEntrySize
            } else {
                SectionDefect::TruncatedEntry
            },
        });
    }

    let mut buf = vec![0u8; symbols.len() * entry_size];
    for (i, symbol) in symbols.iter().enumerate() {
        let value = u32::try_from(symbol.value)
            .map_err(|_| ElfError::ValueOutOfRange("symbol value"))?;
        let size =
            u32::try_from(symbol.size).map_err(|_| ElfError::ValueOutOfRange("symbol size"))?;

        let out = &mut buf[i * entry_size..i * entry_size + SYMBOL_SIZE_32];
        out[0..4].copy_from_slice(&symbol.name_offset.to_be_bytes());
        out[4..8].copy_from_slice(&value.to_be_bytes());
        out[8..12].copy_from_slice(&size.to_be_bytes());
        out[12] = symbol.info;
        out[13] = symbol.other;
        out[14..16].copy_from_slice(&symbol.shndx.to_be_bytes());
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
