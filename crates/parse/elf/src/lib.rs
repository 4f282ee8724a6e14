//! ELF object file codec with RPL vendor extensions.
//!
//! Decodes the fixed-layout ELF header and section header table into an
//! in-memory [`Rpl`] object model: typed sections (string tables, symbol
//! tables, relocation tables, RPL CRC and FILEINFO blocks), per-section
//! deflate compression, and byte-exact re-encoding of the 32-bit big-endian
//! configuration with offsets and CRCs recomputed.
//!
//! Decode is tolerant where the format allows it: unknown section types stay
//! opaque and name lookups fall back to sentinel strings rather than failing
//! the file. Structural violations such as a bad magic or a truncated table
//! entry surface as [`ElfError`] values naming the defect.

pub mod header;
pub mod reloc;
pub mod rpl;
pub mod section;
pub mod source;
pub mod strtab;
pub mod symbol;
pub mod view;

mod compress;
mod file;

pub use file::Rpl;
pub use flate2::Compression;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Header field implicated in a [`ElfError::MalformedHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    /// Image smaller than the largest fixed header.
    FileSize,
    /// Ident does not open with `\x7fELF`.
    Magic,
    /// Class byte is neither 32- nor 64-bit.
    Class,
    /// Endianness byte is neither little nor big.
    Endianness,
    /// Ident version is not 1.
    Version,
    /// Declared header size does not match the class.
    HeaderSize,
    /// Program header table lies outside the image.
    ProgramHeaderOffset,
    /// Section header table lies outside the image.
    SectionHeaderOffset,
    /// Program header entry size outside the legal range.
    ProgramHeaderEntrySize,
    /// Section header entry size outside the legal range.
    SectionHeaderEntrySize,
}

impl core::fmt::Display for HeaderField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let what = match self {
            Self::FileSize => "file too small for an ELF header",
            Self::Magic => "bad magic",
            Self::Class => "invalid class",
            Self::Endianness => "invalid endianness",
            Self::Version => "unsupported version",
            Self::HeaderSize => "header size mismatch",
            Self::ProgramHeaderOffset => "program header offset out of bounds",
            Self::SectionHeaderOffset => "section header offset out of bounds",
            Self::ProgramHeaderEntrySize => "bad program header entry size",
            Self::SectionHeaderEntrySize => "bad section header entry size",
        };
        f.write_str(what)
    }
}

/// Structural defect implicated in a [`ElfError::MalformedSection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionDefect {
    /// A table entry extends past the payload.
    TruncatedEntry,
    /// A table section declares an entry size of zero.
    ZeroEntrySize,
    /// FILEINFO payload smaller than its fixed block.
    FileInfoTooSmall,
    /// FILEINFO magic mismatch, carrying the value found.
    BadFileInfoMagic(u16),
    /// Compressed payload too short for its size prefix.
    BadSizePrefix,
    /// Deflate stream failed to inflate or deflate.
    BadDeflate,
}

impl core::fmt::Display for SectionDefect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TruncatedEntry => f.write_str("entry extends past the payload"),
            Self::ZeroEntrySize => f.write_str("entry size is zero"),
            Self::FileInfoTooSmall => f.write_str("fileinfo payload smaller than 0x60 bytes"),
            Self::BadFileInfoMagic(found) => {
                write!(f, "fileinfo magic 0x{found:04X}, expected 0xCAFE")
            }
            Self::BadSizePrefix => f.write_str("compressed payload lacks its size prefix"),
            Self::BadDeflate => f.write_str("deflate stream is corrupt"),
        }
    }
}

/// Configuration a [`ElfError::UnsupportedConfiguration`] refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    /// Encode requested for a class other than ELF32.
    Class(header::Class),
    /// Encode requested for an endianness other than big.
    Endianness(header::Endianness),
    /// Encode requested for a file carrying program headers.
    ProgramHeaders,
}

impl core::fmt::Display for Unsupported {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Class(class) => write!(f, "cannot encode {class} files"),
            Self::Endianness(endianness) => write!(f, "cannot encode {endianness} files"),
            Self::ProgramHeaders => f.write_str("cannot encode files with program headers"),
        }
    }
}

/// Codec-level failure over already-resident bytes.
///
/// Header violations abort the whole decode; section violations name the
/// offending section index. Name-lookup misses are not errors, they resolve
/// to sentinel strings instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElfError {
    /// The fixed header failed validation.
    MalformedHeader(HeaderField),
    /// A section's declared structure does not match its bytes.
    MalformedSection {
        /// Index of the offending section.
        section: usize,
        /// What was wrong with it.
        defect: SectionDefect,
    },
    /// The operation does not support this file's configuration.
    UnsupportedConfiguration(Unsupported),
    /// Re-packing a string table would overwrite an earlier entry.
    CorruptPack {
        /// Index of the offending section.
        section: usize,
        /// Offset of the entry that did not fit.
        offset: u32,
    },
    /// A value does not fit the width a structure requires.
    ValueOutOfRange(&'static str),
}

impl core::fmt::Display for ElfError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MalformedHeader(field) => write!(f, "malformed ELF header: {field}"),
            Self::MalformedSection { section, defect } => {
                write!(f, "malformed section {section}: {defect}")
            }
            Self::UnsupportedConfiguration(what) => write!(f, "unsupported configuration: {what}"),
            Self::CorruptPack { section, offset } => {
                write!(f, "string pack collision in section {section} at offset 0x{offset:X}")
            }
            Self::ValueOutOfRange(what) => write!(f, "{what} does not fit the target width"),
        }
    }
}

impl std::error::Error for ElfError {}

/// Failure while pulling bytes from a source or decoding them.
#[derive(Debug)]
pub enum LoadError {
    /// The byte source failed.
    Io(std::io::Error),
    /// The bytes were read but did not decode.
    Elf(ElfError),
}

impl core::fmt::Display for LoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Elf(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Elf(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ElfError> for LoadError {
    fn from(err: ElfError) -> Self {
        Self::Elf(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_the_offender() {
        let err = ElfError::MalformedSection {
            section: 4,
            defect: SectionDefect::BadFileInfoMagic(0xBEEF),
        };
        assert_eq!(
            err.to_string(),
            "malformed section 4: fileinfo magic 0xBEEF, expected 0xCAFE"
        );

        let err = ElfError::CorruptPack {
            section: 2,
            offset: 0x40,
        };
        assert_eq!(
            err.to_string(),
            "string pack collision in section 2 at offset 0x40"
        );

        let err = ElfError::MalformedHeader(HeaderField::HeaderSize);
        assert_eq!(err.to_string(), "malformed ELF header: header size mismatch");
    }
}
