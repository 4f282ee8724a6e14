//! Section model and section-table codec.
//!
//! Decodes the section header array into typed [`Section`] records, slices
//! out payload bytes, and dispatches each payload to its codec. Payload
//! variants are a closed sum so per-type behavior is matched exhaustively.

use std::borrow::Cow;

use bitflags::bitflags;

use crate::header::{Class, Endianness, FileType, Header};
use crate::reloc::{self, Relocation};
use crate::rpl::{self, RplFileInfo};
use crate::strtab::StringTable;
use crate::symbol::{self, Symbol};
use crate::view::{ByteView, to_index};
use crate::{ElfError, SectionDefect};

/// Size of an ELF32 section header entry.
pub const SECTION_HEADER_SIZE_32: usize = 0x28;

/// Size of an ELF64 section header entry.
pub const SECTION_HEADER_SIZE_64: usize = 0x40;

// ---------------------------------------------------------------------------
// Section type
// ---------------------------------------------------------------------------

/// Section content class, from the `type` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    /// Inactive entry with undefined values.
    Null,
    /// Program-defined code or data.
    ProgBits,
    /// Full symbol table.
    SymTab,
    /// String table.
    StrTab,
    /// Relocations with explicit addends.
    Rela,
    /// Symbol hash table.
    Hash,
    /// Dynamic linking information.
    Dynamic,
    /// Auxiliary notes.
    Note,
    /// Occupies no file space.
    NoBits,
    /// Relocations without addends.
    Rel,
    /// Reserved.
    ShLib,
    /// Minimal dynamic-linking symbol table.
    DynSym,
    /// Constructor array.
    InitArray,
    /// Destructor array.
    FiniArray,
    /// Pre-constructor array.
    PreInitArray,
    /// Section group.
    Group,
    /// Extended symbol table section indices.
    SymTabShndx,
    /// Number of reserved type values.
    Num,
    /// GNU object attributes.
    GnuAttributes,
    /// GNU-style hash table.
    GnuHash,
    /// Pre-link library list.
    GnuLibList,
    /// Version definitions.
    GnuVerDef,
    /// Version needs.
    GnuVerNeed,
    /// Version symbol table.
    GnuVerSym,
    /// RPL exports table.
    RplExports,
    /// RPL imports table.
    RplImports,
    /// RPL per-section CRC hashes.
    RplCrcs,
    /// RPL file metadata.
    RplFileInfo,
    /// Any value without a named variant.
    Unknown(u32),
}

impl From<u32> for SectionType {
    fn from(value: u32) -> Self {
        match value {
            0x0000_0000 => Self::Null,
            0x0000_0001 => Self::ProgBits,
            0x0000_0002 => Self::SymTab,
            0x0000_0003 => Self::StrTab,
            0x0000_0004 => Self::Rela,
            0x0000_0005 => Self::Hash,
            0x0000_0006 => Self::Dynamic,
            0x0000_0007 => Self::Note,
            0x0000_0008 => Self::NoBits,
            0x0000_0009 => Self::Rel,
            0x0000_000A => Self::ShLib,
            0x0000_000B => Self::DynSym,
            0x0000_000E => Self::InitArray,
            0x0000_000F => Self::FiniArray,
            0x0000_0010 => Self::PreInitArray,
            0x0000_0011 => Self::Group,
            0x0000_0012 => Self::SymTabShndx,
            0x0000_0013 => Self::Num,
            0x6FFF_FFF5 => Self::GnuAttributes,
            0x6FFF_FFF6 => Self::GnuHash,
            0x6FFF_FFF7 => Self::GnuLibList,
            0x6FFF_FFFD => Self::GnuVerDef,
            0x6FFF_FFFE => Self::GnuVerNeed,
            0x6FFF_FFFF => Self::GnuVerSym,
            0x8000_0001 => Self::RplExports,
            0x8000_0002 => Self::RplImports,
            0x8000_0003 => Self::RplCrcs,
            0x8000_0004 => Self::RplFileInfo,
            other => Self::Unknown(other),
        }
    }
}

impl SectionType {
    /// Converts back to the header field value.
    #[must_use]
    pub fn to_u32(self) -> u32 {
        match self {
            Self::Null => 0x0000_0000,
            Self::ProgBits => 0x0000_0001,
            Self::SymTab => 0x0000_0002,
            Self::StrTab => 0x0000_0003,
            Self::Rela => 0x0000_0004,
            Self::Hash => 0x0000_0005,
            Self::Dynamic => 0x0000_0006,
            Self::Note => 0x0000_0007,
            Self::NoBits => 0x0000_0008,
            Self::Rel => 0x0000_0009,
            Self::ShLib => 0x0000_000A,
            Self::DynSym => 0x0000_000B,
            Self::InitArray => 0x0000_000E,
            Self::FiniArray => 0x0000_000F,
            Self::PreInitArray => 0x0000_0010,
            Self::Group => 0x0000_0011,
            Self::SymTabShndx => 0x0000_0012,
            Self::Num => 0x0000_0013,
            Self::GnuAttributes => 0x6FFF_FFF5,
            Self::GnuHash => 0x6FFF_FFF6,
            Self::GnuLibList => 0x6FFF_FFF7,
            Self::GnuVerDef => 0x6FFF_FFFD,
            Self::GnuVerNeed => 0x6FFF_FFFE,
            Self::GnuVerSym => 0x6FFF_FFFF,
            Self::RplExports => 0x8000_0001,
            Self::RplImports => 0x8000_0002,
            Self::RplCrcs => 0x8000_0003,
            Self::RplFileInfo => 0x8000_0004,
            Self::Unknown(other) => other,
        }
    }
}

impl core::fmt::Display for SectionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Null => "NULL",
            Self::ProgBits => "PROGBITS",
            Self::SymTab => "SYMTAB",
            Self::StrTab => "STRTAB",
            Self::Rela => "RELA",
            Self::Hash => "HASH",
            Self::Dynamic => "DYNAMIC",
            Self::Note => "NOTE",
            Self::NoBits => "NOBITS",
            Self::Rel => "REL",
            Self::ShLib => "SHLIB",
            Self::DynSym => "DYNSYM",
            Self::InitArray => "INIT_ARRAY",
            Self::FiniArray => "FINI_ARRAY",
            Self::PreInitArray => "PREINIT_ARRAY",
            Self::Group => "GROUP",
            Self::SymTabShndx => "SYMTAB_SHNDX",
            Self::Num => "NUM",
            Self::GnuAttributes => "GNU_ATTRIBUTES",
            Self::GnuHash => "GNU_HASH",
            Self::GnuLibList => "GNU_LIBLIST",
            Self::GnuVerDef => "GNU_VERDEF",
            Self::GnuVerNeed => "GNU_VERNEED",
            Self::GnuVerSym => "GNU_VERSYM",
            Self::RplExports => "RPL_EXPORTS",
            Self::RplImports => "RPL_IMPORTS",
            Self::RplCrcs => "RPL_CRCS",
            Self::RplFileInfo => "RPL_FILEINFO",
            Self::Unknown(other) => return write!(f, "UNKNOWN (0x{other:08X})"),
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Section flags
// ---------------------------------------------------------------------------

bitflags! {
    /// Section attribute bits. Unknown bits are retained verbatim so
    /// re-encoding never drops vendor flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SectionFlags: u64 {
        /// Writable at run time.
        const WRITE = 0x0000_0001;
        /// Occupies memory during execution.
        const ALLOC = 0x0000_0002;
        /// Contains executable instructions.
        const EXECINSTR = 0x0000_0004;
        /// May be merged to eliminate duplicates.
        const MERGE = 0x0000_0010;
        /// Contains NUL-terminated strings.
        const STRINGS = 0x0000_0020;
        /// `info` holds a section index.
        const INFO_LINK = 0x0000_0040;
        /// Link order must be preserved.
        const LINK_ORDER = 0x0000_0080;
        /// Requires OS-specific handling.
        const OS_NONCONFORMING = 0x0000_0100;
        /// Member of a section group.
        const GROUP = 0x0000_0200;
        /// Holds thread-local storage.
        const TLS = 0x0000_0400;
        /// Payload is deflate-compressed behind a size prefix.
        const COMPRESSED = 0x0800_0000;
        /// May hold more than 2 GiB.
        const AMD64_LARGE = 0x1000_0000;
        /// Ordering requirement, legacy.
        const ORDERED = 0x4000_0000;
        /// Excluded from linking unless referenced.
        const EXCLUDE = 0x8000_0000;

        const _ = !0;
    }
}

impl core::fmt::Display for SectionFlags {
    /// Named flags joined with ` | `, unknown bits appended as hex,
    /// `<none>` when empty.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return f.write_str("<none>");
        }
        let mut first = true;
        let mut residue = self.bits();
        for (name, flag) in self.iter_names() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            residue &= !flag.bits();
            first = false;
        }
        if residue != 0 {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "0x{residue:08X}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// Decoded view of one section's payload, keyed by section type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw bytes only. Also the state of compressed sections until an
    /// explicit decompress runs.
    Plain,
    /// String table contents.
    Strings(StringTable),
    /// Symbol table contents.
    Symbols(Vec<Symbol>),
    /// Relocation table contents.
    Relocations(Vec<Relocation>),
    /// One CRC-32 hash per file section.
    Crcs(Vec<u32>),
    /// RPL file metadata block.
    FileInfo(RplFileInfo),
}

/// One section of an object file: the header fields, the raw payload
/// bytes, and the typed payload view when one was decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Name offset into the section-header string table.
    pub name_offset: u32,
    /// Content class.
    pub section_type: SectionType,
    /// Attribute bits.
    pub flags: SectionFlags,
    /// Virtual address at execution, zero if not allocated.
    pub addr: u64,
    /// File offset of the payload. Zero means the section has no bytes in
    /// the file.
    pub offset: u64,
    /// Payload size in bytes. For no-bits sections this is the in-memory
    /// size and exceeds the stored byte count.
    pub size: u64,
    /// Index of an associated section, meaning depends on the type.
    pub link: u32,
    /// Extra type-specific information.
    pub info: u32,
    /// Required address alignment.
    pub addr_align: u64,
    /// Size of one record for table-structured payloads.
    pub entry_size: u64,
    /// Raw payload bytes as stored in the file.
    pub data: Vec<u8>,
    /// Typed payload view.
    pub payload: Payload,
}

impl Section {
    /// Whether the payload is stored deflate-compressed.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.flags.contains(SectionFlags::COMPRESSED)
    }

    /// Uncompressed size from the payload's 4-byte prefix, if the section
    /// is compressed and the prefix is present.
    #[must_use]
    pub fn uncompressed_size(&self) -> Option<u32> {
        if !self.is_compressed() {
            return None;
        }
        let prefix: [u8; 4] = self.data.get(..4)?.try_into().ok()?;
        Some(u32::from_be_bytes(prefix))
    }

    /// Serializes the payload back to bytes. Typed payloads go through
    /// their packer; plain payloads are returned as stored.
    ///
    /// Whether relocations emit an addend follows the section's declared
    /// type, not the in-memory records.
    ///
    /// # Errors
    ///
    /// Propagates packer errors, including [`ElfError::CorruptPack`] for
    /// string tables whose entries no longer fit their recorded offsets.
    pub fn payload_bytes(&self, index: usize) -> Result<Cow<'_, [u8]>, ElfError> {
        match &self.payload {
            Payload::Plain => Ok(Cow::Borrowed(&self.data)),
            Payload::Strings(table) => {
                let size = to_index(self.size, "string section size")?;
                table.pack(size, index).map(Cow::Owned)
            }
            Payload::Symbols(symbols) => {
                let entry_size = to_index(self.entry_size, "symbol entry size")?;
                symbol::pack_symbols(symbols, entry_size, index).map(Cow::Owned)
            }
            Payload::Relocations(relocations) => {
                let entry_size = to_index(self.entry_size, "relocation entry size")?;
                let has_addend = self.section_type == SectionType::Rela;
                reloc::pack_relocations(relocations, entry_size, has_addend, index).map(Cow::Owned)
            }
            Payload::Crcs(crcs) => {
                let entry_size = to_index(self.entry_size, "crc entry size")?;
                rpl::pack_crcs(crcs, entry_size, index).map(Cow::Owned)
            }
            Payload::FileInfo(info) => {
                let size = to_index(self.size, "fileinfo section size")?;
                rpl::pack_file_info(info, size, index).map(Cow::Owned)
            }
        }
    }

    /// Serializes the ELF32 big-endian section header entry, with the file
    /// offset and size taken from the arguments rather than the section.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::ValueOutOfRange`] when a field does not fit the
    /// 32-bit layout.
    pub fn encode_header_entry(
        &self,
        offset: u64,
        size: u64,
        buf: &mut Vec<u8>,
    ) -> Result<(), ElfError> {
        let flags = u32::try_from(self.flags.bits())
            .map_err(|_| ElfError::ValueOutOfRange("section flags"))?;
        let addr =
            u32::try_from(self.addr).map_err(|_| ElfError::ValueOutOfRange("section address"))?;
        let offset =
            u32::try_from(offset).map_err(|_| ElfError::ValueOutOfRange("section offset"))?;
        let size = u32::try_from(size).map_err(|_| ElfError::ValueOutOfRange("section size"))?;
        let addr_align = u32::try_from(self.addr_align)
            .map_err(|_| ElfError::ValueOutOfRange("section alignment"))?;
        let entry_size = u32::try_from(self.entry_size)
            .map_err(|_| ElfError::ValueOutOfRange("section entry size"))?;

        buf.extend_from_slice(&self.name_offset.to_be_bytes()); // 0x00
        buf.extend_from_slice(&self.section_type.to_u32().to_be_bytes()); // 0x04
        buf.extend_from_slice(&flags.to_be_bytes()); // 0x08
        buf.extend_from_slice(&addr.to_be_bytes()); // 0x0C
        buf.extend_from_slice(&offset.to_be_bytes()); // 0x10
        buf.extend_from_slice(&size.to_be_bytes()); // 0x14
        buf.extend_from_slice(&self.link.to_be_bytes()); // 0x18
        buf.extend_from_slice(&self.info.to_be_bytes()); // 0x1C
        buf.extend_from_slice(&addr_align.to_be_bytes()); // 0x20
        buf.extend_from_slice(&entry_size.to_be_bytes()); // 0x24
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Section table decode
// ---------------------------------------------------------------------------

/// Decodes the section header array and payloads described by `header`.
///
/// Payload bytes are sliced with the no-file-content convention: a zero
/// file offset yields an empty payload, and a payload running past the end
/// of `bytes` is clamped. Typed decoding runs in three passes over the
/// table: string tables first, then symbol and relocation tables, then RPL
/// vendor sections when the header declares a 32-bit RPL file. Compressed
/// sections keep their raw bytes; unrecognized types stay plain rather
/// than failing the file.
///
/// # Errors
///
/// Returns [`ElfError::MalformedSection`] when a header entry lies outside
/// `bytes` or a typed payload is structurally invalid.
pub fn decode_sections(bytes: &[u8], header: &Header) -> Result<Vec<Section>, ElfError> {
    let table_offset = to_index(header.section_header_offset, "section header offset")?;
    let entry_size = usize::from(header.section_header_entry_size);
    let count = usize::from(header.section_header_count);
    let record_size = match header.class {
        Class::Elf32 => SECTION_HEADER_SIZE_32,
        Class::Elf64 => SECTION_HEADER_SIZE_64,
    };

    let view = ByteView::new(bytes, header.endianness);
    let mut sections = Vec::with_capacity(count);
    for i in 0..count {
        let truncated = ElfError::MalformedSection {
            section: i,
            defect: SectionDefect::TruncatedEntry,
        };
        let entry = view
            .slice(table_offset.saturating_add(i * entry_size), record_size)
            .ok_or(truncated)?;

        let mut section = match header.class {
            Class::Elf32 => Section {
                name_offset: entry.u32(0x0).ok_or(truncated)?,
                section_type: SectionType::from(entry.u32(0x4).ok_or(truncated)?),
                flags: SectionFlags::from_bits_retain(u64::from(entry.u32(0x8).ok_or(truncated)?)),
                addr: u64::from(entry.u32(0xC).ok_or(truncated)?),
                offset: u64::from(entry.u32(0x10).ok_or(truncated)?),
                size: u64::from(entry.u32(0x14).ok_or(truncated)?),
                link: entry.u32(0x18).ok_or(truncated)?,
                info: entry.u32(0x1C).ok_or(truncated)?,
                addr_align: u64::from(entry.u32(0x20).ok_or(truncated)?),
                entry_size: u64::from(entry.u32(0x24).ok_or(truncated)?),
                data: Vec::new(),
                payload: Payload::Plain,
            },
            Class::Elf64 => Section {
                name_offset: entry.u32(0x0).ok_or(truncated)?,
                section_type: SectionType::from(entry.u32(0x4).ok_or(truncated)?),
                flags: SectionFlags::from_bits_retain(entry.u64(0x8).ok_or(truncated)?),
                addr: entry.u64(0x10).ok_or(truncated)?,
                offset: entry.u64(0x18).ok_or(truncated)?,
                size: entry.u64(0x20).ok_or(truncated)?,
                link: entry.u32(0x28).ok_or(truncated)?,
                info: entry.u32(0x2C).ok_or(truncated)?,
                addr_align: entry.u64(0x30).ok_or(truncated)?,
                entry_size: entry.u64(0x38).ok_or(truncated)?,
                data: Vec::new(),
                payload: Payload::Plain,
            },
        };
        section.data = slice_payload(bytes, section.offset, section.size)?;
        sections.push(section);
    }

    decode_payloads(&mut sections, header)?;
    Ok(sections)
}

/// Copies a section's payload out of the file image, clamping at the end
/// of the image. Offset zero means no file content.
fn slice_payload(bytes: &[u8], offset: u64, size: u64) -> Result<Vec<u8>, ElfError> {
    if offset == 0 {
        return Ok(Vec::new());
    }
    let len = bytes.len() as u64;
    let start = to_index(offset.min(len), "section offset")?;
    let end = to_index(offset.saturating_add(size).min(len), "section size")?;
    Ok(bytes[start..end].to_vec())
}

/// Runs the typed decode pass over freshly sliced sections.
pub(crate) fn decode_payloads(sections: &mut [Section], header: &Header) -> Result<(), ElfError> {
    for (i, section) in sections.iter_mut().enumerate() {
        decode_payload(section, header, i)?;
    }
    Ok(())
}

/// Decodes one section's typed payload in place, keyed by its type.
///
/// Compressed sections are left plain; their typed decode runs after an
/// explicit decompress. RPL vendor payloads decode only for 32-bit RPL
/// files.
pub(crate) fn decode_payload(
    section: &mut Section,
    header: &Header,
    index: usize,
) -> Result<(), ElfError> {
    if section.is_compressed() {
        return Ok(());
    }
    let is_rpl = header.file_type == FileType::Rpl && header.class == Class::Elf32;
    match section.section_type {
        SectionType::StrTab => {
            section.payload = Payload::Strings(StringTable::scan(&section.data, 0));
        }
        SectionType::SymTab | SectionType::DynSym => {
            let entry_size = to_index(section.entry_size, "symbol entry size")?;
            section.payload = Payload::Symbols(symbol::decode_symbols(
                &section.data,
                header.class,
                header.endianness,
                entry_size,
                index,
            )?);
        }
        SectionType::Rel | SectionType::Rela => {
            let entry_size = to_index(section.entry_size, "relocation entry size")?;
            let has_addend = section.section_type == SectionType::Rela;
            section.payload = Payload::Relocations(reloc::decode_relocations(
                &section.data,
                header.class,
                header.endianness,
                entry_size,
                has_addend,
                index,
            )?);
        }
        SectionType::RplCrcs if is_rpl => {
            let entry_size = to_index(section.entry_size, "crc entry size")?;
            section.payload = Payload::Crcs(rpl::decode_crcs(
                &section.data,
                header.endianness,
                entry_size,
                index,
            )?);
        }
        SectionType::RplFileInfo if is_rpl => {
            section.payload =
                Payload::FileInfo(rpl::decode_file_info(&section.data, header.endianness, index)?);
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Abi, Machine};

    /// Header describing an image whose section table starts at 0x34.
    fn make_header(file_type: FileType, count: u16) -> Header {
        Header {
            class: Class::Elf32,
            endianness: Endianness::Big,
            version: 1,
            abi: Abi::CafeOs,
            abi_version: 0,
            file_type,
            machine: Machine::PowerPc,
            machine_version: 1,
            entry: 0,
            program_header_offset: 0,
            program_header_entry_size: 0,
            program_header_count: 0,
            section_header_offset: 0x34,
            section_header_entry_size: 0x28,
            section_header_count: count,
            flags: 0,
            shstr_index: 0,
        }
    }

    /// One big-endian ELF32 section header entry.
    #[expect(clippy::too_many_arguments, reason = "mirrors the on-disk field list")]
    fn make_shdr(
        name: u32,
        section_type: u32,
        flags: u32,
        addr: u32,
        offset: u32,
        size: u32,
        link: u32,
        info: u32,
        entsize: u32,
    ) -> Vec<u8> {
        let mut b = Vec::new();
        for field in [name, section_type, flags, addr, offset, size, link, info, 4, entsize] {
            b.extend_from_slice(&field.to_be_bytes());
        }
        b
    }

    /// Assembles an image: zeroed file header, section table at 0x34, then
    /// payload bytes appended at their claimed offsets.
    fn make_image(entries: &[Vec<u8>], payloads: &[(usize, &[u8])]) -> Vec<u8> {
        let mut image = vec![0u8; 0x34];
        for entry in entries {
            image.extend_from_slice(entry);
        }
        for &(offset, data) in payloads {
            if image.len() < offset + data.len() {
                image.resize(offset + data.len(), 0);
            }
            image[offset..offset + data.len()].copy_from_slice(data);
        }
        image
    }

    #[test]
    fn decode_reads_header_fields_and_payload() {
        let payload = b"\x60\x00\x00\x00"; // one instruction worth of bytes
        let entries = vec![make_shdr(9, 1, 0x6, 0x0200_0000, 0x5C, 4, 0, 0, 0)];
        let header = make_header(FileType::Executable, 1);
        let image = make_image(&entries, &[(0x5C, payload)]);

        let sections = decode_sections(&image, &header).unwrap();
        assert_eq!(sections.len(), 1);
        let section = &sections[0];
        assert_eq!(section.name_offset, 9);
        assert_eq!(section.section_type, SectionType::ProgBits);
        assert_eq!(
            section.flags,
            SectionFlags::ALLOC | SectionFlags::EXECINSTR
        );
        assert_eq!(section.addr, 0x0200_0000);
        assert_eq!(section.offset, 0x5C);
        assert_eq!(section.size, 4);
        assert_eq!(section.addr_align, 4);
        assert_eq!(section.data, payload);
        assert_eq!(section.payload, Payload::Plain);
    }

    #[test]
    fn zero_offset_yields_empty_payload() {
        let entries = vec![make_shdr(0, 8, 0x3, 0x1000_0000, 0, 0x8000, 0, 0, 0)];
        let header = make_header(FileType::Executable, 1);
        let image = make_image(&entries, &[]);

        let sections = decode_sections(&image, &header).unwrap();
        assert!(sections[0].data.is_empty());
        assert_eq!(sections[0].size, 0x8000);
    }

    #[test]
    fn payload_clamped_at_image_end() {
        let entries = vec![make_shdr(0, 1, 0, 0, 0x5C, 0x100, 0, 0, 0)];
        let header = make_header(FileType::Executable, 1);
        let image = make_image(&entries, &[(0x5C, b"tail")]);

        let sections = decode_sections(&image, &header).unwrap();
        assert_eq!(sections[0].data, b"tail");
    }

    #[test]
    fn string_table_section_is_scanned() {
        let strtab = b"\0main\0";
        let entries = vec![make_shdr(0, 3, 0, 0, 0x5C, 6, 0, 0, 0)];
        let header = make_header(FileType::Executable, 1);
        let image = make_image(&entries, &[(0x5C, strtab)]);

        let sections = decode_sections(&image, &header).unwrap();
        let Payload::Strings(table) = &sections[0].payload else {
            panic!("expected a string table payload");
        };
        assert_eq!(table.get(1), Some("main"));
    }

    #[test]
    fn symbol_and_relocation_sections_are_decoded() {
        let mut symtab = Vec::new();
        symtab.extend_from_slice(&5u32.to_be_bytes());
        symtab.extend_from_slice(&0x2000u32.to_be_bytes());
        symtab.extend_from_slice(&8u32.to_be_bytes());
        symtab.push(0x12);
        symtab.push(0);
        symtab.extend_from_slice(&1u16.to_be_bytes());

        let mut rela = Vec::new();
        rela.extend_from_slice(&0x2004u32.to_be_bytes());
        rela.extend_from_slice(&((3u32 << 8) | 26).to_be_bytes());
        rela.extend_from_slice(&(-4i32).to_be_bytes());

        let entries = vec![
            make_shdr(0, 2, 0, 0, 0x84, 0x10, 2, 0, 0x10),
            make_shdr(0, 4, 0, 0, 0x94, 0xC, 0, 0, 0xC),
        ];
        let header = make_header(FileType::Executable, 2);
        let image = make_image(&entries, &[(0x84, &symtab), (0x94, &rela)]);

        let sections = decode_sections(&image, &header).unwrap();
        let Payload::Symbols(symbols) = &sections[0].payload else {
            panic!("expected a symbol payload");
        };
        assert_eq!(symbols[0].value, 0x2000);

        let Payload::Relocations(relocations) = &sections[1].payload else {
            panic!("expected a relocation payload");
        };
        assert_eq!(relocations[0].symbol_index, 3);
        assert_eq!(relocations[0].addend, Some(-4));
    }

    #[test]
    fn rpl_sections_decode_only_for_rpl_files() {
        let crcs: Vec<u8> = [0u32, 0xAAAA_AAAA]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        let entries = vec![
            make_shdr(0, 0x8000_0003, 0, 0, 0x84, 8, 0, 0, 4),
            make_shdr(0, 0x8000_0003, 0, 0, 0x84, 8, 0, 0, 4),
        ];

        let image = make_image(&entries, &[(0x84, &crcs)]);
        let rpl = decode_sections(&image, &make_header(FileType::Rpl, 2)).unwrap();
        assert_eq!(rpl[0].payload, Payload::Crcs(vec![0, 0xAAAA_AAAA]));

        let plain = decode_sections(&image, &make_header(FileType::Executable, 2)).unwrap();
        assert_eq!(plain[0].payload, Payload::Plain);
    }

    #[test]
    fn compressed_section_keeps_raw_bytes() {
        let compressed = b"\x00\x00\x01\x00not-actually-deflate";
        let entries = vec![make_shdr(0, 3, 0x0800_0000, 0, 0x5C, 24, 0, 0, 0)];
        let header = make_header(FileType::Executable, 1);
        let image = make_image(&entries, &[(0x5C, compressed)]);

        let sections = decode_sections(&image, &header).unwrap();
        assert_eq!(sections[0].payload, Payload::Plain);
        assert_eq!(sections[0].data, compressed);
        assert_eq!(sections[0].uncompressed_size(), Some(0x100));
    }

    #[test]
    fn unknown_type_is_kept_opaque() {
        let entries = vec![make_shdr(0, 0x6000_0099, 0, 0, 0x5C, 3, 0, 0, 0)];
        let header = make_header(FileType::Executable, 1);
        let image = make_image(&entries, &[(0x5C, b"???")]);

        let sections = decode_sections(&image, &header).unwrap();
        assert_eq!(sections[0].section_type, SectionType::Unknown(0x6000_0099));
        assert_eq!(sections[0].payload, Payload::Plain);
        assert_eq!(sections[0].data, b"???");
    }

    #[test]
    fn truncated_table_entry_fails_decode() {
        let entries = vec![make_shdr(0, 1, 0, 0, 0, 0, 0, 0, 0)];
        let header = make_header(FileType::Executable, 2);
        let image = make_image(&entries, &[]);

        assert_eq!(
            decode_sections(&image, &header),
            Err(ElfError::MalformedSection {
                section: 1,
                defect: SectionDefect::TruncatedEntry
            })
        );
    }

    #[test]
    fn header_entry_round_trips() {
        let entries = vec![make_shdr(7, 1, 0x2B, 0x0200_0000, 0x100, 0x40, 3, 9, 0x10)];
        let header = make_header(FileType::Executable, 1);
        let image = make_image(&entries, &[(0x100, &[0u8; 0x40])]);

        let sections = decode_sections(&image, &header).unwrap();
        let mut encoded = Vec::new();
        sections[0]
            .encode_header_entry(sections[0].offset, sections[0].size, &mut encoded)
            .unwrap();
        assert_eq!(encoded, entries[0]);
    }

    #[test]
    fn rela_payload_emits_addend_but_rel_does_not() {
        let relocation = Relocation {
            address: 0x10,
            symbol_index: 1,
            rel_type: 2,
            addend: Some(8),
        };
        let mut section = Section {
            name_offset: 0,
            section_type: SectionType::Rela,
            flags: SectionFlags::empty(),
            addr: 0,
            offset: 0x100,
            size: 0xC,
            link: 0,
            info: 0,
            addr_align: 4,
            entry_size: 0xC,
            data: Vec::new(),
            payload: Payload::Relocations(vec![relocation]),
        };
        assert_eq!(section.payload_bytes(0).unwrap().len(), 0xC);

        section.section_type = SectionType::Rel;
        section.entry_size = 0x8;
        assert_eq!(section.payload_bytes(0).unwrap().len(), 0x8);
    }

    #[test]
    fn flags_format_as_a_pipe_list() {
        assert_eq!(SectionFlags::empty().to_string(), "<none>");
        let flags = SectionFlags::ALLOC | SectionFlags::EXECINSTR;
        assert_eq!(flags.to_string(), "ALLOC | EXECINSTR");
        let with_unknown = SectionFlags::from_bits_retain(0x2 | 0x0000_1000);
        assert_eq!(with_unknown.to_string(), "ALLOC | 0x00001000");
    }
}
