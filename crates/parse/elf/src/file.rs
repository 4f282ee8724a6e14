//! The decoded object file and the operations that act on it whole.
//!
//! [`Rpl`] owns the fixed header and a flat section array. Every cross
//! reference between sections (string table links, the section name table,
//! symbol section indexes) is an integer index into that array, validated
//! at lookup time. Decoding fills the array; [`Rpl::encode`] lays the file
//! back out from scratch with freshly computed offsets and CRCs.

use std::borrow::Cow;
use std::path::Path;

use flate2::Compression;

use crate::compress;
use crate::header::{self, Class, Endianness, FileType, HEADER_SIZE_32, Header};
use crate::rpl;
use crate::section::{
    self, Payload, SECTION_HEADER_SIZE_32, Section, SectionFlags, SectionType,
};
use crate::source::{ByteSource, FileSource};
use crate::strtab::{COMPRESSED_NAME, UNRESOLVED_NAME};
use crate::symbol::{SHN_ABS, Symbol};
use crate::view::to_index;
use crate::{ElfError, HeaderField, LoadError, Unsupported};

/// A decoded ELF or RPL object file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rpl {
    /// Fixed file header.
    pub header: Header,
    /// Sections in table order; cross references index into this array.
    pub sections: Vec<Section>,
}

// ---------------------------------------------------------------------------
// Decode entry points
// ---------------------------------------------------------------------------

impl Rpl {
    /// Decodes a whole in-memory image.
    ///
    /// Runs header validation, the section table decode, typed payload
    /// decoding, and virtual address resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::MalformedHeader`] when the fixed header fails
    /// validation and [`ElfError::MalformedSection`] when a section entry
    /// or typed payload is structurally invalid.
    pub fn parse(bytes: &[u8]) -> Result<Self, ElfError> {
        let header = header::decode_header(bytes)?;
        let sections = section::decode_sections(bytes, &header)?;
        let mut file = Self { header, sections };
        file.resolve_virtual_addresses();
        Ok(file)
    }

    /// Reads the whole image out of `source` once and decodes it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the source fails and
    /// [`LoadError::Elf`] when the bytes do not decode.
    pub fn load(source: &mut dyn ByteSource) -> Result<Self, LoadError> {
        let size = source.size()?;
        let len = to_index(size, "file size")?;
        let bytes = source.read_at(len, 0)?;
        Ok(Self::parse(&bytes)?)
    }

    /// Opens and decodes the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the file cannot be read and
    /// [`LoadError::Elf`] when its bytes do not decode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let mut source = FileSource::open(path)?;
        Self::load(&mut source)
    }

    /// Recomputes every symbol's virtual address from the file type.
    ///
    /// Relocatable files add the holding section's address to the symbol
    /// value; `SHN_ABS` symbols keep the value as is. Executable, shared,
    /// and RPL files use the value directly. Anything else leaves the
    /// address unset. Runs automatically after [`Rpl::parse`] and
    /// [`Rpl::decompress`].
    pub fn resolve_virtual_addresses(&mut self) {
        let addrs: Vec<u64> = self.sections.iter().map(|section| section.addr).collect();
        let file_type = self.header.file_type;
        for section in &mut self.sections {
            let Payload::Symbols(symbols) = &mut section.payload else {
                continue;
            };
            for symbol in symbols {
                symbol.virtual_address = match file_type {
                    FileType::Relocatable => {
                        let target = usize::from(symbol.shndx);
                        if target < addrs.len() {
                            addrs[target].checked_add(symbol.value)
                        } else if symbol.shndx == SHN_ABS {
                            Some(symbol.value)
                        } else {
                            None
                        }
                    }
                    FileType::Executable | FileType::Shared | FileType::Rpl => Some(symbol.value),
                    FileType::None | FileType::Core | FileType::Unknown(_) => None,
                };
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

impl Rpl {
    /// Serializes the file as ELF32 big-endian bytes.
    ///
    /// Typed payloads are re-serialized from their decoded form, CRC
    /// sections are refilled from the packed payloads with the CRC
    /// section's own entry zeroed, and every nonzero file offset is
    /// recomputed in index order. The receiver is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::UnsupportedConfiguration`] for 64-bit or
    /// little-endian files and for files with program headers,
    /// [`ElfError::CorruptPack`] when a string table cannot be laid out,
    /// and [`ElfError::ValueOutOfRange`] when a value does not fit the
    /// 32-bit layout.
    pub fn encode(&self) -> Result<Vec<u8>, ElfError> {
        if self.header.class != Class::Elf32 {
            return Err(ElfError::UnsupportedConfiguration(Unsupported::Class(
                self.header.class,
            )));
        }
        if self.header.endianness != Endianness::Big {
            return Err(ElfError::UnsupportedConfiguration(Unsupported::Endianness(
                self.header.endianness,
            )));
        }
        if self.header.program_header_count != 0 {
            return Err(ElfError::UnsupportedConfiguration(
                Unsupported::ProgramHeaders,
            ));
        }

        let count = u16::try_from(self.sections.len())
            .map_err(|_| ElfError::ValueOutOfRange("section count"))?;
        let mut emitted = self.header.clone();
        emitted.section_header_count = count;

        let entry_size = usize::from(emitted.section_header_entry_size);
        if count != 0 {
            if entry_size < SECTION_HEADER_SIZE_32 {
                return Err(ElfError::MalformedHeader(HeaderField::SectionHeaderEntrySize));
            }
            if emitted.section_header_offset < emitted.size() as u64 {
                return Err(ElfError::MalformedHeader(HeaderField::SectionHeaderOffset));
            }
        }

        // Payload bytes and emitted sizes. Plain sections keep their
        // declared size so no-file-content sections stay empty on disk.
        let mut blobs: Vec<Cow<'_, [u8]>> = Vec::with_capacity(self.sections.len());
        for (i, section) in self.sections.iter().enumerate() {
            blobs.push(section.payload_bytes(i)?);
        }
        let mut sizes: Vec<u64> = Vec::with_capacity(self.sections.len());
        for (i, section) in self.sections.iter().enumerate() {
            let size = match section.payload {
                Payload::Plain => section.size,
                _ => blobs[i].len() as u64,
            };
            sizes.push(size);
        }

        // CRC sections carry one entry per section, hashed over the bytes
        // about to be written, with the self entry zeroed.
        for i in 0..self.sections.len() {
            if self.sections[i].section_type != SectionType::RplCrcs {
                continue;
            }
            let entry = to_index(self.sections[i].entry_size, "crc entry size")?;
            let crcs: Vec<u32> = blobs
                .iter()
                .enumerate()
                .map(|(j, blob)| if j == i { 0 } else { crc32fast::hash(blob) })
                .collect();
            blobs[i] = Cow::Owned(rpl::pack_crcs(&crcs, entry, i)?);
            sizes[i] = blobs[i].len() as u64;
        }

        let offsets = compress::layout_offsets(
            &emitted,
            self.sections
                .iter()
                .zip(&sizes)
                .map(|(section, &size)| (section.offset, size, section.addr_align)),
        )?;

        let overflow = ElfError::ValueOutOfRange("section layout");
        let table_offset = to_index(emitted.section_header_offset, "section header offset")?;
        let table_end = if count == 0 {
            0
        } else {
            table_offset
                .checked_add(self.sections.len() * entry_size)
                .ok_or(overflow)?
        };

        let mut total = table_end.max(HEADER_SIZE_32);
        let mut writes: Vec<Option<(usize, usize)>> = Vec::with_capacity(self.sections.len());
        for (i, blob) in blobs.iter().enumerate() {
            if offsets[i] == 0 {
                writes.push(None);
                continue;
            }
            let start = to_index(offsets[i], "section offset")?;
            let len = blob.len().min(to_index(sizes[i], "section size")?);
            let end = start.checked_add(len).ok_or(overflow)?;
            total = total.max(end);
            writes.push(Some((start, len)));
        }

        let mut out = vec![0u8; total];
        let head = header::encode_header(&emitted)?;
        out[..head.len()].copy_from_slice(&head);

        let mut table = Vec::with_capacity(self.sections.len() * entry_size);
        for (i, section) in self.sections.iter().enumerate() {
            section.encode_header_entry(offsets[i], sizes[i], &mut table)?;
            table.resize((i + 1) * entry_size, 0);
        }
        if !table.is_empty() {
            out[table_offset..table_offset + table.len()].copy_from_slice(&table);
        }

        for (i, write) in writes.iter().enumerate() {
            if let Some((start, len)) = *write {
                out[start..start + len].copy_from_slice(&blobs[i][..len]);
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Compression
// ---------------------------------------------------------------------------

impl Rpl {
    /// Inflates every compressed section in place.
    ///
    /// Each inflated section loses its compressed flag, takes the inflated
    /// bytes as data and size, and runs the typed payload decode that was
    /// skipped while it was compressed. When anything changed, file
    /// offsets are reassigned and virtual addresses re-resolved. Returns
    /// `true` when at least one section was inflated.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::MalformedSection`] when a compressed payload
    /// lacks its size prefix or its stream is corrupt.
    pub fn decompress(&mut self) -> Result<bool, ElfError> {
        let mut changed = false;
        for i in 0..self.sections.len() {
            if !self.sections[i].is_compressed() {
                continue;
            }
            let inflated = compress::inflate(&self.sections[i].data, i)?;
            let section = &mut self.sections[i];
            section.flags.remove(SectionFlags::COMPRESSED);
            section.size = inflated.len() as u64;
            section.data = inflated;
            section::decode_payload(section, &self.header, i)?;
            changed = true;
        }
        if changed {
            compress::reassign_offsets(&self.header, &mut self.sections)?;
            self.resolve_virtual_addresses();
        }
        Ok(changed)
    }

    /// Deflates every section that gets smaller for it.
    ///
    /// Sections with no file content, sections already compressed, and
    /// the CRC, FILEINFO, and no-bits kinds are left alone. A section
    /// whose framed deflate stream would not shrink it keeps its raw
    /// bytes. Compressed sections drop to a plain payload until the next
    /// [`Rpl::decompress`]. Returns `true` when at least one section was
    /// deflated.
    ///
    /// # Errors
    ///
    /// Returns [`ElfError::MalformedSection`] when a deflate stream fails
    /// and [`ElfError::ValueOutOfRange`] when a section is too large to
    /// frame.
    pub fn compress(&mut self, level: Compression) -> Result<bool, ElfError> {
        let mut changed = false;
        for i in 0..self.sections.len() {
            let section = &self.sections[i];
            let skip = section.offset == 0
                || section.is_compressed()
                || matches!(
                    section.section_type,
                    SectionType::NoBits | SectionType::RplCrcs | SectionType::RplFileInfo
                );
            if skip {
                continue;
            }
            let current = section.payload_bytes(i)?.into_owned();
            let framed = compress::deflate_with_prefix(&current, level, i)?;
            if framed.len() >= current.len() {
                continue;
            }
            let section = &mut self.sections[i];
            section.flags.insert(SectionFlags::COMPRESSED);
            section.size = framed.len() as u64;
            section.data = framed;
            section.payload = Payload::Plain;
            changed = true;
        }
        if changed {
            compress::reassign_offsets(&self.header, &mut self.sections)?;
        }
        Ok(changed)
    }
}

// ---------------------------------------------------------------------------
// Name resolution
// ---------------------------------------------------------------------------

impl Rpl {
    /// Resolves a section's name through the section name table.
    ///
    /// Falls back to `<error>` when the header names no string table or
    /// the offset resolves to nothing, and `<compressed>` when the name
    /// table is still compressed.
    #[must_use]
    pub fn section_name(&self, index: usize) -> &str {
        let Some(section) = self.sections.get(index) else {
            return UNRESOLVED_NAME;
        };
        let table = usize::from(self.header.shstr_index);
        if table == 0 {
            return UNRESOLVED_NAME;
        }
        self.lookup_name(table, section.name_offset)
    }

    /// Resolves a symbol's name through its section's linked string table.
    ///
    /// `table_section` is the index of the symbol table section holding
    /// the symbol. Sentinel fallbacks match [`Rpl::section_name`].
    #[must_use]
    pub fn symbol_name(&self, table_section: usize, symbol: &Symbol) -> &str {
        let Some(owner) = self.sections.get(table_section) else {
            return UNRESOLVED_NAME;
        };
        let Ok(table) = usize::try_from(owner.link) else {
            return UNRESOLVED_NAME;
        };
        self.lookup_name(table, symbol.name_offset)
    }

    fn lookup_name(&self, table: usize, offset: u32) -> &str {
        let Some(section) = self.sections.get(table) else {
            return UNRESOLVED_NAME;
        };
        match &section.payload {
            Payload::Strings(strings) => match strings.get(offset) {
                Some(name) => name,
                None if strings.is_empty() => COMPRESSED_NAME,
                None => UNRESOLVED_NAME,
            },
            _ if section.is_compressed() => COMPRESSED_NAME,
            _ => UNRESOLVED_NAME,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Rpl {
    /// All symbols across all symbol table sections, with the owning
    /// section index and the entry index inside it.
    pub fn symbols(&self) -> impl Iterator<Item = (usize, usize, &Symbol)> {
        self.sections
            .iter()
            .enumerate()
            .filter_map(|(section_index, section)| match &section.payload {
                Payload::Symbols(symbols) => Some((section_index, symbols)),
                _ => None,
            })
            .flat_map(|(section_index, symbols)| {
                symbols
                    .iter()
                    .enumerate()
                    .map(move |(entry, symbol)| (section_index, entry, symbol))
            })
    }

    /// Symbols whose virtual address falls inside the section's address
    /// range. Unknown indexes yield an empty list.
    #[must_use]
    pub fn symbols_in_section(&self, index: usize) -> Vec<&Symbol> {
        let Some(section) = self.sections.get(index) else {
            return Vec::new();
        };
        let start = section.addr;
        let end = start.saturating_add(section.size);
        self.symbols()
            .filter_map(|(_, _, symbol)| symbol.virtual_address.map(|va| (va, symbol)))
            .filter(|&(va, _)| va >= start && va < end)
            .map(|(_, symbol)| symbol)
            .collect()
    }

    /// Sections whose address range contains the symbol's virtual
    /// address. The upper bound is inclusive, so a symbol sitting exactly
    /// at `addr + size` still counts as inside.
    #[must_use]
    pub fn sections_for_symbol(&self, symbol: &Symbol) -> Vec<(usize, &Section)> {
        let Some(va) = symbol.virtual_address else {
            return Vec::new();
        };
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, section)| {
                va >= section.addr && va <= section.addr.saturating_add(section.size)
            })
            .collect()
    }

    /// First section containing the symbol's virtual address, if any.
    #[must_use]
    pub fn section_for_symbol(&self, symbol: &Symbol) -> Option<(usize, &Section)> {
        self.sections_for_symbol(symbol).into_iter().next()
    }

    /// Symbols covering `address`. Zero-sized symbols match only their
    /// exact address; sized symbols use a half-open range.
    #[must_use]
    pub fn symbols_at_address(&self, address: u64) -> Vec<&Symbol> {
        self.symbols()
            .filter_map(|(_, _, symbol)| symbol.virtual_address.map(|va| (va, symbol)))
            .filter(|&(va, symbol)| {
                if symbol.size == 0 {
                    va == address
                } else {
                    address >= va && address < va.saturating_add(symbol.size)
                }
            })
            .map(|(_, symbol)| symbol)
            .collect()
    }

    /// Sections whose half-open address range covers `address`.
    #[must_use]
    pub fn sections_at_address(&self, address: u64) -> Vec<(usize, &Section)> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, section)| {
                address >= section.addr && address < section.addr.saturating_add(section.size)
            })
            .collect()
    }

    /// First symbol whose resolved name matches, ignoring ASCII case.
    #[must_use]
    pub fn symbol_by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols()
            .find(|&(section_index, _, symbol)| {
                self.symbol_name(section_index, symbol)
                    .eq_ignore_ascii_case(name)
            })
            .map(|(_, _, symbol)| symbol)
    }

    /// Every symbol whose resolved name matches, ignoring ASCII case.
    #[must_use]
    pub fn symbols_by_name(&self, name: &str) -> Vec<&Symbol> {
        self.symbols()
            .filter(|&(section_index, _, symbol)| {
                self.symbol_name(section_index, symbol)
                    .eq_ignore_ascii_case(name)
            })
            .map(|(_, _, symbol)| symbol)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Abi, Machine};
    use crate::rpl::RplFileInfo;
    use crate::source::SliceSource;
    use crate::strtab::StringTable;

    fn make_header(section_count: u16) -> Header {
        Header {
            class: Class::Elf32,
            endianness: Endianness::Big,
            version: 1,
            abi: Abi::CafeOs,
            abi_version: 0,
            file_type: FileType::Rpl,
            machine: Machine::PowerPc,
            machine_version: 1,
            entry: 0x0200_0000,
            program_header_offset: 0,
            program_header_entry_size: 0,
            program_header_count: 0,
            section_header_offset: 0x34,
            section_header_entry_size: 0x28,
            section_header_count: section_count,
            flags: 0,
            shstr_index: 4,
        }
    }

    #[expect(clippy::too_many_arguments, reason = "plain fixture builder")]
    fn make_section(
        name_offset: u32,
        section_type: SectionType,
        flags: u64,
        addr: u64,
        offset: u64,
        size: u64,
        link: u32,
        addr_align: u64,
        entry_size: u64,
        data: Vec<u8>,
        payload: Payload,
    ) -> Section {
        Section {
            name_offset,
            section_type,
            flags: SectionFlags::from_bits_retain(flags),
            addr,
            offset,
            size,
            link,
            info: 0,
            addr_align,
            entry_size,
            data,
            payload,
        }
    }

    fn text_bytes() -> Vec<u8> {
        let mut data = Vec::new();
        for _ in 0..32 {
            data.extend_from_slice(&[0x60, 0x00, 0x00, 0x00, 0x4E, 0x80, 0x00, 0x20]);
        }
        data
    }

    fn sample_symbols() -> Vec<Symbol> {
        vec![
            Symbol {
                name_offset: 1,
                value: 0x0200_0000,
                size: 4,
                info: 0x12,
                other: 0,
                shndx: 1,
                virtual_address: None,
            },
            Symbol {
                name_offset: 6,
                value: 0x0200_0004,
                size: 4,
                info: 0x11,
                other: 0,
                shndx: 1,
                virtual_address: None,
            },
        ]
    }

    /// A complete synthetic RPL: null, .text, .symtab, .strtab,
    /// .shstrtab, .rplcrcs, .rplfileinfo.
    fn sample() -> Rpl {
        let text = text_bytes();
        let strtab = b"\0main\0helper\0".to_vec();
        let shstrtab = b"\0.text\0.symtab\0.strtab\0.shstrtab\0.rplcrcs\0.rplfileinfo\0".to_vec();
        let info = RplFileInfo {
            version: 2,
            text_size: 0x100,
            text_align: 0x20,
            compression_level: -1,
            ..RplFileInfo::default()
        };

        let sections = vec![
            make_section(0, SectionType::Null, 0, 0, 0, 0, 0, 0, 0, Vec::new(), Payload::Plain),
            make_section(
                1,
                SectionType::ProgBits,
                0x6,
                0x0200_0000,
                0x100,
                text.len() as u64,
                0,
                4,
                0,
                text.clone(),
                Payload::Plain,
            ),
            make_section(
                7,
                SectionType::SymTab,
                0,
                0,
                0x200,
                0x20,
                3,
                4,
                0x10,
                Vec::new(),
                Payload::Symbols(sample_symbols()),
            ),
            make_section(
                15,
                SectionType::StrTab,
                0,
                0,
                0x300,
                strtab.len() as u64,
                0,
                1,
                0,
                strtab.clone(),
                Payload::Strings(StringTable::scan(&strtab, 0)),
            ),
            make_section(
                23,
                SectionType::StrTab,
                0,
                0,
                0x400,
                shstrtab.len() as u64,
                0,
                1,
                0,
                shstrtab.clone(),
                Payload::Strings(StringTable::scan(&shstrtab, 0)),
            ),
            make_section(
                33,
                SectionType::RplCrcs,
                0,
                0,
                0x500,
                7 * 4,
                0,
                4,
                4,
                Vec::new(),
                Payload::Crcs(vec![0; 7]),
            ),
            make_section(
                42,
                SectionType::RplFileInfo,
                0,
                0,
                0x600,
                0x60,
                0,
                4,
                0,
                Vec::new(),
                Payload::FileInfo(info),
            ),
        ];
        Rpl {
            header: make_header(7),
            sections,
        }
    }

    fn queried() -> Rpl {
        let mut file = sample();
        file.resolve_virtual_addresses();
        file
    }

    #[test]
    fn encode_then_parse_preserves_the_model() {
        let file = queried();
        let bytes = file.encode().unwrap();
        let parsed = Rpl::parse(&bytes).unwrap();

        assert_eq!(parsed.header, file.header);
        assert_eq!(parsed.sections.len(), 7);
        assert_eq!(parsed.section_name(1), ".text");
        assert_eq!(parsed.section_name(5), ".rplcrcs");
        assert_eq!(parsed.section_name(6), ".rplfileinfo");
        assert_eq!(parsed.sections[1].data, file.sections[1].data);
        assert_eq!(parsed.sections[2].payload, file.sections[2].payload);
        assert_eq!(parsed.sections[3].payload, file.sections[3].payload);
        assert_eq!(parsed.sections[6].payload, file.sections[6].payload);

        let Payload::Crcs(crcs) = &parsed.sections[5].payload else {
            panic!("crc payload did not decode");
        };
        assert_eq!(crcs.len(), 7);
        assert_eq!(crcs[0], 0);
        assert_eq!(crcs[1], crc32fast::hash(&file.sections[1].data));
        assert_eq!(crcs[5], 0);
    }

    #[test]
    fn encode_is_stable_across_a_round_trip() {
        let file = queried();
        let first = file.encode().unwrap();
        let second = Rpl::parse(&first).unwrap().encode().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn load_reads_through_a_source() {
        let bytes = queried().encode().unwrap();
        let mut source = SliceSource::new(&bytes);
        let file = Rpl::load(&mut source).unwrap();
        assert_eq!(file.sections.len(), 7);
        assert_eq!(file.section_name(2), ".symtab");
    }

    #[test]
    fn parse_rejects_a_truncated_image() {
        let bytes = queried().encode().unwrap();
        assert_eq!(
            Rpl::parse(&bytes[..0x40]).unwrap_err(),
            ElfError::MalformedHeader(HeaderField::FileSize)
        );
    }

    #[test]
    fn encode_rejects_unsupported_shapes() {
        let mut file = sample();
        file.header.program_header_count = 1;
        assert_eq!(
            file.encode().unwrap_err(),
            ElfError::UnsupportedConfiguration(Unsupported::ProgramHeaders)
        );

        let mut file = sample();
        file.header.endianness = Endianness::Little;
        assert_eq!(
            file.encode().unwrap_err(),
            ElfError::UnsupportedConfiguration(Unsupported::Endianness(Endianness::Little))
        );

        let mut file = sample();
        file.header.class = Class::Elf64;
        assert_eq!(
            file.encode().unwrap_err(),
            ElfError::UnsupportedConfiguration(Unsupported::Class(Class::Elf64))
        );
    }

    #[test]
    fn compress_round_trip_restores_payloads() {
        let mut file = queried();
        let pristine = file.clone();

        assert!(file.compress(Compression::best()).unwrap());
        assert!(file.sections[1].is_compressed());
        assert!(matches!(file.sections[1].payload, Payload::Plain));
        assert!(!file.sections[5].is_compressed());
        assert!(!file.sections[6].is_compressed());
        assert!(!file.compress(Compression::best()).unwrap());

        assert!(file.decompress().unwrap());
        assert!(!file.decompress().unwrap());
        assert_eq!(file.encode().unwrap(), pristine.encode().unwrap());
    }

    #[test]
    fn compress_skips_what_cannot_shrink() {
        let mut file = queried();
        file.compress(Compression::best()).unwrap();
        // 13 bytes of string table cannot beat the 4-byte size prefix.
        assert!(!file.sections[3].is_compressed());
        assert!(matches!(&file.sections[3].payload, Payload::Strings(_)));
    }

    #[test]
    fn compress_reassigns_monotonic_offsets() {
        let mut file = queried();
        file.compress(Compression::best()).unwrap();

        assert_eq!(file.sections[0].offset, 0);
        let table_end = 0x34 + 7 * 0x28;
        let mut last_end = 0;
        for section in file.sections.iter().filter(|section| section.offset != 0) {
            assert!(section.offset >= table_end);
            assert!(section.offset >= last_end);
            last_end = section.offset + section.size;
        }
    }

    #[test]
    fn symbol_queries_resolve_names_and_ranges() {
        let file = queried();

        let main = file.symbol_by_name("main").unwrap();
        assert_eq!(main.value, 0x0200_0000);
        assert!(file.symbol_by_name("MAIN").is_some());
        assert!(file.symbol_by_name("absent").is_none());
        assert_eq!(file.symbols_by_name("helper").len(), 1);

        assert_eq!(file.symbols().count(), 2);
        assert_eq!(file.symbols_in_section(1).len(), 2);
        assert!(file.symbols_in_section(3).is_empty());
        assert!(file.symbols_in_section(99).is_empty());

        assert_eq!(file.symbol_name(2, main), "main");
    }

    #[test]
    fn address_queries_use_half_open_section_ranges() {
        let file = queried();

        let hits = file.symbols_at_address(0x0200_0002);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name_offset, 1);
        assert!(file.symbols_at_address(0x0200_0008).is_empty());

        let sections = file.sections_at_address(0x0200_00FF);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, 1);
        assert!(file.sections_at_address(0x0200_0100).is_empty());
    }

    #[test]
    fn zero_sized_symbols_match_only_their_exact_address() {
        let mut file = queried();
        if let Payload::Symbols(symbols) = &mut file.sections[2].payload {
            symbols[1].size = 0;
        }

        let hits = file.symbols_at_address(0x0200_0004);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name_offset, 6);
        assert!(file.symbols_at_address(0x0200_0005).is_empty());
    }

    #[test]
    fn sections_for_symbol_uses_an_inclusive_upper_bound() {
        let file = queried();

        let main = file.symbol_by_name("main").unwrap();
        assert_eq!(file.section_for_symbol(main).map(|(index, _)| index), Some(1));

        let boundary = Symbol {
            name_offset: 0,
            value: 0,
            size: 0,
            info: 0,
            other: 0,
            shndx: 0,
            virtual_address: Some(0x0200_0100),
        };
        let hits = file.sections_for_symbol(&boundary);
        assert!(hits.iter().any(|&(index, _)| index == 1));
    }

    #[test]
    fn relocatable_addresses_add_the_section_base() {
        let mut file = sample();
        file.header.file_type = FileType::Relocatable;
        if let Payload::Symbols(symbols) = &mut file.sections[2].payload {
            symbols[0].value = 0x10;
            symbols[1].shndx = SHN_ABS;
            symbols[1].value = 0xDEAD;
            symbols.push(Symbol {
                name_offset: 0,
                value: 1,
                size: 0,
                info: 0,
                other: 0,
                shndx: 0x30,
                virtual_address: None,
            });
        }
        file.resolve_virtual_addresses();

        let Payload::Symbols(symbols) = &file.sections[2].payload else {
            panic!("symtab payload did not survive");
        };
        assert_eq!(symbols[0].virtual_address, Some(0x0200_0010));
        assert_eq!(symbols[1].virtual_address, Some(0xDEAD));
        assert_eq!(symbols[2].virtual_address, None);

        file.header.file_type = FileType::Core;
        file.resolve_virtual_addresses();
        let Payload::Symbols(symbols) = &file.sections[2].payload else {
            panic!("symtab payload did not survive");
        };
        assert_eq!(symbols[0].virtual_address, None);
    }

    #[test]
    fn name_resolution_falls_back_to_sentinels() {
        let mut file = queried();

        file.sections[1].name_offset = 999;
        assert_eq!(file.section_name(1), UNRESOLVED_NAME);
        assert_eq!(file.section_name(99), UNRESOLVED_NAME);

        // Mid-string offsets resolve to the suffix of the covering entry.
        let suffix = Symbol {
            name_offset: 3,
            value: 0,
            size: 0,
            info: 0,
            other: 0,
            shndx: 0,
            virtual_address: None,
        };
        assert_eq!(file.symbol_name(2, &suffix), "in");

        file.sections[4].flags.insert(SectionFlags::COMPRESSED);
        file.sections[4].payload = Payload::Plain;
        assert_eq!(file.section_name(2), COMPRESSED_NAME);
    }
}
