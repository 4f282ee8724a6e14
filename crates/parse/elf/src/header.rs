//! ELF identification and header codec.
//!
//! Decodes the fixed-layout header for both 32- and 64-bit images, validating
//! each field in declared order. Re-encoding is supported for the ELF32
//! big-endian configuration only, which is the layout the RPL format uses.

use crate::view::ByteView;
use crate::{ElfError, HeaderField, Unsupported};

/// The four magic bytes every ELF image starts with.
pub const ELF_MAGIC: [u8; 4] = *b"\x7FELF";

/// Size of the ELF32 header in bytes.
pub const HEADER_SIZE_32: usize = 0x34;

/// Size of the ELF64 header in bytes.
pub const HEADER_SIZE_64: usize = 0x40;

/// Minimum legal program header entry size for ELF32.
const PH_ENTRY_MIN_32: u16 = 0x20;

/// Minimum legal program header entry size for ELF64.
const PH_ENTRY_MIN_64: u16 = 0x38;

/// Minimum legal section header entry size for ELF32.
const SH_ENTRY_MIN_32: u16 = 0x28;

/// Minimum legal section header entry size for ELF64.
const SH_ENTRY_MIN_64: u16 = 0x40;

// ---------------------------------------------------------------------------
// Ident enums
// ---------------------------------------------------------------------------

/// Word width of the image, from the ident class byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Class {
    /// 32-bit layout.
    Elf32 = 1,
    /// 64-bit layout.
    Elf64 = 2,
}

impl TryFrom<u8> for Class {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Elf32),
            2 => Ok(Self::Elf64),
            _ => Err(value),
        }
    }
}

impl core::fmt::Display for Class {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Elf32 => write!(f, "ELF32"),
            Self::Elf64 => write!(f, "ELF64"),
        }
    }
}

/// Byte order of the image, from the ident data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Endianness {
    /// Least significant byte first.
    Little = 1,
    /// Most significant byte first.
    Big = 2,
}

impl TryFrom<u8> for Endianness {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Little),
            2 => Ok(Self::Big),
            _ => Err(value),
        }
    }
}

impl core::fmt::Display for Endianness {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Little => write!(f, "Little Endian"),
            Self::Big => write!(f, "Big Endian"),
        }
    }
}

/// OS/ABI identification byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abi {
    /// UNIX System V.
    SystemV,
    /// HP-UX.
    HpUx,
    /// NetBSD.
    NetBsd,
    /// Linux.
    Linux,
    /// Solaris.
    Solaris,
    /// FreeBSD.
    FreeBsd,
    /// OpenBSD.
    OpenBsd,
    /// ARM EABI.
    ArmEabi,
    /// ARM.
    Arm,
    /// CafeOS, the ABI RPL images declare.
    CafeOs,
    /// Standalone (embedded).
    Standalone,
    /// Any value without a named variant.
    Unknown(u8),
}

impl From<u8> for Abi {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::SystemV,
            0x01 => Self::HpUx,
            0x02 => Self::NetBsd,
            0x03 => Self::Linux,
            0x06 => Self::Solaris,
            0x09 => Self::FreeBsd,
            0x0C => Self::OpenBsd,
            0x40 => Self::ArmEabi,
            0x61 => Self::Arm,
            0xCA => Self::CafeOs,
            0xFF => Self::Standalone,
            other => Self::Unknown(other),
        }
    }
}

impl Abi {
    /// Converts back to the raw ident byte.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            Self::SystemV => 0x00,
            Self::HpUx => 0x01,
            Self::NetBsd => 0x02,
            Self::Linux => 0x03,
            Self::Solaris => 0x06,
            Self::FreeBsd => 0x09,
            Self::OpenBsd => 0x0C,
            Self::ArmEabi => 0x40,
            Self::Arm => 0x61,
            Self::CafeOs => 0xCA,
            Self::Standalone => 0xFF,
            Self::Unknown(other) => other,
        }
    }
}

impl core::fmt::Display for Abi {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SystemV => write!(f, "System V"),
            Self::HpUx => write!(f, "HP-UX"),
            Self::NetBsd => write!(f, "NetBSD"),
            Self::Linux => write!(f, "Linux"),
            Self::Solaris => write!(f, "Solaris"),
            Self::FreeBsd => write!(f, "FreeBSD"),
            Self::OpenBsd => write!(f, "OpenBSD"),
            Self::ArmEabi => write!(f, "ARM EABI"),
            Self::Arm => write!(f, "ARM"),
            Self::CafeOs => write!(f, "CafeOS"),
            Self::Standalone => write!(f, "Standalone"),
            Self::Unknown(v) => write!(f, "Unknown ({v:#04X})"),
        }
    }
}

/// Object file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// No file type.
    None,
    /// Relocatable object file.
    Relocatable,
    /// Executable.
    Executable,
    /// Shared object.
    Shared,
    /// Core dump.
    Core,
    /// RPL module (CafeOS dynamic library).
    Rpl,
    /// Any value without a named variant.
    Unknown(u16),
}

impl From<u16> for FileType {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => Self::None,
            0x0001 => Self::Relocatable,
            0x0002 => Self::Executable,
            0x0003 => Self::Shared,
            0x0004 => Self::Core,
            0xFE01 => Self::Rpl,
            other => Self::Unknown(other),
        }
    }
}

impl FileType {
    /// Converts back to the raw field value.
    #[must_use]
    pub fn to_u16(self) -> u16 {
        match self {
            Self::None => 0x0000,
            Self::Relocatable => 0x0001,
            Self::Executable => 0x0002,
            Self::Shared => 0x0003,
            Self::Core => 0x0004,
            Self::Rpl => 0xFE01,
            Self::Unknown(other) => other,
        }
    }
}

impl core::fmt::Display for FileType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Relocatable => write!(f, "Relocatable"),
            Self::Executable => write!(f, "Executable"),
            Self::Shared => write!(f, "Shared"),
            Self::Core => write!(f, "Core"),
            Self::Rpl => write!(f, "RPL"),
            Self::Unknown(v) => write!(f, "Unknown ({v:#06X})"),
        }
    }
}

/// Instruction set architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    /// No machine.
    None,
    /// SPARC.
    Sparc,
    /// Intel 80386.
    X86,
    /// MIPS.
    Mips,
    /// PowerPC, the ISA RPL images declare.
    PowerPc,
    /// PowerPC 64-bit.
    PowerPc64,
    /// IBM S/390.
    S390,
    /// ARM.
    Arm,
    /// SuperH.
    SuperH,
    /// Intel Itanium.
    Ia64,
    /// AMD x86-64.
    X86_64,
    /// ARM AArch64.
    Aarch64,
    /// RISC-V.
    RiscV,
    /// Any value without a named variant.
    Unknown(u16),
}

impl From<u16> for Machine {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => Self::None,
            0x0002 => Self::Sparc,
            0x0003 => Self::X86,
            0x0008 => Self::Mips,
            0x0014 => Self::PowerPc,
            0x0015 => Self::PowerPc64,
            0x0016 => Self::S390,
            0x0028 => Self::Arm,
            0x002A => Self::SuperH,
            0x0032 => Self::Ia64,
            0x003E => Self::X86_64,
            0x00B7 => Self::Aarch64,
            0x00F3 => Self::RiscV,
            other => Self::Unknown(other),
        }
    }
}

impl Machine {
    /// Converts back to the raw field value.
    #[must_use]
    pub fn to_u16(self) -> u16 {
        match self {
            Self::None => 0x0000,
            Self::Sparc => 0x0002,
            Self::X86 => 0x0003,
            Self::Mips => 0x0008,
            Self::PowerPc => 0x0014,
            Self::PowerPc64 => 0x0015,
            Self::S390 => 0x0016,
            Self::Arm => 0x0028,
            Self::SuperH => 0x002A,
            Self::Ia64 => 0x0032,
            Self::X86_64 => 0x003E,
            Self::Aarch64 => 0x00B7,
            Self::RiscV => 0x00F3,
            Self::Unknown(other) => other,
        }
    }
}

impl core::fmt::Display for Machine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Sparc => write!(f, "SPARC"),
            Self::X86 => write!(f, "Intel 80386"),
            Self::Mips => write!(f, "MIPS"),
            Self::PowerPc => write!(f, "PowerPC"),
            Self::PowerPc64 => write!(f, "PowerPC64"),
            Self::S390 => write!(f, "IBM S/390"),
            Self::Arm => write!(f, "ARM"),
            Self::SuperH => write!(f, "SuperH"),
            Self::Ia64 => write!(f, "Intel IA-64"),
            Self::X86_64 => write!(f, "AMD x86-64"),
            Self::Aarch64 => write!(f, "AArch64"),
            Self::RiscV => write!(f, "RISC-V"),
            Self::Unknown(v) => write!(f, "Unknown ({v:#06X})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The decoded ELF header.
///
/// Offsets and the entry point are stored as `u64` regardless of class; the
/// declared [`Class`] decides how they are laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Word width of the image.
    pub class: Class,
    /// Byte order of the image.
    pub endianness: Endianness,
    /// Ident version byte, always 1.
    pub version: u8,
    /// OS/ABI identification.
    pub abi: Abi,
    /// ABI version byte.
    pub abi_version: u8,
    /// Object file type.
    pub file_type: FileType,
    /// Instruction set architecture.
    pub machine: Machine,
    /// Version of the machine ISA; interpretation is ISA specific.
    pub machine_version: u32,
    /// Virtual address of the entry point.
    pub entry: u64,
    /// File offset of the program header table.
    pub program_header_offset: u64,
    /// Size of one program header entry.
    pub program_header_entry_size: u16,
    /// Number of program header entries.
    pub program_header_count: u16,
    /// File offset of the section header table.
    pub section_header_offset: u64,
    /// Size of one section header entry.
    pub section_header_entry_size: u16,
    /// Number of section header entries.
    pub section_header_count: u16,
    /// ISA-specific flags.
    pub flags: u32,
    /// Section index of the section header string table.
    pub shstr_index: u16,
}

impl Header {
    /// Size of this header on disk, decided by class.
    #[must_use]
    pub fn size(&self) -> usize {
        match self.class {
            Class::Elf32 => HEADER_SIZE_32,
            Class::Elf64 => HEADER_SIZE_64,
        }
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decodes and validates the header from the start of a full image.
///
/// `bytes` must be the whole file: the offset bound checks are made against
/// its total length.
///
/// # Errors
///
/// Returns [`ElfError::MalformedHeader`] naming the first field that fails
/// validation. No partially populated header is ever returned.
pub fn decode_header(bytes: &[u8]) -> Result<Header, ElfError> {
    if bytes.len() <= HEADER_SIZE_64 {
        return Err(ElfError::MalformedHeader(HeaderField::FileSize));
    }
    if bytes[..4] != ELF_MAGIC {
        return Err(ElfError::MalformedHeader(HeaderField::Magic));
    }

    let class = Class::try_from(bytes[4]).map_err(|_| ElfError::MalformedHeader(HeaderField::Class))?;
    let endianness =
        Endianness::try_from(bytes[5]).map_err(|_| ElfError::MalformedHeader(HeaderField::Endianness))?;
    let version = bytes[6];
    if version != 1 {
        return Err(ElfError::MalformedHeader(HeaderField::Version));
    }
    let abi = Abi::from(bytes[7]);
    let abi_version = bytes[8];

    let view = ByteView::new(bytes, endianness);
    let truncated = ElfError::MalformedHeader(HeaderField::FileSize);

    // Fields after the 16-byte ident.
    let mut offset = 16;
    let file_type = FileType::from(view.u16(offset).ok_or(truncated)?);
    offset += 2;
    let machine = Machine::from(view.u16(offset).ok_or(truncated)?);
    offset += 2;
    let machine_version = view.u32(offset).ok_or(truncated)?;
    offset += 4;

    let (entry, program_header_offset, section_header_offset) = match class {
        Class::Elf32 => {
            let entry = u64::from(view.u32(offset).ok_or(truncated)?);
            let phoff = u64::from(view.u32(offset + 4).ok_or(truncated)?);
            let shoff = u64::from(view.u32(offset + 8).ok_or(truncated)?);
            offset += 12;
            (entry, phoff, shoff)
        }
        Class::Elf64 => {
            let entry = view.u64(offset).ok_or(truncated)?;
            let phoff = view.u64(offset + 8).ok_or(truncated)?;
            let shoff = view.u64(offset + 16).ok_or(truncated)?;
            offset += 24;
            (entry, phoff, shoff)
        }
    };

    let flags = view.u32(offset).ok_or(truncated)?;
    offset += 4;
    let header_size = view.u16(offset).ok_or(truncated)?;
    offset += 2;
    let program_header_entry_size = view.u16(offset).ok_or(truncated)?;
    offset += 2;
    let program_header_count = view.u16(offset).ok_or(truncated)?;
    offset += 2;
    let section_header_entry_size = view.u16(offset).ok_or(truncated)?;
    offset += 2;
    let section_header_count = view.u16(offset).ok_or(truncated)?;
    offset += 2;
    let shstr_index = view.u16(offset).ok_or(truncated)?;

    let declared = match class {
        Class::Elf32 => HEADER_SIZE_32,
        Class::Elf64 => HEADER_SIZE_64,
    };
    if usize::from(header_size) != declared {
        return Err(ElfError::MalformedHeader(HeaderField::HeaderSize));
    }

    let file_size = bytes.len() as u64;
    let header_end = declared as u64;
    if program_header_count != 0
        && (program_header_offset < header_end || program_header_offset > file_size)
    {
        return Err(ElfError::MalformedHeader(HeaderField::ProgramHeaderOffset));
    }
    if section_header_count != 0
        && (section_header_offset < header_end || section_header_offset > file_size)
    {
        return Err(ElfError::MalformedHeader(HeaderField::SectionHeaderOffset));
    }

    let (ph_min, sh_min) = match class {
        Class::Elf32 => (PH_ENTRY_MIN_32, SH_ENTRY_MIN_32),
        Class::Elf64 => (PH_ENTRY_MIN_64, SH_ENTRY_MIN_64),
    };
    if program_header_count != 0
        && (program_header_entry_size < ph_min || program_header_entry_size > 0xFF)
    {
        return Err(ElfError::MalformedHeader(HeaderField::ProgramHeaderEntrySize));
    }
    if section_header_count != 0
        && (section_header_entry_size < sh_min || section_header_entry_size > 0xFF)
    {
        return Err(ElfError::MalformedHeader(HeaderField::SectionHeaderEntrySize));
    }

    Ok(Header {
        class,
        endianness,
        version,
        abi,
        abi_version,
        file_type,
        machine,
        machine_version,
        entry,
        program_header_offset,
        program_header_entry_size,
        program_header_count,
        section_header_offset,
        section_header_entry_size,
        section_header_count,
        flags,
        shstr_index,
    })
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Serializes the header back to its 0x34-byte on-disk form.
///
/// # Errors
///
/// Returns [`ElfError::UnsupportedConfiguration`] unless the header declares
/// ELF32 big-endian, the only configuration the writer supports.
pub fn encode_header(header: &Header) -> Result<Vec<u8>, ElfError> {
    if header.class != Class::Elf32 {
        return Err(ElfError::UnsupportedConfiguration(Unsupported::Class(
            header.class,
        )));
    }
    if header.endianness != Endianness::Big {
        return Err(ElfError::UnsupportedConfiguration(Unsupported::Endianness(
            header.endianness,
        )));
    }

    let entry = u32::try_from(header.entry)
        .map_err(|_| ElfError::ValueOutOfRange("header entry point"))?;
    let phoff = u32::try_from(header.program_header_offset)
        .map_err(|_| ElfError::ValueOutOfRange("program header offset"))?;
    let shoff = u32::try_from(header.section_header_offset)
        .map_err(|_| ElfError::ValueOutOfRange("section header offset"))?;

    let mut buf = Vec::with_capacity(HEADER_SIZE_32);
    buf.extend_from_slice(&ELF_MAGIC); // 0x00
    buf.push(header.class as u8); // 0x04
    buf.push(header.endianness as u8); // 0x05
    buf.push(header.version); // 0x06
    buf.push(header.abi.to_u8()); // 0x07
    buf.push(header.abi_version); // 0x08
    buf.extend_from_slice(&[0u8; 7]); // 0x09 padding
    buf.extend_from_slice(&header.file_type.to_u16().to_be_bytes()); // 0x10
    buf.extend_from_slice(&header.machine.to_u16().to_be_bytes()); // 0x12
    buf.extend_from_slice(&header.machine_version.to_be_bytes()); // 0x14
    buf.extend_from_slice(&entry.to_be_bytes()); // 0x18
    buf.extend_from_slice(&phoff.to_be_bytes()); // 0x1C
    buf.extend_from_slice(&shoff.to_be_bytes()); // 0x20
    buf.extend_from_slice(&header.flags.to_be_bytes()); // 0x24
    #[expect(clippy::cast_possible_truncation, reason = "the ELF32 header size fits a u16")]
    let header_size = HEADER_SIZE_32 as u16;
    buf.extend_from_slice(&header_size.to_be_bytes()); // 0x28
    buf.extend_from_slice(&header.program_header_entry_size.to_be_bytes()); // 0x2A
    buf.extend_from_slice(&header.program_header_count.to_be_bytes()); // 0x2C
    buf.extend_from_slice(&header.section_header_entry_size.to_be_bytes()); // 0x2E
    buf.extend_from_slice(&header.section_header_count.to_be_bytes()); // 0x30
    buf.extend_from_slice(&header.shstr_index.to_be_bytes()); // 0x32
    debug_assert_eq!(buf.len(), HEADER_SIZE_32);
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a valid ELF32 big-endian RPL header followed by zero padding.
    fn make_image(total: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"\x7FELF"); // magic
        buf.push(1); // class: ELF32
        buf.push(2); // data: big-endian
        buf.push(1); // version
        buf.push(0xCA); // ABI: CafeOS
        buf.push(0); // ABI version
        buf.extend_from_slice(&[0u8; 7]); // padding
        buf.extend_from_slice(&0xFE01_u16.to_be_bytes()); // type: RPL
        buf.extend_from_slice(&0x0014_u16.to_be_bytes()); // machine: PowerPC
        buf.extend_from_slice(&1_u32.to_be_bytes()); // machine version
        buf.extend_from_slice(&0x0200_0000_u32.to_be_bytes()); // entry
        buf.extend_from_slice(&0_u32.to_be_bytes()); // phoff
        buf.extend_from_slice(&0x34_u32.to_be_bytes()); // shoff
        buf.extend_from_slice(&0_u32.to_be_bytes()); // flags
        buf.extend_from_slice(&0x34_u16.to_be_bytes()); // ehsize
        buf.extend_from_slice(&0_u16.to_be_bytes()); // phentsize
        buf.extend_from_slice(&0_u16.to_be_bytes()); // phnum
        buf.extend_from_slice(&0x28_u16.to_be_bytes()); // shentsize
        buf.extend_from_slice(&3_u16.to_be_bytes()); // shnum
        buf.extend_from_slice(&2_u16.to_be_bytes()); // shstrndx
        assert_eq!(buf.len(), HEADER_SIZE_32);
        buf.resize(total, 0);
        buf
    }

    #[test]
    fn parse_valid_32be() {
        let header = decode_header(&make_image(0x100)).unwrap();
        assert_eq!(header.class, Class::Elf32);
        assert_eq!(header.endianness, Endianness::Big);
        assert_eq!(header.abi, Abi::CafeOs);
        assert_eq!(header.file_type, FileType::Rpl);
        assert_eq!(header.machine, Machine::PowerPc);
        assert_eq!(header.entry, 0x0200_0000);
        assert_eq!(header.section_header_offset, 0x34);
        assert_eq!(header.section_header_count, 3);
        assert_eq!(header.shstr_index, 2);
    }

    #[test]
    fn reject_too_small() {
        let image = make_image(0x40);
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::FileSize))
        );
    }

    #[test]
    fn reject_bad_magic() {
        let mut image = make_image(0x100);
        image[0] = b'M';
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::Magic))
        );
    }

    #[test]
    fn reject_bad_class() {
        let mut image = make_image(0x100);
        image[4] = 3;
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::Class))
        );
    }

    #[test]
    fn reject_bad_endianness() {
        let mut image = make_image(0x100);
        image[5] = 0;
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::Endianness))
        );
    }

    #[test]
    fn reject_bad_version() {
        let mut image = make_image(0x100);
        image[6] = 2;
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::Version))
        );
    }

    #[test]
    fn reject_bad_header_size() {
        let mut image = make_image(0x100);
        image[0x28..0x2A].copy_from_slice(&0x40_u16.to_be_bytes());
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::HeaderSize))
        );
    }

    #[test]
    fn reject_section_offset_before_header() {
        let mut image = make_image(0x100);
        image[0x20..0x24].copy_from_slice(&0x10_u32.to_be_bytes());
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::SectionHeaderOffset))
        );
    }

    #[test]
    fn reject_section_offset_past_end() {
        let mut image = make_image(0x100);
        image[0x20..0x24].copy_from_slice(&0x2000_u32.to_be_bytes());
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::SectionHeaderOffset))
        );
    }

    #[test]
    fn reject_small_section_entry_size() {
        let mut image = make_image(0x100);
        image[0x2E..0x30].copy_from_slice(&0x10_u16.to_be_bytes());
        assert_eq!(
            decode_header(&image),
            Err(ElfError::MalformedHeader(HeaderField::SectionHeaderEntrySize))
        );
    }

    #[test]
    fn zero_sections_skips_offset_checks() {
        let mut image = make_image(0x100);
        image[0x20..0x24].copy_from_slice(&0_u32.to_be_bytes()); // shoff
        image[0x2E..0x30].copy_from_slice(&0_u16.to_be_bytes()); // shentsize
        image[0x30..0x32].copy_from_slice(&0_u16.to_be_bytes()); // shnum
        assert!(decode_header(&image).is_ok());
    }

    #[test]
    fn parse_64bit_little_endian() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"\x7FELF");
        buf.push(2); // class: ELF64
        buf.push(1); // data: little-endian
        buf.push(1); // version
        buf.push(0); // ABI
        buf.push(0);
        buf.extend_from_slice(&[0u8; 7]);
        buf.extend_from_slice(&2_u16.to_le_bytes()); // type: executable
        buf.extend_from_slice(&0x3E_u16.to_le_bytes()); // machine: x86-64
        buf.extend_from_slice(&1_u32.to_le_bytes());
        buf.extend_from_slice(&0x40_1000_u64.to_le_bytes()); // entry
        buf.extend_from_slice(&0_u64.to_le_bytes()); // phoff
        buf.extend_from_slice(&0x40_u64.to_le_bytes()); // shoff
        buf.extend_from_slice(&0_u32.to_le_bytes()); // flags
        buf.extend_from_slice(&0x40_u16.to_le_bytes()); // ehsize
        buf.extend_from_slice(&0_u16.to_le_bytes()); // phentsize
        buf.extend_from_slice(&0_u16.to_le_bytes()); // phnum
        buf.extend_from_slice(&0x40_u16.to_le_bytes()); // shentsize
        buf.extend_from_slice(&1_u16.to_le_bytes()); // shnum
        buf.extend_from_slice(&0_u16.to_le_bytes()); // shstrndx
        assert_eq!(buf.len(), HEADER_SIZE_64);
        buf.resize(0x100, 0);

        let header = decode_header(&buf).unwrap();
        assert_eq!(header.class, Class::Elf64);
        assert_eq!(header.endianness, Endianness::Little);
        assert_eq!(header.machine, Machine::X86_64);
        assert_eq!(header.entry, 0x40_1000);
    }

    #[test]
    fn encode_round_trips() {
        let image = make_image(0x100);
        let header = decode_header(&image).unwrap();
        let encoded = encode_header(&header).unwrap();
        assert_eq!(encoded, image[..HEADER_SIZE_32]);
    }

    #[test]
    fn encode_rejects_little_endian() {
        let image = make_image(0x100);
        let mut header = decode_header(&image).unwrap();
        header.endianness = Endianness::Little;
        assert_eq!(
            encode_header(&header),
            Err(ElfError::UnsupportedConfiguration(Unsupported::Endianness(
                Endianness::Little
            )))
        );
    }

    #[test]
    fn encode_rejects_elf64() {
        let image = make_image(0x100);
        let mut header = decode_header(&image).unwrap();
        header.class = Class::Elf64;
        assert_eq!(
            encode_header(&header),
            Err(ElfError::UnsupportedConfiguration(Unsupported::Class(
                Class::Elf64
            )))
        );
    }

    #[test]
    fn unknown_enum_values_round_trip() {
        assert_eq!(Abi::from(0x42).to_u8(), 0x42);
        assert_eq!(FileType::from(0xBEEF).to_u16(), 0xBEEF);
        assert_eq!(Machine::from(0x1234).to_u16(), 0x1234);
    }
}
