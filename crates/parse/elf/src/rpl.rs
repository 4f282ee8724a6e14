//! RPL vendor section codecs.
//!
//! Covers the two CafeOS-specific section payloads: the per-section CRC
//! table and the FILEINFO metadata block with its trailing string table.

use crate::header::Endianness;
use crate::strtab::StringTable;
use crate::view::ByteView;
use crate::{ElfError, SectionDefect};

/// Magic halfword at the start of a FILEINFO payload.
pub const FILE_INFO_MAGIC: u16 = 0xCAFE;

/// Size of the fixed FILEINFO block, before any trailing strings.
pub const FILE_INFO_SIZE: usize = 0x60;

// ---------------------------------------------------------------------------
// CRC table
// ---------------------------------------------------------------------------

/// Decodes a CRC section payload into one hash per file section.
///
/// Each table cell is `entry_size` bytes wide with the hash in its first
/// four bytes; `count = data.len() / entry_size`.
///
/// # Errors
///
/// Returns [`ElfError::MalformedSection`] when the entry size is zero or
/// too small to hold a hash.
pub fn decode_crcs(
    data: &[u8],
    endianness: Endianness,
    entry_size: usize,
    section: usize,
) -> Result<Vec<u32>, ElfError> {
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
    let mut crcs = Vec::with_capacity(count);
    for i in 0..count {
        crcs.push(view.u32(i * entry_size).ok_or(truncated)?);
    }
    Ok(crcs)
}

/// Serializes a CRC table back to big-endian bytes, one hash per
/// `entry_size`-byte cell.
///
/// # Errors
///
/// Returns [`ElfError::MalformedSection`] when the entry size is zero or
/// too small to hold a hash.
pub fn pack_crcs(crcs: &[u32], entry_size: usize, section: usize) -> Result<Vec<u8>, ElfError> {
    if entry_size < 4 {
        return Err(ElfError::MalformedSection {
            section,
            defect: if entry_size == 0 {
                SectionDefect::ZeroEntrySize
            } else {
                SectionDefect::TruncatedEntry
            },
        });
    }

    let mut buf = vec![0u8; crcs.len() * entry_size];
    for (i, crc) in crcs.iter().enumerate() {
        buf[i * entry_size..i * entry_size + 4].copy_from_slice(&crc.to_be_bytes());
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// FILEINFO
// ---------------------------------------------------------------------------

/// The fixed FILEINFO metadata block plus its trailing string table.
///
/// Field order mirrors the on-disk layout. `strings` is keyed by absolute
/// offset within the section, anchored at `strings_offset`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RplFileInfo {
    /// Format version of the block.
    pub version: u16,
    /// Total size of all executable sections.
    pub text_size: u32,
    /// Alignment of the text region.
    pub text_align: u32,
    /// Total size of all data sections.
    pub data_size: u32,
    /// Alignment of the data region.
    pub data_align: u32,
    /// Total size of the loader-visible region.
    pub load_size: u32,
    /// Alignment of the loader-visible region.
    pub load_align: u32,
    /// Scratch space the loader reserves for decompression.
    pub temp_size: u32,
    /// Trampoline adjustment applied by the loader.
    pub tramp_adjust: u32,
    /// Small-data area base address.
    pub sda_base: u32,
    /// Second small-data area base address.
    pub sda2_base: u32,
    /// Requested stack size.
    pub stack_size: u32,
    /// Offset of the trailing string table within the section.
    pub strings_offset: u32,
    /// Loader flag bits.
    pub flags: u32,
    /// Requested heap size.
    pub heap_size: u32,
    /// Offset of the tag block, when present.
    pub tag_offset: u32,
    /// Minimum loader version required.
    pub min_version: u32,
    /// Deflate level used when the file was compressed, `-1` for default.
    pub compression_level: i32,
    /// Extra trampoline space added by the linker.
    pub tramp_addition: u32,
    /// Padding carried in the block.
    pub file_info_pad: u32,
    /// SDK version the module was built against.
    pub cafe_sdk_version: u32,
    /// SDK revision the module was built against.
    pub cafe_sdk_revision: u32,
    /// TLS module slot index.
    pub tls_module_index: u16,
    /// TLS alignment, as a power-of-two shift.
    pub tls_align_shift: u16,
    /// Size of the loader's runtime copy of this block.
    pub runtime_file_info_size: u32,
    /// Strings trailing the fixed block, keyed by section offset.
    pub strings: StringTable,
}

/// Decodes a FILEINFO section payload.
///
/// The payload must be at least [`FILE_INFO_SIZE`] bytes and open with
/// [`FILE_INFO_MAGIC`]. Bytes past the fixed block are scanned as a string
/// table anchored at `strings_offset`; a payload of exactly the fixed size,
/// or whose `strings_offset` lies at or past the end, has no strings.
///
/// # Errors
///
/// Returns [`ElfError::MalformedSection`] when the payload is too small or
/// the magic does not match.
pub fn decode_file_info(
    data: &[u8],
    endianness: Endianness,
    section: usize,
) -> Result<RplFileInfo, ElfError> {
    let too_small = ElfError::MalformedSection {
        section,
        defect: SectionDefect::FileInfoTooSmall,
    };
    if data.len() < FILE_INFO_SIZE {
        return Err(too_small);
    }

    let view = ByteView::new(data, endianness);
    let u16_at = |offset: usize| view.u16(offset).ok_or(too_small);
    let u32_at = |offset: usize| view.u32(offset).ok_or(too_small);
    let i32_at = |offset: usize| view.i32(offset).ok_or(too_small);

    let magic = u16_at(0x0)?;
    if magic != FILE_INFO_MAGIC {
        return Err(ElfError::MalformedSection {
            section,
            defect: SectionDefect::BadFileInfoMagic(magic),
        });
    }

    let strings_offset = u32_at(0x30)?;
    let strings = if data.len() > FILE_INFO_SIZE && (strings_offset as usize) < data.len() {
        StringTable::scan(&data[strings_offset as usize..], strings_offset)
    } else {
        StringTable::new()
    };

    Ok(RplFileInfo {
        version: u16_at(0x2)?,
        text_size: u32_at(0x4)?,
        text_align: u32_at(0x8)?,
        data_size: u32_at(0xC)?,
        data_align: u32_at(0x10)?,
        load_size: u32_at(0x14)?,
        load_align: u32_at(0x18)?,
        temp_size: u32_at(0x1C)?,
        tramp_adjust: u32_at(0x20)?,
        sda_base: u32_at(0x24)?,
        sda2_base: u32_at(0x28)?,
        stack_size: u32_at(0x2C)?,
        strings_offset,
        flags: u32_at(0x34)?,
        heap_size: u32_at(0x38)?,
        tag_offset: u32_at(0x3C)?,
        min_version: u32_at(0x40)?,
        compression_level: i32_at(0x44)?,
        tramp_addition: u32_at(0x48)?,
        file_info_pad: u32_at(0x4C)?,
        cafe_sdk_version: u32_at(0x50)?,
        cafe_sdk_revision: u32_at(0x54)?,
        tls_module_index: u16_at(0x58)?,
        tls_align_shift: u16_at(0x5A)?,
        runtime_file_info_size: u32_at(0x5C)?,
        strings,
    })
}

/// Serializes a FILEINFO block back to big-endian bytes of the given total
/// size, fixed fields first, then each string at its recorded offset.
///
/// # Errors
///
/// Returns [`ElfError::MalformedSection`] when `size` cannot hold the fixed
/// block, and [`ElfError::CorruptPack`] when a string would run past the
/// end or overwrite an already-written byte.
pub fn pack_file_info(
    info: &RplFileInfo,
    size: usize,
    section: usize,
) -> Result<Vec<u8>, ElfError> {
    if size < FILE_INFO_SIZE {
        return Err(ElfError::MalformedSection {
            section,
            defect: SectionDefect::FileInfoTooSmall,
        });
    }

    let mut buf = Vec::with_capacity(size);
    buf.extend_from_slice(&FILE_INFO_MAGIC.to_be_bytes()); // 0x00
    buf.extend_from_slice(&info.version.to_be_bytes()); // 0x02
    buf.extend_from_slice(&info.text_size.to_be_bytes()); // 0x04
    buf.extend_from_slice(&info.text_align.to_be_bytes()); // 0x08
    buf.extend_from_slice(&info.data_size.to_be_bytes()); // 0x0C
    buf.extend_from_slice(&info.data_align.to_be_bytes()); // 0x10
    buf.extend_from_slice(&info.load_size.to_be_bytes()); // 0x14
    buf.extend_from_slice(&info.load_align.to_be_bytes()); // 0x18
    buf.extend_from_slice(&info.temp_size.to_be_bytes()); // 0x1C
    buf.extend_from_slice(&info.tramp_adjust.to_be_bytes()); // 0x20
    buf.extend_from_slice(&info.sda_base.to_be_bytes()); // 0x24
    buf.extend_from_slice(&info.sda2_base.to_be_bytes()); // 0x28
    buf.extend_from_slice(&info.stack_size.to_be_bytes()); // 0x2C
    buf.extend_from_slice(&info.strings_offset.to_be_bytes()); // 0x30
    buf.extend_from_slice(&info.flags.to_be_bytes()); // 0x34
    buf.extend_from_slice(&info.heap_size.to_be_bytes()); // 0x38
    buf.extend_from_slice(&info.tag_offset.to_be_bytes()); // 0x3C
    buf.extend_from_slice(&info.min_version.to_be_bytes()); // 0x40
    buf.extend_from_slice(&info.compression_level.to_be_bytes()); // 0x44
    buf.extend_from_slice(&info.tramp_addition.to_be_bytes()); // 0x48
    buf.extend_from_slice(&info.file_info_pad.to_be_bytes()); // 0x4C
    buf.extend_from_slice(&info.cafe_sdk_version.to_be_bytes()); // 0x50
    buf.extend_from_slice(&info.cafe_sdk_revision.to_be_bytes()); // 0x54
    buf.extend_from_slice(&info.tls_module_index.to_be_bytes()); // 0x58
    buf.extend_from_slice(&info.tls_align_shift.to_be_bytes()); // 0x5A
    buf.extend_from_slice(&info.runtime_file_info_size.to_be_bytes()); // 0x5C
    debug_assert_eq!(buf.len(), FILE_INFO_SIZE);
    buf.resize(size, 0);

    for (offset, value) in info.strings.iter() {
        let start = offset as usize;
        let end = start + value.len() + 1;
        if end > size || buf[start] != 0 {
            return Err(ElfError::CorruptPack { section, offset });
        }
        buf[start..end - 1].copy_from_slice(value.as_bytes());
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
