//! Deflate framing and section layout.
//!
//! Compressed section payloads are a 4-byte big-endian uncompressed-size
//! prefix followed by a raw deflate stream. After any size-changing
//! transform the file layout is rebuilt by [`reassign_offsets`]; stale
//! offsets after a resize would corrupt the re-encoded file.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::header::Header;
use crate::section::Section;
use crate::{ElfError, SectionDefect};

/// Length of the uncompressed-size prefix.
const SIZE_PREFIX: usize = 4;

/// Inflates a compressed section payload, stripping the size prefix.
///
/// # Errors
///
/// Returns [`ElfError::MalformedSection`] when the prefix is missing or
/// the deflate stream is corrupt.
pub(crate) fn inflate(data: &[u8], section: usize) -> Result<Vec<u8>, ElfError> {
    if data.len() < SIZE_PREFIX {
        return Err(ElfError::MalformedSection {
            section,
            defect: SectionDefect::BadSizePrefix,
        });
    }
    let mut inflated = Vec::new();
    DeflateDecoder::new(&data[SIZE_PREFIX..])
        .read_to_end(&mut inflated)
        .map_err(|_| ElfError::MalformedSection {
            section,
            defect: SectionDefect::BadDeflate,
        })?;
    Ok(inflated)
}

/// Deflates a payload and prepends the big-endian uncompressed-size prefix.
///
/// # Errors
///
/// Returns [`ElfError::ValueOutOfRange`] when the payload exceeds the
/// 32-bit prefix, and [`ElfError::MalformedSection`] when the encoder
/// fails.
pub(crate) fn deflate_with_prefix(
    data: &[u8],
    level: Compression,
    section: usize,
) -> Result<Vec<u8>, ElfError> {
    let size =
        u32::try_from(data.len()).map_err(|_| ElfError::ValueOutOfRange("uncompressed size"))?;
    let bad_deflate = ElfError::MalformedSection {
        section,
        defect: SectionDefect::BadDeflate,
    };

    let mut encoder = DeflateEncoder::new(Vec::from(size.to_be_bytes()), level);
    encoder.write_all(data).map_err(|_| bad_deflate)?;
    encoder.finish().map_err(|_| bad_deflate)
}

/// Computes a file offset for every `(offset, size, align)` triple.
///
/// Content starts past both header tables. Entries with offset zero stay
/// at zero. Each remaining entry is placed at the layout cursor rounded
/// up to its alignment, with a declared alignment of 4 widened to 16 and 0
/// treated as 1; the cursor then advances by the entry's size.
///
/// # Errors
///
/// Returns [`ElfError::ValueOutOfRange`] when the layout would overflow.
pub(crate) fn layout_offsets(
    header: &Header,
    entries: impl Iterator<Item = (u64, u64, u64)>,
) -> Result<Vec<u64>, ElfError> {
    let overflow = ElfError::ValueOutOfRange("section layout");
    let section_table_end = header.section_header_offset.saturating_add(
        u64::from(header.section_header_count) * u64::from(header.section_header_entry_size),
    );
    let program_table_end = header.program_header_offset.saturating_add(
        u64::from(header.program_header_count) * u64::from(header.program_header_entry_size),
    );
    let mut cursor = section_table_end.max(program_table_end);

    let mut offsets = Vec::new();
    for (offset, size, addr_align) in entries {
        if offset == 0 {
            offsets.push(0);
            continue;
        }
        let align = match addr_align {
            0 => 1,
            4 => 16,
            other => other,
        };
        let placed = cursor.checked_next_multiple_of(align).ok_or(overflow)?;
        cursor = placed.checked_add(size).ok_or(overflow)?;
        offsets.push(placed);
    }
    Ok(offsets)
}

/// Rebuilds every section's file offset in index order.
///
/// # Errors
///
/// Returns [`ElfError::ValueOutOfRange`] when the layout would overflow.
pub(crate) fn reassign_offsets(
    header: &Header,
    sections: &mut [Section],
) -> Result<(), ElfError> {
    let offsets = layout_offsets(
        header,
        sections
            .iter()
            .map(|section| (section.offset, section.size, section.addr_align)),
    )?;
    for (section, offset) in sections.iter_mut().zip(offsets) {
        section.offset = offset;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
