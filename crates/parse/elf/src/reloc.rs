//! Relocation table codec.
//!
//! Handles both the addend-less and explicit-addend record layouts. The
//! packed `info` word is split into symbol index and relocation type on
//! decode and recomposed on encode, so the split never goes stale.

use crate::header::{Class, Endianness};
use crate::view::ByteView;
use crate::{ElfError, SectionDefect};

/// Size of an ELF32 relocation record without addend.
const REL_SIZE_32: usize = 0x8;

/// Size of an ELF32 relocation record with addend.
const RELA_SIZE_32: usize = 0xC;

/// A decoded relocation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    /// Location to patch, as a virtual address or section offset.
    pub address: u64,
    /// Index into the symbol table named by the owning section's `link`
    /// field.
    pub symbol_index: u32,
    /// Processor-specific relocation type.
    pub rel_type: u32,
    /// Explicit addend. `Some` only for records decoded from an
    /// addend-carrying table.
    pub addend: Option<i64>,
}

/// Decodes a relocation table payload into its records.
///
/// The record count is `data.len() / entry_size`; trailing bytes smaller
/// than one entry are ignored. `has_addend` selects the explicit-addend
/// layout.
///
/// # Errors
///
/// Returns [`ElfError::MalformedSection`] when the entry size is zero or an
/// entry is too small for the declared layout.
pub fn decode_relocations(
    data: &[u8],
    class: Class,
    endianness: Endianness,
    entry_size: usize,
    has_addend: bool,
    section: usize,
) -> Result<Vec<Relocation>, ElfError> {
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
    let mut relocations = Vec::with_capacity(count);
    for i in 0..count {
        let entry = view.slice(i * entry_size, entry_size).ok_or(truncated)?;
        let relocation = match class {
            Class::Elf32 => {
                let info = entry.u32(4).ok_or(truncated)?;
                Relocation {
                    address: u64::from(entry.u32(0).ok_or(truncated)?),
                    symbol_index: info >> 8,
                    rel_type: info & 0xFF,
                    addend: if has_addend {
                        Some(i64::from(entry.i32(8).ok_or(truncated)?))
                    } else {
                        None
                    },
                }
            }
            Class::Elf64 => {
                let info = entry.u64(8).ok_or(truncated)?;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "both halves of the info word are masked to 32 bits"
                )]
                let (symbol_index, rel_type) = ((info >> 32) as u32, (info & 0xFFFF_FFFF) as u32);
                Relocation {
                    address: entry.u64(0).ok_or(truncated)?,
                    symbol_index,
                    rel_type,
                    addend: if has_addend {
                        Some(entry.i64(16).ok_or(truncated)?)
                    } else {
                        None
                    },
                }
            }
        };
        relocations.push(relocation);
    }
    Ok(relocations)
}

/// Serializes relocation records back to ELF32 big-endian bytes. The addend
/// word is emitted only when `has_addend` is set, regardless of what the
/// individual records carry.
///
/// # Errors
///
/// Returns [`ElfError::ValueOutOfRange`] when a field does not fit the
/// 32-bit record layout, and [`ElfError::MalformedSection`] when the entry
/// size is zero or smaller than one record.
pub fn pack_relocations(
    relocations: &[Relocation],
    entry_size: usize,
    has_addend: bool,
    section: usize,
) -> Result<Vec<u8>, ElfError> {
    let record_size = if has_addend { RELA_SIZE_32 } else { REL_SIZE_32 };
    if entry_size < record_size {
        return Err(ElfError::MalformedSection {
            section,
            defect: if entry_size == 0 {
                SectionDefect::ZeroEntrySize
            } else {
                SectionDefect::TruncatedEntry
            },
        });
    }

    let mut buf = vec![0u8; relocations.len() * entry_size];
    for (i, relocation) in relocations.iter().enumerate() {
        let address = u32::try_from(relocation.address)
            .map_err(|_| ElfError::ValueOutOfRange("relocation address"))?;
        if relocation.symbol_index > 0x00FF_FFFF {
            return Err(ElfError::ValueOutOfRange("relocation symbol index"));
        }
        if relocation.rel_type > 0xFF {
            return Err(ElfError::ValueOutOfRange("relocation type"));
        }
        let info = (relocation.symbol_index << 8) | relocation.rel_type;

        let out = &mut buf[i * entry_size..i * entry_size + record_size];
        out[0..4].copy_from_slice(&address.to_be_bytes());
        out[4..8].copy_from_slice(&info.to_be_bytes());
        if has_addend {
            let addend = i32::try_from(relocation.addend.unwrap_or(0))
                .map_err(|_| ElfError::ValueOutOfRange("relocation addend"))?;
            out[8..12].copy_from_slice(&addend.to_be_bytes());
        }
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds one big-endian ELF32 relocation record, with or without the
    /// addend word.
    fn make_rel32(address: u32, symbol: u32, rel_type: u32, addend: Option<i32>) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&address.to_be_bytes());
        b.extend_from_slice(&((symbol << 8) | rel_type).to_be_bytes());
        if let Some(addend) = addend {
            b.extend_from_slice(&addend.to_be_bytes());
        }
        b
    }

    /// Builds one big-endian ELF64 explicit-addend relocation record.
    fn make_rela64(address: u64, symbol: u32, rel_type: u32, addend: i64) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&address.to_be_bytes());
        b.extend_from_slice(&((u64::from(symbol) << 32) | u64::from(rel_type)).to_be_bytes());
        b.extend_from_slice(&addend.to_be_bytes());
        b
    }

    #[test]
    fn decode_elf32_without_addend() {
        let data = make_rel32(0x0200_0040, 7, 26, None);
        let relocations =
            decode_relocations(&data, Class::Elf32, Endianness::Big, REL_SIZE_32, false, 0)
                .unwrap();
        assert_eq!(
            relocations,
            vec![Relocation {
                address: 0x0200_0040,
                symbol_index: 7,
                rel_type: 26,
                addend: None,
            }]
        );
    }

    #[test]
    fn decode_elf32_with_negative_addend() {
        let data = make_rel32(0x10, 1, 4, Some(-8));
        let relocations =
            decode_relocations(&data, Class::Elf32, Endianness::Big, RELA_SIZE_32, true, 0)
                .unwrap();
        assert_eq!(relocations[0].addend, Some(-8));
    }

    #[test]
    fn decode_elf64_splits_info_word() {
        let data = make_rela64(0x1000, 0x0001_0002, 0x0000_0026, 16);
        let relocations =
            decode_relocations(&data, Class::Elf64, Endianness::Big, 0x18, true, 0).unwrap();
        let rel = &relocations[0];
        assert_eq!(rel.symbol_index, 0x0001_0002);
        assert_eq!(rel.rel_type, 0x26);
        assert_eq!(rel.addend, Some(16));
    }

    #[test]
    fn decode_rejects_zero_entry_size() {
        let data = make_rel32(0, 0, 0, None);
        assert_eq!(
            decode_relocations(&data, Class::Elf32, Endianness::Big, 0, false, 2),
            Err(ElfError::MalformedSection {
                section: 2,
                defect: SectionDefect::ZeroEntrySize
            })
        );
    }

    #[test]
    fn decode_rejects_entry_smaller_than_record() {
        let data = [0u8; 0x18];
        assert_eq!(
            decode_relocations(&data, Class::Elf32, Endianness::Big, 4, true, 2),
            Err(ElfError::MalformedSection {
                section: 2,
                defect: SectionDefect::TruncatedEntry
            })
        );
    }

    #[test]
    fn pack_round_trips_with_addend() {
        let mut data = make_rel32(0x0200_0040, 7, 26, Some(4));
        data.extend_from_slice(&make_rel32(0x0200_0080, 8, 1, Some(-4)));
        let relocations =
            decode_relocations(&data, Class::Elf32, Endianness::Big, RELA_SIZE_32, true, 0)
                .unwrap();
        let packed = pack_relocations(&relocations, RELA_SIZE_32, true, 0).unwrap();
        assert_eq!(packed, data);
    }

    #[test]
    fn pack_omits_addend_for_plain_rel() {
        let relocations = vec![Relocation {
            address: 0x20,
            symbol_index: 3,
            rel_type: 2,
            addend: Some(123),
        }];
        let packed = pack_relocations(&relocations, REL_SIZE_32, false, 0).unwrap();
        assert_eq!(packed, make_rel32(0x20, 3, 2, None));
    }

    #[test]
    fn pack_rejects_oversized_symbol_index() {
        let relocations = vec![Relocation {
            address: 0,
            symbol_index: 0x0100_0000,
            rel_type: 0,
            addend: None,
        }];
        assert_eq!(
            pack_relocations(&relocations, REL_SIZE_32, false, 0),
            Err(ElfError::ValueOutOfRange("relocation symbol index"))
        );
    }
}
