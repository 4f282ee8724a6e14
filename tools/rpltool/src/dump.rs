//! Readelf-flavored text reports over a decoded object file.

use rplkit_elf::Rpl;
use rplkit_elf::section::Payload;
use rplkit_elf::symbol::SHN_ABS;

/// Prints the fixed header block.
pub fn header(file: &Rpl) {
    let h = &file.header;
    println!("ELF Header:");
    println!("  Class:           {}", h.class);
    println!("  Endianness:      {}", h.endianness);
    println!("  Version:         {}", h.version);
    println!("  ABI:             {} ({})", h.abi, h.abi_version);
    println!("  Type:            {}", h.file_type);
    println!("  Machine:         {}", h.machine);
    println!("  Entry:           0x{:08X}", h.entry);
    println!("  Flags:           0x{:08X}", h.flags);
    println!(
        "  Section headers: {} entries of 0x{:X} bytes at 0x{:X}",
        h.section_header_count, h.section_header_entry_size, h.section_header_offset
    );
    println!(
        "  Program headers: {} entries of 0x{:X} bytes at 0x{:X}",
        h.program_header_count, h.program_header_entry_size, h.program_header_offset
    );
    println!("  Name table:      section {}", h.shstr_index);
}

/// Prints the section table.
pub fn sections(file: &Rpl) {
    println!();
    println!("Sections:");
    println!("  [Nr] Name                 Type             Addr     Off    Size   ES Lk Inf Al Flags");
    for (index, section) in file.sections.iter().enumerate() {
        let name = file.section_name(index);
        let kind = section.section_type.to_string();
        let flags = section.flags.to_string();
        println!(
            "  [{index:2}] {name:<20} {kind:<16} {:08X} {:06X} {:06X} {:02X} {:2} {:3} {:2} {flags}",
            section.addr,
            section.offset,
            section.size,
            section.entry_size,
            section.link,
            section.info,
            section.addr_align,
        );
    }
}

/// Prints every decoded symbol table.
pub fn symbols(file: &Rpl) {
    for (index, section) in file.sections.iter().enumerate() {
        let Payload::Symbols(symbols) = &section.payload else {
            continue;
        };
        println!();
        println!(
            "Symbol table {} contains {} entries:",
            file.section_name(index),
            symbols.len()
        );
        println!("   Num:    Value  Size Type    Bind   Vis      Ndx Name");
        for (num, symbol) in symbols.iter().enumerate() {
            let kind = symbol.symbol_type().to_string();
            let bind = symbol.binding().to_string();
            let vis = symbol.visibility().to_string();
            let ndx = match symbol.shndx {
                0 => "UND".to_string(),
                SHN_ABS => "ABS".to_string(),
                other => other.to_string(),
            };
            println!(
                "  {num:4}: {:08X} {:5} {kind:<7} {bind:<6} {vis:<8} {ndx:>3} {}",
                symbol.value,
                symbol.size,
                file.symbol_name(index, symbol),
            );
        }
    }
}

/// Prints every decoded relocation table.
pub fn relocations(file: &Rpl) {
    for (index, section) in file.sections.iter().enumerate() {
        let Payload::Relocations(relocations) = &section.payload else {
            continue;
        };
        println!();
        println!(
            "Relocation section {} contains {} entries:",
            file.section_name(index),
            relocations.len()
        );
        println!("    Offset    Type  Symbol  Addend");
        for relocation in relocations {
            let addend = relocation
                .addend
                .map_or(String::new(), |addend| format!("  {addend:#x}"));
            println!(
                "    {:08X}  {:4}  {:6}{addend}",
                relocation.address, relocation.rel_type, relocation.symbol_index
            );
        }
    }
}

/// Prints every decoded string table.
pub fn strings(file: &Rpl) {
    for (index, section) in file.sections.iter().enumerate() {
        let Payload::Strings(table) = &section.payload else {
            continue;
        };
        println!();
        println!(
            "String table {} contains {} entries:",
            file.section_name(index),
            table.len()
        );
        for (offset, value) in table.iter() {
            println!("  0x{offset:06X}: {value}");
        }
    }
}

/// Prints the RPL FILEINFO payload.
pub fn file_info(file: &Rpl) {
    for (index, section) in file.sections.iter().enumerate() {
        let Payload::FileInfo(info) = &section.payload else {
            continue;
        };
        println!();
        println!("RPL file info in {}:", file.section_name(index));
        println!("  version:                0x{:04X}", info.version);
        println!("  text_size:              0x{:08X}", info.text_size);
        println!("  text_align:             0x{:08X}", info.text_align);
        println!("  data_size:              0x{:08X}", info.data_size);
        println!("  data_align:             0x{:08X}", info.data_align);
        println!("  load_size:              0x{:08X}", info.load_size);
        println!("  load_align:             0x{:08X}", info.load_align);
        println!("  temp_size:              0x{:08X}", info.temp_size);
        println!("  tramp_adjust:           0x{:08X}", info.tramp_adjust);
        println!("  sda_base:               0x{:08X}", info.sda_base);
        println!("  sda2_base:              0x{:08X}", info.sda2_base);
        println!("  stack_size:             0x{:08X}", info.stack_size);
        println!("  strings_offset:         0x{:08X}", info.strings_offset);
        println!("  flags:                  0x{:08X}", info.flags);
        println!("  heap_size:              0x{:08X}", info.heap_size);
        println!("  tag_offset:             0x{:08X}", info.tag_offset);
        println!("  min_version:            0x{:08X}", info.min_version);
        println!("  compression_level:      {}", info.compression_level);
        println!("  tramp_addition:         0x{:08X}", info.tramp_addition);
        println!("  file_info_pad:          0x{:08X}", info.file_info_pad);
        println!("  cafe_sdk_version:       0x{:08X}", info.cafe_sdk_version);
        println!("  cafe_sdk_revision:      0x{:08X}", info.cafe_sdk_revision);
        println!("  tls_module_index:       {}", info.tls_module_index);
        println!("  tls_align_shift:        {}", info.tls_align_shift);
        println!("  runtime_file_info_size: 0x{:08X}", info.runtime_file_info_size);
        if !info.strings.is_empty() {
            println!("  strings:");
            for (offset, value) in info.strings.iter() {
                println!("    0x{offset:06X}: {value}");
            }
        }
    }
}

/// Hexdumps every section that has bytes but no decoded form.
pub fn plain_payloads(file: &Rpl) {
    for (index, section) in file.sections.iter().enumerate() {
        if !matches!(section.payload, Payload::Plain) || section.data.is_empty() {
            continue;
        }
        println!();
        println!("Hex dump of section {}:", file.section_name(index));
        hexdump(&section.data);
    }
}

fn hexdump(data: &[u8]) {
    for (row, chunk) in data.chunks(16).enumerate() {
        print!("  {:06X}:", row * 16);
        for byte in chunk {
            print!(" {byte:02X}");
        }
        for _ in chunk.len()..16 {
            print!("   ");
        }
        print!("  ");
        for byte in chunk {
            let shown = if byte.is_ascii_graphic() {
                char::from(*byte)
            } else {
                '.'
            };
            print!("{shown}");
        }
        println!();
    }
}
