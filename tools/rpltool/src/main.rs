//! RPL/ELF object file tool.
//!
//! Decodes object files through `rplkit-elf`, prints readelf-flavored
//! reports, and rewrites files with their section payloads inflated or
//! deflated.

mod cli;
mod dump;

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rplkit_elf::{Compression, Rpl};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Info(ref args) => cmd_info(&cli, args),
        cli::Command::Decompress(ref args) => cmd_decompress(&cli, args),
        cli::Command::Compress(ref args) => cmd_compress(&cli, args),
    }
}

// ===========================================================================
// Commands
// ===========================================================================

/// Decode a file and print the requested reports.
///
/// The header and section table are shown as stored on disk; payload
/// reports run after an in-memory decompress so compressed tables still
/// print their contents.
fn cmd_info(cli: &cli::Cli, args: &cli::InfoArgs) -> Result<()> {
    let mut file = open(cli, &args.file)?;

    dump::header(&file);
    if args.sections || args.all {
        dump::sections(&file);
    }

    let want_payloads =
        args.symbols || args.relocations || args.strings || args.file_info || args.all;
    if want_payloads {
        let inflated = file
            .decompress()
            .with_context(|| format!("failed to decompress {}", args.file.display()))?;
        if inflated && cli.verbose {
            println!("Decompressed sections in memory for the payload reports.");
        }
    }

    if args.symbols || args.all {
        dump::symbols(&file);
    }
    if args.relocations || args.all {
        dump::relocations(&file);
    }
    if args.strings || args.all {
        dump::strings(&file);
    }
    if args.file_info || args.all {
        dump::file_info(&file);
    }
    if args.all {
        dump::plain_payloads(&file);
    }
    Ok(())
}

/// Inflate every compressed section and write the result.
fn cmd_decompress(cli: &cli::Cli, args: &cli::DecompressArgs) -> Result<()> {
    let mut file = open(cli, &args.input)?;
    let changed = file
        .decompress()
        .with_context(|| format!("failed to decompress {}", args.input.display()))?;
    if !changed && !cli.quiet {
        println!("{}: no compressed sections", args.input.display());
    }
    write_out(cli, &file, &args.output)
}

/// Deflate every section that shrinks and write the result.
fn cmd_compress(cli: &cli::Cli, args: &cli::CompressArgs) -> Result<()> {
    if args.level > 9 {
        bail!("compression level must be between 0 and 9, got {}", args.level);
    }
    let mut file = open(cli, &args.input)?;
    let changed = file
        .compress(Compression::new(args.level))
        .with_context(|| format!("failed to compress {}", args.input.display()))?;
    if !changed && !cli.quiet {
        println!("{}: nothing shrank", args.input.display());
    }
    write_out(cli, &file, &args.output)
}

// ===========================================================================
// Shared plumbing
// ===========================================================================

fn open(cli: &cli::Cli, path: &Path) -> Result<Rpl> {
    let file =
        Rpl::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    if cli.verbose {
        println!(
            "Decoded {} with {} sections.",
            path.display(),
            file.sections.len()
        );
    }
    Ok(file)
}

fn write_out(cli: &cli::Cli, file: &Rpl, path: &Path) -> Result<()> {
    let bytes = file
        .encode()
        .with_context(|| format!("failed to encode {}", path.display()))?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    if !cli.quiet {
        println!("{}: wrote {} bytes", path.display(), bytes.len());
    }
    Ok(())
}
