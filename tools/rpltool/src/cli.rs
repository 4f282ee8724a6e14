//! Command-line interface definitions for rpltool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// RPL/ELF object file inspector and converter.
#[derive(Parser)]
#[command(name = "rpltool", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress status output; print only requested reports and errors.
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose progress output.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Print header and section information.
    Info(InfoArgs),
    /// Inflate every compressed section and write the result.
    Decompress(DecompressArgs),
    /// Deflate every section that shrinks and write the result.
    Compress(CompressArgs),
}

/// Arguments for the `info` subcommand.
#[derive(Parser)]
pub struct InfoArgs {
    /// Object file to inspect.
    pub file: PathBuf,

    /// Print the section table.
    #[arg(long, short = 's')]
    pub sections: bool,

    /// Print symbol tables.
    #[arg(long, short = 'y')]
    pub symbols: bool,

    /// Print relocation tables.
    #[arg(long, short = 'r')]
    pub relocations: bool,

    /// Print string tables.
    #[arg(long, short = 't')]
    pub strings: bool,

    /// Print the RPL FILEINFO section.
    #[arg(long, short = 'i')]
    pub file_info: bool,

    /// Print everything, hexdumping sections with no decoded form.
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Arguments for the `decompress` subcommand.
#[derive(Parser)]
pub struct DecompressArgs {
    /// Input object file.
    pub input: PathBuf,

    /// Output path.
    pub output: PathBuf,
}

/// Arguments for the `compress` subcommand.
#[derive(Parser)]
pub struct CompressArgs {
    /// Input object file.
    pub input: PathBuf,

    /// Output path.
    pub output: PathBuf,

    /// Deflate level, 0 (store) through 9 (best).
    #[arg(long, short = 'l', default_value_t = 6)]
    pub level: u32,
}
