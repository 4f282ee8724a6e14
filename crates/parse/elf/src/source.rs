//! Byte sources feeding the decoder.
//!
//! The decoder pulls the whole image through a [`ByteSource`] once and never
//! retains the source afterwards. Sources hand back exactly the requested
//! bytes or fail; short reads never surface as truncated buffers.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::LoadError;

/// Positioned byte input of known size.
pub trait ByteSource {
    /// Total size of the source in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the size cannot be determined.
    fn size(&mut self) -> Result<u64, LoadError>;

    /// Reads exactly `len` bytes starting at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the read would run past the end of
    /// the source or the underlying input fails.
    fn read_at(&mut self, len: usize, pos: u64) -> Result<Vec<u8>, LoadError>;
}

/// Source over an in-memory byte slice.
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    /// Wraps borrowed bytes.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl ByteSource for SliceSource<'_> {
    fn size(&mut self) -> Result<u64, LoadError> {
        Ok(self.data.len() as u64)
    }

    fn read_at(&mut self, len: usize, pos: u64) -> Result<Vec<u8>, LoadError> {
        let eof = || {
            LoadError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read past end of slice",
            ))
        };
        let start = usize::try_from(pos).map_err(|_| eof())?;
        let end = start.checked_add(len).ok_or_else(eof)?;
        self.data.get(start..end).map(Vec::from).ok_or_else(eof)
    }
}

/// Source over a file on disk.
#[derive(Debug)]
pub struct FileSource {
    file: File,
}

impl FileSource {
    /// Opens the file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Ok(Self {
            file: File::open(path)?,
        })
    }
}

impl ByteSource for FileSource {
    fn size(&mut self) -> Result<u64, LoadError> {
        Ok(self.file.metadata()?.len())
    }

    fn read_at(&mut self, len: usize, pos: u64) -> Result<Vec<u8>, LoadError> {
        self.file.seek(SeekFrom::Start(pos))?;
        let mut buf = vec![0u8; len];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
