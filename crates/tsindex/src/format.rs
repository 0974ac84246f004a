//! Index file binary format constants and header/entry read/write helpers.
//!
//! ## Header (36 bytes)
//!
//! ```text
//! [magic: u32][version: u16][reserved: u16][file_count: u32][entry_count: u64]
//! [fp_file_count: u32][fp_sample_count: u64][fp_digest: u32]
//! ```
//!
//! The reader checks the magic first, then the version, and only then the
//! trailing checksum, so a file from a newer format version is reported as a
//! version mismatch rather than as corruption.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use std::io::{self, Read, Result as IoResult, Write};

use crate::{Fingerprint, IndexEntry};

/// Magic number identifying timestamp index files (ASCII "TSI1").
pub const INDEX_MAGIC: u32 = 0x5453_4931;

/// The only format version this crate reads and writes.
pub const INDEX_VERSION: u16 = 1;

/// File extension used for index files.
pub const INDEX_EXTENSION: &str = "tsi";

/// Size of the header in bytes.
pub const HEADER_BYTES: u64 = 4 + 2 + 2 + 4 + 8 + 4 + 8 + 4;

/// Size of one entry: timestamp (8) + file_id (4) + position (8).
pub const ENTRY_BYTES: u64 = 8 + 4 + 8;

/// Size of the trailing CRC32.
pub const FOOTER_BYTES: u64 = 4;

/// Longest data file path we accept in the file table (4 KiB).
/// Prevents huge allocations on corrupt files.
pub const MAX_PATH_BYTES: usize = 4 * 1024;

/// Parsed index header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    pub file_count: u32,
    pub entry_count: u64,
    pub fingerprint: Fingerprint,
}

impl Header {
    pub fn write_to<W: Write>(&self, w: &mut W) -> IoResult<()> {
        w.write_u32::<LittleEndian>(INDEX_MAGIC)?;
        w.write_u16::<LittleEndian>(self.version)?;
        w.write_u16::<LittleEndian>(0)?;
        w.write_u32::<LittleEndian>(self.file_count)?;
        w.write_u64::<LittleEndian>(self.entry_count)?;
        w.write_u32::<LittleEndian>(self.fingerprint.file_count)?;
        w.write_u64::<LittleEndian>(self.fingerprint.sample_count)?;
        w.write_u32::<LittleEndian>(self.fingerprint.digest)?;
        Ok(())
    }

    /// Reads the header fields that follow magic and version.
    pub fn read_rest<R: Read>(r: &mut R, version: u16) -> IoResult<Self> {
        let _reserved = r.read_u16::<LittleEndian>()?;
        let file_count = r.read_u32::<LittleEndian>()?;
        let entry_count = r.read_u64::<LittleEndian>()?;
        let fingerprint = Fingerprint {
            file_count: r.read_u32::<LittleEndian>()?,
            sample_count: r.read_u64::<LittleEndian>()?,
            digest: r.read_u32::<LittleEndian>()?,
        };
        Ok(Self {
            version,
            file_count,
            entry_count,
            fingerprint,
        })
    }
}

pub fn write_entry<W: Write>(w: &mut W, entry: &IndexEntry) -> IoResult<()> {
    w.write_u64::<LittleEndian>(entry.timestamp)?;
    w.write_u32::<LittleEndian>(entry.file_id)?;
    w.write_u64::<LittleEndian>(entry.position)?;
    Ok(())
}

pub fn read_entry<R: Read>(r: &mut R) -> IoResult<IndexEntry> {
    Ok(IndexEntry {
        timestamp: r.read_u64::<LittleEndian>()?,
        file_id: r.read_u32::<LittleEndian>()?,
        position: r.read_u64::<LittleEndian>()?,
    })
}

/// Writer adapter that feeds every byte it passes through into a CRC32.
pub struct CrcWriter<W: Write> {
    inner: W,
    hasher: Crc32,
}

impl<W: Write> CrcWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Crc32::new(),
        }
    }

    /// Writes the checksum of everything written so far (not itself
    /// checksummed) and returns the inner writer.
    pub fn finish(mut self) -> IoResult<W> {
        let crc = self.hasher.finalize();
        self.inner.write_u32::<LittleEndian>(crc)?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for CrcWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
