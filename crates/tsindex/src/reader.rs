use byteorder::{LittleEndian, ReadBytesExt};
use crc32fast::Hasher as Crc32;
use dataset::path_from_bytes;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

use crate::format::{read_entry, Header};
use crate::{
    FileRecord, IndexContents, IndexEntry, IndexError, ENTRY_BYTES, FOOTER_BYTES, HEADER_BYTES, INDEX_MAGIC,
    INDEX_VERSION, MAX_PATH_BYTES,
};

/// Reads and validates index files.
///
/// The whole file is read into memory (index files hold 20 bytes per sample
/// plus a small file table), checked, and decoded into [`IndexContents`].
pub struct IndexReader {}

/// Maps a short read inside the checksummed body to corruption. The checksum
/// already matched at that point, so running out of bytes means the header
/// counts disagree with the body.
fn truncated(e: io::Error) -> IndexError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        IndexError::Corrupt("unexpected end of index data".to_string())
    } else {
        IndexError::Io(e)
    }
}

impl IndexReader {
    /// Reads the index file at `path`.
    ///
    /// # Validation
    ///
    /// - The file must exist ([`IndexError::Missing`] otherwise).
    /// - It must hold at least a header and footer, and start with the
    ///   `TSI1` magic.
    /// - The version must be [`INDEX_VERSION`] ([`IndexError::VersionMismatch`]).
    /// - The trailing CRC32 must match.
    /// - Counts must agree with the file size, every `file_id` must exist in
    ///   the file table, every position must be inside its file, and
    ///   timestamps must be strictly ascending.
    ///
    /// Everything except a missing file or an I/O failure is reported as
    /// [`IndexError::Corrupt`].
    pub fn open(path: &Path) -> Result<IndexContents, IndexError> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IndexError::Missing(path.to_path_buf()))
            }
            Err(e) => return Err(IndexError::Io(e)),
        };
        Self::decode(&bytes)
    }

    /// Decodes an index from its raw bytes.
    pub fn decode(bytes: &[u8]) -> Result<IndexContents, IndexError> {
        let filesize = bytes.len() as u64;
        if filesize < HEADER_BYTES + FOOTER_BYTES {
            return Err(IndexError::Corrupt(format!(
                "file too small for index header ({} bytes)",
                filesize
            )));
        }

        let mut r = Cursor::new(bytes);
        let magic = r.read_u32::<LittleEndian>()?;
        if magic != INDEX_MAGIC {
            return Err(IndexError::Corrupt(format!("unknown index magic: {:#x}", magic)));
        }
        let version = r.read_u16::<LittleEndian>()?;
        if version != INDEX_VERSION {
            return Err(IndexError::VersionMismatch {
                found: version,
                supported: INDEX_VERSION,
            });
        }

        let body_len = bytes.len() - FOOTER_BYTES as usize;
        let (body, footer) = bytes.split_at(body_len);
        let stored_crc = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
        let mut hasher = Crc32::new();
        hasher.update(body);
        let actual_crc = hasher.finalize();
        if actual_crc != stored_crc {
            return Err(IndexError::Corrupt(format!(
                "CRC32 mismatch: expected {:#010x}, got {:#010x}",
                stored_crc, actual_crc
            )));
        }

        let header = Header::read_rest(&mut r, version).map_err(truncated)?;
        if header.fingerprint.file_count != header.file_count {
            return Err(IndexError::Corrupt(format!(
                "file table has {} files but fingerprint records {}",
                header.file_count, header.fingerprint.file_count
            )));
        }

        let entries_bytes = header
            .entry_count
            .checked_mul(ENTRY_BYTES)
            .filter(|&n| n <= body_len as u64 - HEADER_BYTES)
            .ok_or_else(|| {
                IndexError::Corrupt(format!(
                    "entry_count {} does not fit in a {} byte file",
                    header.entry_count, filesize
                ))
            })?;

        let mut files = Vec::new();
        for _ in 0..header.file_count {
            let path_len = r.read_u32::<LittleEndian>().map_err(truncated)? as usize;
            if path_len > MAX_PATH_BYTES {
                return Err(IndexError::Corrupt(format!(
                    "path_len {} exceeds maximum {}",
                    path_len, MAX_PATH_BYTES
                )));
            }
            let mut raw = vec![0u8; path_len];
            r.read_exact(&mut raw).map_err(truncated)?;
            let path = path_from_bytes(raw).ok_or_else(|| {
                IndexError::Corrupt("data file path is not valid on this platform".to_string())
            })?;
            let samples = r.read_u64::<LittleEndian>().map_err(truncated)?;
            files.push(FileRecord { path, samples });
        }

        if r.position() + entries_bytes != body_len as u64 {
            return Err(IndexError::Corrupt(format!(
                "entry section is {} bytes, expected {}",
                body_len as u64 - r.position(),
                entries_bytes
            )));
        }

        let mut entries: Vec<IndexEntry> = Vec::with_capacity(header.entry_count as usize);
        for i in 0..header.entry_count {
            let entry = read_entry(&mut r).map_err(truncated)?;
            let file = files.get(entry.file_id as usize).ok_or_else(|| {
                IndexError::Corrupt(format!(
                    "entry {} refers to file {} but only {} files are recorded",
                    i,
                    entry.file_id,
                    files.len()
                ))
            })?;
            if entry.position >= file.samples {
                return Err(IndexError::Corrupt(format!(
                    "entry {} position {} is outside file {} ({} samples)",
                    i, entry.position, entry.file_id, file.samples
                )));
            }
            if let Some(prev) = entries.last() {
                if prev.timestamp >= entry.timestamp {
                    return Err(IndexError::Corrupt(format!(
                        "entry {} timestamp {} is not after {}",
                        i, entry.timestamp, prev.timestamp
                    )));
                }
            }
            entries.push(entry);
        }

        Ok(IndexContents {
            fingerprint: header.fingerprint,
            files,
            entries,
        })
    }
}
