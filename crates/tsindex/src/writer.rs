use std::fs::{self, rename, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use dataset::path_bytes;

use crate::format::{write_entry, CrcWriter, Header};
use crate::{FileRecord, Fingerprint, IndexEntry, IndexError, Scoped, INDEX_VERSION, MAX_PATH_BYTES};

/// Writes index files.
///
/// The write is crash-safe: everything goes to `<path>.tmp`, which is
/// fsynced and then atomically renamed over `path`. Until the rename succeeds
/// a previous index file at `path` is left untouched; if anything fails the
/// temporary file is removed.
pub struct IndexWriter {}

impl IndexWriter {
    /// Returns the temporary path used while writing `path`.
    pub fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Persists an index to `path`.
    ///
    /// `entries` must be sorted by timestamp and every `file_id` must index
    /// into `files`; the reader rejects files that violate either.
    ///
    /// # Errors
    ///
    /// [`IndexError::Io`] on any I/O failure. [`IndexError::Unencodable`] if
    /// a file path is longer than [`MAX_PATH_BYTES`] or has no byte form, or
    /// if there are more files than a `u32` can count.
    pub fn write(
        path: &Path,
        fingerprint: Fingerprint,
        files: &[FileRecord],
        entries: &[IndexEntry],
    ) -> Result<(), IndexError> {
        let file_count = u32::try_from(files.len()).map_err(|_| {
            IndexError::Unencodable(format!(
                "{} data files exceed the file table limit",
                files.len()
            ))
        })?;

        let tmp = Scoped::new(Self::tmp_path(path), |p: PathBuf| {
            let _ = fs::remove_file(&p);
        });

        let raw_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(tmp.get())?;
        let mut out = CrcWriter::new(BufWriter::new(raw_file));

        let header = Header {
            version: INDEX_VERSION,
            file_count,
            entry_count: entries.len() as u64,
            fingerprint,
        };
        header.write_to(&mut out)?;

        // FILE TABLE
        for file in files {
            let p = path_bytes(&file.path).ok_or_else(|| {
                IndexError::Unencodable(format!(
                    "data file path {} is not valid UTF-8",
                    file.path.display()
                ))
            })?;
            if p.len() > MAX_PATH_BYTES {
                return Err(IndexError::Unencodable(format!(
                    "data file path of {} bytes exceeds maximum {}",
                    p.len(),
                    MAX_PATH_BYTES
                )));
            }
            // bounded by MAX_PATH_BYTES above
            out.write_u32::<LittleEndian>(p.len() as u32)?;
            out.write_all(p)?;
            out.write_u64::<LittleEndian>(file.samples)?;
        }

        // ENTRIES
        for entry in entries {
            write_entry(&mut out, entry)?;
        }

        // FOOTER, then flush BufWriter and sync the underlying file
        let mut buffered = out.finish()?;
        buffered.flush()?;
        buffered.into_inner().map_err(|e| e.into_error())?.sync_all()?;

        rename(tmp.get(), path)?;
        tmp.dismiss();

        // Fsync the parent directory so the rename itself is durable.
        if let Some(parent) = path.parent() {
            if let Ok(dir) = fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }
}
