use super::sample_index;
use crate::*;
use anyhow::Result;
use std::fs;
use tempfile::tempdir;

#[test]
fn write_creates_file_and_removes_tmp() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sst.tsi");
    let (fp, files, entries) = sample_index();

    IndexWriter::write(&path, fp, &files, &entries)?;

    assert!(path.exists());
    assert!(!IndexWriter::tmp_path(&path).exists());
    Ok(())
}

#[test]
fn written_size_matches_layout() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sst.tsi");
    let (fp, files, entries) = sample_index();

    IndexWriter::write(&path, fp, &files, &entries)?;

    let paths: u64 = files.iter().map(|f| 4 + f.path.to_string_lossy().len() as u64 + 8).sum();
    let expected = HEADER_BYTES + paths + entries.len() as u64 * ENTRY_BYTES + FOOTER_BYTES;
    assert_eq!(fs::metadata(&path)?.len(), expected);
    Ok(())
}

#[test]
fn tmp_path_appends_suffix() {
    let p = std::path::Path::new("/idx/sst.tsi");
    assert_eq!(IndexWriter::tmp_path(p), std::path::Path::new("/idx/sst.tsi.tmp"));
}

#[test]
fn overwrite_replaces_previous_index() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sst.tsi");
    let (fp, files, entries) = sample_index();

    IndexWriter::write(&path, fp, &files, &entries)?;
    IndexWriter::write(&path, fp, &files, &entries[..2])?;

    let contents = IndexReader::open(&path)?;
    assert_eq!(contents.entries.len(), 2);
    Ok(())
}

#[test]
fn failed_write_keeps_previous_index() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sst.tsi");
    let (fp, files, entries) = sample_index();
    IndexWriter::write(&path, fp, &files, &entries)?;

    let long = FileRecord {
        path: "x".repeat(MAX_PATH_BYTES + 1).into(),
        samples: 1,
    };
    let res = IndexWriter::write(&path, fp, &[long], &[]);
    assert!(matches!(res, Err(IndexError::Unencodable(ref m)) if m.contains("exceeds maximum")));
    assert!(!res.unwrap_err().requires_rebuild());

    // The old index is intact and the temp file was cleaned up.
    assert_eq!(IndexReader::open(&path)?.entries, entries);
    assert!(!IndexWriter::tmp_path(&path).exists());
    Ok(())
}

#[test]
fn write_into_missing_directory_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no/such/dir/sst.tsi");
    let (fp, files, entries) = sample_index();
    let res = IndexWriter::write(&path, fp, &files, &entries);
    assert!(matches!(res, Err(IndexError::Io(_))));
}

#[test]
fn longest_allowed_path_round_trips() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("sst.tsi");
    let (fp, _, _) = sample_index();
    let files = vec![FileRecord {
        path: "y".repeat(MAX_PATH_BYTES).into(),
        samples: 1,
    }];
    let fp = Fingerprint {
        file_count: 1,
        ..fp
    };

    IndexWriter::write(&path, fp, &files, &[])?;
    assert_eq!(IndexReader::open(&path)?.files, files);
    Ok(())
}

#[cfg(unix)]
#[test]
fn non_utf8_path_round_trips_exactly() -> Result<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir()?;
    let path = dir.path().join("sst.tsi");
    let (fp, mut files, entries) = sample_index();
    files[0].path = OsStr::from_bytes(b"data/\xffsst.nc").into();

    IndexWriter::write(&path, fp, &files, &entries)?;

    let contents = IndexReader::open(&path)?;
    assert_eq!(contents.files[0].path.as_os_str().as_bytes(), b"data/\xffsst.nc");
    assert_eq!(contents.files, files);
    Ok(())
}
