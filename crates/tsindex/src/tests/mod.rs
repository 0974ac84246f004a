mod merge_tests;
mod scoped_tests;
mod writer_tests;

use crate::{FileRecord, Fingerprint, IndexEntry};
use dataset::{DataFileDesc, VariableDesc};
use std::path::PathBuf;

pub(crate) fn data_file(path: &str, ts: &[u64]) -> DataFileDesc {
    let var = VariableDesc::new("votemper", vec![4]).unwrap();
    DataFileDesc::new(ts.to_vec(), vec![var], path).unwrap()
}

pub(crate) fn entry(timestamp: u64, file_id: u32, position: u64) -> IndexEntry {
    IndexEntry {
        timestamp,
        file_id,
        position,
    }
}

/// Two files: A = [10, 20, 30], B = [40, 50].
pub(crate) fn sample_index() -> (Fingerprint, Vec<FileRecord>, Vec<IndexEntry>) {
    let fp = Fingerprint {
        file_count: 2,
        sample_count: 5,
        digest: 0xDEAD_BEEF,
    };
    let files = vec![
        FileRecord {
            path: PathBuf::from("data/a.nc"),
            samples: 3,
        },
        FileRecord {
            path: PathBuf::from("data/b.nc"),
            samples: 2,
        },
    ];
    let entries = vec![
        entry(10, 0, 0),
        entry(20, 0, 1),
        entry(30, 0, 2),
        entry(40, 1, 0),
        entry(50, 1, 1),
    ];
    (fp, files, entries)
}
