use super::{data_file, entry};
use crate::*;

// -------------------- Ordered files (concatenation path) --------------------

#[test]
fn ordered_files_concatenate() {
    let files = vec![data_file("a.nc", &[10, 20, 30]), data_file("b.nc", &[40, 50])];
    let entries = build_entries(&files).unwrap();
    assert_eq!(
        entries,
        vec![
            entry(10, 0, 0),
            entry(20, 0, 1),
            entry(30, 0, 2),
            entry(40, 1, 0),
            entry(50, 1, 1),
        ]
    );
}

#[test]
fn no_files_builds_empty_index() {
    assert!(build_entries(&[]).unwrap().is_empty());
}

#[test]
fn empty_files_are_skipped() {
    let files = vec![
        data_file("a.nc", &[]),
        data_file("b.nc", &[5]),
        data_file("c.nc", &[]),
    ];
    assert_eq!(build_entries(&files).unwrap(), vec![entry(5, 1, 0)]);
}

// -------------------- Unordered files (heap merge path) --------------------

#[test]
fn reversed_files_are_merged() {
    let files = vec![data_file("b.nc", &[40, 50]), data_file("a.nc", &[10, 20, 30])];
    let entries = build_entries(&files).unwrap();
    let ts: Vec<u64> = entries.iter().map(|e| e.timestamp).collect();
    assert_eq!(ts, vec![10, 20, 30, 40, 50]);
    assert_eq!(entries[0], entry(10, 1, 0));
    assert_eq!(entries[4], entry(50, 0, 1));
}

#[test]
fn interleaved_files_are_merged() {
    let files = vec![data_file("a.nc", &[1, 4, 7]), data_file("b.nc", &[2, 3, 9])];
    let entries = build_entries(&files).unwrap();
    assert_eq!(
        entries,
        vec![
            entry(1, 0, 0),
            entry(2, 1, 0),
            entry(3, 1, 1),
            entry(4, 0, 1),
            entry(7, 0, 2),
            entry(9, 1, 2),
        ]
    );
}

#[test]
fn many_files_merge_in_order() {
    // 8 files, file i holds i, i+8, i+16, ...
    let files: Vec<_> = (0..8u64)
        .map(|i| {
            let ts: Vec<u64> = (0..100).map(|k| i + k * 8).collect();
            data_file(&format!("f{i}.nc"), &ts)
        })
        .collect();
    let entries = build_entries(&files).unwrap();
    assert_eq!(entries.len(), 800);
    for (n, e) in entries.iter().enumerate() {
        assert_eq!(e.timestamp, n as u64);
        assert_eq!(e.file_id as u64, n as u64 % 8);
        assert_eq!(e.position, n as u64 / 8);
    }
}

// -------------------- Overlap --------------------

#[test]
fn shared_timestamp_is_overlap() {
    let files = vec![data_file("a.nc", &[10, 25]), data_file("b.nc", &[25, 40])];
    match build_entries(&files) {
        Err(IndexError::Overlap {
            timestamp,
            first_file,
            second_file,
        }) => {
            assert_eq!(timestamp, 25);
            assert_eq!(first_file, 0);
            assert_eq!(second_file, 1);
        }
        other => panic!("expected overlap, got {other:?}"),
    }
}

#[test]
fn overlap_in_unordered_files_is_detected() {
    let files = vec![
        data_file("a.nc", &[50, 60]),
        data_file("b.nc", &[1, 2]),
        data_file("c.nc", &[3, 60]),
    ];
    assert!(matches!(
        build_entries(&files),
        Err(IndexError::Overlap { timestamp: 60, .. })
    ));
}

#[test]
fn merge_stops_after_error() {
    let files = vec![data_file("a.nc", &[1, 2]), data_file("b.nc", &[1, 3])];
    let mut merge = EntryMerge::new(&files);
    assert!(merge.next_entry().is_err());
    assert!(merge.next_entry().unwrap().is_none());
}

#[test]
fn merge_as_iterator() {
    let files = vec![data_file("a.nc", &[2]), data_file("b.nc", &[1])];
    let ts: Vec<u64> = EntryMerge::new(&files)
        .map(|e| e.unwrap().timestamp)
        .collect();
    assert_eq!(ts, vec![1, 2]);
}
