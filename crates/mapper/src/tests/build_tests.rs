use super::{data_file, dataset, two_file_dataset};
use crate::*;
use std::path::Path;

#[test]
fn build_indexes_every_timestamp() -> Result<(), IndexError> {
    let mut m = TimestampMapper::new("unused.tsi");
    m.build(&two_file_dataset())?;

    assert_eq!(m.len(), 5);
    assert_eq!(m.file_count(), 2);
    assert_eq!(m.first_timestamp(), Some(10));
    assert_eq!(m.last_timestamp(), Some(50));
    assert!(m.is_ready());
    assert_eq!(m.file_path(1), Some(Path::new("b.nc")));
    assert_eq!(m.file_samples(0), Some(3));
    Ok(())
}

#[test]
fn build_empty_dataset() -> Result<(), IndexError> {
    let mut m = TimestampMapper::new("unused.tsi");
    m.build(&dataset("empty", vec![]))?;

    assert!(m.is_empty());
    assert!(m.is_ready());
    assert_eq!(m.first_timestamp(), None);
    Ok(())
}

#[test]
fn build_out_of_order_files() -> Result<(), IndexError> {
    let mut m = TimestampMapper::new("unused.tsi");
    m.build(&dataset(
        "rev",
        vec![data_file("late.nc", &[100, 200]), data_file("early.nc", &[1, 2, 3])],
    ))?;

    assert_eq!(m.lookup(1)?, Location { file_id: 1, position: 0 });
    assert_eq!(m.lookup(200)?, Location { file_id: 0, position: 1 });
    let ts: Vec<u64> = m.range(0, u64::MAX)?.map(|e| e.timestamp).collect();
    assert_eq!(ts, vec![1, 2, 3, 100, 200]);
    Ok(())
}

#[test]
fn shared_timestamp_fails_with_overlap() {
    let files = vec![data_file("a.nc", &[10, 25]), data_file("b.nc", &[25, 40])];
    let mut m = TimestampMapper::new("unused.tsi");
    let err = m.build_files(&files).unwrap_err();
    assert!(matches!(err, IndexError::Overlap { timestamp: 25, .. }));
    assert!(!err.requires_rebuild());
}

#[test]
fn failed_build_keeps_previous_index() -> Result<(), IndexError> {
    let mut m = TimestampMapper::new("unused.tsi");
    m.build(&two_file_dataset())?;
    let fp = m.fingerprint();

    let bad = vec![data_file("x.nc", &[1, 2]), data_file("y.nc", &[2])];
    assert!(m.build_files(&bad).is_err());

    assert_eq!(m.len(), 5);
    assert_eq!(m.fingerprint(), fp);
    assert_eq!(m.lookup(30)?, Location { file_id: 0, position: 2 });
    Ok(())
}

#[test]
fn rebuild_replaces_index() -> Result<(), IndexError> {
    let mut m = TimestampMapper::new("unused.tsi");
    m.build(&two_file_dataset())?;
    m.build(&dataset("sst", vec![data_file("c.nc", &[7])]))?;

    assert_eq!(m.len(), 1);
    assert!(matches!(m.lookup(10), Err(IndexError::NotFound(10))));
    assert_eq!(m.file_path(0), Some(Path::new("c.nc")));
    Ok(())
}

#[test]
fn clear_discards_in_memory_index() -> Result<(), IndexError> {
    let mut m = TimestampMapper::new("unused.tsi");
    m.build(&two_file_dataset())?;
    m.clear();

    assert!(m.is_empty());
    assert!(!m.is_ready());
    assert_eq!(m.file_count(), 0);
    Ok(())
}

#[test]
fn dataset_name_is_sanitized_into_index_path() {
    let m = TimestampMapper::for_dataset("/idx", "Sea Surface/Temp");
    assert_eq!(m.index_path(), Path::new("/idx/sea_surface_temp.tsi"));
    assert_eq!(sanitize_dataset_name("GIOPS-daily_v2"), "giops-daily_v2");
}
