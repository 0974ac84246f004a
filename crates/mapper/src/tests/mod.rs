mod build_tests;

use dataset::{DataFileDesc, DatasetDesc, DatasetKind, VariableDesc};

pub(crate) fn data_file(path: &str, ts: &[u64]) -> DataFileDesc {
    let var = VariableDesc::new("votemper", vec![40, 50]).unwrap();
    DataFileDesc::new(ts.to_vec(), vec![var], path).unwrap()
}

pub(crate) fn dataset(name: &str, files: Vec<DataFileDesc>) -> DatasetDesc {
    DatasetDesc::new(name, DatasetKind::Historical, files).unwrap()
}

/// File A covers [10, 20, 30], file B covers [40, 50].
pub(crate) fn two_file_dataset() -> DatasetDesc {
    dataset(
        "sst",
        vec![data_file("a.nc", &[10, 20, 30]), data_file("b.nc", &[40, 50])],
    )
}
