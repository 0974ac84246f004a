use crc32fast::Hasher as Crc32;

use crate::{path_bytes, DataFileDesc, DescError, Timestamp};

/// Whether a dataset holds observed history or forecast runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetKind {
    #[default]
    Historical,
    Forecast,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Historical => "historical",
            DatasetKind::Forecast => "forecast",
        }
    }
}

/// Lightweight summary of a dataset's file set, used to decide whether a
/// persisted index still matches the files it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fingerprint {
    pub file_count: u32,
    pub sample_count: u64,
    /// CRC32 over each file's path, sample count, first/last timestamp and
    /// modification marker, in dataset order.
    pub digest: u32,
}

impl Fingerprint {
    /// Fingerprints a list of files in the given order.
    pub fn of(files: &[DataFileDesc]) -> Self {
        let mut hasher = Crc32::new();
        let mut sample_count = 0u64;
        for file in files {
            let lossy;
            let path = match path_bytes(file.path()) {
                Some(raw) => raw,
                None => {
                    lossy = file.path().to_string_lossy();
                    lossy.as_bytes()
                }
            };
            hasher.update(&(path.len() as u64).to_le_bytes());
            hasher.update(path);
            hasher.update(&(file.sample_count() as u64).to_le_bytes());
            hasher.update(&file.first_timestamp().unwrap_or(0).to_le_bytes());
            hasher.update(&file.last_timestamp().unwrap_or(0).to_le_bytes());
            hasher.update(&file.marker().to_le_bytes());
            sample_count += file.sample_count() as u64;
        }
        Self {
            file_count: files.len() as u32,
            sample_count,
            digest: hasher.finalize(),
        }
    }
}

/// A named collection of data files forming one logical dataset.
///
/// No timestamp appears in more than one member file; this is checked at
/// construction. Files keep the order they were given in, which is also the
/// order that defines their file ids in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDesc {
    name: String,
    kind: DatasetKind,
    files: Vec<DataFileDesc>,
}

impl DatasetDesc {
    /// Creates a dataset after checking that no two files share a timestamp.
    ///
    /// # Errors
    ///
    /// [`DescError::EmptyDatasetName`] or [`DescError::Overlap`].
    pub fn new(
        name: impl Into<String>,
        kind: DatasetKind,
        files: Vec<DataFileDesc>,
    ) -> Result<Self, DescError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DescError::EmptyDatasetName);
        }
        check_disjoint(&files)?;
        Ok(Self { name, kind, files })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn is_historical(&self) -> bool {
        self.kind == DatasetKind::Historical
    }

    pub fn is_forecast(&self) -> bool {
        self.kind == DatasetKind::Forecast
    }

    /// Member files in dataset order.
    pub fn files(&self) -> &[DataFileDesc] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of timestamps across all files.
    pub fn sample_count(&self) -> u64 {
        self.files.iter().map(|f| f.sample_count() as u64).sum()
    }

    /// Returns a copy of this dataset under a different name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.name = name;
        }
        self
    }

    /// Computes the dataset's current fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.files)
    }
}

/// Fails if any timestamp is covered by two files.
///
/// Files whose `[first, last]` spans do not intersect are accepted without
/// looking at individual timestamps. Otherwise every timestamp is tagged with
/// its file and the sorted list is checked for neighbours with equal keys.
fn check_disjoint(files: &[DataFileDesc]) -> Result<(), DescError> {
    let mut spans: Vec<(Timestamp, Timestamp)> = files
        .iter()
        .filter_map(|f| Some((f.first_timestamp()?, f.last_timestamp()?)))
        .collect();
    spans.sort_unstable();
    if spans.windows(2).all(|w| w[0].1 < w[1].0) {
        return Ok(());
    }

    let mut tagged: Vec<(Timestamp, usize)> = files
        .iter()
        .enumerate()
        .flat_map(|(i, f)| f.timestamps().iter().map(move |&ts| (ts, i)))
        .collect();
    tagged.sort_unstable();

    for w in tagged.windows(2) {
        if w[0].0 == w[1].0 {
            return Err(DescError::Overlap {
                timestamp: w[0].0,
                first: files[w[0].1].path().to_path_buf(),
                second: files[w[1].1].path().to_path_buf(),
            });
        }
    }
    Ok(())
}
