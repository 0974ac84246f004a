/// # Database - Datasets and Their Timestamp Mappers
///
/// Owns one [`TimestampMapper`] per opened dataset, all persisting into a
/// single index directory:
///
/// ```text
/// data/index/
///   sst.tsi
///   salinity.tsi
/// ```
///
/// Opening a dataset prefers the persisted index and falls back to a rebuild
/// whenever the index is missing, unreadable or stale. Lookups resolve file
/// ids back to data file paths, which is what a caller needs to actually
/// read the sample.
use anyhow::{anyhow, bail, Context, Result};
use dataset::{DatasetDesc, Timestamp};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::TimestampMapper;

/// How [`Database::open_dataset`] obtained the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A fresh persisted index was loaded.
    Loaded,
    /// The index was built from the descriptors and persisted.
    Rebuilt,
}

impl fmt::Display for OpenOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenOutcome::Loaded => write!(f, "loaded"),
            OpenOutcome::Rebuilt => write!(f, "rebuilt"),
        }
    }
}

/// A timestamp resolved to a concrete data file and sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub file_id: u32,
    pub path: PathBuf,
    pub position: u64,
}

pub struct Database {
    index_dir: PathBuf,
    mappers: BTreeMap<String, TimestampMapper>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("index_dir", &self.index_dir)
            .field("datasets", &self.mappers)
            .finish()
    }
}

impl Database {
    /// Opens (creating if needed) the index directory and removes leftover
    /// `.tsi.tmp` files from interrupted persists.
    pub fn open<P: AsRef<Path>>(index_dir: P) -> Result<Self> {
        let index_dir = index_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&index_dir).with_context(|| {
            format!("failed to create index directory {}", index_dir.display())
        })?;
        Self::cleanup_tmp_files(&index_dir);
        Ok(Self {
            index_dir,
            mappers: BTreeMap::new(),
        })
    }

    /// Cleans up leftover `.tsi.tmp` files.
    fn cleanup_tmp_files(index_dir: &Path) {
        if let Ok(entries) = std::fs::read_dir(index_dir) {
            for entry in entries.flatten() {
                let p = entry.path();
                if let Some(name) = p.file_name().and_then(|n| n.to_str()) {
                    if name.ends_with(".tsi.tmp") {
                        debug!(path = %p.display(), "removing leftover temp index");
                        let _ = std::fs::remove_file(&p);
                    }
                }
            }
        }
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Opens `desc`, loading its persisted index when it is present and
    /// fresh, or rebuilding and persisting it otherwise.
    ///
    /// With `regen` set the persisted index is ignored and always rebuilt.
    /// Reopening an already open dataset replaces its mapper.
    ///
    /// # Errors
    ///
    /// Fails without touching any file if a different open dataset already
    /// uses the same index file (names that only differ in case or
    /// punctuation, e.g. `SST` and `sst`). Otherwise build errors and
    /// persist errors. Load errors are not surfaced; they trigger the
    /// rebuild.
    pub fn open_dataset(&mut self, desc: &DatasetDesc, regen: bool) -> Result<OpenOutcome> {
        let mut mapper = TimestampMapper::for_dataset(&self.index_dir, desc.name());
        let clash = self.mappers.iter().find(|(name, m)| {
            name.as_str() != desc.name() && m.index_path() == mapper.index_path()
        });
        if let Some((other, _)) = clash {
            bail!(
                "dataset '{}' would share index file {} with open dataset '{}'",
                desc.name(),
                mapper.index_path().display(),
                other
            );
        }

        let outcome = if !regen && mapper.index_file_exists() {
            match mapper.reload() {
                Ok(()) if !mapper.is_stale(desc) => OpenOutcome::Loaded,
                Ok(()) => {
                    info!(dataset = desc.name(), "persisted index is stale, rebuilding");
                    Self::rebuild(&mut mapper, desc)?;
                    OpenOutcome::Rebuilt
                }
                Err(e) if e.requires_rebuild() => {
                    warn!(dataset = desc.name(), error = %e, "failed to load index, rebuilding");
                    Self::rebuild(&mut mapper, desc)?;
                    OpenOutcome::Rebuilt
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            Self::rebuild(&mut mapper, desc)?;
            OpenOutcome::Rebuilt
        };

        self.mappers.insert(desc.name().to_string(), mapper);
        Ok(outcome)
    }

    /// Forces a rebuild of an open (or new) dataset.
    pub fn rebuild_dataset(&mut self, desc: &DatasetDesc) -> Result<()> {
        self.open_dataset(desc, true).map(|_| ())
    }

    fn rebuild(mapper: &mut TimestampMapper, desc: &DatasetDesc) -> Result<()> {
        mapper
            .delete_index_file()
            .context("failed to delete old index file")?;
        mapper.clear();
        mapper
            .build(desc)
            .with_context(|| format!("failed to build index for dataset '{}'", desc.name()))?;
        mapper.persist().with_context(|| {
            format!(
                "failed to persist index to {}",
                mapper.index_path().display()
            )
        })?;
        Ok(())
    }

    /// Returns the mapper of an open dataset.
    pub fn mapper(&self, name: &str) -> Result<&TimestampMapper> {
        self.mappers
            .get(name)
            .ok_or_else(|| anyhow!("dataset '{}' is not open", name))
    }

    /// Names of all open datasets, sorted.
    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.mappers.keys().map(|k| k.as_str())
    }

    /// `true` if the open dataset's index no longer matches `desc`.
    pub fn is_stale(&self, desc: &DatasetDesc) -> Result<bool> {
        Ok(self.mapper(desc.name())?.is_stale(desc))
    }

    fn resolve(mapper: &TimestampMapper, file_id: u32, position: u64) -> Result<ResolvedLocation> {
        let path = mapper
            .file_path(file_id)
            .ok_or_else(|| anyhow!("index refers to unknown file id {}", file_id))?;
        Ok(ResolvedLocation {
            file_id,
            path: path.to_path_buf(),
            position,
        })
    }

    /// Resolves `timestamp` in dataset `name` to a data file and sample.
    ///
    /// A miss is an [`IndexError::NotFound`](crate::IndexError::NotFound)
    /// wrapped in the returned error; callers can `downcast_ref` it.
    pub fn locate(&self, name: &str, timestamp: Timestamp) -> Result<ResolvedLocation> {
        let mapper = self.mapper(name)?;
        let loc = mapper.lookup(timestamp)?;
        Self::resolve(mapper, loc.file_id, loc.position)
    }

    /// Resolves every timestamp in `[start, end]` of dataset `name`.
    pub fn range(
        &self,
        name: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<(Timestamp, ResolvedLocation)>> {
        let mapper = self.mapper(name)?;
        mapper
            .range(start, end)?
            .map(|e| Ok((e.timestamp, Self::resolve(mapper, e.file_id, e.position)?)))
            .collect()
    }

    /// Deletes the dataset's index file and forgets its mapper.
    pub fn drop_dataset(&mut self, name: &str) -> Result<()> {
        let mapper = self
            .mappers
            .remove(name)
            .ok_or_else(|| anyhow!("dataset '{}' is not open", name))?;
        mapper.delete_index_file()?;
        info!(dataset = name, "dataset dropped");
        Ok(())
    }
}
