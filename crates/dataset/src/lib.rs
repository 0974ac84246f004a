//! # Dataset - Static Geometry of a Time-Series Dataset
//!
//! Descriptor types consumed (never mutated) by the timestamp mapper:
//!
//! ```text
//! DatasetDesc  "sst", Historical
//!   ├── DataFileDesc  a.nc   timestamps [10, 20, 30]  vars [votemper]
//!   └── DataFileDesc  b.nc   timestamps [40, 50]      vars [votemper]
//! ```
//!
//! All three descriptor types are plain immutable values: their fields are
//! private, they are validated once at construction, and they can be cloned
//! or moved freely.
//!
//! A [`DatasetDesc`] can also be loaded from a line-oriented text catalog,
//! see [`catalog`].

pub mod catalog;
mod desc;
mod file;
mod variable;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use catalog::{load_catalog, load_catalog_with};
pub use desc::{DatasetDesc, DatasetKind, Fingerprint};
pub use file::{modification_marker, path_bytes, path_from_bytes, DataFileDesc};
pub use variable::VariableDesc;

/// Sample key. Opaque and totally ordered; no uniform spacing is assumed.
pub type Timestamp = u64;

/// Errors raised while constructing or loading descriptors.
#[derive(Debug, Error)]
pub enum DescError {
    #[error("variable name must not be empty")]
    EmptyVariableName,

    #[error("variable '{name}' has a zero-sized dimension at axis {axis}")]
    ZeroDimension { name: String, axis: usize },

    #[error("data file path must not be empty")]
    EmptyPath,

    #[error("timestamps in {} are not strictly increasing at position {position}", .path.display())]
    UnsortedTimestamps { path: PathBuf, position: usize },

    #[error("dataset name must not be empty")]
    EmptyDatasetName,

    #[error(
        "timestamp {timestamp} is covered by both {} and {}",
        .first.display(),
        .second.display()
    )]
    Overlap {
        timestamp: Timestamp,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("catalog line {line}: {message}")]
    Catalog { line: usize, message: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
