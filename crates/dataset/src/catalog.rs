//! # Catalog - Text Description of a Dataset
//!
//! A catalog lists the data files of one dataset together with their
//! timestamps and variables, so a [`DatasetDesc`] can be rebuilt without
//! opening the data files themselves.
//!
//! ```text
//! # sea surface temperature, daily
//! dataset:sst
//! kind:historical
//! file:2019/sst_01.nc
//! ts:10 20 30
//! var:votemper:40x50:degC:Sea Water Temperature
//! file:2019/sst_02.nc
//! ts:40 50
//! var:votemper:40x50:degC
//! ```
//!
//! - `ts:` lines append to the current file and may repeat.
//! - `var:` is `name:dims[:units[:long name]]`; `dims` is `x`-separated, empty
//!   for a scalar.
//! - Relative file paths are resolved against the catalog's directory.
//! - Lines starting with `#` are comments. Empty lines are ignored.
//!
//! Catalogs are treated as untrusted input: every descriptor goes through the
//! same validation as one built in code.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    modification_marker, DataFileDesc, DatasetDesc, DatasetKind, DescError, Timestamp,
    VariableDesc,
};

struct PendingFile {
    path: PathBuf,
    timestamps: Vec<Timestamp>,
    variables: Vec<VariableDesc>,
}

impl PendingFile {
    fn finish(self) -> Result<DataFileDesc, DescError> {
        let marker = modification_marker(&self.path);
        Ok(DataFileDesc::new(self.timestamps, self.variables, self.path)?.with_marker(marker))
    }
}

fn catalog_err(line: usize, message: impl Into<String>) -> DescError {
    DescError::Catalog {
        line,
        message: message.into(),
    }
}

/// Reads and parses the catalog at `path`.
///
/// # Errors
///
/// I/O errors, [`DescError::Catalog`] for malformed lines, and any
/// descriptor validation error (unsorted timestamps, overlap, ...).
pub fn load_catalog(path: &Path) -> Result<DatasetDesc, DescError> {
    load_catalog_with(path, |_| true)
}

/// Like [`load_catalog`], but keeps only the files whose resolved path
/// satisfies `keep`.
pub fn load_catalog_with<F>(path: &Path, keep: F) -> Result<DatasetDesc, DescError>
where
    F: Fn(&Path) -> bool,
{
    let text = fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    parse_catalog_with(&text, base, keep)
}

/// Parses catalog text, resolving relative file paths against `base_dir`.
pub fn parse_catalog(text: &str, base_dir: &Path) -> Result<DatasetDesc, DescError> {
    parse_catalog_with(text, base_dir, |_| true)
}

/// Parses catalog text, dropping files whose resolved path fails `keep`.
///
/// Dropped files are still parsed, so malformed lines are reported, but they
/// are not stat'ed and take no part in dataset validation: two excluded
/// files may overlap.
pub fn parse_catalog_with<F>(
    text: &str,
    base_dir: &Path,
    keep: F,
) -> Result<DatasetDesc, DescError>
where
    F: Fn(&Path) -> bool,
{
    let mut name: Option<String> = None;
    let mut kind = DatasetKind::default();
    let mut files = Vec::new();
    let mut current: Option<PendingFile> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (tag, rest) = trimmed.split_once(':').ok_or_else(|| {
            catalog_err(line_num, format!("invalid format (expected '<tag>:<value>'): {}", trimmed))
        })?;
        let rest = rest.trim();

        match tag {
            "dataset" => {
                if rest.is_empty() {
                    return Err(catalog_err(line_num, "empty dataset name"));
                }
                name = Some(rest.to_string());
            }
            "kind" => {
                kind = match rest {
                    "historical" => DatasetKind::Historical,
                    "forecast" => DatasetKind::Forecast,
                    other => {
                        return Err(catalog_err(
                            line_num,
                            format!("unknown kind '{}' (expected historical or forecast)", other),
                        ))
                    }
                };
            }
            "file" => {
                if rest.is_empty() {
                    return Err(catalog_err(line_num, "empty file path"));
                }
                if let Some(done) = current.take().filter(|f| keep(&f.path)) {
                    files.push(done.finish()?);
                }
                let p = Path::new(rest);
                let path = if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    base_dir.join(p)
                };
                current = Some(PendingFile {
                    path,
                    timestamps: Vec::new(),
                    variables: Vec::new(),
                });
            }
            "ts" => {
                let file = current
                    .as_mut()
                    .ok_or_else(|| catalog_err(line_num, "'ts' before any 'file'"))?;
                for tok in rest.split_whitespace() {
                    let ts: Timestamp = tok
                        .parse()
                        .map_err(|_| catalog_err(line_num, format!("invalid timestamp '{}'", tok)))?;
                    file.timestamps.push(ts);
                }
            }
            "var" => {
                let file = current
                    .as_mut()
                    .ok_or_else(|| catalog_err(line_num, "'var' before any 'file'"))?;
                file.variables.push(parse_variable(rest, line_num)?);
            }
            other => {
                return Err(catalog_err(line_num, format!("unknown tag '{}'", other)));
            }
        }
    }

    if let Some(done) = current.take().filter(|f| keep(&f.path)) {
        files.push(done.finish()?);
    }

    let name = name.ok_or_else(|| catalog_err(0, "missing 'dataset' line"))?;
    DatasetDesc::new(name, kind, files)
}

fn parse_variable(field: &str, line_num: usize) -> Result<VariableDesc, DescError> {
    let mut parts = field.splitn(4, ':');
    let name = parts.next().unwrap_or("").trim();
    let dims_str = parts.next().unwrap_or("").trim();

    let mut dims = Vec::new();
    if !dims_str.is_empty() {
        for d in dims_str.split('x') {
            let d: u64 = d
                .trim()
                .parse()
                .map_err(|_| catalog_err(line_num, format!("invalid dimension '{}'", d)))?;
            dims.push(d);
        }
    }

    let mut var = VariableDesc::new(name, dims)?;
    if let Some(units) = parts.next() {
        var = var.with_units(units.trim());
    }
    if let Some(long_name) = parts.next() {
        var = var.with_long_name(long_name.trim());
    }
    Ok(var)
}
