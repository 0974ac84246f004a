//! # tsm - Timestamp Mapper Shell
//!
//! Loads a dataset catalog, opens (or builds) its timestamp index and answers
//! queries read from stdin. Results go to stdout, logs to stderr, so commands
//! can be piped in and the output compared in scripts.
//!
//! ## Commands
//!
//! ```text
//! LOOKUP ts          File and sample position holding `ts`
//! RANGE start end    Every timestamp in [start, end]
//! FILES              The indexed file table
//! STALE              Re-read the catalog and compare with the index
//! REBUILD            Re-read the catalog and rebuild the index
//! DELETE-INDEX       Remove the index file (in-memory index stays)
//! STATS              Print database debug info
//! EXIT / QUIT        Shut down
//! ```
//!
//! Configuration comes from `TSM_*` environment variables, see the `config`
//! crate. `RUST_LOG` controls log verbosity (default `info`).
//!
//! ## Example
//!
//! ```text
//! $ TSM_CATALOG=sst/catalog.txt cargo run -p cli
//! tsm started (dataset=sst, files=2, entries=5, index=data/index/sst.tsi, rebuilt)
//! > LOOKUP 30
//! 30 -> sst/a.nc[2] (file 0)
//! > RANGE 15 45
//! 20 -> sst/a.nc[1] (file 0)
//! 30 -> sst/a.nc[2] (file 0)
//! 40 -> sst/b.nc[0] (file 1)
//! (3 entries)
//! > EXIT
//! bye
//! ```

use anyhow::{Context, Result};
use config::MapperConfig;
use dataset::{load_catalog_with, DatasetDesc, Timestamp};
use mapper::{Database, IndexError};
use regex::Regex;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Compiles the data file filter. The pattern must match a whole path.
fn file_filter(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern))
        .with_context(|| format!("invalid file pattern '{}'", pattern))
}

/// Loads the catalog, keeping only files that match the configured pattern,
/// and applies the configured dataset name override.
fn load_dataset(cfg: &MapperConfig) -> Result<DatasetDesc> {
    let filter = file_filter(&cfg.file_pattern)?;
    let desc = load_catalog_with(&cfg.catalog, |p| filter.is_match(&p.to_string_lossy()))
        .with_context(|| format!("failed to load catalog {}", cfg.catalog.display()))?;
    Ok(match &cfg.dataset {
        Some(name) => desc.renamed(name.as_str()),
        None => desc,
    })
}

fn parse_ts(arg: Option<&str>) -> Option<Timestamp> {
    arg.and_then(|s| s.parse().ok())
}

/// Runs one command line against `db`. Returns `false` when the shell
/// should exit.
fn execute<W: Write>(
    db: &mut Database,
    cfg: &MapperConfig,
    name: &str,
    line: &str,
    out: &mut W,
) -> Result<bool> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(true);
    };

    match cmd.to_uppercase().as_str() {
        "LOOKUP" => match parse_ts(parts.next()) {
            Some(ts) => match db.locate(name, ts) {
                Ok(loc) => writeln!(
                    out,
                    "{} -> {}[{}] (file {})",
                    ts,
                    loc.path.display(),
                    loc.position,
                    loc.file_id
                )?,
                Err(e) => match e.downcast_ref::<IndexError>() {
                    Some(IndexError::NotFound(_)) => writeln!(out, "(not found)")?,
                    _ => writeln!(out, "ERR lookup failed: {}", e)?,
                },
            },
            None => writeln!(out, "ERR usage: LOOKUP ts")?,
        },
        "RANGE" => match (parse_ts(parts.next()), parse_ts(parts.next())) {
            (Some(start), Some(end)) => match db.range(name, start, end) {
                Ok(hits) if hits.is_empty() => writeln!(out, "(empty)")?,
                Ok(hits) => {
                    for (ts, loc) in &hits {
                        writeln!(
                            out,
                            "{} -> {}[{}] (file {})",
                            ts,
                            loc.path.display(),
                            loc.position,
                            loc.file_id
                        )?;
                    }
                    writeln!(out, "({} entries)", hits.len())?;
                }
                Err(e) => writeln!(out, "ERR range failed: {}", e)?,
            },
            _ => writeln!(out, "ERR usage: RANGE start end")?,
        },
        "FILES" => {
            let mapper = db.mapper(name)?;
            for id in 0..mapper.file_count() as u32 {
                if let (Some(path), Some(samples)) =
                    (mapper.file_path(id), mapper.file_samples(id))
                {
                    writeln!(out, "{}: {} ({} samples)", id, path.display(), samples)?;
                }
            }
            writeln!(out, "({} files)", mapper.file_count())?;
        }
        "STALE" => match load_dataset(cfg) {
            Ok(desc) => {
                let stale = db.mapper(name)?.is_stale(&desc);
                writeln!(out, "{}", if stale { "stale" } else { "fresh" })?;
            }
            Err(e) => writeln!(out, "ERR {:#}", e)?,
        },
        "REBUILD" => match load_dataset(cfg).and_then(|desc| db.rebuild_dataset(&desc)) {
            Ok(()) => writeln!(out, "OK (entries={})", db.mapper(name)?.len())?,
            Err(e) => writeln!(out, "ERR rebuild failed: {:#}", e)?,
        },
        "DELETE-INDEX" => match db.mapper(name)?.delete_index_file() {
            Ok(()) => writeln!(out, "OK")?,
            Err(e) => writeln!(out, "ERR delete failed: {}", e)?,
        },
        "STATS" => writeln!(out, "{:?}", db)?,
        "EXIT" | "QUIT" => {
            writeln!(out, "bye")?;
            return Ok(false);
        }
        other => writeln!(out, "unknown command: {}", other)?,
    }
    Ok(true)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cfg = MapperConfig::from_env();
    info!(%cfg, "configuration loaded");
    let desc = load_dataset(&cfg)?;

    if cfg.dry_run {
        for file in desc.files() {
            println!("{}", file.path().display());
        }
        println!("Total files found: {}", desc.file_count());
        return Ok(());
    }

    let mut db = Database::open(&cfg.index_dir)?;
    let outcome = db.open_dataset(&desc, cfg.regen)?;
    let name = desc.name().to_string();
    {
        let mapper = db.mapper(&name)?;
        println!(
            "tsm started (dataset={}, files={}, entries={}, index={}, {})",
            name,
            mapper.file_count(),
            mapper.len(),
            mapper.index_path().display(),
            outcome
        );
    }
    println!("Commands: LOOKUP ts | RANGE start end | FILES | STALE | REBUILD");
    println!("          DELETE-INDEX | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        if !execute(&mut db, &cfg, &name, &line, &mut stdout)? {
            break;
        }
        print!("> ");
        stdout.flush().ok();
    }

    if !cfg.keep_index {
        if let Err(e) = db.drop_dataset(&name) {
            warn!(dataset = %name, error = %e, "failed to remove index file");
        }
    }
    Ok(())
}
