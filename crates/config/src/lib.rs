//! Environment-driven configuration for the `tsm` binary.
//!
//! ```text
//! TSM_CATALOG     dataset catalog path                  (default: "catalog.txt")
//! TSM_INDEX_DIR   directory holding .tsi index files    (default: "data/index")
//! TSM_DATASET     overrides the catalog's dataset name  (default: unset)
//! TSM_REGEX       keep only data files whose full path
//!                 matches this pattern                  (default: ".*")
//! TSM_DRY_RUN     list data files and exit              (default: "false")
//! TSM_REGEN       rebuild even if a fresh index exists  (default: "false")
//! TSM_KEEP_INDEX  keep the index file on exit           (default: "true")
//! ```
//!
//! Booleans accept `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off` in any
//! case. Anything else falls back to the default.

use std::fmt;
use std::path::PathBuf;

pub const CATALOG_VAR: &str = "TSM_CATALOG";
pub const INDEX_DIR_VAR: &str = "TSM_INDEX_DIR";
pub const DATASET_VAR: &str = "TSM_DATASET";
pub const REGEX_VAR: &str = "TSM_REGEX";
pub const DRY_RUN_VAR: &str = "TSM_DRY_RUN";
pub const REGEN_VAR: &str = "TSM_REGEN";
pub const KEEP_INDEX_VAR: &str = "TSM_KEEP_INDEX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    pub catalog: PathBuf,
    pub index_dir: PathBuf,
    /// Replaces the dataset name found in the catalog when set.
    pub dataset: Option<String>,
    /// Regex a data file path must match in full to be indexed.
    pub file_pattern: String,
    pub dry_run: bool,
    pub regen: bool,
    pub keep_index: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("catalog.txt"),
            index_dir: PathBuf::from("data/index"),
            dataset: None,
            file_pattern: ".*".to_string(),
            dry_run: false,
            regen: false,
            keep_index: true,
        }
    }
}

impl fmt::Display for MapperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "catalog={}, index_dir={}, dataset={}, regex={}, dry_run={}, regen={}, keep_index={}",
            self.catalog.display(),
            self.index_dir.display(),
            self.dataset.as_deref().unwrap_or("(catalog)"),
            self.file_pattern,
            self.dry_run,
            self.regen,
            self.keep_index
        )
    }
}

impl MapperConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let env_or = |key: &str, default: PathBuf| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(default)
        };
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default)
        };

        Self {
            catalog: env_or(CATALOG_VAR, d.catalog),
            index_dir: env_or(INDEX_DIR_VAR, d.index_dir),
            dataset: lookup(DATASET_VAR)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            file_pattern: lookup(REGEX_VAR)
                .filter(|v| !v.is_empty())
                .unwrap_or(d.file_pattern),
            dry_run: flag(DRY_RUN_VAR, d.dry_run),
            regen: flag(REGEN_VAR, d.regen),
            keep_index: flag(KEEP_INDEX_VAR, d.keep_index),
        }
    }
}

/// Parses a boolean flag value. `None` for anything unrecognised.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> MapperConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MapperConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config_from(&[]);
        assert_eq!(cfg, MapperConfig::default());
        assert_eq!(cfg.catalog, PathBuf::from("catalog.txt"));
        assert_eq!(cfg.index_dir, PathBuf::from("data/index"));
        assert!(cfg.keep_index);
        assert!(!cfg.dry_run);
        assert!(!cfg.regen);
        assert!(cfg.dataset.is_none());
        assert_eq!(cfg.file_pattern, ".*");
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config_from(&[
            (CATALOG_VAR, "/srv/ocean/catalog.txt"),
            (INDEX_DIR_VAR, "/var/tsm"),
            (DATASET_VAR, "giops_day"),
            (REGEX_VAR, r".*/2019_.*\.nc"),
            (DRY_RUN_VAR, "true"),
            (REGEN_VAR, "1"),
            (KEEP_INDEX_VAR, "no"),
        ]);
        assert_eq!(cfg.catalog, PathBuf::from("/srv/ocean/catalog.txt"));
        assert_eq!(cfg.index_dir, PathBuf::from("/var/tsm"));
        assert_eq!(cfg.dataset.as_deref(), Some("giops_day"));
        assert_eq!(cfg.file_pattern, r".*/2019_.*\.nc");
        assert!(cfg.dry_run);
        assert!(cfg.regen);
        assert!(!cfg.keep_index);
    }

    #[test]
    fn unparseable_flags_fall_back_to_default() {
        let cfg = config_from(&[
            (DRY_RUN_VAR, "maybe"),
            (REGEN_VAR, ""),
            (KEEP_INDEX_VAR, "definitely"),
        ]);
        assert!(!cfg.dry_run);
        assert!(!cfg.regen);
        assert!(cfg.keep_index);
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let cfg = config_from(&[(CATALOG_VAR, ""), (DATASET_VAR, "   "), (REGEX_VAR, "")]);
        assert_eq!(cfg.catalog, PathBuf::from("catalog.txt"));
        assert_eq!(cfg.file_pattern, ".*");
        assert!(cfg.dataset.is_none());
    }

    #[test]
    fn parse_bool_is_case_insensitive() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" Off "), Some(false));
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn display_mentions_paths() {
        let s = config_from(&[]).to_string();
        assert!(s.contains("catalog=catalog.txt"));
        assert!(s.contains("dataset=(catalog)"));
    }
}
