//! Load `.treesum.toml` from a directory (CLI only). Lib does not use this; the consuming program injects config via DigestOpts.
//!
//! The key is never read from this file; use `--key` or `TREESUM_KEY`.

use serde::Deserialize;
use std::path::Path;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TreesumToml {
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Settings {
    algorithm: Option<String>,
    depth: Option<usize>,
    recursive: Option<bool>,
    hidden: Option<bool>,
    workers: Option<usize>,
    no_name: Option<bool>,
    verbose: Option<bool>,
}

/// Load the config file from `dir`. `Ok(None)` if missing or unreadable; `Err` is a printable
/// parse error for the caller to log once logging is up. CLI only.
pub(crate) fn load_treesum_toml(dir: &Path) -> Result<Option<TreesumToml>, String> {
    let path = dir.join(PackagePaths::get().config_filename());
    let Ok(s) = std::fs::read_to_string(&path) else {
        return Ok(None);
    };
    parse_treesum_toml(&s)
        .map(Some)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

impl TreesumToml {
    pub(crate) fn depth(&self) -> Option<usize> {
        self.settings.depth
    }
}

pub(crate) fn parse_treesum_toml(s: &str) -> Result<TreesumToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($set:expr, $opts:expr, $set_field:ident => $opts_field:ident) => {
        if let Some(v) = $set.$set_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only set fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &TreesumToml, opts: &mut Opts) {
    let set = &file.settings;
    if let Some(ref a) = set.algorithm {
        opts.algorithm = a.clone();
    }
    apply_file_opt!(set, opts, depth => max_depth);
    if set.recursive == Some(true) {
        opts.max_depth = usize::MAX;
    }
    apply_file_opt!(set, opts, hidden => include_hidden);
    if set.workers.is_some() {
        opts.num_workers = set.workers;
    }
    apply_file_opt!(set, opts, no_name => no_name);
    apply_file_opt!(set, opts, verbose => verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_only_present_fields() {
        let file = parse_treesum_toml("[settings]\nalgorithm = \"md5\"\nhidden = true\n").unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.algorithm, "md5");
        assert!(opts.include_hidden);
        assert_eq!(opts.max_depth, 1);
        assert_eq!(opts.num_workers, None);
    }

    #[test]
    fn test_recursive_lifts_depth() {
        let file = parse_treesum_toml("[settings]\ndepth = 2\nrecursive = true\nworkers = 4\n").unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.max_depth, usize::MAX);
        assert_eq!(opts.num_workers, Some(4));
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let file = parse_treesum_toml("").unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.algorithm, "sha256");
    }

    #[test]
    fn test_key_not_accepted_in_file() {
        assert!(parse_treesum_toml("[settings]\nkey = \"hex:00\"\n").is_err());
    }

    #[test]
    fn test_load_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".treesum.toml"), "[settings\n").unwrap();
        let err = load_treesum_toml(dir.path()).err().unwrap();
        assert!(err.contains(".treesum.toml"));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_treesum_toml(dir.path()).unwrap().is_none());
        std::fs::write(dir.path().join(".treesum.toml"), "[settings]\nno_name = true\n").unwrap();
        let file = load_treesum_toml(dir.path()).unwrap().unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert!(opts.no_name);
    }
}
