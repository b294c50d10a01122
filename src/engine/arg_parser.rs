use clap::Parser;
use std::path::PathBuf;

/// Concurrent content digests for files and directory trees, printed in walk order.
#[derive(Clone, Debug, Parser)]
#[command(name = "treesum", version)]
#[command(about = "Digest files and directory trees; reads standard input when no paths are given.")]
pub struct Cli {
    /// Files or directories to digest. None: standard input.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Digest algorithm (see --list-algorithms). Default: sha256.
    #[arg(long, short = 'a')]
    pub algorithm: Option<String>,

    /// Maximum directory depth to descend. 0 digests only the given paths. Default: 1.
    #[arg(long, short = 'd', value_parser = clap::value_parser!(usize), conflicts_with = "recursive")]
    pub depth: Option<usize>,

    /// Descend without a depth limit.
    #[arg(long, short = 'r', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub recursive: Option<bool>,

    /// Include hidden files and directories.
    #[arg(long, short = 'H', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub hidden: Option<bool>,

    /// Keyed mode (HMAC, or blake3 keyed): binary:<file>, base64:<text> or hex:<text>.
    /// Falls back to TREESUM_KEY / .env when not given.
    #[arg(long, short = 'k', value_name = "SCHEME:DATA")]
    pub key: Option<String>,

    /// Number of digest workers. Default: available threads, at most 16.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Print digests without file names.
    #[arg(long, short = 'n', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub no_name: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, require_equals = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// List supported algorithms and exit.
    #[arg(long)]
    pub list_algorithms: bool,
}
