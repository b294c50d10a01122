//! Public and internal types for the treesum API and pipeline.

use std::path::{Path, PathBuf};

use crate::error::NodeError;

/// What a stat found at a path. `Stdin` is the virtual root used when no paths are given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
    /// Exists but is neither a regular file nor a directory (fifo, socket, device).
    Other,
    /// Stat failed; see [`Node::failure`].
    Unresolved,
    Stdin,
}

/// Result of a stat through [`FileSystem`](crate::pipeline::FileSystem).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub kind: NodeKind,
    pub size: u64,
}

/// One unit of traversal work and its result. Owned by exactly one pipeline stage at a time;
/// fields accumulate as it moves walker → digester → sequencer → sink.
#[derive(Debug)]
pub struct Node {
    /// `None` for standard input.
    pub path: Option<PathBuf>,
    /// Walk emission rank; defines output order. Assigned by the walker at emission.
    pub seq: u64,
    /// Distance from the root this node was reached from (roots are 0).
    pub depth: usize,
    pub kind: NodeKind,
    /// Size reported by stat (0 when unresolved or stdin).
    pub size: u64,
    /// Set only for files (and stdin) that were read completely.
    pub digest: Option<Vec<u8>>,
    pub failure: Option<NodeError>,
}

impl Node {
    /// Node for a stat'ed path. Sequence number is assigned later by the walker.
    pub fn new(path: PathBuf, depth: usize, stat: FileStat) -> Self {
        Self {
            path: Some(path),
            seq: 0,
            depth,
            kind: stat.kind,
            size: stat.size,
            digest: None,
            failure: None,
        }
    }

    /// Node for a path whose stat failed.
    pub fn unresolved(path: PathBuf, depth: usize, err: std::io::Error) -> Self {
        Self {
            path: Some(path),
            seq: 0,
            depth,
            kind: NodeKind::Unresolved,
            size: 0,
            digest: None,
            failure: Some(NodeError::Stat(err)),
        }
    }

    /// The standard-input root.
    pub fn stdin() -> Self {
        Self {
            path: None,
            seq: 0,
            depth: 0,
            kind: NodeKind::Stdin,
            size: 0,
            digest: None,
            failure: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True for nodes the digest workers read: regular files and stdin, with no earlier failure.
    pub fn wants_digest(&self) -> bool {
        self.failure.is_none() && matches!(self.kind, NodeKind::File | NodeKind::Stdin)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }
}

/// Lib options for [`digest_paths`](crate::digest_paths). Only the fields that shape the pipeline.
#[derive(Clone, Debug)]
pub struct DigestOpts {
    /// Directories at depth < max_depth are expanded. 0 = roots only, default 1.
    pub max_depth: usize,
    /// Include entries whose name is hidden on this platform (and their subtrees).
    pub include_hidden: bool,
    /// Override digest worker count. When None, derived from available threads and FD limit.
    pub num_workers: Option<usize>,
    /// Override the bounded channel capacity between stages. When None, scales with workers.
    pub channel_cap: Option<usize>,
}

impl Default for DigestOpts {
    fn default() -> Self {
        Self {
            max_depth: 1,
            include_hidden: false,
            num_workers: None,
            channel_cap: None,
        }
    }
}

impl From<&Opts> for DigestOpts {
    fn from(o: &Opts) -> Self {
        DigestOpts {
            max_depth: o.max_depth,
            include_hidden: o.include_hidden,
            num_workers: o.num_workers,
            channel_cap: None,
        }
    }
}

/// Full options (CLI). Use [`DigestOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Registry name of the digest algorithm (e.g. `sha256`).
    pub algorithm: String,
    /// Keyed mode: `scheme:data` key spec. Decoded before the pipeline starts.
    pub key: Option<String>,
    pub max_depth: usize,
    pub include_hidden: bool,
    pub num_workers: Option<usize>,
    /// Print digests without file names.
    pub no_name: bool,
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            algorithm: crate::digest::Algorithm::DEFAULT.name().to_string(),
            key: None,
            max_depth: 1,
            include_hidden: false,
            num_workers: None,
            no_name: false,
            verbose: false,
        }
    }
}

impl Opts {
    /// Copy safe to log: the key spec is masked.
    pub fn redacted(mut self) -> Self {
        if self.key.is_some() {
            self.key = Some("<redacted>".to_string());
        }
        self
    }
}

/// Counts from one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Nodes the walker emitted (directories included).
    pub emitted: usize,
    /// Nodes handed to the sink.
    pub reported: usize,
    /// Reported nodes that carried a failure.
    pub failures: usize,
    /// True when cancellation truncated the walk; output is a prefix of the full result.
    pub cancelled: bool,
}
