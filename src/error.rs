//! Typed errors: per-node failures carried through the pipeline, and configuration errors
//! (algorithm, key) that stop the run before it starts.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::digest::Algorithm;

/// Why a node could not be digested. Attached to the node and reported by the sink; never aborts the pipeline.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Path could not be inspected (missing, permission denied, dangling link).
    #[error("{0}")]
    Stat(#[source] io::Error),
    /// Directory could not be enumerated.
    #[error("read dir: {0}")]
    List(#[source] io::Error),
    /// File content could not be fully read; any partial digest is discarded.
    #[error("read: {0}")]
    Read(#[source] io::Error),
}

/// Digest configuration errors (fatal, raised before the pipeline starts).
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("unknown digest algorithm {0:?} (see --list-algorithms)")]
    UnknownAlgorithm(String),
    #[error("{0} has no keyed mode")]
    KeyedUnsupported(Algorithm),
    #[error("{algorithm} keyed mode needs a {expected}-byte key, got {actual} bytes")]
    KeyLength {
        algorithm: Algorithm,
        expected: usize,
        actual: usize,
    },
}

/// Secret-key decoding errors (fatal, raised before the pipeline starts).
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("malformed {scheme} key: {reason}")]
    Decode {
        scheme: &'static str,
        reason: String,
    },
    #[error("unknown key scheme {0:?} (expected binary, base64 or hex)")]
    UnknownScheme(String),
    /// The spec has no `scheme:` prefix. The value itself is not kept; it may be the raw secret.
    #[error("key spec has no scheme prefix (expected binary:, base64: or hex:)")]
    MissingScheme,
    #[error("read key file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
