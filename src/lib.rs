//! Treesum: concurrent content digests for files and directory trees, reported in walk order.
//!
//! A walker numbers every node in deterministic pre-order, a bounded pool of workers digests
//! files in parallel, and a sequencer puts results back in walk order before the sink sees them.

pub mod digest;
pub mod engine;
pub mod error;
pub mod key;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use crate::digest::{Algorithm, DigestFactory, DigestInstance, create_keyed, factory_for};
pub use error::{DigestError, KeyError, NodeError};
pub use pipeline::CancelSignal;

use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Result alias used by public treesum API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: digest `roots` (standard input when empty) with `factory` and hand each
/// reportable node to `on_node` in walk order.
///
/// - Directories are walked but not reported (unless listing them failed).
/// - Per-path failures arrive as nodes with [`Node::failure`] set; they never stop the run.
/// - Firing `cancel` stops the walk; nodes already emitted are still delivered, so the callback
///   sees a prefix of the full ordered result and the summary has `cancelled` set.
/// - An error from `on_node` cancels the run and is returned.
///
/// ```ignore
/// let factory = treesum::factory_for(treesum::Algorithm::Md5, None)?;
/// let mut lines = Vec::new();
/// treesum::digest_paths(&[dir], factory, &DigestOpts::default(), &CancelSignal::new(), |n| {
///     lines.push(treesum::engine::format_line(&n, false));
///     Ok(())
/// })?;
/// ```
pub fn digest_paths<F>(
    roots: &[PathBuf],
    factory: Arc<dyn DigestFactory>,
    opts: &DigestOpts,
    cancel: &CancelSignal,
    on_node: F,
) -> Result<PipelineSummary>
where
    F: FnMut(Node) -> Result<()>,
{
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);

    let handles = pipeline::run_pipeline(roots, opts, factory, cancel);
    pipeline::drive_pipeline(handles, cancel, on_node)
}
