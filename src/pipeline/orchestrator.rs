use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::digest::DigestFactory;
use crate::engine::output::should_report;
use crate::utils::config::InterruptConsts;
use crate::{DigestOpts, Node, PipelineSummary};

use super::cancel::CancelSignal;
use super::context::{PipelineHandles, PipelineTuning, create_pipeline_channels};
use super::digester::spawn_digest_workers;
use super::sequencer::spawn_sequencer_thread;
use super::walk::{FileSystem, OsFileSystem, WalkOpts, WalkOutcome, spawn_walk_thread};

/// Start walk → digest workers → sequencer over `fs`. Caller receives from `ordered_rx`
/// and must then join with [`shutdown_pipeline_handles`].
pub fn run_pipeline_with_fs<F: FileSystem + 'static>(
    fs: F,
    roots: &[PathBuf],
    opts: &DigestOpts,
    factory: Arc<dyn DigestFactory>,
    cancel: &CancelSignal,
) -> PipelineHandles {
    let tuning = PipelineTuning::from_opts(opts);
    let channels = create_pipeline_channels(tuning.channel_cap);
    debug!(
        "starting pipeline: {} roots, algorithm {}, max depth {}",
        roots.len(),
        factory.name(),
        opts.max_depth
    );

    let walk_handle = spawn_walk_thread(
        Arc::new(fs),
        roots.to_vec(),
        WalkOpts {
            max_depth: opts.max_depth,
            include_hidden: opts.include_hidden,
        },
        cancel.clone(),
        channels.walk_tx,
    );

    let worker_handles = spawn_digest_workers(
        channels.walk_rx,
        &channels.digest_tx,
        &factory,
        tuning.num_workers,
    );

    // Dropping the last sender closes the channel once the workers exit.
    drop(channels.digest_tx);

    let sequencer_handle = spawn_sequencer_thread(channels.digest_rx, channels.ordered_tx);

    PipelineHandles {
        ordered_rx: channels.ordered_rx,
        walk_handle,
        worker_handles,
        sequencer_handle,
    }
}

/// [`run_pipeline_with_fs`] over the real filesystem.
pub fn run_pipeline(
    roots: &[PathBuf],
    opts: &DigestOpts,
    factory: Arc<dyn DigestFactory>,
    cancel: &CancelSignal,
) -> PipelineHandles {
    run_pipeline_with_fs(OsFileSystem, roots, opts, factory, cancel)
}

/// Join walk, workers and sequencer (after `ordered_rx` is drained or dropped).
pub fn shutdown_pipeline_handles(
    walk_handle: JoinHandle<WalkOutcome>,
    worker_handles: Vec<JoinHandle<()>>,
    sequencer_handle: JoinHandle<u64>,
) -> Result<WalkOutcome> {
    let outcome = walk_handle
        .join()
        .map_err(|_| anyhow::anyhow!("walk thread panicked"))?;
    for h in worker_handles {
        h.join()
            .map_err(|_| anyhow::anyhow!("digest worker panicked"))?;
    }
    sequencer_handle
        .join()
        .map_err(|_| anyhow::anyhow!("sequencer thread panicked"))?;
    Ok(outcome)
}

/// Sink side: pull ordered nodes, drop those [`should_report`] rejects, hand the rest to `sink`.
/// A sink error cancels the walk, tears the pipeline down and is returned.
pub fn drive_pipeline<S>(
    handles: PipelineHandles,
    cancel: &CancelSignal,
    mut sink: S,
) -> Result<PipelineSummary>
where
    S: FnMut(Node) -> Result<()>,
{
    let PipelineHandles {
        ordered_rx,
        walk_handle,
        worker_handles,
        sequencer_handle,
    } = handles;

    let mut summary = PipelineSummary::default();
    let mut sink_error = None;
    while let Ok(node) = ordered_rx.recv() {
        if !should_report(&node) {
            continue;
        }
        summary.reported += 1;
        if node.failure.is_some() {
            summary.failures += 1;
        }
        if let Err(e) = sink(node) {
            cancel.cancel();
            sink_error = Some(e);
            break;
        }
    }
    // Closing our end unblocks a sequencer still sending after a sink error.
    drop(ordered_rx);

    let outcome = shutdown_pipeline_handles(walk_handle, worker_handles, sequencer_handle)?;
    summary.emitted = outcome.emitted;
    summary.cancelled = outcome.cancelled;
    debug!(
        "pipeline done: {} emitted, {} reported, {} failed{}",
        summary.emitted,
        summary.reported,
        summary.failures,
        if summary.cancelled { ", cancelled" } else { "" }
    );
    match sink_error {
        Some(e) => Err(e),
        None => Ok(summary),
    }
}

/// Fire `cancel` on Ctrl+C / SIGTERM. Process-wide; call at most once (CLI only).
///
/// A worker blocked in a read (stdin, a stalled mount) never sees the cancel, so the first signal
/// also arms a timer: after [`InterruptConsts::GRACE`] the process exits with
/// [`InterruptConsts::EXIT_CODE`]. A second signal exits at once.
pub fn install_interrupt_handler(cancel: &CancelSignal) -> Result<()> {
    let cancel = cancel.clone();
    ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            std::process::exit(i32::from(InterruptConsts::EXIT_CODE));
        }
        warn!("Interrupted; finishing results already in flight");
        cancel.cancel();
        thread::spawn(|| {
            thread::sleep(InterruptConsts::GRACE);
            warn!(
                "Pipeline still busy {:?} after interrupt; exiting",
                InterruptConsts::GRACE
            );
            std::process::exit(i32::from(InterruptConsts::EXIT_CODE));
        });
    })
    .context("set Ctrl+C handler")
}
