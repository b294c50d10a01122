//! Pipeline channels, handles and tuning: what connects walk → digest workers → sequencer → sink.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::thread::JoinHandle;

use crate::utils::config::{ChannelCap, WorkerThreadLimits};
use crate::utils::fd_limit::cap_workers_by_fd_limit;
use crate::{DigestOpts, Node};

use super::walk::WalkOutcome;

/// Worker count and channel capacity for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineTuning {
    pub num_workers: usize,
    /// Capacity of each bounded channel between stages.
    pub channel_cap: usize,
}

impl PipelineTuning {
    /// Explicit options win; otherwise workers come from available threads (capped by the FD
    /// limit) and the channel cap scales with workers.
    pub fn from_opts(opts: &DigestOpts) -> Self {
        let num_workers = match opts.num_workers {
            Some(n) => n.max(1),
            None => cap_workers_by_fd_limit(WorkerThreadLimits::current().default_workers()),
        };
        let channel_cap = opts
            .channel_cap
            .unwrap_or_else(|| ChannelCap::for_workers(num_workers))
            .max(1);
        debug!(
            "pipeline tuning: {} digest workers, channel cap {}",
            num_workers, channel_cap
        );
        Self {
            num_workers,
            channel_cap,
        }
    }
}

/// Bounded channels for the three hand-offs. The walk thread gets walk_tx; workers get walk_rx
/// and digest_tx; the sequencer gets digest_rx and ordered_tx; the sink reads ordered_rx.
pub struct PipelineChannels {
    pub walk_tx: Sender<Node>,
    pub walk_rx: Receiver<Node>,
    pub digest_tx: Sender<Node>,
    pub digest_rx: Receiver<Node>,
    pub ordered_tx: Sender<Node>,
    pub ordered_rx: Receiver<Node>,
}

pub fn create_pipeline_channels(channel_cap: usize) -> PipelineChannels {
    let (walk_tx, walk_rx) = bounded::<Node>(channel_cap);
    let (digest_tx, digest_rx) = bounded::<Node>(channel_cap);
    let (ordered_tx, ordered_rx) = bounded::<Node>(channel_cap);
    PipelineChannels {
        walk_tx,
        walk_rx,
        digest_tx,
        digest_rx,
        ordered_tx,
        ordered_rx,
    }
}

/// Handles returned by [`run_pipeline`](super::run_pipeline): receive ordered nodes from
/// `ordered_rx` (directories included), then join everything with
/// [`shutdown_pipeline_handles`](super::shutdown_pipeline_handles).
pub struct PipelineHandles {
    pub ordered_rx: Receiver<Node>,
    pub walk_handle: JoinHandle<WalkOutcome>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub sequencer_handle: JoinHandle<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_tuning_respected() {
        let opts = DigestOpts {
            num_workers: Some(3),
            channel_cap: Some(5),
            ..Default::default()
        };
        assert_eq!(
            PipelineTuning::from_opts(&opts),
            PipelineTuning {
                num_workers: 3,
                channel_cap: 5
            }
        );
    }

    #[test]
    fn test_zero_values_raised_to_one() {
        let opts = DigestOpts {
            num_workers: Some(0),
            channel_cap: Some(0),
            ..Default::default()
        };
        let t = PipelineTuning::from_opts(&opts);
        assert_eq!((t.num_workers, t.channel_cap), (1, 1));
    }

    #[test]
    fn test_default_tuning_in_range() {
        let t = PipelineTuning::from_opts(&DigestOpts::default());
        assert!(t.num_workers >= 1 && t.num_workers <= WorkerThreadLimits::MAX_THREADS);
        assert_eq!(t.channel_cap, ChannelCap::for_workers(t.num_workers));
    }
}
