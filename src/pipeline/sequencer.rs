//! Restores walk order: buffers out-of-order nodes by sequence number and releases the
//! contiguous run starting at the next expected number.

use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use std::collections::HashMap;
use std::thread::{self, JoinHandle};

use crate::Node;

/// Sparse reorder buffer. Holds at most the worker pool's in-flight skew.
#[derive(Debug, Default)]
pub struct Sequencer {
    next: u64,
    pending: HashMap<u64, Node>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer `node`. Sequence numbers are unique per run; a repeat replaces nothing and is dropped.
    pub fn accept(&mut self, node: Node) {
        if node.seq < self.next || self.pending.contains_key(&node.seq) {
            warn!("sequencer: duplicate sequence number {} dropped", node.seq);
            return;
        }
        self.pending.insert(node.seq, node);
    }

    /// Next node in order, if it has arrived.
    pub fn pop_ready(&mut self) -> Option<Node> {
        let node = self.pending.remove(&self.next)?;
        self.next += 1;
        Some(node)
    }

    /// Nodes released so far.
    pub fn released(&self) -> u64 {
        self.next
    }

    /// Nodes still waiting on a gap.
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }
}

/// Reorder `node_rx` into `ordered_tx`. Returns the number of nodes released. Drops
/// `ordered_tx` when the input closes and everything contiguous is flushed, or when the
/// receiver goes away.
pub fn run_sequencer_loop(node_rx: Receiver<Node>, ordered_tx: Sender<Node>) -> u64 {
    let mut seq = Sequencer::new();
    'recv: while let Ok(node) = node_rx.recv() {
        seq.accept(node);
        while let Some(ready) = seq.pop_ready() {
            if ordered_tx.send(ready).is_err() {
                break 'recv;
            }
        }
    }
    if seq.buffered() > 0 {
        warn!(
            "sequencer: {} nodes stranded behind missing sequence number {}",
            seq.buffered(),
            seq.released()
        );
    }
    debug!("sequencer: released {} nodes", seq.released());
    drop(ordered_tx);
    seq.released()
}

pub fn spawn_sequencer_thread(
    node_rx: Receiver<Node>,
    ordered_tx: Sender<Node>,
) -> JoinHandle<u64> {
    thread::spawn(move || run_sequencer_loop(node_rx, ordered_tx))
}
