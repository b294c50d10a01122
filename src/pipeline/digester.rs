use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::Node;
use crate::NodeKind;
use crate::digest::{DigestFactory, DigestInstance};
use crate::engine::hashing::{digest_file, digest_stdin};
use crate::error::NodeError;

/// Digest `node` in place if it is a readable regular file (or stdin). Anything else is left untouched.
/// A read error replaces the digest with [`NodeError::Read`].
pub fn digest_node(node: &mut Node, digest: &mut dyn DigestInstance) {
    if !node.wants_digest() {
        return;
    }
    let result = match (node.kind, node.path.as_deref()) {
        (NodeKind::Stdin, _) => digest_stdin(digest),
        (_, Some(path)) => digest_file(path, node.size, digest),
        (_, None) => return,
    };
    match result {
        Ok(sum) => node.digest = Some(sum),
        Err(err) => node.failure = Some(NodeError::Read(err)),
    }
}

/// Single digest worker: one private instance, reused for every node it takes from node_rx.
/// Every node received is forwarded exactly once.
fn digest_worker_loop(
    id: usize,
    node_rx: Receiver<Node>,
    node_tx: Sender<Node>,
    factory: Arc<dyn DigestFactory>,
) {
    let mut digest = factory.create();
    let mut processed = 0_usize;
    while let Ok(mut node) = node_rx.recv() {
        digest_node(&mut node, digest.as_mut());
        if node_tx.send(node).is_err() {
            break;
        }
        processed += 1;
    }
    debug!("digest worker {} exiting after {} nodes", id, processed);
    drop(node_tx);
}

/// Spawn `num_workers` digest workers reading node_rx and writing node_tx. Caller must drop its
/// sender after this; the output channel closes once every worker has exited.
pub fn spawn_digest_workers(
    node_rx: Receiver<Node>,
    node_tx: &Sender<Node>,
    factory: &Arc<dyn DigestFactory>,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers.max(1))
        .map(|id| {
            let node_rx = node_rx.clone();
            let node_tx = node_tx.clone();
            let factory = Arc::clone(factory);
            thread::spawn(move || digest_worker_loop(id, node_rx, node_tx, factory))
        })
        .collect()
}
