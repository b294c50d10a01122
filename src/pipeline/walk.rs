//! Ordered depth-first walk: explicit stack, sequence numbers assigned at emission, cancellable sends.

use crossbeam_channel::{Sender, select};
use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::tools::is_hidden;
use crate::error::NodeError;
use crate::{FileStat, Node, NodeKind};

use super::cancel::CancelSignal;

/// Filesystem operations the walker needs. [`OsFileSystem`] in production; tests use a fake tree.
pub trait FileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> io::Result<FileStat>;
    /// Child paths in any order; the walker sorts them.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
    fn is_hidden(&self, path: &Path) -> bool;
}

/// The real filesystem. Stat follows symlinks.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let meta = std::fs::metadata(path)?;
        let ft = meta.file_type();
        let kind = if ft.is_file() {
            NodeKind::File
        } else if ft.is_dir() {
            NodeKind::Dir
        } else {
            NodeKind::Other
        };
        Ok(FileStat {
            kind,
            size: meta.len(),
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn is_hidden(&self, path: &Path) -> bool {
        is_hidden(path)
    }
}

/// Walk limits, fixed for the whole run.
#[derive(Clone, Copy, Debug)]
pub struct WalkOpts {
    pub max_depth: usize,
    pub include_hidden: bool,
}

/// What the walk thread reports when it exits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkOutcome {
    pub emitted: usize,
    pub cancelled: bool,
}

fn stat_node<F: FileSystem + ?Sized>(fs: &F, path: PathBuf, depth: usize) -> Node {
    match fs.stat(&path) {
        Ok(stat) => Node::new(path, depth, stat),
        Err(err) => Node::unresolved(path, depth, err),
    }
}

/// Push `node`'s children so the smallest name is on top of the stack.
/// A listing failure is recorded on `node` and contributes no children.
fn expand_dir<F: FileSystem + ?Sized>(fs: &F, node: &mut Node, stack: &mut Vec<Node>) {
    let Some(path) = node.path.as_deref() else {
        return;
    };
    match fs.read_dir(path) {
        Ok(children) => {
            let mut children: Vec<Node> = children
                .into_iter()
                .map(|p| stat_node(fs, p, node.depth + 1))
                .collect();
            children.sort_by(|a, b| file_name(b).cmp(&file_name(a)));
            stack.extend(children);
        }
        Err(err) => node.failure = Some(NodeError::List(err)),
    }
}

fn file_name(node: &Node) -> Option<&std::ffi::OsStr> {
    node.path().and_then(Path::file_name)
}

/// Send `node` unless cancelled. Returns false when the walk must stop (cancelled, or
/// the receiving side is gone).
fn emit(node_tx: &Sender<Node>, node: Node, cancel: &CancelSignal) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    select! {
        send(node_tx, node) -> res => res.is_ok(),
        recv(cancel.fired()) -> _ => false,
    }
}

/// Walk `roots` (or stdin when empty) and send every visited node to `node_tx` in pre-order,
/// siblings ascending by name, numbering them 0, 1, 2, ... Drops `node_tx` when done.
///
/// Hidden entries below the roots are skipped with their subtrees unless `include_hidden`.
/// Stat and listing failures are recorded on the node, which is still emitted.
pub fn run_walk_loop<F: FileSystem + ?Sized>(
    fs: &F,
    roots: &[PathBuf],
    opts: WalkOpts,
    cancel: &CancelSignal,
    node_tx: Sender<Node>,
) -> WalkOutcome {
    let mut stack: Vec<Node> = if roots.is_empty() {
        vec![Node::stdin()]
    } else {
        let mut roots = roots.to_vec();
        roots.sort_by(|a, b| b.as_os_str().cmp(a.as_os_str()));
        roots.into_iter().map(|p| stat_node(fs, p, 0)).collect()
    };

    let mut next_seq = 0_u64;
    let mut emitted = 0_usize;
    while let Some(mut node) = stack.pop() {
        if !opts.include_hidden && node.depth > 0 && node.path().is_some_and(|p| fs.is_hidden(p))
        {
            continue;
        }
        if node.is_dir() && node.failure.is_none() && node.depth < opts.max_depth {
            expand_dir(fs, &mut node, &mut stack);
        }
        node.seq = next_seq;
        if !emit(&node_tx, node, cancel) {
            break;
        }
        next_seq += 1;
        emitted += 1;
    }

    let cancelled = cancel.is_cancelled();
    debug!(
        "walk: emitted {} nodes{}",
        emitted,
        if cancelled { " (cancelled)" } else { "" }
    );
    drop(node_tx);
    WalkOutcome { emitted, cancelled }
}

pub fn spawn_walk_thread<F: FileSystem + 'static>(
    fs: Arc<F>,
    roots: Vec<PathBuf>,
    opts: WalkOpts,
    cancel: CancelSignal,
    node_tx: Sender<Node>,
) -> JoinHandle<WalkOutcome> {
    thread::spawn(move || run_walk_loop(fs.as_ref(), &roots, opts, &cancel, node_tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::collections::BTreeMap;

    enum Fake {
        File,
        Dir(Vec<&'static str>),
        Unreadable,
    }

    /// Deterministic in-memory tree. `read_dir` returns children in insertion order, not sorted.
    #[derive(Default)]
    struct FakeFs {
        entries: BTreeMap<PathBuf, Fake>,
    }

    impl FakeFs {
        fn file(mut self, path: &str) -> Self {
            self.entries.insert(PathBuf::from(path), Fake::File);
            self
        }

        fn dir(mut self, path: &str, children: &[&'static str]) -> Self {
            self.entries
                .insert(PathBuf::from(path), Fake::Dir(children.to_vec()));
            self
        }

        fn unreadable_dir(mut self, path: &str) -> Self {
            self.entries.insert(PathBuf::from(path), Fake::Unreadable);
            self
        }
    }

    impl FileSystem for FakeFs {
        fn stat(&self, path: &Path) -> io::Result<FileStat> {
            let kind = match self.entries.get(path) {
                Some(Fake::File) => NodeKind::File,
                Some(Fake::Dir(_)) | Some(Fake::Unreadable) => NodeKind::Dir,
                None => return Err(io::Error::from(io::ErrorKind::NotFound)),
            };
            Ok(FileStat { kind, size: 1 })
        }

        fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
            match self.entries.get(path) {
                Some(Fake::Dir(children)) => Ok(children.iter().map(|c| path.join(c)).collect()),
                Some(Fake::Unreadable) => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
                _ => Err(io::Error::from(io::ErrorKind::NotADirectory)),
            }
        }

        fn is_hidden(&self, path: &Path) -> bool {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'))
        }
    }

    fn walk(fs: &FakeFs, roots: &[&str], max_depth: usize, include_hidden: bool) -> Vec<Node> {
        let (tx, rx) = unbounded();
        let roots: Vec<PathBuf> = roots.iter().map(PathBuf::from).collect();
        let opts = WalkOpts {
            max_depth,
            include_hidden,
        };
        let outcome = run_walk_loop(fs, &roots, opts, &CancelSignal::new(), tx);
        let nodes: Vec<Node> = rx.iter().collect();
        assert_eq!(outcome.emitted, nodes.len());
        assert!(!outcome.cancelled);
        nodes
    }

    fn paths(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| n.path().map(|p| p.display().to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_siblings_visited_ascending() {
        let fs = FakeFs::default()
            .dir("r", &["b", "a", "c"])
            .file("r/a")
            .file("r/b")
            .file("r/c");
        let nodes = walk(&fs, &["r"], 1, false);
        assert_eq!(paths(&nodes), ["r", "r/a", "r/b", "r/c"]);
        let depths: Vec<usize> = nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, [0, 1, 1, 1]);
    }

    #[test]
    fn test_preorder_recursion() {
        let fs = FakeFs::default()
            .dir("r", &["z", "d", "a"])
            .file("r/a")
            .dir("r/d", &["y", "x"])
            .file("r/d/x")
            .file("r/d/y")
            .file("r/z");
        let nodes = walk(&fs, &["r"], 5, false);
        assert_eq!(
            paths(&nodes),
            ["r", "r/a", "r/d", "r/d/x", "r/d/y", "r/z"]
        );
    }

    #[test]
    fn test_sequence_numbers_follow_emission() {
        let fs = FakeFs::default()
            .dir("r", &["b", "a"])
            .file("r/a")
            .file("r/b");
        let nodes = walk(&fs, &["r"], 1, false);
        let seqs: Vec<u64> = nodes.iter().map(|n| n.seq).collect();
        assert_eq!(seqs, [0, 1, 2]);
    }

    #[test]
    fn test_max_depth_limits_expansion() {
        let fs = FakeFs::default()
            .dir("r", &["d"])
            .dir("r/d", &["f"])
            .file("r/d/f");
        assert_eq!(paths(&walk(&fs, &["r"], 0, false)), ["r"]);
        assert_eq!(paths(&walk(&fs, &["r"], 1, false)), ["r", "r/d"]);
        assert_eq!(paths(&walk(&fs, &["r"], 2, false)), ["r", "r/d", "r/d/f"]);
    }

    #[test]
    fn test_hidden_entries_and_subtrees_skipped() {
        let fs = FakeFs::default()
            .dir("r", &[".git", "a", ".env"])
            .dir("r/.git", &["HEAD"])
            .file("r/.git/HEAD")
            .file("r/.env")
            .file("r/a");
        assert_eq!(paths(&walk(&fs, &["r"], 3, false)), ["r", "r/a"]);
        assert_eq!(
            paths(&walk(&fs, &["r"], 3, true)),
            ["r", "r/.env", "r/.git", "r/.git/HEAD", "r/a"]
        );
    }

    #[test]
    fn test_hidden_root_is_kept() {
        let fs = FakeFs::default().file(".profile");
        assert_eq!(paths(&walk(&fs, &[".profile"], 1, false)), [".profile"]);
    }

    #[test]
    fn test_roots_sorted_ascending() {
        let fs = FakeFs::default().file("b").file("a").file("c");
        assert_eq!(paths(&walk(&fs, &["c", "a", "b"], 1, false)), ["a", "b", "c"]);
    }

    #[test]
    fn test_stat_failure_is_emitted_not_fatal() {
        let fs = FakeFs::default().file("ok");
        let nodes = walk(&fs, &["missing", "ok"], 1, false);
        assert_eq!(paths(&nodes), ["missing", "ok"]);
        assert_eq!(nodes[0].kind, NodeKind::Unresolved);
        assert!(matches!(nodes[0].failure, Some(NodeError::Stat(_))));
        assert!(nodes[1].failure.is_none());
    }

    #[test]
    fn test_listing_failure_has_no_children() {
        let fs = FakeFs::default()
            .dir("r", &["locked", "open"])
            .unreadable_dir("r/locked")
            .file("r/open");
        let nodes = walk(&fs, &["r"], 3, false);
        assert_eq!(paths(&nodes), ["r", "r/locked", "r/open"]);
        assert!(matches!(nodes[1].failure, Some(NodeError::List(_))));
    }

    #[test]
    fn test_no_roots_means_stdin() {
        let nodes = walk(&FakeFs::default(), &[], 1, false);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].kind, NodeKind::Stdin);
        assert!(nodes[0].path.is_none());
        assert_eq!(nodes[0].seq, 0);
    }

    #[test]
    fn test_cancelled_before_start_emits_nothing() {
        let fs = FakeFs::default().file("a");
        let cancel = CancelSignal::new();
        cancel.cancel();
        let (tx, rx) = unbounded();
        let opts = WalkOpts {
            max_depth: 1,
            include_hidden: false,
        };
        let outcome = run_walk_loop(&fs, &[PathBuf::from("a")], opts, &cancel, tx);
        assert_eq!(outcome, WalkOutcome { emitted: 0, cancelled: true });
        assert!(rx.iter().next().is_none());
    }

    #[test]
    fn test_cancel_wakes_blocked_send() {
        let fs = Arc::new(
            FakeFs::default()
                .dir("r", &["a", "b", "c"])
                .file("r/a")
                .file("r/b")
                .file("r/c"),
        );
        let cancel = CancelSignal::new();
        // Rendezvous channel: every send blocks until received.
        let (tx, rx) = crossbeam_channel::bounded(0);
        let opts = WalkOpts {
            max_depth: 1,
            include_hidden: false,
        };
        let handle = spawn_walk_thread(fs, vec![PathBuf::from("r")], opts, cancel.clone(), tx);
        let first = rx.recv().unwrap();
        assert_eq!(first.seq, 0);
        cancel.cancel();
        let outcome = handle.join().unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.emitted, 1);
    }
}
