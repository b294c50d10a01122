//! Sink: which ordered nodes are reported, and how each becomes one output line.

use std::io::{self, Write};

use crate::engine::tools::display_path;
use crate::{Node, NodeKind};

/// Directories travel the pipeline only to keep sequence numbers contiguous; they are reported
/// only when listing them failed. Non-regular entries found under a root are skipped, but a
/// non-regular root still gets its line.
pub fn should_report(node: &Node) -> bool {
    match node.kind {
        NodeKind::Dir => node.failure.is_some(),
        NodeKind::Other => node.depth == 0,
        NodeKind::File | NodeKind::Stdin | NodeKind::Unresolved => true,
    }
}

/// `<hex>  <path>` on success (`<hex>` alone with `no_name`), `<error>  <path>` on failure.
pub fn format_line(node: &Node, no_name: bool) -> String {
    let path = display_path(node.path());
    if let Some(err) = &node.failure {
        return format!("{err}  {path}");
    }
    match &node.digest {
        Some(sum) if no_name => hex::encode(sum),
        Some(sum) => format!("{}  {}", hex::encode(sum), path),
        None => format!("not a regular file  {path}"),
    }
}

pub fn write_line<W: Write>(out: &mut W, node: &Node, no_name: bool) -> io::Result<()> {
    writeln!(out, "{}", format_line(node, no_name))
}
