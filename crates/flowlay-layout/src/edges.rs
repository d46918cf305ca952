//! Edge synthesis
//!
//! Derives connector edges from the positioned tree by flattening it
//! depth-first and connecting adjacent pairs that match a fixed
//! predicate: user -> agent, agent -> user, agent -> agent. This is a
//! sequential-adjacency heuristic, not a causal graph: it relies on the
//! interpreter emitting nodes in a visually sensible order, and it never
//! mutates the tree it reads.

use crate::engine::LayoutEngine;
use flowlay_types::{LayoutEdge, LayoutNode, NodeKind, NodeStatus};

/// Flatten a forest depth-first: each node, then its sequential
/// children, then its parallel-branch members in branch order.
pub fn flatten(roots: &[LayoutNode]) -> Vec<&LayoutNode> {
    let mut flat = Vec::new();
    for root in roots {
        flatten_into(root, &mut flat);
    }
    flat
}

fn flatten_into<'a>(node: &'a LayoutNode, flat: &mut Vec<&'a LayoutNode>) {
    flat.push(node);
    for child in &node.children {
        flatten_into(child, flat);
    }
    for branch in &node.parallel_branches {
        for child in branch {
            flatten_into(child, flat);
        }
    }
}

/// The adjacency predicate: which kind pairs get a connector.
fn connects(source: NodeKind, target: NodeKind) -> bool {
    matches!(
        (source, target),
        (NodeKind::User, NodeKind::Agent)
            | (NodeKind::Agent, NodeKind::User)
            | (NodeKind::Agent, NodeKind::Agent)
    )
}

impl LayoutEngine {
    /// Derive connector edges for a positioned forest.
    pub(crate) fn synthesize_edges(&self, roots: &[LayoutNode]) -> Vec<LayoutEdge> {
        let flat = flatten(roots);
        let mut edges = Vec::new();
        for pair in flat.windows(2) {
            let (source, target) = (pair[0], pair[1]);
            if !connects(source.kind, target.kind) {
                continue;
            }
            edges.push(LayoutEdge {
                id: format!("edge_{}", edges.len()),
                source: source.id.clone(),
                target: target.id.clone(),
                from: source.bottom_center(),
                to: target.top_center(),
                step_id: source.data.step_id.clone(),
                label: None,
                error: source.data.status == NodeStatus::Error,
                selected: false,
            });
        }
        edges
    }
}
