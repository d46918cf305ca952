//! ASCII tree rendering for layout results
//!
//! Renders a built layout as an ASCII tree for logs and quick diagnosis:
//! one line per node with status, kind, label and geometry. This is a
//! debugging surface; painting the diagram is the renderer layer's job,
//! not this crate's.

use ascii_tree::Tree;
use flowlay_types::{LayoutNode, LayoutResult, NodeStatus};

/// Trait for rendering layout results as ASCII trees
pub trait LayoutRenderer {
    /// Render the whole result as an ASCII tree
    fn render_as_ascii_tree(&self) -> String;

    /// Render one node (and its subtree) as a tree node
    fn render_node_as_tree(&self, node: &LayoutNode) -> Tree;
}

fn status_icon(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Idle => "·",
        NodeStatus::InProgress => "⏳",
        NodeStatus::Completed => "✅",
        NodeStatus::Error => "❌",
    }
}

fn node_label(node: &LayoutNode) -> String {
    let mut label = format!(
        "{} {} \"{}\" ({:.0}x{:.0} @ {:.0},{:.0})",
        status_icon(node.data.status),
        node.kind,
        node.data.label,
        node.width,
        node.height,
        node.x,
        node.y
    );
    if let Some(iterations) = node.data.iterations {
        label.push_str(&format!(" [{iterations} iterations]"));
    }
    if let Some(condition) = &node.data.condition {
        label.push_str(&format!(" [if {condition}]"));
    }
    label
}

impl LayoutRenderer for LayoutResult {
    fn render_as_ascii_tree(&self) -> String {
        let root_label = format!(
            "Layout {:.0}x{:.0} - {} nodes, {} edges",
            self.total_width,
            self.total_height,
            self.node_count(),
            self.edges.len()
        );

        let mut children: Vec<Tree> = self
            .nodes
            .iter()
            .map(|node| self.render_node_as_tree(node))
            .collect();

        if !self.edges.is_empty() {
            let edge_lines = self
                .edges
                .iter()
                .map(|edge| {
                    let marker = if edge.error { "❌" } else { "→" };
                    format!("{}: {} {} {}", edge.id, edge.source, marker, edge.target)
                })
                .collect();
            children.push(Tree::Leaf(edge_lines));
        }

        let tree = Tree::Node(root_label, children);
        let mut buffer = String::new();
        ascii_tree::write_tree(&mut buffer, &tree).unwrap();
        buffer
    }

    fn render_node_as_tree(&self, node: &LayoutNode) -> Tree {
        let mut children: Vec<Tree> = node
            .children
            .iter()
            .map(|child| self.render_node_as_tree(child))
            .collect();

        for (index, branch) in node.parallel_branches.iter().enumerate() {
            let members = branch
                .iter()
                .map(|child| self.render_node_as_tree(child))
                .collect();
            children.push(Tree::Node(format!("branch {}", index + 1), members));
        }

        if children.is_empty() {
            Tree::Leaf(vec![node_label(node)])
        } else {
            Tree::Node(node_label(node), children)
        }
    }
}
