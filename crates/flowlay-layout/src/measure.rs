//! Dimension measurement
//!
//! Bottom-up pass computing each node's width and height from its
//! measured children plus the engine's per-kind constants. Pure function
//! of the subtree: two passes over the same tree always agree.

use crate::engine::LayoutEngine;
use flowlay_types::{LayoutNode, NodeKind, NodeVariant};

impl LayoutEngine {
    /// Measure `node` and its whole subtree, post-order, in place.
    pub(crate) fn measure(&self, node: &mut LayoutNode) {
        for child in &mut node.children {
            self.measure(child);
        }
        for branch in &mut node.parallel_branches {
            for child in branch {
                self.measure(child);
            }
        }

        let (width, height) = if node.sized_as_container() {
            self.container_size(node)
        } else {
            self.leaf_size(node)
        };
        node.width = width;
        node.height = height;
    }

    /// Fixed size of a node without a body.
    fn leaf_size(&self, node: &LayoutNode) -> (f64, f64) {
        if node.data.variant == NodeVariant::Pill {
            return self.pill_size;
        }
        match node.kind {
            NodeKind::Tool => self.tool_size,
            NodeKind::Llm => self.llm_size,
            NodeKind::User => self.user_size,
            NodeKind::Conditional => self.conditional_size,
            NodeKind::Switch => self.switch_size,
            NodeKind::Join | NodeKind::Loop => self.pill_size,
            // Containers reserve their header + padding box even when empty.
            NodeKind::Agent | NodeKind::Group => self.container_size(node),
        }
    }

    /// Size of a node with a body: content width is the widest of the
    /// sequential children and the parallel block; height stacks the
    /// sequential children and adds only the tallest branch (branches
    /// render side by side, not stacked).
    fn container_size(&self, node: &LayoutNode) -> (f64, f64) {
        let widest_child = node
            .children
            .iter()
            .map(|child| child.width)
            .fold(0.0, f64::max);
        let branch_block_width = self.branch_block_width(node);
        let content_width = widest_child.max(branch_block_width);
        let width = content_width.max(self.container_min_width) + 2.0 * self.padding;

        let header = if node.kind.has_header() {
            self.header_height
        } else {
            0.0
        };
        let mut height = header + self.padding;
        for (index, child) in node.children.iter().enumerate() {
            height += child.height;
            if index + 1 < node.children.len() {
                height += self.child_spacing;
            }
        }
        if !node.children.is_empty() && !node.parallel_branches.is_empty() {
            height += self.child_spacing;
        }
        height += self.branch_block_height(node);
        height += self.padding;

        (width, height)
    }

    /// Width of the parallel block: each column is as wide as its widest
    /// member, columns separated by the branch spacing.
    pub(crate) fn branch_block_width(&self, node: &LayoutNode) -> f64 {
        if node.parallel_branches.is_empty() {
            return 0.0;
        }
        let columns: f64 = node
            .parallel_branches
            .iter()
            .map(|branch| Self::branch_width(branch))
            .sum();
        columns + self.branch_spacing * (node.parallel_branches.len() - 1) as f64
    }

    /// Height of the parallel block: the single tallest column.
    fn branch_block_height(&self, node: &LayoutNode) -> f64 {
        node.parallel_branches
            .iter()
            .map(|branch| self.branch_height(branch))
            .fold(0.0, f64::max)
    }

    /// Column width of one branch.
    pub(crate) fn branch_width(branch: &[LayoutNode]) -> f64 {
        branch.iter().map(|child| child.width).fold(0.0, f64::max)
    }

    /// Stacked height of one branch.
    pub(crate) fn branch_height(&self, branch: &[LayoutNode]) -> f64 {
        let children: f64 = branch.iter().map(|child| child.height).sum();
        if branch.is_empty() {
            0.0
        } else {
            children + self.child_spacing * (branch.len() - 1) as f64
        }
    }
}
