//! Position assignment
//!
//! Top-down pass writing absolute coordinates into an already-measured
//! tree. Roots stack vertically and center against the widest root;
//! within a container, sequential children stack centered in the content
//! width and parallel branches lay out as columns from a shared starting
//! y, so concurrent work reads at the same height.

use crate::engine::LayoutEngine;
use flowlay_types::LayoutNode;

impl LayoutEngine {
    /// Place all top-level nodes, offset by the canvas margin.
    pub(crate) fn position_roots(&self, roots: &mut [LayoutNode]) {
        let widest = roots.iter().map(|root| root.width).fold(0.0, f64::max);
        let mut y = self.canvas_margin;
        for root in roots {
            let x = self.canvas_margin + (widest - root.width) / 2.0;
            self.position_node(root, x, y);
            y += root.height + self.root_spacing;
        }
    }

    /// Place one node and, pre-order, its whole subtree. The node's own
    /// dimensions must already be final.
    fn position_node(&self, node: &mut LayoutNode, x: f64, y: f64) {
        node.x = x;
        node.y = y;

        let header = if node.kind.has_header() {
            self.header_height
        } else {
            0.0
        };
        let width = node.width;
        let mut cursor = y + header + self.padding;

        let child_count = node.children.len();
        for (index, child) in node.children.iter_mut().enumerate() {
            let child_x = x + (width - child.width) / 2.0;
            let child_height = child.height;
            self.position_node(child, child_x, cursor);
            cursor += child_height;
            if index + 1 < child_count {
                cursor += self.child_spacing;
            }
        }

        if node.parallel_branches.is_empty() {
            return;
        }
        if child_count > 0 {
            cursor += self.child_spacing;
        }

        let block_width = self.branch_block_width(node);
        let mut column_x = x + (width - block_width) / 2.0;
        for branch in &mut node.parallel_branches {
            let column_width = Self::branch_width(branch);
            let mut branch_y = cursor;
            for child in branch.iter_mut() {
                let child_x = column_x + (column_width - child.width) / 2.0;
                let child_height = child.height;
                self.position_node(child, child_x, branch_y);
                branch_y += child_height + self.child_spacing;
            }
            column_x += column_width + self.branch_spacing;
        }
    }
}
