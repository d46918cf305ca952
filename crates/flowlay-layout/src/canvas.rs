//! Canvas sizing
//!
//! Overall bounding box of the positioned forest plus the outer margin;
//! an empty forest reports the fixed placeholder size.

use crate::edges::flatten;
use crate::engine::LayoutEngine;
use flowlay_types::LayoutNode;

impl LayoutEngine {
    /// Compute the canvas size for a positioned forest.
    pub(crate) fn canvas_size(&self, roots: &[LayoutNode]) -> (f64, f64) {
        let flat = flatten(roots);
        if flat.is_empty() {
            return self.empty_canvas;
        }
        let width = flat
            .iter()
            .map(|node| node.x + node.width)
            .fold(0.0, f64::max);
        let height = flat
            .iter()
            .map(|node| node.y + node.height)
            .fold(0.0, f64::max);
        (width + self.canvas_margin, height + self.canvas_margin)
    }
}
