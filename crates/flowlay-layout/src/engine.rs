//! Layout engine entry point
//!
//! [`LayoutEngine`] owns the sizing parameters and runs the passes in
//! fixed order: interpret -> measure -> position -> edges -> canvas. The
//! single `build` entry point is what keeps the measure-before-position
//! contract structural: callers cannot reach a half-laid-out tree.

use crate::interpreter::interpret;
use flowlay_types::{LayoutResult, NameMap, TraceStep};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The layout engine, with every sizing constant as a tunable field.
///
/// Absolute values are design parameters; the passes only rely on the
/// relative relationships (padding smaller than node sizes, pill smaller
/// than leaves, and so on). Serializable so a consumer can ship its own
/// sizing profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutEngine {
    /// Fixed size of tool leaves
    pub tool_size: (f64, f64),
    /// Fixed size of llm leaves
    pub llm_size: (f64, f64),
    /// Fixed size of user markers
    pub user_size: (f64, f64),
    /// Fixed size of conditional nodes
    pub conditional_size: (f64, f64),
    /// Fixed size of switch nodes
    pub switch_size: (f64, f64),
    /// Fixed size of bodiless pills (Start, Finish, Join, Map, Fork)
    pub pill_size: (f64, f64),
    /// Minimum content width of containers
    pub container_min_width: f64,
    /// Header strip height of agent and group containers
    pub header_height: f64,
    /// Inner padding of containers
    pub padding: f64,
    /// Vertical gap between sequential children
    pub child_spacing: f64,
    /// Horizontal gap between parallel branch columns
    pub branch_spacing: f64,
    /// Vertical gap between top-level nodes
    pub root_spacing: f64,
    /// Outer margin added around the whole diagram
    pub canvas_margin: f64,
    /// Canvas size reported for an empty trace
    pub empty_canvas: (f64, f64),
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            tool_size: (180.0, 48.0),
            llm_size: (180.0, 48.0),
            user_size: (200.0, 56.0),
            conditional_size: (200.0, 64.0),
            switch_size: (200.0, 64.0),
            pill_size: (96.0, 28.0),
            container_min_width: 240.0,
            header_height: 40.0,
            padding: 16.0,
            child_spacing: 24.0,
            branch_spacing: 32.0,
            root_spacing: 48.0,
            canvas_margin: 40.0,
            empty_canvas: (320.0, 200.0),
        }
    }
}

impl LayoutEngine {
    /// Build a complete layout from a step stream and a name map.
    ///
    /// Atomic from the caller's perspective: a fresh interpreter context
    /// per call, a fully measured and positioned tree, derived edges and
    /// canvas size. Empty input yields an empty result with the
    /// placeholder canvas. Never fails.
    pub fn build(&self, steps: &[TraceStep], names: &NameMap) -> LayoutResult {
        let mut roots = interpret(steps, names);
        for root in &mut roots {
            self.measure(root);
        }
        self.position_roots(&mut roots);

        let edges = self.synthesize_edges(&roots);
        let (total_width, total_height) = self.canvas_size(&roots);

        debug!(
            roots = roots.len(),
            edges = edges.len(),
            total_width,
            total_height,
            "layout built"
        );

        LayoutResult {
            nodes: roots,
            edges,
            total_width,
            total_height,
        }
    }
}

/// Build a layout with the default engine parameters.
pub fn build(steps: &[TraceStep], names: &NameMap) -> LayoutResult {
    LayoutEngine::default().build(steps, names)
}
