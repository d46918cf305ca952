//! Layout tree and geometry result types
//!
//! The layout tree is built by the trace interpreter, sized and placed by
//! the geometry passes, and handed to callers as part of a `LayoutResult`.
//! Geometry fields start at zero and are only meaningful once a build call
//! has run its measure and position passes.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Kind of a layout node — a closed variant set so every dispatch over
/// node kinds is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    /// Agent invocation container (top-level or nested)
    Agent,
    /// Tool invocation leaf
    Tool,
    /// LLM call leaf
    Llm,
    /// User message marker
    User,
    /// Conditional branch node
    Conditional,
    /// Multi-way switch node
    Switch,
    /// Control-flow marker (Start / Finish / Join pills)
    Join,
    /// Iteration node (Map / Fork pills), may own parallel branches
    Loop,
    /// Sub-workflow scope container
    Group,
}

impl NodeKind {
    /// Whether nodes of this kind own a sequential child scope by default.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Agent | NodeKind::Group)
    }

    /// Whether nodes of this kind render a header strip above their content.
    pub fn has_header(&self) -> bool {
        matches!(self, NodeKind::Agent | NodeKind::Group)
    }
}

/// Execution status of the step(s) a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// No execution recorded for this node
    #[default]
    Idle,
    /// Started but no matching result seen yet
    InProgress,
    /// A matching result step arrived
    Completed,
    /// A matching result step arrived carrying an error
    Error,
}

/// Visual variant of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeVariant {
    /// Regular box
    #[default]
    Default,
    /// Compact control-flow marker (Start, Finish, Join, Map, Fork)
    Pill,
}

/// Semantic payload of a layout node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    /// Human-readable display label
    pub label: String,
    /// Originating step id, when the node maps to a single step
    pub step_id: Option<String>,
    /// Execution status
    pub status: NodeStatus,
    /// Visual variant
    pub variant: NodeVariant,
    /// Condition text, for conditional nodes
    pub condition: Option<String>,
    /// Branch outcome, for conditional nodes
    pub branch: Option<String>,
    /// Iteration count, for loop/map nodes
    pub iterations: Option<u32>,
}

impl NodeData {
    /// Create node data with the given label and defaults everywhere else.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            step_id: None,
            status: NodeStatus::Idle,
            variant: NodeVariant::Default,
            condition: None,
            branch: None,
            iterations: None,
        }
    }

    /// Set the originating step id and return self for chaining.
    pub fn with_step_id(mut self, step_id: impl Into<String>) -> Self {
        self.step_id = Some(step_id.into());
        self
    }

    /// Set the status and return self for chaining.
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark as a pill and return self for chaining.
    pub fn as_pill(mut self) -> Self {
        self.variant = NodeVariant::Pill;
        self
    }
}

/// A node of the layout tree.
///
/// `children` is the node's sequential scope; `parallel_branches` holds
/// concurrent columns and may coexist with sequential children. The tree
/// is strictly a tree: a node appears under exactly one parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    /// Unique id, generated sequentially per kind (`{kind}_{index}`)
    pub id: String,
    /// Node kind
    pub kind: NodeKind,
    /// Semantic payload
    pub data: NodeData,
    /// Absolute x, populated by the position pass
    pub x: f64,
    /// Absolute y, populated by the position pass
    pub y: f64,
    /// Width, populated by the measure pass
    pub width: f64,
    /// Height, populated by the measure pass
    pub height: f64,
    /// Sequential children, in execution order
    pub children: Vec<LayoutNode>,
    /// Parallel branches, each an ordered child sequence
    pub parallel_branches: Vec<Vec<LayoutNode>>,
}

impl LayoutNode {
    /// Create an unmeasured, unpositioned node.
    pub fn new(id: impl Into<String>, kind: NodeKind, data: NodeData) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            children: Vec::new(),
            parallel_branches: Vec::new(),
        }
    }

    /// Whether this node must be sized like a container: containers
    /// always, and pills only once they carry a body.
    pub fn sized_as_container(&self) -> bool {
        self.kind.is_container() || !self.children.is_empty() || !self.parallel_branches.is_empty()
    }

    /// Bottom-center anchor point, for outgoing edges.
    pub fn bottom_center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height)
    }

    /// Top-center anchor point, for incoming edges.
    pub fn top_center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y)
    }

    /// Total node count of this subtree, branches included.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(LayoutNode::subtree_len)
            .sum::<usize>()
            + self
                .parallel_branches
                .iter()
                .flatten()
                .map(LayoutNode::subtree_len)
                .sum::<usize>()
    }
}

/// A connector edge between two positioned nodes.
///
/// Edges are derived data: they never own or mutate the tree and are
/// recomputed whenever layout runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEdge {
    /// Unique edge id
    pub id: String,
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Source anchor (bottom-center of the source node)
    pub from: (f64, f64),
    /// Target anchor (top-center of the target node)
    pub to: (f64, f64),
    /// Originating step id, if any
    pub step_id: Option<String>,
    /// Optional edge label
    pub label: Option<String>,
    /// Whether the source node ended in an error
    pub error: bool,
    /// Selection flag for interactive consumers
    pub selected: bool,
}

/// The externally visible output of a build call.
///
/// Immutable once produced; a new step stream pass produces an entirely
/// new result rather than a delta.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LayoutResult {
    /// Positioned top-level nodes (each owning its subtree)
    pub nodes: Vec<LayoutNode>,
    /// Connector edges between top-level-adjacent nodes
    pub edges: Vec<LayoutEdge>,
    /// Overall canvas width
    pub total_width: f64,
    /// Overall canvas height
    pub total_height: f64,
}

impl LayoutResult {
    /// Total node count across all roots.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(LayoutNode::subtree_len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_matches_id_prefix() {
        assert_eq!(NodeKind::Agent.to_string(), "agent");
        assert_eq!(NodeKind::Conditional.to_string(), "conditional");
    }

    #[test]
    fn test_pill_with_body_sized_as_container() {
        let mut pill = LayoutNode::new("loop_0", NodeKind::Loop, NodeData::new("Map").as_pill());
        assert!(!pill.sized_as_container());
        pill.parallel_branches.push(vec![LayoutNode::new(
            "tool_0",
            NodeKind::Tool,
            NodeData::new("fetch"),
        )]);
        assert!(pill.sized_as_container());
    }

    #[test]
    fn test_subtree_len_counts_branches() {
        let mut root = LayoutNode::new("agent_0", NodeKind::Agent, NodeData::new("Agent"));
        root.children
            .push(LayoutNode::new("tool_0", NodeKind::Tool, NodeData::new("a")));
        root.parallel_branches.push(vec![
            LayoutNode::new("tool_1", NodeKind::Tool, NodeData::new("b")),
            LayoutNode::new("tool_2", NodeKind::Tool, NodeData::new("c")),
        ]);
        assert_eq!(root.subtree_len(), 4);
    }
}
