//! Tests for the geometry passes and the build entry point

use flowlay_layout::edges::flatten;
use flowlay_layout::{
    build, LayoutEngine, LayoutNode, NameMap, NodeKind, NodeStatus, StepType, TraceStep,
};
use std::collections::HashSet;

fn user_request(id: &str, task: &str, target: &str) -> TraceStep {
    TraceStep::new(id, StepType::UserRequest)
        .with_owning_task(task)
        .with_target(target)
}

fn conversation_steps() -> Vec<TraceStep> {
    vec![
        user_request("s1", "task-1", "assistant"),
        TraceStep::new("s2", StepType::AgentLlmCall)
            .with_owning_task("task-1")
            .with_function_call("f1"),
        TraceStep::new("s3", StepType::AgentToolInvocationStart)
            .with_owning_task("task-1")
            .with_function_call("f2")
            .with_target("search"),
        TraceStep::new("s4", StepType::AgentToolExecutionResult).with_function_call("f2"),
        TraceStep::new("s5", StepType::AgentResponseText).with_owning_task("task-1"),
    ]
}

fn workflow_with_map_steps() -> Vec<TraceStep> {
    vec![
        TraceStep::new("s1", StepType::WorkflowExecutionStart)
            .with_owning_task("wf-1")
            .with_target("pipeline"),
        TraceStep::new("s2", StepType::WorkflowNodeExecutionStart)
            .with_owning_task("wf-1")
            .with_function_call("f-map")
            .with_payload(serde_json::json!({"nodeType": "map"})),
        TraceStep::new("s3", StepType::WorkflowNodeExecutionStart)
            .with_owning_task("s2")
            .with_target("worker"),
        TraceStep::new("s4", StepType::WorkflowNodeExecutionStart)
            .with_owning_task("s2")
            .with_target("worker"),
        TraceStep::new("s5", StepType::WorkflowNodeExecutionResult).with_function_call("f-map"),
        TraceStep::new("s6", StepType::WorkflowExecutionResult).with_owning_task("wf-1"),
    ]
}

/// Every child (sequential or branch member) must sit inside its parent,
/// inset by at least the engine padding.
fn assert_contained(parent: &LayoutNode, padding: f64) {
    let members = parent
        .children
        .iter()
        .chain(parent.parallel_branches.iter().flatten());
    for child in members {
        assert!(
            child.x >= parent.x + padding - 1e-9,
            "{} leaks left out of {}",
            child.id,
            parent.id
        );
        assert!(
            child.x + child.width <= parent.x + parent.width - padding + 1e-9,
            "{} leaks right out of {}",
            child.id,
            parent.id
        );
        assert!(child.y >= parent.y - 1e-9, "{} above {}", child.id, parent.id);
        assert!(
            child.y + child.height <= parent.y + parent.height - padding + 1e-9,
            "{} leaks below {}",
            child.id,
            parent.id
        );
        assert_contained(child, padding);
    }
}

#[test]
fn test_single_user_request_layout() {
    let steps = vec![user_request("s1", "task-1", "assistant")];
    let layout = build(&steps, &NameMap::new());

    assert_eq!(layout.nodes.len(), 2);
    assert_eq!(layout.nodes[0].kind, NodeKind::User);
    assert_eq!(layout.nodes[1].kind, NodeKind::Agent);
    assert!(layout.nodes[1].children.is_empty());
    assert_eq!(layout.edges.len(), 1);
    assert_eq!(layout.edges[0].source, "user_0");
    assert_eq!(layout.edges[0].target, "agent_0");
}

#[test]
fn test_peer_invocation_layout() {
    let mut names = NameMap::new();
    names.insert("Helper".to_string(), "Helper".to_string());
    let steps = vec![
        user_request("s1", "task-1", "assistant"),
        TraceStep::new("s2", StepType::AgentToolInvocationStart)
            .with_owning_task("task-1")
            .with_function_call("f1")
            .with_target("peer_Helper"),
        TraceStep::new("s3", StepType::AgentToolExecutionResult).with_function_call("f1"),
        TraceStep::new("s4", StepType::AgentResponseText).with_owning_task("task-1"),
    ];
    let layout = build(&steps, &names);

    assert_eq!(layout.nodes.len(), 3);
    let nested = &layout.nodes[1].children[0];
    assert_eq!(nested.kind, NodeKind::Agent);
    assert_eq!(nested.data.label, "Helper");
    assert_eq!(nested.data.status, NodeStatus::Completed);
    assert_eq!(layout.nodes[2].kind, NodeKind::User);
}

#[test]
fn test_workflow_map_branches_do_not_overlap() {
    let layout = build(&workflow_with_map_steps(), &NameMap::new());

    assert_eq!(layout.nodes.len(), 1);
    let group = &layout.nodes[0];
    assert_eq!(group.kind, NodeKind::Group);
    assert_eq!(group.children[0].data.label, "Start");
    assert_eq!(group.children.last().unwrap().data.label, "Finish");

    let map = &group.children[1];
    assert_eq!(map.parallel_branches.len(), 2);
    let first = &map.parallel_branches[0][0];
    let second = &map.parallel_branches[1][0];
    assert!(
        first.x + first.width <= second.x,
        "branch columns overlap: {} and {}",
        first.id,
        second.id
    );
    // Branches start at the same height.
    assert_eq!(first.y, second.y);
}

#[test]
fn test_empty_input_yields_placeholder_canvas() {
    let engine = LayoutEngine::default();
    let layout = engine.build(&[], &NameMap::new());

    assert!(layout.nodes.is_empty());
    assert!(layout.edges.is_empty());
    assert_eq!((layout.total_width, layout.total_height), engine.empty_canvas);
}

#[test]
fn test_build_is_deterministic() {
    let steps = conversation_steps();
    let names = NameMap::new();

    let first = serde_json::to_value(build(&steps, &names)).unwrap();
    let second = serde_json::to_value(build(&steps, &names)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_node_ids_are_unique_across_the_tree() {
    let mut steps = conversation_steps();
    steps.extend(workflow_with_map_steps());
    let layout = build(&steps, &NameMap::new());

    let flat = flatten(&layout.nodes);
    let ids: HashSet<&str> = flat.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids.len(), flat.len());
}

#[test]
fn test_container_width_covers_widest_child() {
    let layout = build(&conversation_steps(), &NameMap::new());

    for node in flatten(&layout.nodes) {
        let widest = node
            .children
            .iter()
            .map(|child| child.width)
            .fold(0.0, f64::max);
        assert!(node.width >= widest);
    }
}

#[test]
fn test_container_height_covers_children() {
    let layout = build(&conversation_steps(), &NameMap::new());

    for node in flatten(&layout.nodes) {
        let stacked: f64 = node.children.iter().map(|child| child.height).sum();
        assert!(node.height >= stacked);
    }
}

#[test]
fn test_children_are_contained_in_parents() {
    let engine = LayoutEngine::default();
    let mut steps = conversation_steps();
    steps.extend(workflow_with_map_steps());
    let layout = engine.build(&steps, &NameMap::new());

    for root in &layout.nodes {
        assert_contained(root, engine.padding);
    }
}

#[test]
fn test_roots_are_centered_against_the_widest() {
    let layout = build(&conversation_steps(), &NameMap::new());

    let centers: Vec<f64> = layout
        .nodes
        .iter()
        .map(|root| root.x + root.width / 2.0)
        .collect();
    for center in &centers {
        assert!((center - centers[0]).abs() < 1e-9);
    }
}

#[test]
fn test_canvas_bounds_every_node() {
    let layout = build(&conversation_steps(), &NameMap::new());

    for node in flatten(&layout.nodes) {
        assert!(node.x + node.width <= layout.total_width);
        assert!(node.y + node.height <= layout.total_height);
    }
}

#[test]
fn test_leaf_sizes_follow_engine_parameters() {
    let engine = LayoutEngine::default();
    let layout = engine.build(&conversation_steps(), &NameMap::new());

    let agent = &layout.nodes[1];
    let llm = &agent.children[0];
    let tool = &agent.children[1];
    assert_eq!((llm.width, llm.height), engine.llm_size);
    assert_eq!((tool.width, tool.height), engine.tool_size);

    let user = &layout.nodes[0];
    assert_eq!((user.width, user.height), engine.user_size);
}

#[test]
fn test_pills_keep_fixed_size_without_a_body() {
    let engine = LayoutEngine::default();
    let layout = engine.build(&workflow_with_map_steps(), &NameMap::new());

    let group = &layout.nodes[0];
    let start = &group.children[0];
    assert_eq!((start.width, start.height), engine.pill_size);

    // The Map pill carries branches, so it is sized like a container.
    let map = &group.children[1];
    assert!(map.width > engine.pill_size.0);
}
