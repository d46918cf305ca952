//! Trace interpretation
//!
//! Consumes a step stream once, left to right, and incrementally builds
//! the layout tree by mapping step types to tree mutations: append child,
//! open container, close container, open parallel branch, record a status
//! update. All state lives in a call-scoped [`BuildContext`]; two builds
//! over the same stream produce two disjoint trees and concurrent builds
//! share nothing.
//!
//! Malformed input degrades instead of failing: unknown step types are
//! skipped, unresolvable attachments fall back to the most recently
//! opened agent, and orphaned results are dropped. Every such decision is
//! traced at debug level.

use flowlay_types::{
    LayoutNode, NameMap, NodeData, NodeKind, NodeStatus, NodeVariant, StepType, TraceStep,
};
use std::collections::HashMap;
use tracing::debug;

/// Index into the build arena.
type NodeIdx = usize;

/// A node under construction. Children are arena indices so the routing
/// tables can point anywhere into the tree while it is still growing.
struct BuildNode {
    id: String,
    kind: NodeKind,
    data: NodeData,
    children: Vec<NodeIdx>,
    branches: Vec<Vec<NodeIdx>>,
}

/// Interpreter state threaded through the single forward pass.
///
/// The routing tables are lookup keys, never owners: `task_containers`
/// lets later steps find the container they belong to, `call_nodes` lets
/// a result step find the node it must close. The whole context is
/// dropped when [`interpret`] returns.
struct BuildContext<'a> {
    names: &'a NameMap,
    arena: Vec<BuildNode>,
    roots: Vec<NodeIdx>,
    /// task id -> currently open container for that task
    task_containers: HashMap<String, NodeIdx>,
    /// function-call id (or node execution id) -> started node
    call_nodes: HashMap<String, NodeIdx>,
    /// most recently opened agent, the fallback attachment target
    current_agent: Option<NodeIdx>,
    /// per-kind counters for sequential id generation
    counters: HashMap<NodeKind, usize>,
}

impl<'a> BuildContext<'a> {
    fn new(names: &'a NameMap) -> Self {
        Self {
            names,
            arena: Vec::new(),
            roots: Vec::new(),
            task_containers: HashMap::new(),
            call_nodes: HashMap::new(),
            current_agent: None,
            counters: HashMap::new(),
        }
    }

    /// Allocate a node in the arena with a `{kind}_{index}` id.
    fn alloc(&mut self, kind: NodeKind, data: NodeData) -> NodeIdx {
        let counter = self.counters.entry(kind).or_insert(0);
        let id = format!("{}_{}", kind, *counter);
        *counter += 1;
        self.arena.push(BuildNode {
            id,
            kind,
            data,
            children: Vec::new(),
            branches: Vec::new(),
        });
        self.arena.len() - 1
    }

    /// Attach a child to a parent. Map/Fork pills open a new parallel
    /// branch per attached child; every other parent appends to its
    /// sequential scope.
    fn attach(&mut self, parent: NodeIdx, child: NodeIdx) {
        let opens_branch = {
            let p = &self.arena[parent];
            p.kind == NodeKind::Loop && p.data.variant == NodeVariant::Pill
        };
        let p = &mut self.arena[parent];
        if opens_branch {
            p.branches.push(vec![child]);
            p.data.iterations = Some(p.branches.len() as u32);
        } else {
            p.children.push(child);
        }
    }

    /// Resolve the container a step should attach to: `owning_task_id`
    /// lookup first, most recently opened agent as fallback. Returns
    /// `None` (and traces) only when no agent exists at all.
    fn resolve_container(&self, step: &TraceStep) -> Option<NodeIdx> {
        if let Some(task_id) = step.owning_task_id.as_deref() {
            if let Some(&idx) = self.task_containers.get(task_id) {
                return Some(idx);
            }
            debug!(
                step_id = %step.id,
                task_id,
                "owning task not registered, falling back to current agent"
            );
        }
        if self.current_agent.is_none() {
            debug!(step_id = %step.id, "no container available, dropping step");
        }
        self.current_agent
    }

    /// Human-readable name for an internal identifier.
    fn display_name(&self, raw: &str) -> String {
        self.names
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }

    fn register_call(&mut self, step: &TraceStep, idx: NodeIdx) {
        if let Some(call_id) = &step.function_call_id {
            self.call_nodes.insert(call_id.clone(), idx);
        }
    }

    /// Status for a result step: error payloads close the node as failed.
    fn result_status(step: &TraceStep) -> NodeStatus {
        if step.error_message().is_some() {
            NodeStatus::Error
        } else {
            NodeStatus::Completed
        }
    }

    fn on_user_request(&mut self, step: &TraceStep) {
        let user = self.alloc(
            NodeKind::User,
            NodeData::new("User").with_step_id(step.id.clone()),
        );
        self.roots.push(user);

        let label = match step.target.as_deref() {
            Some(target) => self.display_name(target),
            None => "Agent".to_string(),
        };
        let agent = self.alloc(
            NodeKind::Agent,
            NodeData::new(label)
                .with_step_id(step.id.clone())
                .with_status(NodeStatus::InProgress),
        );
        self.roots.push(agent);

        if let Some(task_id) = &step.owning_task_id {
            self.task_containers.insert(task_id.clone(), agent);
        }
        self.current_agent = Some(agent);
    }

    fn on_llm_call(&mut self, step: &TraceStep) {
        let Some(container) = self.resolve_container(step) else {
            return;
        };
        let label = step
            .payload
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or("LLM")
            .to_string();
        let llm = self.alloc(
            NodeKind::Llm,
            NodeData::new(label)
                .with_step_id(step.id.clone())
                .with_status(NodeStatus::InProgress),
        );
        self.attach(container, llm);
        self.register_call(step, llm);
    }

    fn on_tool_start(&mut self, step: &TraceStep) {
        if step.is_workflow_tool() {
            // Handled by the workflow-specific steps; counting it here
            // would duplicate the group node.
            debug!(step_id = %step.id, "skipping workflow-tool invocation");
            return;
        }
        let Some(container) = self.resolve_container(step) else {
            return;
        };

        if step.is_peer_invocation() {
            let label = match step.peer_name() {
                Some(name) => self.display_name(name),
                None => "Agent".to_string(),
            };
            let nested = self.alloc(
                NodeKind::Agent,
                NodeData::new(label)
                    .with_step_id(step.id.clone())
                    .with_status(NodeStatus::InProgress),
            );
            self.attach(container, nested);

            let sub_task = step
                .sub_task_id()
                .map(str::to_string)
                .or_else(|| step.function_call_id.clone());
            if let Some(task_id) = sub_task {
                self.task_containers.insert(task_id, nested);
            }
            self.register_call(step, nested);
            self.current_agent = Some(nested);
        } else {
            let label = match step.target.as_deref() {
                Some(target) => self.display_name(target),
                None => "Tool".to_string(),
            };
            let tool = self.alloc(
                NodeKind::Tool,
                NodeData::new(label)
                    .with_step_id(step.id.clone())
                    .with_status(NodeStatus::InProgress),
            );
            self.attach(container, tool);
            self.register_call(step, tool);
        }
    }

    fn on_tool_result(&mut self, step: &TraceStep) {
        let Some(call_id) = step.function_call_id.as_deref() else {
            debug!(step_id = %step.id, "tool result without function call id, ignoring");
            return;
        };
        match self.call_nodes.get(call_id) {
            Some(&idx) => self.arena[idx].data.status = Self::result_status(step),
            // Results may race ahead of registration in malformed traces.
            None => debug!(step_id = %step.id, call_id, "result for unknown call, ignoring"),
        }
    }

    fn on_response_text(&mut self, step: &TraceStep) {
        let Some(container) = self.resolve_container(step) else {
            return;
        };
        // Only top-level exchanges get a closing user marker; nested
        // agent responses stay inside their container.
        if !self.roots.contains(&container) {
            return;
        }
        let user = self.alloc(
            NodeKind::User,
            NodeData::new("User").with_step_id(step.id.clone()),
        );
        self.roots.push(user);
    }

    fn on_workflow_start(&mut self, step: &TraceStep) {
        let label = match step.target.as_deref() {
            Some(target) => self.display_name(target),
            None => "Workflow".to_string(),
        };
        let group = self.alloc(
            NodeKind::Group,
            NodeData::new(label)
                .with_step_id(step.id.clone())
                .with_status(NodeStatus::InProgress),
        );

        let caller = step
            .parent_task_id
            .as_deref()
            .and_then(|task_id| self.task_containers.get(task_id).copied());
        match caller {
            Some(parent) => self.attach(parent, group),
            None => self.roots.push(group),
        }

        let start = self.alloc(NodeKind::Join, NodeData::new("Start").as_pill());
        self.attach(group, start);

        if let Some(task_id) = &step.owning_task_id {
            self.task_containers.insert(task_id.clone(), group);
        }
    }

    fn on_workflow_node_start(&mut self, step: &TraceStep) {
        let Some(container) = self.resolve_container(step) else {
            return;
        };

        let node = match step.node_type().unwrap_or_default() {
            "conditional" | "if" => {
                let mut data = NodeData::new(match step.target.as_deref() {
                    Some(target) => self.display_name(target),
                    None => "Condition".to_string(),
                })
                .with_step_id(step.id.clone())
                .with_status(NodeStatus::InProgress);
                data.condition = step.condition().map(str::to_string);
                data.branch = step.branch().map(str::to_string);
                self.alloc(NodeKind::Conditional, data)
            }
            "switch" => {
                let data = NodeData::new(match step.target.as_deref() {
                    Some(target) => self.display_name(target),
                    None => "Switch".to_string(),
                })
                .with_step_id(step.id.clone())
                .with_status(NodeStatus::InProgress);
                self.alloc(NodeKind::Switch, data)
            }
            "map" => {
                let mut data = NodeData::new("Map").with_step_id(step.id.clone()).as_pill();
                data.iterations = Some(0);
                self.alloc(NodeKind::Loop, data)
            }
            "fork" | "parallel" => {
                let data = NodeData::new("Fork").with_step_id(step.id.clone()).as_pill();
                self.alloc(NodeKind::Loop, data)
            }
            "join" => {
                let data = NodeData::new("Join").with_step_id(step.id.clone()).as_pill();
                self.alloc(NodeKind::Join, data)
            }
            _ => {
                let label = match step.target.as_deref() {
                    Some(target) => self.display_name(target),
                    None => "Node".to_string(),
                };
                self.alloc(
                    NodeKind::Agent,
                    NodeData::new(label)
                        .with_step_id(step.id.clone())
                        .with_status(NodeStatus::InProgress),
                )
            }
        };
        self.attach(container, node);

        // Container-capable nodes take subsequent nested steps: register
        // the node's own execution id (and any announced sub-task id).
        let kind = self.arena[node].kind;
        if matches!(kind, NodeKind::Agent | NodeKind::Loop) {
            self.task_containers.insert(step.id.clone(), node);
            if let Some(sub_task) = step.sub_task_id() {
                self.task_containers.insert(sub_task.to_string(), node);
            }
            if kind == NodeKind::Agent {
                self.current_agent = Some(node);
            }
        }

        // Results correlate by function-call id or the node's own id.
        self.call_nodes.insert(step.id.clone(), node);
        self.register_call(step, node);
    }

    fn on_workflow_node_result(&mut self, step: &TraceStep) {
        let resolved = step
            .function_call_id
            .as_deref()
            .and_then(|call_id| self.call_nodes.get(call_id).copied())
            .or_else(|| {
                step.payload
                    .get("nodeExecutionId")
                    .and_then(|v| v.as_str())
                    .and_then(|node_id| self.call_nodes.get(node_id).copied())
            });
        match resolved {
            Some(idx) => self.arena[idx].data.status = Self::result_status(step),
            None => debug!(step_id = %step.id, "result for unknown workflow node, ignoring"),
        }
    }

    fn on_workflow_result(&mut self, step: &TraceStep) {
        let Some(group) = self.resolve_container(step) else {
            return;
        };
        let finish = self.alloc(NodeKind::Join, NodeData::new("Finish").as_pill());
        self.attach(group, finish);
        self.arena[group].data.status = Self::result_status(step);
    }
}

/// Materialize the owned layout tree from the build arena.
fn materialize(arena: &[BuildNode], idx: NodeIdx) -> LayoutNode {
    let build = &arena[idx];
    let mut node = LayoutNode::new(build.id.clone(), build.kind, build.data.clone());
    node.children = build
        .children
        .iter()
        .map(|&child| materialize(arena, child))
        .collect();
    node.parallel_branches = build
        .branches
        .iter()
        .map(|branch| branch.iter().map(|&child| materialize(arena, child)).collect())
        .collect();
    node
}

/// Build the (unmeasured, unpositioned) layout tree from a step stream.
///
/// Single forward pass; never fails. Ids are counter-based, so feeding
/// the same steps twice produces two disjoint but structurally identical
/// trees.
pub fn interpret(steps: &[TraceStep], names: &NameMap) -> Vec<LayoutNode> {
    let mut ctx = BuildContext::new(names);
    for step in steps {
        match step.step_type {
            StepType::UserRequest => ctx.on_user_request(step),
            StepType::AgentLlmCall => ctx.on_llm_call(step),
            StepType::AgentToolInvocationStart => ctx.on_tool_start(step),
            StepType::AgentToolExecutionResult => ctx.on_tool_result(step),
            StepType::AgentResponseText => ctx.on_response_text(step),
            StepType::WorkflowExecutionStart => ctx.on_workflow_start(step),
            StepType::WorkflowNodeExecutionStart => ctx.on_workflow_node_start(step),
            StepType::WorkflowNodeExecutionResult => ctx.on_workflow_node_result(step),
            StepType::WorkflowExecutionResult => ctx.on_workflow_result(step),
            StepType::Unknown => {
                debug!(step_id = %step.id, "skipping unrecognized step type");
            }
        }
    }

    let BuildContext { arena, roots, .. } = ctx;
    roots.iter().map(|&root| materialize(&arena, root)).collect()
}
