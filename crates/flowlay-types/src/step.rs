//! Execution trace step records
//!
//! A step is one recorded event in an agent/workflow run. Steps arrive in
//! execution order and are consumed read-only by the layout engine; the
//! type-specific payload stays a raw JSON value so upstream producers can
//! evolve their schemas without breaking deserialization here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

/// Maps internal agent/workflow identifiers to human-readable display names.
pub type NameMap = HashMap<String, String>;

/// Targets containing this marker are handled by the workflow-specific
/// steps instead of the generic tool path.
pub const WORKFLOW_TOOL_MARKER: &str = "__workflow_call";

/// Target name prefixes that mark an invocation of a peer agent.
pub const PEER_TARGET_PREFIXES: [&str; 2] = ["peer_", "workflow_"];

/// Types of steps that can occur in an execution trace.
///
/// The set is closed on the producer side, but `Unknown` absorbs any
/// future step type so a single unrecognized record never fails a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StepType {
    /// A user message that opens a new exchange
    UserRequest,
    /// An LLM request issued by an agent
    AgentLlmCall,
    /// A tool (or peer-agent) invocation begins
    AgentToolInvocationStart,
    /// A previously started invocation finished
    AgentToolExecutionResult,
    /// Final response text produced by an agent
    AgentResponseText,
    /// A sub-workflow starts executing
    WorkflowExecutionStart,
    /// A node inside a workflow starts executing
    WorkflowNodeExecutionStart,
    /// A workflow node finished
    WorkflowNodeExecutionResult,
    /// The whole workflow finished
    WorkflowExecutionResult,
    /// Any step type this version does not know about
    Unknown,
}

impl From<String> for StepType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(StepType::Unknown)
    }
}

/// A single recorded event in an execution trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    /// Unique step identifier
    pub id: String,
    /// Step discriminant
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Logical task / agent-invocation this step belongs to
    #[serde(default, rename = "owningTaskId")]
    pub owning_task_id: Option<String>,
    /// Calling task, when this step is nested under another one
    #[serde(default, rename = "parentTaskId")]
    pub parent_task_id: Option<String>,
    /// Correlates an invocation-start with its later result
    #[serde(default, rename = "functionCallId")]
    pub function_call_id: Option<String>,
    /// Tool / agent / workflow name the step acts on
    #[serde(default)]
    pub target: Option<String>,
    /// When the step was recorded, if the producer stamps its records
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Type-specific payload
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl TraceStep {
    /// Create a minimal step of the given type.
    pub fn new(id: impl Into<String>, step_type: StepType) -> Self {
        Self {
            id: id.into(),
            step_type,
            owning_task_id: None,
            parent_task_id: None,
            function_call_id: None,
            target: None,
            timestamp: None,
            payload: serde_json::Value::Null,
        }
    }

    /// Set the owning task id and return self for chaining.
    pub fn with_owning_task(mut self, task_id: impl Into<String>) -> Self {
        self.owning_task_id = Some(task_id.into());
        self
    }

    /// Set the parent task id and return self for chaining.
    pub fn with_parent_task(mut self, task_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(task_id.into());
        self
    }

    /// Set the function call id and return self for chaining.
    pub fn with_function_call(mut self, call_id: impl Into<String>) -> Self {
        self.function_call_id = Some(call_id.into());
        self
    }

    /// Set the target name and return self for chaining.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the payload and return self for chaining.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Whether this invocation targets a peer agent rather than a plain tool.
    ///
    /// Detected via the explicit `isPeerInvocation` payload flag, or by a
    /// reserved target-name prefix when the flag is absent.
    pub fn is_peer_invocation(&self) -> bool {
        if let Some(flag) = self
            .payload
            .get("isPeerInvocation")
            .and_then(|v| v.as_bool())
        {
            return flag;
        }
        self.target
            .as_deref()
            .map(|t| PEER_TARGET_PREFIXES.iter().any(|p| t.starts_with(p)))
            .unwrap_or(false)
    }

    /// Whether the target carries the reserved workflow-tool marker.
    pub fn is_workflow_tool(&self) -> bool {
        self.target
            .as_deref()
            .map(|t| t.contains(WORKFLOW_TOOL_MARKER))
            .unwrap_or(false)
    }

    /// The workflow node kind discriminator, for workflow-node steps.
    pub fn node_type(&self) -> Option<&str> {
        self.payload.get("nodeType").and_then(|v| v.as_str())
    }

    /// Sub-task id announced by this step, for nested attachment.
    pub fn sub_task_id(&self) -> Option<&str> {
        self.payload.get("subTaskId").and_then(|v| v.as_str())
    }

    /// Condition text, for conditional workflow nodes.
    pub fn condition(&self) -> Option<&str> {
        self.payload.get("condition").and_then(|v| v.as_str())
    }

    /// Branch outcome, for conditional workflow nodes.
    pub fn branch(&self) -> Option<&str> {
        self.payload.get("branch").and_then(|v| v.as_str())
    }

    /// Error message carried by a result step, if the execution failed.
    pub fn error_message(&self) -> Option<&str> {
        self.payload.get("error").and_then(|v| v.as_str())
    }

    /// Peer target name with any reserved prefix stripped.
    pub fn peer_name(&self) -> Option<&str> {
        let target = self.target.as_deref()?;
        for prefix in PEER_TARGET_PREFIXES {
            if let Some(stripped) = target.strip_prefix(prefix) {
                return Some(stripped);
            }
        }
        Some(target)
    }
}

/// A complete recorded trace: the step stream plus session metadata.
///
/// This is the on-disk container produced by trace collectors; the layout
/// engine itself only ever consumes the `steps` slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceLog {
    /// Unique session identifier
    pub session_id: String,
    /// Agent that produced the trace (deterministic, local, gemini, etc.)
    pub agent_type: String,
    /// When recording started
    pub started_at: DateTime<Utc>,
    /// When recording ended, if the run completed
    pub ended_at: Option<DateTime<Utc>>,
    /// All steps in execution order
    pub steps: Vec<TraceStep>,
}

impl TraceLog {
    /// Create an empty trace log with a fresh session id.
    pub fn new(agent_type: impl Into<String>) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            agent_type: agent_type.into(),
            started_at: Utc::now(),
            ended_at: None,
            steps: Vec::new(),
        }
    }

    /// Append a step to the trace.
    pub fn add_step(&mut self, step: TraceStep) {
        self.steps.push(step);
    }

    /// Mark the trace as finished.
    pub fn complete(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    /// Total recording duration, when the trace has ended.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.ended_at.map(|end| end - self.started_at)
    }

    /// Count steps by type.
    pub fn count_steps_by_type(&self) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for step in &self.steps {
            *counts.entry(step.step_type.to_string()).or_insert(0) += 1;
        }
        counts
    }
}
