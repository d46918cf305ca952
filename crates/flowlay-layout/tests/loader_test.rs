//! Tests for the trace file loader

use anyhow::Result;
use flowlay_layout::loader::{load_steps_jsonl, load_trace_file};
use flowlay_layout::{build, LayoutError, NameMap, StepType};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_trace_yaml() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"
session_id: session-1
agent_type: deterministic
started_at: 2026-08-01T10:00:00Z
ended_at: 2026-08-01T10:00:05Z
steps:
  - id: s1
    type: USER_REQUEST
    owningTaskId: task-1
    target: assistant
  - id: s2
    type: AGENT_LLM_CALL
    owningTaskId: task-1
    functionCallId: f1
"#
    )?;

    let trace = load_trace_file(file.path())?;
    assert_eq!(trace.session_id, "session-1");
    assert_eq!(trace.steps.len(), 2);
    assert_eq!(trace.steps[0].step_type, StepType::UserRequest);

    let layout = build(&trace.steps, &NameMap::new());
    assert_eq!(layout.nodes.len(), 2);
    Ok(())
}

#[test]
fn test_load_steps_jsonl_skips_blank_and_summary_lines() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        r#"{{"id":"s1","type":"USER_REQUEST","owningTaskId":"task-1","target":"assistant"}}"#
    )?;
    writeln!(file)?;
    writeln!(file, "# SESSION_SUMMARY: {{\"total\": 2}}")?;
    writeln!(
        file,
        r#"{{"id":"s2","type":"AGENT_LLM_CALL","owningTaskId":"task-1"}}"#
    )?;

    let steps = load_steps_jsonl(file.path())?;
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].step_type, StepType::AgentLlmCall);
    Ok(())
}

#[test]
fn test_load_steps_jsonl_tolerates_future_step_types() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, r#"{{"id":"s1","type":"SOME_FUTURE_STEP"}}"#)?;

    let steps = load_steps_jsonl(file.path())?;
    assert_eq!(steps[0].step_type, StepType::Unknown);
    Ok(())
}

#[test]
fn test_load_steps_jsonl_rejects_malformed_lines() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "not json at all")?;

    let err = load_steps_jsonl(file.path()).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidFormat(_)));
    assert!(err.to_string().contains("line 1"));
    Ok(())
}

#[test]
fn test_load_missing_file_is_an_io_error() {
    let err = load_trace_file(std::path::Path::new("does/not/exist.yml")).unwrap_err();
    assert!(matches!(err, LayoutError::Io(_)));
}
