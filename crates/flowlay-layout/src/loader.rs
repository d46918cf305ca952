//! Trace file loading
//!
//! Reads step streams produced by upstream trace collectors: a complete
//! trace log serialized as YAML, or a JSONL session file with one step
//! per line. The JSONL reader tolerates blank lines and `#`-prefixed
//! summary lines that some collectors append to their session files.

use crate::error::{LayoutError, Result};
use flowlay_types::{TraceLog, TraceStep};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Load a complete trace log from a YAML file.
pub fn load_trace_file(path: &Path) -> Result<TraceLog> {
    let content = std::fs::read_to_string(path)?;
    let trace: TraceLog = serde_yaml::from_str(&content)?;
    info!(
        path = %path.display(),
        steps = trace.steps.len(),
        "loaded trace log"
    );
    Ok(trace)
}

/// Load a step stream from a JSONL session file, one step per line.
pub fn load_steps_jsonl(path: &Path) -> Result<Vec<TraceStep>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut steps = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            debug!(line = number + 1, "skipping summary line");
            continue;
        }
        let step: TraceStep = serde_json::from_str(trimmed).map_err(|e| {
            LayoutError::invalid_format(format!("line {}: {e}", number + 1))
        })?;
        steps.push(step);
    }

    info!(path = %path.display(), steps = steps.len(), "loaded step stream");
    Ok(steps)
}
