//! Decoding of trace files into [`TaskTrace`] records.
//!
//! A file is either a JSON array or newline-delimited JSON. Each record is a web-log event
//! (anything with an `event` or `trace` key) or a plain `TaskTrace`.

mod weblog;

pub use weblog::{WeblogEvent, WeblogTrace};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::types::TaskTrace;

/// Identity of a task across the successive events reported for it.
type TaskKey = (String, String, u64, Option<u32>);

fn task_key(trace: &TaskTrace) -> TaskKey {
    (
        trace.run_name.clone(),
        trace.process.clone(),
        trace.task_id,
        trace.attempt,
    )
}

fn is_weblog_event(value: &Value) -> bool {
    value.get("trace").is_some() || value.get("event").is_some()
}

fn decode_record(value: Value) -> Result<Option<TaskTrace>> {
    if is_weblog_event(&value) {
        let event: WeblogEvent =
            serde_json::from_value(value).context("failed to decode web-log event")?;
        Ok(event.into_task_trace())
    } else {
        let trace: TaskTrace =
            serde_json::from_value(value).context("failed to decode task trace")?;
        Ok(Some(trace))
    }
}

fn parse_values(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("failed to parse trace array");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("invalid JSON on line {}", idx + 1))
        })
        .collect()
}

/// Keeps one record per task: the last reported state, at the position the task was first seen.
pub fn collapse_task_updates(traces: Vec<TaskTrace>) -> Vec<TaskTrace> {
    let mut positions: HashMap<TaskKey, usize> = HashMap::new();
    let mut collapsed: Vec<TaskTrace> = Vec::with_capacity(traces.len());

    for trace in traces {
        match positions.get(&task_key(&trace)) {
            Some(&idx) => collapsed[idx] = trace,
            None => {
                positions.insert(task_key(&trace), collapsed.len());
                collapsed.push(trace);
            }
        }
    }
    collapsed
}

/// Decodes a trace document. Syntactically broken JSON fails the whole document; records that
/// parse but do not describe a task are skipped.
pub fn decode_traces(content: &str) -> Result<Vec<TaskTrace>> {
    let values = parse_values(content)?;
    let total = values.len();

    let mut traces = Vec::with_capacity(total);
    let mut skipped = 0usize;
    for (idx, value) in values.into_iter().enumerate() {
        match decode_record(value) {
            Ok(Some(trace)) => traces.push(trace),
            Ok(None) => skipped += 1,
            Err(e) => {
                warn!("Skipping trace record {}: {:#}", idx + 1, e);
                skipped += 1;
            }
        }
    }

    let traces = collapse_task_updates(traces);
    debug!(
        "Decoded {} records into {} tasks ({} skipped)",
        total,
        traces.len(),
        skipped
    );
    Ok(traces)
}

pub fn read_traces(path: &Path) -> Result<Vec<TaskTrace>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trace file {:?}", path))?;
    decode_traces(&content).with_context(|| format!("failed to decode trace file {:?}", path))
}
