//! Result aggregation - turns the execution log into the run's final text

use super::record::NodeExecutionRecord;
use serde_json::Value;

/// Fields checked, in order, for a human-readable payload
const TEXT_FIELDS: [&str; 3] = ["response", "message", "result"];

/// Text of the last successful execution, empty if none succeeded
pub fn final_output(executions: &[NodeExecutionRecord]) -> String {
    executions
        .iter()
        .rev()
        .find(|rec| rec.is_success())
        .and_then(|rec| rec.output.as_ref())
        .map(extract_text)
        .unwrap_or_default()
}

/// First non-empty string among `response`, `message`, `result`;
/// otherwise a pretty JSON dump of the whole output.
pub fn extract_text(output: &Value) -> String {
    match output {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => TEXT_FIELDS
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| dump(output)),
        other => dump(other),
    }
}

fn dump(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
