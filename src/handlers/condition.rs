//! If-condition handler - compares a field against a value and picks a branch

use super::{NodeContext, NodeHandler, NodeOutcome};
use anyhow::Result;
use futures::future::{self, BoxFuture};
use regex::RegexBuilder;
use serde_json::{json, Value};

/// Branch label when the condition holds
pub const BRANCH_TRUE: &str = "true";
/// Branch label when it does not
pub const BRANCH_FALSE: &str = "false";

/// Conditional node with `"true"` / `"false"` output ports
#[derive(Debug, Clone, Copy, Default)]
pub struct IfConditionHandler;

impl IfConditionHandler {
    fn evaluate(ctx: &NodeContext<'_>) -> NodeOutcome {
        let field = ctx.config_str("field").unwrap_or("message");
        let operator = ctx.config_str("operator").unwrap_or("equals");
        let compare_value = config_text(ctx, "value");

        let actual_value = match field {
            // UTF-16 code units, as the message length is measured in the editor
            "message.length" => ctx.trigger.encode_utf16().count().to_string(),
            "output" if !ctx.input.is_null() => ctx.input.to_string(),
            "output" => String::new(),
            _ => ctx.trigger.to_string(),
        };

        let result = evaluate_condition(&actual_value, operator, &compare_value);
        let branch = if result { BRANCH_TRUE } else { BRANCH_FALSE };

        NodeOutcome::new(json!({
            "field": field,
            "operator": operator,
            "compareValue": compare_value,
            "actualValue": actual_value,
            "result": result,
            "branch": branch,
        }))
        .with_branch(branch)
    }
}

impl NodeHandler for IfConditionHandler {
    fn run<'a>(&'a self, ctx: NodeContext<'a>) -> BoxFuture<'a, Result<NodeOutcome>> {
        Box::pin(future::ready(Ok(Self::evaluate(&ctx))))
    }

    fn is_conditional(&self) -> bool {
        true
    }
}

/// Config entry rendered as text; scalars are stringified, missing is empty
fn config_text(ctx: &NodeContext<'_>, key: &str) -> String {
    match ctx.config_value(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Finite decimal number; `inf`, `infinity` and `NaN` spellings are text
fn as_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Evaluate `field_value <operator> compare_value`.
///
/// Both sides are trimmed. Text comparisons ignore case; `equals` and
/// `not_equals` compare numerically when both sides are numbers. Unknown
/// operators and invalid regexes evaluate to `false`.
pub fn evaluate_condition(field_value: &str, operator: &str, compare_value: &str) -> bool {
    let fv = field_value.trim();
    let cv = compare_value.trim();
    let fv_lower = fv.to_lowercase();
    let cv_lower = cv.to_lowercase();

    match operator {
        "equals" => match (as_number(fv), as_number(cv)) {
            (Some(a), Some(b)) => a == b,
            _ => fv_lower == cv_lower,
        },
        "not_equals" => match (as_number(fv), as_number(cv)) {
            (Some(a), Some(b)) => a != b,
            _ => fv_lower != cv_lower,
        },
        "contains" => fv_lower.contains(&cv_lower),
        "not_contains" => !fv_lower.contains(&cv_lower),
        "greater" => matches!((as_number(fv), as_number(cv)), (Some(a), Some(b)) if a > b),
        "less" => matches!((as_number(fv), as_number(cv)), (Some(a), Some(b)) if a < b),
        "starts_with" => fv_lower.starts_with(&cv_lower),
        "ends_with" => fv_lower.ends_with(&cv_lower),
        "is_empty" => fv.is_empty(),
        "is_not_empty" => !fv.is_empty(),
        "regex" => RegexBuilder::new(cv)
            .case_insensitive(true)
            .build()
            .map(|re| re.is_match(fv))
            .unwrap_or(false),
        other => {
            log::debug!("Unknown condition operator '{}'", other);
            false
        }
    }
}
