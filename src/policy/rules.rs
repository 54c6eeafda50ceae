//! Rule types and the ordered deny/allow evaluation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Profile;
use super::matcher::WildcardPattern;

/// One pattern rule scoped to a tool.
///
/// `tool` is either `"*"` or an exact tool name; `pattern` uses the
/// [`WildcardPattern`] grammar and is matched against the tool's subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub tool: String,
    pub pattern: String,
}

impl Rule {
    pub fn new(tool: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            pattern: pattern.into(),
        }
    }

    fn applies_to(&self, tool_name: &str) -> bool {
        self.tool == "*" || self.tool == tool_name
    }

    pub fn matches(&self, tool_name: &str, subject: &str) -> bool {
        self.applies_to(tool_name) && WildcardPattern::parse(&self.pattern).matches(subject)
    }
}

/// What a rule list decided about an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVerdict {
    Allow,
    Deny,
}

/// Extract the single string a rule pattern is matched against.
///
/// Execution tools match on the command text, file tools on the resolved
/// path (with `path` as a fallback key), search tools on the path. Unknown
/// tools yield an empty subject, which only `*` or an empty pattern match.
pub fn match_subject(tool_name: &str, input: &Value) -> String {
    let subject = match tool_name {
        "Bash" => input.get("command").and_then(Value::as_str),
        "Read" | "Write" | "Edit" | "Glob" => input
            .get("file_path")
            .or_else(|| input.get("path"))
            .and_then(Value::as_str),
        "Grep" => input.get("path").and_then(Value::as_str),
        _ => None,
    };
    subject.unwrap_or_default().to_string()
}

/// Evaluate an operation against a profile's rule lists.
///
/// Deny rules run first, in list order; the first match wins. An operation
/// matching both a deny and an allow rule is therefore always denied - the
/// lists are ordered and deny takes precedence, with no conflict warning.
/// Returns `None` when nothing matched, signaling the caller to continue.
pub fn check_rules(tool_name: &str, input: &Value, profile: &Profile) -> Option<RuleVerdict> {
    let subject = match_subject(tool_name, input);

    for rule in &profile.deny {
        if rule.matches(tool_name, &subject) {
            return Some(RuleVerdict::Deny);
        }
    }

    for rule in &profile.allow {
        if rule.matches(tool_name, &subject) {
            return Some(RuleVerdict::Allow);
        }
    }

    None
}
