//! Request/response types for the host's `PreToolUse` hook exchange.
//!
//! The contract is deliberately asymmetric: the hook can say "skip the
//! prompt" with a structured approval, but it has no way to block. Every
//! non-allow outcome - rule deny, cached deny, judge deny, any error - is
//! the same empty object, which the host reads as "run the normal
//! interactive confirmation". The human prompt stays the backstop.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const HOOK_EVENT: &str = "PreToolUse";

const REASON_TAG: &str = "[greenlight]";
const MAX_COMMAND_CHARS: usize = 60;
const MAX_PATTERN_CHARS: usize = 30;

/// One permission request from the host.
#[derive(Debug, Clone, Deserialize)]
pub struct HookRequest {
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
}

/// Final outcome of the pipeline.
///
/// A closed two-variant enum on purpose: there is no `Deny`, so "never
/// actively block" holds by construction rather than by convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow { reason: String },
    Defer,
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self::Allow {
            reason: reason.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    /// Encode this decision for the host, attaching a redacted one-line
    /// summary of the operation to allow reasons.
    pub fn into_response(self, tool_name: &str, input: &Value) -> HookResponse {
        match self {
            Self::Allow { reason } => {
                let summary = summarize(tool_name, input);
                HookResponse::allow(format!("{REASON_TAG} {summary} ({reason})"))
            }
            Self::Defer => HookResponse::pass(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_event_name: String,
    pub permission_decision: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

/// Either an approval or the empty pass-through object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookResponse {
    #[serde(
        rename = "hookSpecificOutput",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub hook_specific_output: Option<HookOutput>,
}

impl HookResponse {
    /// The empty object: defer to the host's own confirmation flow.
    pub fn pass() -> Self {
        Self::default()
    }

    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            hook_specific_output: Some(HookOutput {
                hook_event_name: HOOK_EVENT.to_string(),
                permission_decision: "allow".to_string(),
                reason: reason.into(),
            }),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.hook_specific_output.is_none()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// A one-line operation summary safe to surface to the user: command text
/// truncated, paths reduced to their final segment, search patterns cut
/// short. Unknown tools fall back to the bare tool name.
pub fn summarize(tool_name: &str, input: &Value) -> String {
    match tool_name {
        "Bash" => {
            if let Some(command) = input.get("command").and_then(Value::as_str) {
                return format!("Bash: {}", truncate(command, MAX_COMMAND_CHARS));
            }
        }
        "Read" | "Write" | "Edit" | "Glob" => {
            let path = input
                .get("file_path")
                .or_else(|| input.get("path"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            let short = match path.rfind('/') {
                Some(idx) => format!("...{}", &path[idx..]),
                None => path.to_string(),
            };
            return format!("{tool_name}: {short}");
        }
        "Grep" => {
            if let Some(pattern) = input.get("pattern").and_then(Value::as_str) {
                return format!("Grep: {}", truncate(pattern, MAX_PATTERN_CHARS));
            }
        }
        _ => {}
    }
    tool_name.to_string()
}
