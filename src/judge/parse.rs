//! Defensive parsing of the judge's freeform answer.
//!
//! The judge is instructed to answer with a bare JSON object, but model
//! output drifts: fenced code blocks, prose around the object, or a verdict
//! embedded mid-sentence. Parsing tries the strictest reading first and
//! only then falls back to salvage.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::{Error, Result};

const EXCERPT_CHARS: usize = 100;

/// The judge's answer: approve or not, plus a one-line explanation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Verdict {
    pub approve: bool,
    #[serde(default)]
    pub reason: String,
}

fn fenced_block(text: &str) -> Option<&str> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fence pattern is static")
    });
    fence
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn literal_approve(text: &str) -> Option<bool> {
    static TRUE_RE: OnceLock<Regex> = OnceLock::new();
    static FALSE_RE: OnceLock<Regex> = OnceLock::new();
    let approve = TRUE_RE.get_or_init(|| {
        Regex::new(r#""approve"\s*:\s*true"#).expect("approve pattern is static")
    });
    let reject = FALSE_RE.get_or_init(|| {
        Regex::new(r#""approve"\s*:\s*false"#).expect("approve pattern is static")
    });

    if approve.is_match(text) {
        Some(true)
    } else if reject.is_match(text) {
        Some(false)
    } else {
        None
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

/// Parse a judge response, in order of attempt:
///
/// 1. the entire text as the expected object,
/// 2. the contents of a fenced code block,
/// 3. a literal `"approve": true/false` found anywhere in the text.
///
/// Anything else is a protocol error carrying a truncated excerpt for the
/// side log. The error must never be read as a verdict.
pub fn parse_verdict(text: &str) -> Result<Verdict> {
    if let Ok(verdict) = serde_json::from_str::<Verdict>(text.trim()) {
        return Ok(verdict);
    }

    if let Some(block) = fenced_block(text)
        && let Ok(verdict) = serde_json::from_str::<Verdict>(block)
    {
        return Ok(verdict);
    }

    if let Some(approve) = literal_approve(text) {
        return Ok(Verdict {
            approve,
            reason: "parsed from text".to_string(),
        });
    }

    Err(Error::Protocol {
        excerpt: excerpt(text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_json() {
        let verdict = parse_verdict(r#"{"approve": true, "reason": "routine read"}"#).unwrap();
        assert!(verdict.approve);
        assert_eq!(verdict.reason, "routine read");
    }

    #[test]
    fn test_bare_json_with_whitespace() {
        let verdict = parse_verdict("  \n{\"approve\": false, \"reason\": \"risky\"}\n").unwrap();
        assert!(!verdict.approve);
    }

    #[test]
    fn test_fenced_block() {
        let text = "Here is my assessment:\n```json\n{\"approve\": false, \"reason\": \"destructive\"}\n```";
        let verdict = parse_verdict(text).unwrap();
        assert!(!verdict.approve);
        assert_eq!(verdict.reason, "destructive");
    }

    #[test]
    fn test_fenced_block_without_language_tag() {
        let text = "```\n{\"approve\": true, \"reason\": \"fine\"}\n```";
        assert!(parse_verdict(text).unwrap().approve);
    }

    #[test]
    fn test_literal_salvage() {
        let text = r#"I would say "approve": true here because the command is harmless."#;
        let verdict = parse_verdict(text).unwrap();
        assert!(verdict.approve);
        assert_eq!(verdict.reason, "parsed from text");

        let text = r#"Definitely not: "approve": false."#;
        assert!(!parse_verdict(text).unwrap().approve);
    }

    #[test]
    fn test_missing_reason_defaults_empty() {
        let verdict = parse_verdict(r#"{"approve": true}"#).unwrap();
        assert!(verdict.approve);
        assert_eq!(verdict.reason, "");
    }

    #[test]
    fn test_garbage_is_a_protocol_error() {
        let err = parse_verdict("the model refused to answer").unwrap_err();
        match err {
            Error::Protocol { excerpt } => assert!(excerpt.contains("refused")),
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_excerpt_is_truncated() {
        let long = "x".repeat(500);
        let err = parse_verdict(&long).unwrap_err();
        match err {
            Error::Protocol { excerpt } => assert_eq!(excerpt.chars().count(), 100),
            other => panic!("expected protocol error, got {other:?}"),
        }
    }
}
