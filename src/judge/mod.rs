//! Safety evaluator client: formats one request to the external judge and
//! defensively parses its freeform answer into a verdict.

mod client;
mod parse;

pub use client::SafetyJudge;
pub use parse::{Verdict, parse_verdict};
