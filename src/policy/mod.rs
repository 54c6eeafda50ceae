//! Policy profiles and the static rule engine.

mod builtin;
mod matcher;
mod profile;
mod rules;

pub use builtin::{balanced, default_profile, find_builtin, permissive, strict};
pub use matcher::WildcardPattern;
pub use profile::{Expectation, Fixture, Profile, ProfileStore};
pub use rules::{Rule, RuleVerdict, check_rules, match_subject};
