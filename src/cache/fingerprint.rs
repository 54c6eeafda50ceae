//! Content-addressed fingerprints for cache lookups.
//!
//! Semantically equivalent operations must land on the same cache slot, so
//! command text is normalized through an ordered rewrite list before
//! hashing: `npm install left-pad` and `npm install right-pad` both become
//! `npm install *`. Non-command input is serialized canonically instead
//! (serde_json's map keeps keys sorted, so equal inputs serialize equally).

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

struct Rewrite {
    pattern: Regex,
    replacement: &'static str,
}

/// First matching rewrite wins; unmatched commands pass through verbatim.
fn rewrites() -> &'static [Rewrite] {
    static REWRITES: OnceLock<Vec<Rewrite>> = OnceLock::new();
    REWRITES.get_or_init(|| {
        [
            // Package installs collapse by verb+subcommand, not package name
            (r"^(npm|yarn|pnpm)\s+(install|add|remove)\s+.+", "$1 $2 *"),
            (r"^pip3?\s+install\s+.+", "pip install *"),
            (r"^git\s+commit\s+.+", "git commit *"),
            // rm without flags
            (r"^rm\s+[^-].*", "rm *"),
            // rm with flags but not -r
            (r"^rm\s+-[^r].*", "rm -* *"),
            (r"^mkdir\s+.+", "mkdir *"),
            (r"^(cat|head|tail)\s+.+", "$1 *"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| Rewrite {
            pattern: Regex::new(pattern).expect("rewrite patterns are static"),
            replacement,
        })
        .collect()
    })
}

pub fn normalize_command(command: &str) -> String {
    for rewrite in rewrites() {
        if rewrite.pattern.is_match(command) {
            return rewrite
                .pattern
                .replace(command, rewrite.replacement)
                .into_owned();
        }
    }
    command.to_string()
}

fn normalize_input(tool_name: &str, input: &Value) -> String {
    if tool_name == "Bash" {
        return input
            .get("command")
            .and_then(Value::as_str)
            .map(normalize_command)
            .unwrap_or_default();
    }
    serde_json::to_string(input).unwrap_or_default()
}

/// Deterministic short digest identifying one normalized operation.
///
/// SHA-256 over `profile:tool:normalized-input`, truncated to the first
/// 8 bytes and hex-encoded (16 chars) - short enough for file names, long
/// enough that collisions are not a practical concern for a cache.
pub fn fingerprint(profile: &str, tool_name: &str, input: &Value) -> String {
    let normalized = normalize_input(tool_name, input);

    let mut hasher = Sha256::new();
    hasher.update(profile.as_bytes());
    hasher.update(b":");
    hasher.update(tool_name.as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());

    hasher.finalize()[..8]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_package_installs_collapse() {
        assert_eq!(normalize_command("npm install left-pad"), "npm install *");
        assert_eq!(normalize_command("npm install right-pad"), "npm install *");
        assert_eq!(normalize_command("yarn add react react-dom"), "yarn add *");
        assert_eq!(normalize_command("pnpm remove lodash"), "pnpm remove *");
        assert_eq!(normalize_command("pip3 install requests"), "pip install *");
        assert_eq!(normalize_command("pip install flask"), "pip install *");
    }

    #[test]
    fn test_rm_collapses_by_flag_presence() {
        assert_eq!(normalize_command("rm file.txt"), "rm *");
        assert_eq!(normalize_command("rm -f file.txt"), "rm -* *");
        // -r keeps its exact form: recursive deletes do not share a slot
        assert_eq!(normalize_command("rm -rf /tmp/x"), "rm -rf /tmp/x");
    }

    #[test]
    fn test_single_argument_reads_collapse_by_verb() {
        assert_eq!(normalize_command("cat /etc/hosts"), "cat *");
        assert_eq!(normalize_command("head -5 log.txt"), "head *");
        assert_eq!(normalize_command("tail -f service.log"), "tail *");
        assert_eq!(normalize_command("mkdir -p a/b/c"), "mkdir *");
    }

    #[test]
    fn test_unmatched_commands_pass_through() {
        assert_eq!(normalize_command("git status"), "git status");
        assert_eq!(
            normalize_command("cargo build --release"),
            "cargo build --release"
        );
    }

    #[test]
    fn test_fingerprint_stable_across_package_names() {
        let a = fingerprint("balanced", "Bash", &json!({"command": "npm install left-pad"}));
        let b = fingerprint("balanced", "Bash", &json!({"command": "npm install right-pad"}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_sensitive_to_profile_and_tool() {
        let input = json!({"command": "git status"});
        let a = fingerprint("balanced", "Bash", &input);
        let b = fingerprint("strict", "Bash", &input);
        assert_ne!(a, b);

        let path = json!({"file_path": "/tmp/x"});
        assert_ne!(
            fingerprint("balanced", "Read", &path),
            fingerprint("balanced", "Write", &path)
        );
    }

    #[test]
    fn test_fingerprint_shape() {
        let fp = fingerprint("balanced", "Read", &json!({"file_path": "/tmp/x"}));
        assert_eq!(fp.len(), 16);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_non_command_input_uses_canonical_serialization() {
        // serde_json maps sort keys, so key order in the source is irrelevant
        let a = json!({"file_path": "/tmp/x", "limit": 10});
        let b = json!({"limit": 10, "file_path": "/tmp/x"});
        assert_eq!(
            fingerprint("balanced", "Read", &a),
            fingerprint("balanced", "Read", &b)
        );
    }
}
