//! # greenlight
//!
//! Auto-approval `PreToolUse` hook for Claude Code.
//!
//! Each tool invocation Claude Code is about to perform arrives as one JSON
//! request on stdin. greenlight answers with exactly one of two outcomes:
//! a structured auto-approval, or an empty object that lets the host fall
//! back to its normal interactive prompt. It never blocks anything outright.
//!
//! The decision pipeline runs three layers in fixed order:
//!
//! 1. **Rules** - ordered deny/allow wildcard patterns from the active
//!    profile. Pure and synchronous.
//! 2. **Cache** - prior judge verdicts addressed by a fingerprint of the
//!    normalized operation, with lazy TTL expiry.
//! 3. **Judge** - a single Anthropic Messages API call that returns
//!    `{"approve": bool, "reason": string}`, parsed defensively.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use greenlight::cache::{DecisionCache, MemoryStore};
//! use greenlight::hook::{HookRequest, Pipeline};
//! use greenlight::policy::default_profile;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = DecisionCache::new(MemoryStore::new(), 86_400);
//!     let pipeline = Pipeline::new(true, default_profile(), cache, None);
//!
//!     let request: HookRequest =
//!         serde_json::from_str(r#"{"tool_name":"Read","tool_input":{"file_path":"/tmp/x"}}"#)
//!             .unwrap();
//!     let response = pipeline.run(&request).await;
//!     println!("{}", serde_json::to_string(&response).unwrap());
//! }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod config;
pub mod hook;
pub mod judge;
pub mod policy;

// Re-exports for convenience
pub use cache::{CacheEntry, CacheStore, DecisionCache, FileStore, MemoryStore};
pub use config::{Config, Paths};
pub use hook::{Decision, HookRequest, HookResponse, Pipeline};
pub use judge::{SafetyJudge, Verdict};
pub use policy::{Profile, ProfileStore, Rule, RuleVerdict, WildcardPattern};

/// Error type for greenlight operations.
///
/// Every variant degrades to a deferral at the protocol boundary; errors
/// exist for diagnostics and for the setup collaborator, never to block.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No API credential is configured in the environment.
    #[error("no API credential configured")]
    MissingCredential,

    /// The credential was rejected by the API (401/403).
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// The API reported an error or returned a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Network connectivity failed or the request timed out.
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The judge response survived none of the parsing strategies.
    #[error("unparseable judge response: {excerpt}")]
    Protocol { excerpt: String },

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category mirroring the failure taxonomy the pipeline degrades from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or rejected credential.
    Configuration,
    /// Network failures, timeouts, non-success API statuses.
    Transport,
    /// Judge output that could not be parsed.
    Protocol,
    /// Corrupt cache entries, unreadable files, bad JSON on disk.
    LocalState,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingCredential | Error::Auth { .. } => ErrorCategory::Configuration,
            Error::Network(_) | Error::Api { .. } => ErrorCategory::Transport,
            Error::Protocol { .. } => ErrorCategory::Protocol,
            Error::Json(_) | Error::Io(_) => ErrorCategory::LocalState,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_transport_error(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
