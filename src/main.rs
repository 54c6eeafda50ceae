//! Hook entry point.
//!
//! Reads one `PreToolUse` request from stdin, runs the decision pipeline,
//! and prints one JSON response line. The process always exits 0 and falls
//! back to the empty pass-through object on any failure - a broken hook
//! must degrade to Claude Code's own permission prompt, not break it.

use std::io::Read;
use std::sync::Arc;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use greenlight::cache::{DecisionCache, FileStore};
use greenlight::config::{Config, Paths};
use greenlight::hook::{HookRequest, HookResponse, Pipeline};
use greenlight::judge::SafetyJudge;
use greenlight::policy::ProfileStore;

#[tokio::main]
async fn main() {
    let paths = Paths::discover();
    let config = match &paths {
        Some(paths) => Config::load(&paths.config_file()),
        None => Config::default(),
    };

    if config.logging
        && let Some(paths) = &paths
    {
        init_logging(paths);
    }

    let response = match &paths {
        Some(paths) => respond(&config, paths).await,
        None => HookResponse::pass(),
    };

    match serde_json::to_string(&response) {
        Ok(json) => println!("{json}"),
        Err(_) => println!("{{}}"),
    }
}

async fn respond(config: &Config, paths: &Paths) -> HookResponse {
    let mut raw = String::new();
    if std::io::stdin().read_to_string(&mut raw).is_err() {
        warn!("failed to read hook input");
        return HookResponse::pass();
    }

    let request: HookRequest = match serde_json::from_str(&raw) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "unparseable hook request, passing through");
            return HookResponse::pass();
        }
    };

    let profile = ProfileStore::new(paths.profiles_dir()).load(&config.profile);
    let cache = DecisionCache::new(FileStore::new(paths.cache_dir()), config.cache_ttl);

    let judge = match Config::credential() {
        Some(key) => match SafetyJudge::new(key, &config.model) {
            Ok(judge) => Some(judge),
            Err(err) => {
                warn!(error = %err, "failed to build judge client");
                None
            }
        },
        None => None,
    };

    Pipeline::new(config.enabled, profile, cache, judge)
        .run(&request)
        .await
}

/// Append diagnostics to the side log. Never into the response.
fn init_logging(paths: &Paths) {
    if let Some(parent) = paths.log_file().parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(paths.log_file())
    else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("greenlight=debug,info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Arc::new(file))
        .try_init();
}
