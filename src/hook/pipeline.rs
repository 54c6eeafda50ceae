//! The layered decision pipeline.

use tracing::{debug, warn};

use super::protocol::{Decision, HookRequest, HookResponse};
use crate::cache::{CacheStore, DecisionCache};
use crate::judge::SafetyJudge;
use crate::policy::{Profile, RuleVerdict, check_rules};

/// Composes rules, cache, and judge in fixed order and encodes the outcome.
///
/// Stage order is not configurable and no stage is retried: rules are free
/// and deterministic, the cache avoids repeat judge calls, and the judge is
/// the paid last resort. Every stage may short-circuit; every failure path
/// lands on [`Decision::Defer`].
pub struct Pipeline<S> {
    enabled: bool,
    profile: Profile,
    cache: DecisionCache<S>,
    judge: Option<SafetyJudge>,
}

impl<S: CacheStore> Pipeline<S> {
    /// `judge` is `None` when no credential is configured; the pipeline
    /// then defers anything rules and cache cannot resolve.
    pub fn new(
        enabled: bool,
        profile: Profile,
        cache: DecisionCache<S>,
        judge: Option<SafetyJudge>,
    ) -> Self {
        Self {
            enabled,
            profile,
            cache,
            judge,
        }
    }

    pub async fn decide(&self, request: &HookRequest) -> Decision {
        if !self.enabled {
            debug!("hook disabled, passing through");
            return Decision::Defer;
        }

        let tool = &request.tool_name;
        let input = &request.tool_input;

        match check_rules(tool, input, &self.profile) {
            Some(RuleVerdict::Allow) => {
                debug!(tool = %tool, "rule allow");
                return Decision::allow("rule");
            }
            Some(RuleVerdict::Deny) => {
                debug!(tool = %tool, "rule deny, asking user");
                return Decision::Defer;
            }
            None => {}
        }

        match self.cache.get(&self.profile.name, tool, input).await {
            Some(true) => {
                debug!(tool = %tool, "cache allow");
                return Decision::allow("cached");
            }
            Some(false) => {
                debug!(tool = %tool, "cache deny, asking user");
                return Decision::Defer;
            }
            None => {}
        }

        let Some(judge) = &self.judge else {
            warn!("no API credential configured, asking user");
            return Decision::Defer;
        };

        match judge.evaluate(&self.profile.prompt, tool, input).await {
            Ok(verdict) => {
                // Both polarities are cached; errors above never reach here.
                self.cache
                    .set(&self.profile.name, tool, input, verdict.approve)
                    .await;
                if verdict.approve {
                    debug!(tool = %tool, reason = %verdict.reason, "judge allow");
                    Decision::allow(format!("AI: {}", verdict.reason))
                } else {
                    debug!(tool = %tool, reason = %verdict.reason, "judge deny, asking user");
                    Decision::Defer
                }
            }
            Err(err) => {
                warn!(tool = %tool, error = %err, "judge call failed, asking user");
                Decision::Defer
            }
        }
    }

    /// Run the pipeline and encode the outcome for the host.
    pub async fn run(&self, request: &HookRequest) -> HookResponse {
        self.decide(request)
            .await
            .into_response(&request.tool_name, &request.tool_input)
    }
}
