//! Alert rule listing and lookup.

mod state;

pub use state::{CollisionPolicy, Enriched, RuleStateKey, StateIndex, summarize_rules};

use grafana_models::alerting::{AlertRule, LiveRulesResponse, RuleSummary};
use tracing::warn;

use crate::client::{GrafanaClient, require};
use crate::error::GrafanaError;
use crate::limits::LimitPolicy;

pub const RULES_LIMIT: LimitPolicy = LimitPolicy::new(100);

const PROVISIONING_RULES: [&str; 4] = ["api", "v1", "provisioning", "alert-rules"];
const LIVE_RULES: [&str; 6] = ["api", "prometheus", "grafana", "api", "v1", "rules"];

/// Alert rule operations against one Grafana instance.
#[derive(Debug, Clone, Copy)]
pub struct Alerting<'a> {
    client: &'a GrafanaClient,
    policy: CollisionPolicy,
}

impl<'a> Alerting<'a> {
    #[must_use]
    pub const fn new(client: &'a GrafanaClient) -> Self {
        Self {
            client,
            policy: CollisionPolicy::LastWriteWins,
        }
    }

    #[must_use]
    pub const fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetches rule definitions. `limit` is forwarded upstream when positive.
    ///
    /// # Errors
    /// Returns transport, status, or decode failures.
    pub async fn rules(&self, limit: usize) -> Result<Vec<AlertRule>, GrafanaError> {
        let mut query = Vec::new();
        if limit > 0 {
            query.push(("limit", limit.to_string()));
        }
        self.client.get_json(&PROVISIONING_RULES, &query).await
    }

    /// Fetches live evaluation state for all alerting rules.
    ///
    /// # Errors
    /// Returns transport, status, or decode failures.
    pub async fn live_state(&self) -> Result<StateIndex, GrafanaError> {
        let response: LiveRulesResponse = self.client.get_json(&LIVE_RULES, &[]).await?;
        Ok(StateIndex::from_live(&response, self.policy))
    }

    /// Lists rule summaries, optionally enriched with live state.
    ///
    /// A failed live-state fetch does not fail the listing: the summaries are
    /// returned without state and the failure is logged and recorded in
    /// [`Enriched::suppressed`].
    ///
    /// # Errors
    /// Returns failures of the rule definition fetch only.
    pub async fn list_rules(
        &self,
        limit: usize,
        include_state: bool,
    ) -> Result<Enriched<Vec<RuleSummary>>, GrafanaError> {
        let rules = self.rules(limit).await?;
        if !include_state {
            return Ok(Enriched::complete(summarize_rules(&rules, None)));
        }

        match self.live_state().await {
            Ok(index) => Ok(Enriched::complete(summarize_rules(&rules, Some(&index)))),
            Err(err) => {
                warn!(error = %err, "live alert state unavailable; listing rules without state");
                Ok(Enriched::degraded(
                    summarize_rules(&rules, None),
                    format!("live alert state unavailable: {err}"),
                ))
            }
        }
    }

    /// Fetches one full rule definition.
    ///
    /// # Errors
    /// Returns [`GrafanaError::InvalidInput`] for a blank uid and
    /// [`GrafanaError::NotFound`] for any non-success status.
    pub async fn rule_by_uid(&self, uid: &str) -> Result<AlertRule, GrafanaError> {
        let uid = require("uid", uid)?;
        let mut segments: Vec<&str> = PROVISIONING_RULES.to_vec();
        segments.push(uid);
        self.client
            .get_json(&segments, &[])
            .await
            .map_err(|err| err.into_not_found(format!("alert rule {uid}")))
    }
}
