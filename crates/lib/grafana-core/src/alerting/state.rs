//! Join of provisioning rules with live evaluation state.
//!
//! The live API has no rule UIDs, so records are matched on the natural key
//! `(title, rule group)`. Nothing upstream enforces uniqueness of that pair;
//! when two live records share it, the [`CollisionPolicy`] decides which one
//! the index keeps.

use std::collections::HashMap;
use std::fmt;

use grafana_models::alerting::{AlertRule, LiveRulesResponse, RuleState, RuleSummary};
use tracing::debug;

/// Composite natural key of an alert rule across both APIs.
///
/// Equality is on the `(title, rule_group)` pair. The `title|group` rendering
/// from [`fmt::Display`] is for diagnostics only and is ambiguous when either
/// part contains `|`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleStateKey {
    title: String,
    rule_group: String,
}

impl RuleStateKey {
    #[must_use]
    pub fn new(title: impl Into<String>, rule_group: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rule_group: rule_group.into(),
        }
    }

    #[must_use]
    pub fn for_rule(rule: &AlertRule) -> Self {
        Self::new(rule.title.clone(), rule.rule_group.clone())
    }

    #[must_use]
    pub fn for_state(state: &RuleState) -> Self {
        Self::new(state.title.clone(), state.rule_group.clone())
    }
}

impl fmt::Display for RuleStateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.title, self.rule_group)
    }
}

/// What the index does when a second record arrives for an existing key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The record seen later in response order replaces the earlier one.
    #[default]
    LastWriteWins,
    /// The first record seen is kept.
    FirstWriteWins,
}

/// Live rule state indexed by [`RuleStateKey`].
#[derive(Debug, Clone, Default)]
pub struct StateIndex {
    entries: HashMap<RuleStateKey, RuleState>,
    policy: CollisionPolicy,
    collisions: usize,
}

impl StateIndex {
    #[must_use]
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            collisions: 0,
        }
    }

    /// Indexes every alerting rule of a live response. Recording rules are
    /// dropped before indexing.
    #[must_use]
    pub fn from_live(response: &LiveRulesResponse, policy: CollisionPolicy) -> Self {
        let mut index = Self::new(policy);
        for group in &response.data.groups {
            for rule in group.rules.iter().filter(|rule| rule.is_alerting()) {
                index.insert(RuleState::from_live(&group.name, rule));
            }
        }
        if index.collisions > 0 {
            debug!(
                collisions = index.collisions,
                policy = ?index.policy,
                "live alert rules share a title and group"
            );
        }
        index
    }

    pub fn insert(&mut self, state: RuleState) {
        let key = RuleStateKey::for_state(&state);
        match self.entries.get_mut(&key) {
            Some(existing) => {
                self.collisions += 1;
                if self.policy == CollisionPolicy::LastWriteWins {
                    *existing = state;
                }
            }
            None => {
                self.entries.insert(key, state);
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &RuleStateKey) -> Option<&RuleState> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records that arrived for an already indexed key.
    #[must_use]
    pub const fn collisions(&self) -> usize {
        self.collisions
    }
}

/// A result whose optional secondary fetch may have failed without failing
/// the whole operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enriched<T> {
    pub data: T,
    /// Message of the swallowed secondary failure, if any.
    pub suppressed: Option<String>,
}

impl<T> Enriched<T> {
    pub const fn complete(data: T) -> Self {
        Self {
            data,
            suppressed: None,
        }
    }

    pub const fn degraded(data: T, warning: String) -> Self {
        Self {
            data,
            suppressed: Some(warning),
        }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.suppressed.is_some()
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// Builds one summary per rule, in rule order. With an index, state and
/// health are copied from the matching live record; rules without a match
/// keep them empty.
#[must_use]
pub fn summarize_rules(rules: &[AlertRule], index: Option<&StateIndex>) -> Vec<RuleSummary> {
    rules
        .iter()
        .map(|rule| {
            let mut summary = RuleSummary::from(rule);
            if let Some(state) = index.and_then(|index| index.get(&RuleStateKey::for_rule(rule))) {
                summary.state = non_empty(&state.state);
                summary.health = non_empty(&state.health);
            }
            summary
        })
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(uid: &str, title: &str, group: &str) -> AlertRule {
        AlertRule {
            uid: uid.to_string(),
            title: title.to_string(),
            rule_group: group.to_string(),
            ..AlertRule::default()
        }
    }

    fn state(title: &str, group: &str, value: &str) -> RuleState {
        RuleState {
            title: title.to_string(),
            rule_group: group.to_string(),
            state: value.to_string(),
            health: "ok".to_string(),
            ..RuleState::default()
        }
    }

    #[test]
    fn key_equality_is_on_the_pair_not_the_rendering() {
        let left = RuleStateKey::new("a|b", "c");
        let right = RuleStateKey::new("a", "b|c");
        assert_eq!(left.to_string(), right.to_string());
        assert_ne!(left, right);
    }

    #[test]
    fn last_write_wins_replaces_earlier_records() {
        let mut index = StateIndex::new(CollisionPolicy::LastWriteWins);
        index.insert(state("HighCPU", "infra", "pending"));
        index.insert(state("HighCPU", "infra", "firing"));

        let key = RuleStateKey::new("HighCPU", "infra");
        assert_eq!(index.get(&key).map(|s| s.state.as_str()), Some("firing"));
        assert_eq!(index.len(), 1);
        assert_eq!(index.collisions(), 1);
    }

    #[test]
    fn first_write_wins_keeps_the_earliest_record() {
        let mut index = StateIndex::new(CollisionPolicy::FirstWriteWins);
        index.insert(state("HighCPU", "infra", "pending"));
        index.insert(state("HighCPU", "infra", "firing"));

        let key = RuleStateKey::new("HighCPU", "infra");
        assert_eq!(index.get(&key).map(|s| s.state.as_str()), Some("pending"));
    }

    #[test]
    fn recording_rules_never_reach_the_index() {
        let response: LiveRulesResponse = serde_json::from_value(json!({
            "status": "success",
            "data": {"groups": [{
                "name": "infra",
                "rules": [
                    {"name": "HighCPU", "type": "alerting", "state": "firing", "health": "ok"},
                    {"name": "HighCPU", "type": "recording", "state": "", "health": "err"}
                ]
            }]}
        }))
        .expect("live response decodes");

        let index = StateIndex::from_live(&response, CollisionPolicy::default());
        let found = index
            .get(&RuleStateKey::new("HighCPU", "infra"))
            .expect("alerting entry indexed");
        assert_eq!(found.state, "firing");
        assert_eq!(found.health, "ok");
        assert_eq!(index.collisions(), 0);
    }

    #[test]
    fn summaries_without_an_index_have_no_state() {
        let rules = vec![rule("u1", "HighCPU", "infra"), rule("u2", "DiskFull", "infra")];
        let summaries = summarize_rules(&rules, None);

        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| s.state.is_none() && s.health.is_none()));
    }

    #[test]
    fn summaries_are_enriched_only_on_exact_key_matches() {
        let rules = vec![
            rule("u1", "HighCPU", "infra"),
            rule("u2", "HighCPU", "apps"),
            rule("u3", "DiskFull", "infra"),
        ];
        let mut index = StateIndex::default();
        index.insert(state("HighCPU", "infra", "firing"));
        index.insert(state("DiskFull", "storage", "pending"));

        let summaries = summarize_rules(&rules, Some(&index));

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].state.as_deref(), Some("firing"));
        assert_eq!(summaries[0].health.as_deref(), Some("ok"));
        assert!(summaries[1].state.is_none());
        assert!(summaries[2].state.is_none());
        assert_eq!(summaries[2].uid, "u3");
    }

    #[test]
    fn degraded_results_keep_their_data() {
        let enriched = Enriched::degraded(vec![1, 2], "live state unavailable".to_string());
        assert!(enriched.is_degraded());
        assert_eq!(enriched.into_data(), vec![1, 2]);
        assert!(!Enriched::complete(()).is_degraded());
    }
}
