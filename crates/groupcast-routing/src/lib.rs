// SPDX-FileCopyrightText: 2026 Groupcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing table for the Groupcast relay.
//!
//! An ordered sequence of [`RoutingRule`]s mapping a source group to one or
//! more target groups, with an optional media-kind filter per rule.
//! Insertion order is significant only for display; a source may appear in
//! multiple rules. Mutations are append and remove-by-index, each followed
//! by persistence through a [`RuleStore`].

pub mod store;

use serde::{Deserialize, Serialize};

use groupcast_core::types::{GroupId, MediaKind};

pub use store::{JsonRuleStore, RuleStore};

/// One relay rule: media observed in `source` is delivered to `targets`.
///
/// `source ∈ targets` is not rejected here (the admin surface guards it);
/// the delivery pipeline independently skips any target equal to the
/// message's own chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub source: GroupId,
    pub targets: Vec<GroupId>,
    /// When present, only these declared kinds are relayed for this rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<MediaKind>>,
}

impl RoutingRule {
    /// Whether this rule accepts a message of the given declared kind.
    ///
    /// Rules without a filter accept every kind; the classifier has already
    /// decided the message is relayable media by the time this is consulted.
    pub fn accepts(&self, kind: MediaKind) -> bool {
        match &self.kinds {
            Some(kinds) => kinds.contains(&kind),
            None => true,
        }
    }
}

/// Ordered sequence of routing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    rules: Vec<RoutingRule>,
}

impl RoutingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule; its index is its position in the sequence.
    pub fn add(&mut self, rule: RoutingRule) {
        self.rules.push(rule);
    }

    /// Reinserts a rule at `index`, shifting later rules. Used to undo a
    /// removal whose persistence failed. Clamped to the sequence length.
    pub fn insert(&mut self, index: usize, rule: RoutingRule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Removes the rule at `index`. Returns the removed rule, or `None`
    /// when the index is out of range.
    pub fn remove(&mut self, index: usize) -> Option<RoutingRule> {
        if index < self.rules.len() {
            Some(self.rules.remove(index))
        } else {
            None
        }
    }

    /// All rules whose source equals the given chat id.
    pub fn matching(&self, source: &str) -> Vec<&RoutingRule> {
        self.rules
            .iter()
            .filter(|r| r.source.0 == source)
            .collect()
    }

    /// The full rule sequence, in insertion order.
    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(source: &str, targets: &[&str]) -> RoutingRule {
        RoutingRule {
            source: source.into(),
            targets: targets.iter().map(|t| GroupId::from(*t)).collect(),
            kinds: None,
        }
    }

    #[test]
    fn matching_unknown_source_is_empty() {
        let mut table = RoutingTable::new();
        table.add(rule("a@g.us", &["b@g.us"]));
        table.add(rule("b@g.us", &["c@g.us"]));
        assert!(table.matching("zzz@g.us").is_empty());
        assert!(RoutingTable::new().matching("a@g.us").is_empty());
    }

    #[test]
    fn matching_returns_every_rule_for_a_source() {
        let mut table = RoutingTable::new();
        table.add(rule("a@g.us", &["b@g.us"]));
        table.add(rule("a@g.us", &["c@g.us"]));
        table.add(rule("d@g.us", &["e@g.us"]));
        let matched = table.matching("a@g.us");
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].targets[0].0, "b@g.us");
        assert_eq!(matched[1].targets[0].0, "c@g.us");
    }

    #[test]
    fn append_then_remove_round_trips() {
        let mut table = RoutingTable::new();
        table.add(rule("a@g.us", &["b@g.us"]));
        let before = table.clone();

        table.add(rule("x@g.us", &["y@g.us"]));
        let removed = table.remove(1).unwrap();
        assert_eq!(removed.source.0, "x@g.us");
        assert_eq!(table, before);
    }

    #[test]
    fn insert_restores_a_removed_rule_in_place() {
        let mut table = RoutingTable::new();
        table.add(rule("a@g.us", &["b@g.us"]));
        table.add(rule("c@g.us", &["d@g.us"]));
        let before = table.clone();

        let removed = table.remove(0).unwrap();
        table.insert(0, removed);
        assert_eq!(table, before);
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut table = RoutingTable::new();
        table.add(rule("a@g.us", &["b@g.us"]));
        assert!(table.remove(5).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn rule_kind_filter() {
        let mut r = rule("a@g.us", &["b@g.us"]);
        assert!(r.accepts(MediaKind::Image));
        assert!(r.accepts(MediaKind::Video));

        r.kinds = Some(vec![MediaKind::Image]);
        assert!(r.accepts(MediaKind::Image));
        assert!(!r.accepts(MediaKind::Video));
    }

    #[test]
    fn table_serializes_without_kind_filter_noise() {
        let mut table = RoutingTable::new();
        table.add(rule("a@g.us", &["b@g.us"]));
        let json = serde_json::to_string(&table).unwrap();
        assert!(!json.contains("kinds"));

        let parsed: RoutingTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }
}
