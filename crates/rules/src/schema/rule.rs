//! Rule records and the merged result of a path resolution.

use indexmap::IndexMap;
use serde::Serialize;

use super::action::{DynamicHandler, RuleAction};

/// Field names owned by the resolver; never stored as extension fields.
pub const RESERVED_FIELDS: &[&str] = &[
    "action",
    "fallbackIndex",
    "patterns",
    "appliedPatterns",
    "target",
];

/// One policy entry.
///
/// `patterns` is filled in at registration from the rule key. Fields the
/// resolver does not know about are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(skip_serializing_if = "RuleAction::is_unset")]
    pub action: RuleAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_index: Option<bool>,
    #[serde(flatten)]
    extra: IndexMap<String, serde_json::Value>,
    patterns: Vec<String>,
}

impl Rule {
    pub fn new(action: impl Into<RuleAction>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_fallback_index(mut self, fallback_index: bool) -> Self {
        self.fallback_index = Some(fallback_index);
        self
    }

    /// Add an extension field. Reserved names are ignored.
    pub fn with_field(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.insert_field(name, value);
        self
    }

    /// Add an extension field, returning `false` for reserved names.
    pub fn insert_field(&mut self, name: impl Into<String>, value: serde_json::Value) -> bool {
        let name = name.into();
        if RESERVED_FIELDS.contains(&name.as_str()) {
            return false;
        }
        self.extra.insert(name, value);
        true
    }

    /// Extension fields, in insertion order.
    pub fn extra(&self) -> &IndexMap<String, serde_json::Value> {
        &self.extra
    }

    /// Patterns this rule was registered under, in key order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub(crate) fn set_patterns(&mut self, patterns: Vec<String>) {
        self.patterns = patterns;
    }
}

impl From<RuleAction> for Rule {
    fn from(action: RuleAction) -> Self {
        Rule::new(action)
    }
}

impl From<bool> for Rule {
    fn from(unlocked: bool) -> Self {
        Rule::new(unlocked)
    }
}

impl From<&str> for Rule {
    fn from(target: &str) -> Self {
        Rule::new(target)
    }
}

impl From<String> for Rule {
    fn from(target: String) -> Self {
        Rule::new(target)
    }
}

impl From<DynamicHandler> for Rule {
    fn from(handler: DynamicHandler) -> Self {
        Rule::new(handler)
    }
}

/// The effective decision for one resource path.
///
/// `action` stays [`RuleAction::Unset`] when no matching rule decided
/// anything; hosts treat that as "no policy applies".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRule {
    #[serde(skip_serializing_if = "RuleAction::is_unset")]
    pub action: RuleAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_index: Option<bool>,
    #[serde(flatten)]
    extra: IndexMap<String, serde_json::Value>,
    /// Canonical keys of every matching rule, in registration order.
    pub applied_patterns: Vec<String>,
    /// The normalized path that was resolved.
    pub target: String,
}

impl ResolvedRule {
    pub(crate) fn for_target(target: String) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Shallow-merge a matching rule over what has been accumulated.
    pub(crate) fn apply(&mut self, key: &str, rule: &Rule) {
        if !rule.action.is_unset() {
            self.action = rule.action.clone();
        }
        if rule.fallback_index.is_some() {
            self.fallback_index = rule.fallback_index;
        }
        for (name, value) in &rule.extra {
            if !RESERVED_FIELDS.contains(&name.as_str()) {
                self.extra.insert(name.clone(), value.clone());
            }
        }
        self.applied_patterns.push(key.to_string());
    }

    /// Extension fields merged from every matching rule.
    pub fn extra(&self) -> &IndexMap<String, serde_json::Value> {
        &self.extra
    }

    /// True when at least one rule matched.
    pub fn is_matched(&self) -> bool {
        !self.applied_patterns.is_empty()
    }
}
