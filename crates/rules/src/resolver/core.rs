//! Core [`PathResolver`] struct: rule registration, lookup and resolution.

use std::path::Path;

use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::debug;

use crate::config::{require_app_id, ResolverConfig, RuleSet, RuleSpec};
use crate::error::{Result, RuleError};
use crate::globs::{canonical_key, parse_globs, stringify_globs, MultiGlob};
use crate::normalize::normalize_resource_path;
use crate::schema::{HandlerRegistry, ResolvedRule, Rule};

use super::counts::RuleCounts;
use super::host::ResourceHost;

/// A registered rule together with its compiled patterns.
#[derive(Debug, Clone)]
struct StoredRule {
    rule: Rule,
    globs: MultiGlob,
}

/// Rule store and resolver for one application.
///
/// Rules live in an insertion-ordered map keyed by canonical multi-glob
/// key. Registering under a key that already exists replaces the rule in
/// place, keeping its position.
#[derive(Debug, Clone)]
pub struct PathResolver {
    app_id: String,
    rules: IndexMap<String, StoredRule>,
    counts: RuleCounts,
}

impl PathResolver {
    /// Create an empty resolver.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            rules: IndexMap::new(),
            counts: RuleCounts::default(),
        }
    }

    /// Create a resolver and register every rule of `config`, in order.
    pub fn with_config(
        app_id: impl Into<String>,
        config: &ResolverConfig,
        handlers: &HandlerRegistry,
    ) -> Result<Self> {
        let mut resolver = Self::new(app_id);
        resolver.register_ruleset(&config.rules, handlers)?;
        Ok(resolver)
    }

    /// Create a resolver from untyped values.
    ///
    /// `app_id` must be a string. `config`, when given, must be a mapping
    /// whose optional `rules` entry is itself a `key -> rule` mapping.
    pub fn from_value(app_id: &Value, config: Option<&Value>, handlers: &HandlerRegistry) -> Result<Self> {
        let app_id = require_app_id(app_id)?;
        let config = config
            .map(ResolverConfig::from_value)
            .transpose()?
            .unwrap_or_default();
        Self::with_config(app_id, &config, handlers)
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Register a rule and return its canonical key.
    ///
    /// `rule` may be a full [`Rule`] or a bare action (`bool`, reroute
    /// string, [`DynamicHandler`](crate::schema::DynamicHandler)).
    pub fn register_rule(&mut self, globs_key: &str, rule: impl Into<Rule>) -> Result<String> {
        let patterns = parse_globs(globs_key);
        if patterns.is_empty() {
            return Err(RuleError::InvalidGlobsKey(format!(
                "'{}' contains no patterns",
                globs_key
            )));
        }
        let globs = MultiGlob::new(&patterns)?;
        let key = stringify_globs(&patterns);

        let mut rule = rule.into();
        rule.set_patterns(patterns);
        let kind = rule.action.kind();

        // Counters track live rules: a replaced rule stops counting.
        let replaced = self.rules.insert(key.clone(), StoredRule { rule, globs });
        if let Some(old_kind) = replaced.as_ref().and_then(|old| old.rule.action.kind()) {
            self.counts.forget(old_kind);
        }
        if let Some(kind) = kind {
            self.counts.record(kind);
        }

        debug!(
            app_id = %self.app_id,
            key = %key,
            kind = ?kind,
            replaced = replaced.is_some(),
            "registered rule"
        );
        Ok(key)
    }

    /// Register a rule from untyped values, binding handler references
    /// against `handlers`.
    pub fn register_value(&mut self, globs_key: &Value, rule: &Value, handlers: &HandlerRegistry) -> Result<String> {
        let key = globs_key.as_str().ok_or_else(|| {
            RuleError::InvalidGlobsKey(format!(
                "expected a string, got {}",
                crate::config::describe(globs_key)
            ))
        })?;
        let rule = RuleSpec::from_value(key, rule)?.bind(handlers)?;
        self.register_rule(key, rule)
    }

    /// Register every entry of an untyped `key -> rule` mapping, in order.
    pub fn register_rules(&mut self, ruleset: &Value, handlers: &HandlerRegistry) -> Result<Vec<String>> {
        let rules = RuleSet::from_value(ruleset)?;
        self.register_ruleset(&rules, handlers)
    }

    /// Register every entry of a validated ruleset, in order.
    pub fn register_ruleset(&mut self, rules: &RuleSet, handlers: &HandlerRegistry) -> Result<Vec<String>> {
        rules
            .iter()
            .map(|(key, spec)| {
                let rule = spec.bind(handlers)?;
                self.register_rule(key, rule)
            })
            .collect()
    }

    /// Look a rule up by key. The key is canonicalized first; this is an
    /// exact key lookup, not a path match.
    pub fn get_rule(&self, globs_key: &str) -> Option<&Rule> {
        let key = canonical_key(globs_key)?;
        self.rules.get(&key).map(|stored| &stored.rule)
    }

    /// Resolve a resource path against every rule, in registration order.
    ///
    /// Never fails; when nothing matches the result has an unset action
    /// and no applied patterns.
    pub fn resolve_rules_for(&self, resource_path: &str) -> ResolvedRule {
        let target = normalize_resource_path(resource_path);
        let mut resolved = ResolvedRule::for_target(target.clone());

        for (key, stored) in &self.rules {
            if stored.globs.is_match(&target) {
                resolved.apply(key, &stored.rule);
            }
        }

        debug!(
            app_id = %self.app_id,
            target = %target,
            matched = resolved.applied_patterns.len(),
            "resolved resource path"
        );
        resolved
    }

    /// Resolve a filesystem-style path. Fails only for non UTF-8 paths.
    pub fn resolve_path(&self, resource_path: impl AsRef<Path>) -> Result<ResolvedRule> {
        let resource_path = resource_path.as_ref();
        let path = resource_path
            .to_str()
            .ok_or_else(|| RuleError::InvalidResourcePath(resource_path.to_string_lossy().into_owned()))?;
        Ok(self.resolve_rules_for(path))
    }

    /// Resolve `resource_path` and let `host` act on the decision.
    pub fn handle_resource_path<H: ResourceHost>(
        &self,
        resource_path: impl AsRef<Path>,
        host: &H,
    ) -> Result<H::Output> {
        let resolved = self.resolve_path(resource_path)?;
        Ok(host.handle(resolved.decision(), &resolved))
    }

    /// Registered rules with their canonical keys, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.rules.iter().map(|(key, stored)| (key.as_str(), &stored.rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn counts(&self) -> RuleCounts {
        self.counts
    }

    pub fn dynamic_handler_count(&self) -> usize {
        self.counts.dynamic_handlers
    }

    pub fn static_reroute_count(&self) -> usize {
        self.counts.static_reroutes
    }

    pub fn static_lock_count(&self) -> usize {
        self.counts.static_locks
    }
}
