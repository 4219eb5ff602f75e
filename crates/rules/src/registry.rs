//! Resolvers for every installed application, shareable across threads.

use std::sync::RwLock;

use indexmap::IndexMap;
use tracing::info;

use crate::error::{Result, RuleError};
use crate::resolver::PathResolver;
use crate::schema::{ResolvedRule, Rule};

/// One [`PathResolver`] per application id behind a read-write lock.
///
/// Resolutions take the read lock; registration and (un)installation take
/// the write lock.
#[derive(Debug, Default)]
pub struct AppRegistry {
    apps: RwLock<IndexMap<String, PathResolver>>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a resolver under its own app id, returning the one it replaces.
    pub fn install(&self, resolver: PathResolver) -> Option<PathResolver> {
        let app_id = resolver.app_id().to_string();
        let rules = resolver.len();
        let replaced = self
            .apps
            .write()
            .expect("apps lock poisoned")
            .insert(app_id.clone(), resolver);
        info!(app_id = %app_id, rules, replaced = replaced.is_some(), "installed app resolver");
        replaced
    }

    pub fn uninstall(&self, app_id: &str) -> Option<PathResolver> {
        let removed = self
            .apps
            .write()
            .expect("apps lock poisoned")
            .shift_remove(app_id);
        if removed.is_some() {
            info!(app_id = %app_id, "uninstalled app resolver");
        }
        removed
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.apps.read().expect("apps lock poisoned").contains_key(app_id)
    }

    /// Installed app ids, in installation order.
    pub fn app_ids(&self) -> Vec<String> {
        self.apps.read().expect("apps lock poisoned").keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.apps.read().expect("apps lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a rule to an installed application.
    pub fn register_rule(&self, app_id: &str, globs_key: &str, rule: impl Into<Rule>) -> Result<String> {
        let mut apps = self.apps.write().expect("apps lock poisoned");
        let resolver = apps
            .get_mut(app_id)
            .ok_or_else(|| RuleError::UnknownApp(app_id.to_string()))?;
        resolver.register_rule(globs_key, rule)
    }

    /// Resolve a path for an installed application.
    pub fn resolve(&self, app_id: &str, resource_path: &str) -> Result<ResolvedRule> {
        self.with_resolver(app_id, |resolver| resolver.resolve_rules_for(resource_path))
    }

    /// Run `f` against an application's resolver under the read lock.
    pub fn with_resolver<R>(&self, app_id: &str, f: impl FnOnce(&PathResolver) -> R) -> Result<R> {
        let apps = self.apps.read().expect("apps lock poisoned");
        let resolver = apps
            .get(app_id)
            .ok_or_else(|| RuleError::UnknownApp(app_id.to_string()))?;
        Ok(f(resolver))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::schema::RuleAction;

    fn resolver(app_id: &str, key: &str, locked: bool) -> PathResolver {
        let mut resolver = PathResolver::new(app_id);
        resolver.register_rule(key, !locked).unwrap();
        resolver
    }

    #[test]
    fn apps_are_isolated() {
        let registry = AppRegistry::new();
        registry.install(resolver("notes", "private/**", true));
        registry.install(resolver("photos", "albums/**", true));

        assert_eq!(registry.resolve("notes", "private/a").unwrap().action, RuleAction::Lock);
        assert_eq!(registry.resolve("photos", "private/a").unwrap().action, RuleAction::Unset);
        assert_eq!(registry.app_ids(), vec!["notes", "photos"]);
    }

    #[test]
    fn unknown_app_is_an_error() {
        let registry = AppRegistry::new();
        assert!(matches!(registry.resolve("nope", "a"), Err(RuleError::UnknownApp(id)) if id == "nope"));
        assert!(matches!(
            registry.register_rule("nope", "a", false),
            Err(RuleError::UnknownApp(_))
        ));
    }

    #[test]
    fn install_replaces_and_uninstall_removes() {
        let registry = AppRegistry::new();
        assert!(registry.install(resolver("notes", "a", true)).is_none());
        let old = registry.install(resolver("notes", "b", true)).unwrap();
        assert!(old.get_rule("a").is_some());
        assert_eq!(registry.len(), 1);

        assert!(registry.uninstall("notes").is_some());
        assert!(registry.uninstall("notes").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn rules_added_after_install_apply() {
        let registry = AppRegistry::new();
        registry.install(resolver("notes", "docs/**", true));
        registry.register_rule("notes", "docs/public/**", true).unwrap();

        let resolved = registry.resolve("notes", "docs/public/readme.md").unwrap();
        assert_eq!(resolved.action, RuleAction::Unlock);
        assert_eq!(resolved.applied_patterns, vec!["docs/**", "docs/public/**"]);
    }

    #[test]
    fn concurrent_resolution_and_registration() {
        let registry = Arc::new(AppRegistry::new());
        registry.install(PathResolver::new("notes"));

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..50 {
                    registry.register_rule("notes", &format!("dir{i}/**"), false).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let resolved = registry.resolve("notes", "dir0/file").unwrap();
                        assert!(matches!(resolved.action, RuleAction::Unset | RuleAction::Lock));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        let counts = registry.with_resolver("notes", |r| r.counts()).unwrap();
        assert_eq!(counts.static_locks, 50);
    }
}
