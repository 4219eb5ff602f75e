use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::debug;

use pathgate_rules::{ActionSpec, DynamicHandler, HandlerRegistry, PathResolver, ResolverConfig};

/// App id used when neither the command line nor the document names one.
pub const DEFAULT_APP_ID: &str = "default";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Read and validate a ruleset document.
pub fn load_ruleset(path: &Path) -> Result<ResolverConfig> {
    debug!(path = %path.display(), "loading ruleset");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ruleset: {}", path.display()))?;
    ResolverConfig::from_yaml_str(&content)
        .with_context(|| format!("failed to parse ruleset: {}", path.display()))
}

/// Handler logic lives in the host, so every handler the document names is
/// bound to a stub that reports the target it was given.
pub fn stub_handlers(config: &ResolverConfig) -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();
    for (_, spec) in config.rules.iter() {
        if let ActionSpec::Handler(name) = &spec.action {
            let label = name.clone();
            handlers.insert(DynamicHandler::new(name.clone(), move |target| {
                json!({ "handler": label, "target": target })
            }));
        }
    }
    handlers
}

/// Build the resolver for a loaded document.
/// App id priority: cli_override > document > [`DEFAULT_APP_ID`].
pub fn build_resolver(config: &ResolverConfig, cli_override: Option<&str>) -> Result<PathResolver> {
    let app_id = cli_override
        .or(config.app_id.as_deref())
        .unwrap_or(DEFAULT_APP_ID)
        .to_string();
    let handlers = stub_handlers(config);
    PathResolver::with_config(app_id.clone(), config, &handlers)
        .with_context(|| format!("failed to register rules for app '{}'", app_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathgate_rules::RuleAction;
    use std::fs;
    use tempfile::TempDir;

    const RULESET: &str = r#"
app_id: notes
rules:
  "private/**": false
  "api/**": { action: { handler: api } }
"#;

    fn write_ruleset(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("rules.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_and_build() {
        let dir = TempDir::new().unwrap();
        let config = load_ruleset(&write_ruleset(&dir, RULESET)).unwrap();
        let resolver = build_resolver(&config, None).unwrap();

        assert_eq!(resolver.app_id(), "notes");
        assert_eq!(resolver.resolve_rules_for("private/x").action, RuleAction::Lock);
        match resolver.resolve_rules_for("api/users").action {
            RuleAction::Handler(handler) => assert_eq!(
                handler.call("api/users"),
                json!({ "handler": "api", "target": "api/users" })
            ),
            other => panic!("expected handler, got {other:?}"),
        }
    }

    #[test]
    fn app_id_override_and_default() {
        let dir = TempDir::new().unwrap();
        let config = load_ruleset(&write_ruleset(&dir, RULESET)).unwrap();
        assert_eq!(build_resolver(&config, Some("other")).unwrap().app_id(), "other");

        let config = load_ruleset(&write_ruleset(&dir, "rules: {}\n")).unwrap();
        assert_eq!(build_resolver(&config, None).unwrap().app_id(), DEFAULT_APP_ID);
    }

    #[test]
    fn missing_file_has_context() {
        let dir = TempDir::new().unwrap();
        let err = load_ruleset(&dir.path().join("nope.yml")).unwrap_err();
        assert!(err.to_string().contains("failed to read ruleset"));
    }

    #[test]
    fn invalid_document_has_context() {
        let dir = TempDir::new().unwrap();
        let err = load_ruleset(&write_ruleset(&dir, "rules: [a]\n")).unwrap_err();
        assert!(err.to_string().contains("failed to parse ruleset"));
    }
}
