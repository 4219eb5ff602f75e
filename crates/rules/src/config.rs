//! Ruleset documents: YAML (or JSON) -> validated rule specs.
//!
//! ```yaml
//! app_id: notes
//! rules:
//!   "public/** | assets/**": true
//!   "private/**": false
//!   "old/**": { action: "new/index.html", fallbackIndex: true }
//!   "api/**": { action: { handler: api } }
//! ```
//!
//! Documents are validated by hand rather than through `Deserialize` so
//! that every shape problem maps onto a specific [`RuleError`] variant.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::error::{Result, RuleError};
use crate::schema::{HandlerRegistry, Rule, RuleAction, RESERVED_FIELDS};

/// Document key holding the application id.
const APP_ID_FIELD: &str = "app_id";
/// Document key holding the ruleset.
const RULES_FIELD: &str = "rules";

/// An action as written in a document. Handlers are referenced by name.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionSpec {
    Unset,
    Unlock,
    Lock,
    Reroute(String),
    Handler(String),
}

/// A validated, not yet bound, rule value.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    pub action: ActionSpec,
    pub fallback_index: Option<bool>,
    pub extra: IndexMap<String, serde_json::Value>,
}

impl RuleSpec {
    /// Validate one rule value. `key` only labels errors.
    pub fn from_value(key: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Mapping(record) => Self::from_record(key, record),
            other => Ok(Self {
                action: action_from_value(key, other)?,
                fallback_index: None,
                extra: IndexMap::new(),
            }),
        }
    }

    fn from_record(key: &str, record: &Mapping) -> Result<Self> {
        let mut spec = Self {
            action: ActionSpec::Unset,
            fallback_index: None,
            extra: IndexMap::new(),
        };
        for (name, value) in record {
            let name = name
                .as_str()
                .ok_or_else(|| RuleError::rule_shape(key, format!("field names must be strings, got {}", describe(name))))?;
            match name {
                "action" => {
                    spec.action = match value {
                        Value::Null => ActionSpec::Unset,
                        other => action_from_value(key, other)?,
                    }
                }
                "fallbackIndex" => {
                    spec.fallback_index = match value {
                        Value::Null => None,
                        Value::Bool(b) => Some(*b),
                        other => {
                            return Err(RuleError::rule_shape(
                                key,
                                format!("fallbackIndex must be a boolean, got {}", describe(other)),
                            ))
                        }
                    }
                }
                reserved if RESERVED_FIELDS.contains(&reserved) => {}
                extra => {
                    let json = serde_json::to_value(value)
                        .map_err(|e| RuleError::rule_shape(key, format!("field '{}': {}", extra, e)))?;
                    spec.extra.insert(extra.to_string(), json);
                }
            }
        }
        Ok(spec)
    }

    /// Turn the spec into a [`Rule`], looking handler names up in `handlers`.
    pub fn bind(&self, handlers: &HandlerRegistry) -> Result<Rule> {
        let action = match &self.action {
            ActionSpec::Unset => RuleAction::Unset,
            ActionSpec::Unlock => RuleAction::Unlock,
            ActionSpec::Lock => RuleAction::Lock,
            ActionSpec::Reroute(target) => RuleAction::Reroute(target.clone()),
            ActionSpec::Handler(name) => RuleAction::Handler(handlers.get(name)?),
        };
        let mut rule = Rule::new(action);
        rule.fallback_index = self.fallback_index;
        for (name, value) in &self.extra {
            rule.insert_field(name.clone(), value.clone());
        }
        Ok(rule)
    }
}

/// Actions may be a boolean, a reroute string or `{ handler: <name> }`.
/// Inside a record, a missing or null action means "unset".
fn action_from_value(key: &str, value: &Value) -> Result<ActionSpec> {
    match value {
        Value::Bool(true) => Ok(ActionSpec::Unlock),
        Value::Bool(false) => Ok(ActionSpec::Lock),
        Value::String(target) => Ok(ActionSpec::Reroute(target.clone())),
        Value::Mapping(m) if m.len() == 1 => match m.get("handler") {
            Some(Value::String(name)) => Ok(ActionSpec::Handler(name.clone())),
            _ => Err(RuleError::rule_shape(key, "action mapping must be { handler: <name> }")),
        },
        Value::Null => Err(RuleError::rule_shape(key, "rule must not be null")),
        other => Err(RuleError::rule_shape(
            key,
            format!("expected boolean, string, handler or rule record, got {}", describe(other)),
        )),
    }
}

/// Ordered ruleset as written in a document. Keys are kept verbatim;
/// canonicalization happens at registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    entries: Vec<(String, RuleSpec)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a `key -> rule` mapping.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mapping = value.as_mapping().ok_or_else(|| {
            RuleError::InvalidRulesetShape(format!("expected a mapping, got {}", describe(value)))
        })?;

        let mut entries = Vec::with_capacity(mapping.len());
        for (key, rule) in mapping {
            let key = key
                .as_str()
                .ok_or_else(|| RuleError::InvalidGlobsKey(format!("expected a string, got {}", describe(key))))?;
            entries.push((key.to_string(), RuleSpec::from_value(key, rule)?));
        }
        Ok(Self { entries })
    }

    pub fn push(&mut self, key: impl Into<String>, spec: RuleSpec) {
        self.entries.push((key.into(), spec));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A resolver document: application id, ruleset and any other fields.
///
/// Only `rules` drives the resolver; other fields are kept in `extra`
/// for the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolverConfig {
    pub app_id: Option<String>,
    pub rules: RuleSet,
    pub extra: IndexMap<String, serde_json::Value>,
}

impl ResolverConfig {
    /// Parse and validate a YAML document. JSON documents parse as well.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(source)?;
        Self::from_value(&value)
    }

    /// Validate an already parsed document. A null document is empty.
    pub fn from_value(value: &Value) -> Result<Self> {
        let document = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(m) => m,
            other => {
                return Err(RuleError::InvalidRulesetShape(format!(
                    "config must be a mapping, got {}",
                    describe(other)
                )))
            }
        };

        let mut config = Self::default();
        for (name, value) in document {
            match name.as_str() {
                Some(APP_ID_FIELD) => config.app_id = app_id_from_value(value)?,
                Some(RULES_FIELD) => {
                    if !value.is_null() {
                        config.rules = RuleSet::from_value(value)?;
                    }
                }
                Some(other) => {
                    let json = serde_json::to_value(value).map_err(|e| {
                        RuleError::InvalidRulesetShape(format!("config field '{}': {}", other, e))
                    })?;
                    config.extra.insert(other.to_string(), json);
                }
                None => {
                    return Err(RuleError::InvalidRulesetShape(format!(
                        "config field names must be strings, got {}",
                        describe(name)
                    )))
                }
            }
        }
        Ok(config)
    }
}

fn app_id_from_value(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(id) => Ok(Some(id.clone())),
        other => Err(RuleError::InvalidAppId(format!("expected a string, got {}", describe(other)))),
    }
}

/// Require a string application id.
pub(crate) fn require_app_id(value: &Value) -> Result<String> {
    app_id_from_value(value)?.ok_or_else(|| RuleError::InvalidAppId("missing".to_string()))
}

/// Short type description for error messages.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DynamicHandler;
    use serde_json::json;

    const DOCUMENT: &str = r#"
app_id: notes
theme: dark
rules:
  "public/** | assets/**": true
  "private/**": false
  "old/**":
    action: new/index.html
    fallbackIndex: true
    status: 301
  "api/**":
    action: { handler: api }
  "docs/**":
    fallbackIndex: true
"#;

    fn yaml(source: &str) -> Value {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn parse_full_document() {
        let config = ResolverConfig::from_yaml_str(DOCUMENT).unwrap();
        assert_eq!(config.app_id.as_deref(), Some("notes"));
        assert_eq!(config.extra["theme"], json!("dark"));

        let entries: Vec<_> = config.rules.iter().collect();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].0, "public/** | assets/**");
        assert_eq!(entries[0].1.action, ActionSpec::Unlock);
        assert_eq!(entries[1].1.action, ActionSpec::Lock);
        assert_eq!(entries[2].1.action, ActionSpec::Reroute("new/index.html".into()));
        assert_eq!(entries[2].1.fallback_index, Some(true));
        assert_eq!(entries[2].1.extra["status"], json!(301));
        assert_eq!(entries[3].1.action, ActionSpec::Handler("api".into()));
        assert_eq!(entries[4].1.action, ActionSpec::Unset);
    }

    #[test]
    fn json_documents_parse() {
        let config = ResolverConfig::from_yaml_str(r#"{"app_id": "x", "rules": {"a/**": "b"}}"#).unwrap();
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn missing_rules_is_empty() {
        let config = ResolverConfig::from_yaml_str("app_id: x\n").unwrap();
        assert!(config.rules.is_empty());
        assert!(ResolverConfig::from_value(&Value::Null).unwrap().rules.is_empty());
    }

    #[test]
    fn non_string_app_id_is_rejected() {
        let err = ResolverConfig::from_yaml_str("app_id: 42\n").unwrap_err();
        assert!(matches!(err, RuleError::InvalidAppId(_)));
        assert!(matches!(require_app_id(&Value::Null), Err(RuleError::InvalidAppId(_))));
    }

    #[test]
    fn ruleset_must_be_a_mapping() {
        let err = ResolverConfig::from_yaml_str("rules: [a, b]\n").unwrap_err();
        assert!(matches!(err, RuleError::InvalidRulesetShape(_)));
        assert!(matches!(
            RuleSet::from_value(&yaml("just a string")),
            Err(RuleError::InvalidRulesetShape(_))
        ));
    }

    #[test]
    fn unconvertible_config_fields_are_rejected() {
        let err = ResolverConfig::from_yaml_str("app_id: x\n7: seven\n").unwrap_err();
        assert!(matches!(err, RuleError::InvalidRulesetShape(_)));

        let err = ResolverConfig::from_yaml_str("app_id: x\nmeta:\n  ? [a, b]\n  : one\n").unwrap_err();
        assert!(matches!(err, RuleError::InvalidRulesetShape(ref m) if m.contains("meta")));
    }

    #[test]
    fn non_string_key_is_rejected() {
        let err = RuleSet::from_value(&yaml("42: false\n")).unwrap_err();
        assert!(matches!(err, RuleError::InvalidGlobsKey(_)));
    }

    #[test]
    fn bad_rule_shapes_are_rejected() {
        for source in [
            "a: 1\n",
            "a: [x]\n",
            "a: ~\n",
            "a: { action: 3 }\n",
            "a: { action: [x] }\n",
            "a: { action: { handler: 1 } }\n",
            "a: { action: { other: x } }\n",
            "a: { fallbackIndex: yes please }\n",
        ] {
            let err = RuleSet::from_value(&yaml(source)).unwrap_err();
            assert!(
                matches!(err, RuleError::InvalidRuleShape { ref key, .. } if key == "a"),
                "{source} gave {err:?}"
            );
        }
    }

    #[test]
    fn null_action_in_record_is_unset() {
        let spec = RuleSpec::from_value("a", &yaml("{ action: ~, owner: ops }")).unwrap();
        assert_eq!(spec.action, ActionSpec::Unset);
        assert_eq!(spec.extra["owner"], json!("ops"));
    }

    #[test]
    fn reserved_fields_are_dropped() {
        let spec = RuleSpec::from_value("a", &yaml("{ action: false, patterns: [z], target: t }")).unwrap();
        assert!(spec.extra.is_empty());
    }

    #[test]
    fn bind_resolves_handlers() {
        let handlers = HandlerRegistry::new().with(DynamicHandler::new("api", |_| json!(null)));
        let spec = RuleSpec::from_value("a", &yaml("{ action: { handler: api } }")).unwrap();
        let rule = spec.bind(&handlers).unwrap();
        assert_eq!(rule.action, RuleAction::Handler(handlers.get("api").unwrap()));

        let missing = RuleSpec::from_value("a", &yaml("{ action: { handler: gone } }")).unwrap();
        assert!(matches!(missing.bind(&handlers), Err(RuleError::UnknownHandler(_))));
    }
}
