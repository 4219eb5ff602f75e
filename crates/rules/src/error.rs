//! Error types for rule registration and resolution.

/// Errors raised by the resolver and its configuration layer.
///
/// Every variant is a contract violation reported at the offending call;
/// resolving a path that matches nothing is not an error.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Application identifier missing or not a string.
    #[error("invalid app id: {0}")]
    InvalidAppId(String),

    /// A ruleset was not a key -> rule mapping.
    #[error("invalid ruleset: {0}")]
    InvalidRulesetShape(String),

    /// A rule key was not a string or contained no patterns.
    #[error("invalid globs key: {0}")]
    InvalidGlobsKey(String),

    /// A rule value was not an action or a rule record.
    #[error("invalid rule for '{key}': {reason}")]
    InvalidRuleShape { key: String, reason: String },

    /// A resource path could not be read as UTF-8.
    #[error("invalid resource path: {0}")]
    InvalidResourcePath(String),

    /// A pattern failed to compile.
    #[error("invalid glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A rule referenced a handler that was never registered.
    #[error("unknown handler '{0}'")]
    UnknownHandler(String),

    /// No resolver is installed for the application.
    #[error("unknown app '{0}'")]
    UnknownApp(String),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl RuleError {
    pub(crate) fn rule_shape(key: &str, reason: impl Into<String>) -> Self {
        RuleError::InvalidRuleShape {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
