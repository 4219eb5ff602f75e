//! The rule action sum type and dynamic handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{Result, RuleError};

type HandlerFn = dyn Fn(&str) -> serde_json::Value + Send + Sync;

/// A named callable that takes over resolution of a resource.
///
/// The resolver never invokes it; it is stored and handed back to the host
/// as an opaque action. Two handlers are equal only when they share the
/// same allocation.
#[derive(Clone)]
pub struct DynamicHandler {
    name: Arc<str>,
    func: Arc<HandlerFn>,
}

impl DynamicHandler {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> serde_json::Value + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the handler for a resolved target path.
    pub fn call(&self, target: &str) -> serde_json::Value {
        (self.func)(target)
    }
}

impl PartialEq for DynamicHandler {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
    }
}

impl fmt::Debug for DynamicHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynamicHandler").field(&self.name).finish()
    }
}

/// What a rule decides for the paths it matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RuleAction {
    /// No decision; inherited actions stay in effect.
    #[default]
    Unset,
    /// Explicit unlock (`true`), overriding an inherited lock.
    Unlock,
    /// Static lock (`false`).
    Lock,
    /// Static reroute to another resource path.
    Reroute(String),
    /// Delegate to a dynamic handler.
    Handler(DynamicHandler),
}

/// Counted action kinds. Unlocks and unset actions are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    DynamicHandler,
    StaticReroute,
    StaticLock,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::DynamicHandler => write!(f, "dynamic_handler"),
            ActionKind::StaticReroute => write!(f, "static_reroute"),
            ActionKind::StaticLock => write!(f, "static_lock"),
        }
    }
}

impl RuleAction {
    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            RuleAction::Handler(_) => Some(ActionKind::DynamicHandler),
            RuleAction::Reroute(_) => Some(ActionKind::StaticReroute),
            RuleAction::Lock => Some(ActionKind::StaticLock),
            RuleAction::Unlock | RuleAction::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, RuleAction::Unset)
    }
}

impl From<bool> for RuleAction {
    fn from(unlocked: bool) -> Self {
        if unlocked {
            RuleAction::Unlock
        } else {
            RuleAction::Lock
        }
    }
}

impl From<&str> for RuleAction {
    fn from(target: &str) -> Self {
        RuleAction::Reroute(target.to_string())
    }
}

impl From<String> for RuleAction {
    fn from(target: String) -> Self {
        RuleAction::Reroute(target)
    }
}

impl From<DynamicHandler> for RuleAction {
    fn from(handler: DynamicHandler) -> Self {
        RuleAction::Handler(handler)
    }
}

/// Serializes the way rule documents spell actions: booleans, a reroute
/// string, or `{"handler": name}`. `Unset` serializes as null.
impl Serialize for RuleAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RuleAction::Unset => serializer.serialize_none(),
            RuleAction::Unlock => serializer.serialize_bool(true),
            RuleAction::Lock => serializer.serialize_bool(false),
            RuleAction::Reroute(target) => serializer.serialize_str(target),
            RuleAction::Handler(handler) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("handler", handler.name())?;
                map.end()
            }
        }
    }
}

/// Named handlers that rule documents can refer to.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, DynamicHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler under its own name, replacing any previous one.
    pub fn insert(&mut self, handler: DynamicHandler) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn with(mut self, handler: DynamicHandler) -> Self {
        self.insert(handler);
        self
    }

    pub fn get(&self, name: &str) -> Result<DynamicHandler> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::UnknownHandler(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
