//! Rule and action types.

mod action;
mod rule;

pub use action::{ActionKind, DynamicHandler, HandlerRegistry, RuleAction};
pub use rule::{ResolvedRule, Rule, RESERVED_FIELDS};
