//! Per-application resource path policy resolver.
//!
//! This crate provides:
//! - Multi-glob rule keys (`"public/** | assets/**"`) with negation
//! - An insertion-ordered rule store that merges every matching rule
//! - Lock, unlock, reroute and dynamic-handler actions
//! - YAML/JSON ruleset documents with shape validation
//! - A thread-safe registry of resolvers, one per installed application

pub mod config;
pub mod error;
pub mod globs;
pub mod normalize;
pub mod registry;
pub mod resolver;
pub mod schema;

pub use config::{ActionSpec, ResolverConfig, RuleSet, RuleSpec};
pub use error::{Result, RuleError};
pub use registry::AppRegistry;
pub use resolver::{Decision, PathResolver, ResourceHost, RuleCounts};
pub use schema::{ActionKind, DynamicHandler, HandlerRegistry, ResolvedRule, Rule, RuleAction};
