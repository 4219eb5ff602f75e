//! Per-application rule store and path resolver.
//!
//! Rules are registered under multi-glob keys and kept in registration
//! order. Resolving a path scans every rule in that order and merges the
//! matching ones, so later registrations override earlier ones field by
//! field.

mod core;
mod counts;
mod host;


pub use self::core::PathResolver;
pub use self::counts::RuleCounts;
pub use self::host::{Decision, ResourceHost};
