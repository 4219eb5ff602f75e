//! Boundary between a resolution and the host that acts on it.

use crate::schema::{DynamicHandler, ResolvedRule, RuleAction};

/// A resolved action, borrowed from the [`ResolvedRule`] it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision<'a> {
    /// No rule decided anything.
    Pass,
    /// Explicitly unlocked.
    Allow,
    /// Locked.
    Deny,
    /// Serve another resource path instead.
    Reroute(&'a str),
    /// Hand the request to a dynamic handler.
    Delegate(&'a DynamicHandler),
}

impl ResolvedRule {
    pub fn decision(&self) -> Decision<'_> {
        match &self.action {
            RuleAction::Unset => Decision::Pass,
            RuleAction::Unlock => Decision::Allow,
            RuleAction::Lock => Decision::Deny,
            RuleAction::Reroute(target) => Decision::Reroute(target),
            RuleAction::Handler(handler) => Decision::Delegate(handler),
        }
    }
}

/// Something that serves, denies or redirects resources.
///
/// [`PathResolver::handle_resource_path`](super::PathResolver::handle_resource_path)
/// resolves the path and passes the decision here.
pub trait ResourceHost {
    type Output;

    fn handle(&self, decision: Decision<'_>, resolved: &ResolvedRule) -> Self::Output;
}
