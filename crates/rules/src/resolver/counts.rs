//! Per-kind rule counters.

use serde::Serialize;

use crate::schema::ActionKind;

/// Number of live rules of each counted [`ActionKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuleCounts {
    pub dynamic_handlers: usize,
    pub static_reroutes: usize,
    pub static_locks: usize,
}

impl RuleCounts {
    pub fn get(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::DynamicHandler => self.dynamic_handlers,
            ActionKind::StaticReroute => self.static_reroutes,
            ActionKind::StaticLock => self.static_locks,
        }
    }

    pub(crate) fn record(&mut self, kind: ActionKind) {
        *self.slot(kind) += 1;
    }

    pub(crate) fn forget(&mut self, kind: ActionKind) {
        let slot = self.slot(kind);
        *slot = slot.saturating_sub(1);
    }

    fn slot(&mut self, kind: ActionKind) -> &mut usize {
        match kind {
            ActionKind::DynamicHandler => &mut self.dynamic_handlers,
            ActionKind::StaticReroute => &mut self.static_reroutes,
            ActionKind::StaticLock => &mut self.static_locks,
        }
    }
}
