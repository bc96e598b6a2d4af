use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::escalation::Anger;

/// Point-in-time view of the shared cooldown state, for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownSnapshot {
    pub anger: Anger,
    pub disabled_until: Option<DateTime<Utc>>,
    /// Whole seconds left on the cooldown; 0 when none is running or it has
    /// lapsed but not yet been observed.
    pub remaining_secs: u64,
    pub awaiting_reply: bool,
    pub at: DateTime<Utc>,
}

impl CooldownSnapshot {
    pub(crate) fn capture(
        anger: Anger,
        disabled_until: Option<DateTime<Utc>>,
        pending_reminder: Option<u64>,
        now: DateTime<Utc>,
    ) -> Self {
        let remaining_secs = disabled_until
            .map(|until| (until - now).num_seconds().max(0) as u64)
            .unwrap_or(0);
        Self {
            anger,
            disabled_until,
            remaining_secs,
            awaiting_reply: pending_reminder.is_some(),
            at: now,
        }
    }

    pub fn is_cooling_down(&self) -> bool {
        self.disabled_until.is_some()
    }
}
