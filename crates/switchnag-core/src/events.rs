use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::escalation::{Anger, ReminderResponse};

/// Every state change in the nudger produces an Event.
/// The loops log them and forward them to an optional subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A reminder notification was issued.
    ReminderShown {
        generation: u64,
        anger: Anger,
        text: String,
        at: DateTime<Utc>,
    },
    /// A reminder response (or lack of one) changed the anger counter.
    AngerChanged {
        generation: u64,
        response: ReminderResponse,
        from: Anger,
        to: Anger,
        at: DateTime<Utc>,
    },
    /// Anger crossed the threshold and a punitive cooldown was triggered.
    Escalated {
        previous: Anger,
        cooldown_secs: u64,
        at: DateTime<Utc>,
    },
    /// Cooldown started or accumulated.
    CooldownExtended {
        added_secs: u64,
        disabled_until: DateTime<Utc>,
        /// `true` when this call started a fresh cooldown (and disabled the
        /// interface); `false` when it extended a running one.
        started: bool,
        at: DateTime<Utc>,
    },
    /// Cooldown ran out and the interface was re-enabled.
    CooldownExpired {
        was_until: DateTime<Utc>,
        /// Anger after expiry; a punished counter returns to neutral.
        anger: Anger,
        at: DateTime<Utc>,
    },
    /// A failed toggle was re-issued by the poll loop.
    NetworkReasserted {
        enabled: bool,
        ok: bool,
        at: DateTime<Utc>,
    },
}
