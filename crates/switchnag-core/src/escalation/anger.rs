use serde::{Deserialize, Serialize};
use std::fmt;

use super::ReminderResponse;

/// Escalation counter.
///
/// Ranges over `{-1} ∪ [0, threshold]`. `-1` is the punished sentinel: a
/// punitive cooldown is running (or was just triggered), and responses no
/// longer move the counter. `0` is neutral, positive values count
/// consecutive ignored reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Anger(i32);

impl Anger {
    pub const PUNISHED: Anger = Anger(-1);
    pub const NEUTRAL: Anger = Anger(0);

    /// Anger after `ignored` consecutive ignored reminders.
    pub fn ignored(ignored: u32) -> Self {
        Anger(i32::try_from(ignored).unwrap_or(i32::MAX))
    }

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn is_punished(self) -> bool {
        self.0 < 0
    }

    pub fn is_neutral(self) -> bool {
        self.0 == 0
    }

    /// Whether this level has reached the escalation threshold.
    /// The punished sentinel never reaches it.
    pub fn reached(self, threshold: u32) -> bool {
        i64::from(self.0) >= i64::from(threshold)
    }

    /// Anger after the user responded to a reminder.
    pub fn after(self, response: ReminderResponse) -> Anger {
        if self.is_punished() {
            return self;
        }
        match response {
            ReminderResponse::Compliance => Anger::NEUTRAL,
            ReminderResponse::Ignored => Anger(self.0.saturating_add(1)),
        }
    }
}

impl Default for Anger {
    fn default() -> Self {
        Anger::NEUTRAL
    }
}

impl fmt::Display for Anger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
