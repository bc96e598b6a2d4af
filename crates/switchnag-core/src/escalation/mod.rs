//! Reminder escalation policy.
//!
//! Decides what a reminder says, how long it stays up, and how the user's
//! response moves the [`Anger`] counter.
//!
//! ## Presentation
//!
//! | anger | mood      | duration                       |
//! |-------|-----------|--------------------------------|
//! | 0     | Neutral   | `neutral` (short)              |
//! | > 0   | Urgent    | `angry` (zero, no auto-dismiss)|
//! | -1    | Angered   | `disabled` (long)              |
//!
//! ## Escalation
//!
//! Checked once at the top of every reminder cycle: when anger has reached
//! the threshold it becomes [`Anger::PUNISHED`] and a cooldown of
//! `duration_on_anger_secs` is requested.

mod anger;

pub use anger::Anger;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::notify::Activation;

/// Action tag a notifier reports when the user pressed the submit button.
pub const SUBMIT_ACTION: &str = "submit";
/// Input field carrying the user's "next thing".
pub const NEXT_THING_INPUT: &str = "thing";

pub const NEUTRAL_TEXT: &str = "Time to Switch!";
pub const URGENT_TEXT: &str = "Please do not ignore me!";
pub const ANGERED_TEXT: &str = "You have angered me! Internet disabled temporarily.";

/// How the user reacted to a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderResponse {
    /// Explicit submit with a non-empty "next thing".
    Compliance,
    /// Dismissed, submitted empty, or never answered before the next cycle.
    Ignored,
}

impl ReminderResponse {
    /// Classify a notifier activation. Anything other than a submit with a
    /// non-blank input counts as ignored.
    pub fn from_activation(activation: &Activation) -> Self {
        let answered = activation
            .inputs
            .get(NEXT_THING_INPUT)
            .is_some_and(|thing| !thing.trim().is_empty());
        if activation.action == SUBMIT_ACTION && answered {
            ReminderResponse::Compliance
        } else {
            ReminderResponse::Ignored
        }
    }
}

/// Presentation mood derived from anger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Neutral,
    Urgent,
    Angered,
}

/// On-screen duration for each mood. Also used as the extra pause the
/// reminder loop takes after its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationDurations {
    pub neutral: Duration,
    pub angry: Duration,
    pub disabled: Duration,
}

impl Default for PresentationDurations {
    fn default() -> Self {
        Self {
            neutral: Duration::from_secs(1200),
            angry: Duration::ZERO,
            disabled: Duration::from_secs(2400),
        }
    }
}

/// What a reminder looks like for a given anger level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub mood: Mood,
    pub text: &'static str,
    /// Zero means the notification should not auto-dismiss.
    pub duration: Duration,
}

impl Presentation {
    pub fn for_anger(anger: Anger, durations: &PresentationDurations) -> Self {
        if anger.is_punished() {
            Self {
                mood: Mood::Angered,
                text: ANGERED_TEXT,
                duration: durations.disabled,
            }
        } else if anger.is_neutral() {
            Self {
                mood: Mood::Neutral,
                text: NEUTRAL_TEXT,
                duration: durations.neutral,
            }
        } else {
            Self {
                mood: Mood::Urgent,
                text: URGENT_TEXT,
                duration: durations.angry,
            }
        }
    }
}

/// Escalation and loop timing knobs, usually built from `Config::policy()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// Ignored reminders before a punitive cooldown.
    pub anger_threshold: u32,
    /// Punitive cooldown length in seconds.
    pub duration_on_anger_secs: u64,
    /// Short manual cooldown in seconds; the long one is three times this.
    pub duration_on_manual_secs: u64,
    /// Pause between reminders, before the presentation duration.
    pub reminder_interval: Duration,
    /// Cooldown expiry poll interval; also the reminder loop's idle tick.
    pub poll_interval: Duration,
    pub durations: PresentationDurations,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            anger_threshold: 10,
            duration_on_anger_secs: 40 * 60,
            duration_on_manual_secs: 20 * 60,
            reminder_interval: Duration::from_secs(10),
            poll_interval: Duration::from_secs(5),
            durations: PresentationDurations::default(),
        }
    }
}

impl EscalationPolicy {
    pub fn presentation(&self, anger: Anger) -> Presentation {
        Presentation::for_anger(anger, &self.durations)
    }

    pub fn should_escalate(&self, anger: Anger) -> bool {
        anger.reached(self.anger_threshold)
    }

    pub fn short_manual_secs(&self) -> u64 {
        self.duration_on_manual_secs
    }

    pub fn long_manual_secs(&self) -> u64 {
        self.duration_on_manual_secs.saturating_mul(3)
    }
}
