//! Notification surface.
//!
//! A [`Notifier`] shows a [`Reminder`] and later reports how the user
//! reacted through a one-shot [`ActivationCallback`]. Notifiers that never
//! call back leave the reminder unanswered, which the reminder loop counts
//! as ignored on its next cycle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::NotifyError;
use crate::escalation::{Mood, NEXT_THING_INPUT, SUBMIT_ACTION};

/// How a notification was interacted with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    /// Action tag, e.g. `"submit"`.
    pub action: String,
    /// Input fields keyed by id.
    #[serde(default)]
    pub inputs: HashMap<String, String>,
}

impl Activation {
    pub const DISMISSED: &'static str = "dismissed";

    pub fn submit(thing: impl Into<String>) -> Self {
        let mut inputs = HashMap::new();
        inputs.insert(NEXT_THING_INPUT.to_string(), thing.into());
        Self {
            action: SUBMIT_ACTION.to_string(),
            inputs,
        }
    }

    pub fn dismissed() -> Self {
        Self {
            action: Self::DISMISSED.to_string(),
            inputs: HashMap::new(),
        }
    }
}

/// One reminder as handed to a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub generation: u64,
    pub mood: Mood,
    pub text: String,
    /// Zero means no auto-dismiss.
    pub duration: Duration,
}

pub type ActivationCallback = Box<dyn FnOnce(Activation) + Send + 'static>;

pub trait Notifier: Send + Sync {
    /// Show `reminder`. `on_activated` is called at most once, from any thread.
    fn show(&self, reminder: &Reminder, on_activated: ActivationCallback)
        -> Result<(), NotifyError>;
}

/// Holds the callback of the reminder currently on screen so that several
/// input paths (toast action, console reply) can race to answer it.
#[derive(Clone, Default)]
pub struct ReplySlot {
    pending: Arc<Mutex<Option<(u64, ActivationCallback)>>>,
}

impl ReplySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the callback for reminder `generation`. Returns `true` if an
    /// older, unanswered callback was dropped.
    pub fn arm(&self, generation: u64, on_activated: ActivationCallback) -> bool {
        self.lock().replace((generation, on_activated)).is_some()
    }

    /// Answer whichever reminder is pending. Returns `false` if nothing was
    /// waiting.
    pub fn deliver(&self, activation: Activation) -> bool {
        let pending = self.lock().take();
        Self::fire(pending, activation)
    }

    /// Answer reminder `generation` only if it is still the pending one.
    pub fn deliver_to(&self, generation: u64, activation: Activation) -> bool {
        let pending = {
            let mut slot = self.lock();
            if slot.as_ref().is_some_and(|(armed, _)| *armed == generation) {
                slot.take()
            } else {
                None
            }
        };
        Self::fire(pending, activation)
    }

    pub fn pending_generation(&self) -> Option<u64> {
        self.lock().as_ref().map(|(generation, _)| *generation)
    }

    // Callbacks run without our lock held.
    fn fire(pending: Option<(u64, ActivationCallback)>, activation: Activation) -> bool {
        match pending {
            Some((_, callback)) => {
                callback(activation);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<(u64, ActivationCallback)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ReplySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplySlot")
            .field("pending", &self.pending_generation())
            .finish()
    }
}

/// Headless notifier: writes reminders to the log and never calls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(
        &self,
        reminder: &Reminder,
        _on_activated: ActivationCallback,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            generation = reminder.generation,
            mood = ?reminder.mood,
            "{}",
            reminder.text
        );
        Ok(())
    }
}
