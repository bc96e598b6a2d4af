//! Shared cooldown state.
//!
//! One [`CooldownManager`] per process is the single source of truth for
//! whether the Wi-Fi interface should be down, until when, and how angry
//! the nudger is. Both loops and the menu share it through an `Arc`; every
//! read-modify-write of `disabled_until` and `anger` happens under the same
//! lock, including the interface toggle itself.
//!
//! ## Cooldown rules
//!
//! - `extend_cooldown(s)` with no live cooldown: `disabled_until = now + s`
//!   and the interface is disabled right away.
//! - `extend_cooldown(s)` with a live cooldown: `disabled_until += s`.
//!   Manual and punitive cooldowns accumulate the same way.
//! - `check_and_expire()` once `now > disabled_until`: interface enabled,
//!   `disabled_until` cleared.
//!
//! Toggle failures are logged and never roll state back. The next
//! `check_and_expire()` re-issues whatever state the interface should be in.

mod snapshot;

pub use snapshot::CooldownSnapshot;

use chrono::{DateTime, Local, TimeDelta, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;
use crate::escalation::{Anger, EscalationPolicy, Presentation, ReminderResponse};
use crate::events::Event;
use crate::network::NetworkControl;
use crate::notify::Reminder;

#[derive(Debug)]
struct CooldownState {
    disabled_until: Option<DateTime<Utc>>,
    anger: Anger,
    /// Generation of the reminder still waiting for an answer.
    pending_reminder: Option<u64>,
    last_generation: u64,
    /// Last admin-state the backend accepted. Starts as "enabled".
    applied: Option<bool>,
}

impl Default for CooldownState {
    fn default() -> Self {
        Self {
            disabled_until: None,
            anger: Anger::NEUTRAL,
            pending_reminder: None,
            last_generation: 0,
            applied: Some(true),
        }
    }
}

/// Outcome of starting a reminder cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderCycle {
    pub reminder: Reminder,
    /// Everything that changed while starting the cycle, in order.
    pub events: Vec<Event>,
}

pub struct CooldownManager {
    state: Mutex<CooldownState>,
    network: Arc<dyn NetworkControl>,
    interface: String,
    clock: Arc<dyn Clock>,
}

impl CooldownManager {
    pub fn new(network: Arc<dyn NetworkControl>, interface: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(CooldownState::default()),
            network,
            interface: interface.into(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn anger(&self) -> Anger {
        self.lock().anger
    }

    pub fn disabled_until(&self) -> Option<DateTime<Utc>> {
        self.lock().disabled_until
    }

    /// Whether a cooldown is recorded. Stays `true` past expiry until the
    /// poll loop observes it.
    pub fn is_cooling_down(&self) -> bool {
        self.lock().disabled_until.is_some()
    }

    pub fn presentation(&self, policy: &EscalationPolicy) -> Presentation {
        policy.presentation(self.anger())
    }

    pub fn snapshot(&self) -> CooldownSnapshot {
        let state = self.lock();
        CooldownSnapshot::capture(
            state.anger,
            state.disabled_until,
            state.pending_reminder,
            self.clock.now(),
        )
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or lengthen the cooldown by `seconds`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `seconds` is zero.
    pub fn extend_cooldown(&self, seconds: u64) -> Result<Event, ValidationError> {
        if seconds == 0 {
            return Err(ValidationError::InvalidValue {
                field: "seconds".into(),
                message: "cooldown must be at least one second".into(),
            });
        }
        let mut state = self.lock();
        Ok(self.extend_locked(&mut state, seconds))
    }

    /// Re-enable the interface once the cooldown is over. Called on every
    /// poll; also re-issues a toggle that failed earlier.
    pub fn check_and_expire(&self) -> Vec<Event> {
        let mut state = self.lock();
        let now = self.clock.now();

        if let Some(until) = state.disabled_until {
            if now > until {
                self.apply_locked(&mut state, true);
                state.disabled_until = None;
                // The angered reminder is moot once the punishment is served.
                // After a manual cooldown an unanswered reminder still counts.
                if state.anger.is_punished() {
                    state.anger = Anger::NEUTRAL;
                    state.pending_reminder = None;
                }
                return vec![Event::CooldownExpired {
                    was_until: until,
                    anger: state.anger,
                    at: now,
                }];
            }
        }

        let desired = state.disabled_until.is_none();
        if state.applied == Some(desired) {
            return Vec::new();
        }
        tracing::info!(
            interface = %self.interface,
            enabled = desired,
            "re-asserting interface admin-state"
        );
        let ok = self.apply_locked(&mut state, desired);
        vec![Event::NetworkReasserted {
            enabled: desired,
            ok,
            at: now,
        }]
    }

    /// Begin a reminder cycle: count an unanswered previous reminder as
    /// ignored, escalate if anger reached the threshold, then issue the next
    /// reminder.
    ///
    /// Returns `None` when a cooldown is already recorded; no reminders are
    /// shown while the network is down.
    pub fn start_cycle(&self, policy: &EscalationPolicy) -> Option<ReminderCycle> {
        let mut state = self.lock();
        if state.disabled_until.is_some() {
            return None;
        }
        let now = self.clock.now();
        let mut events = Vec::new();

        if let Some(generation) = state.pending_reminder.take() {
            events.push(self.respond_locked(
                &mut state,
                generation,
                ReminderResponse::Ignored,
                now,
            ));
        }

        if policy.should_escalate(state.anger) {
            let previous = state.anger;
            state.anger = Anger::PUNISHED;
            tracing::warn!(%previous, threshold = policy.anger_threshold, "anger threshold reached");
            events.push(Event::Escalated {
                previous,
                cooldown_secs: policy.duration_on_anger_secs,
                at: now,
            });
            events.push(self.extend_locked(&mut state, policy.duration_on_anger_secs));
        }

        state.last_generation += 1;
        let generation = state.last_generation;
        state.pending_reminder = Some(generation);

        let presentation = policy.presentation(state.anger);
        tracing::debug!(generation, anger = %state.anger, "issuing reminder");
        events.push(Event::ReminderShown {
            generation,
            anger: state.anger,
            text: presentation.text.to_string(),
            at: now,
        });

        Some(ReminderCycle {
            reminder: Reminder {
                generation,
                mood: presentation.mood,
                text: presentation.text.to_string(),
                duration: presentation.duration,
            },
            events,
        })
    }

    /// Record the user's answer to reminder `generation`.
    ///
    /// Answers to anything but the pending reminder are dropped: the
    /// reminder was already counted as ignored when the next cycle began.
    pub fn respond(&self, generation: u64, response: ReminderResponse) -> Option<Event> {
        let mut state = self.lock();
        if state.pending_reminder != Some(generation) {
            tracing::debug!(generation, ?response, "dropping answer to a stale reminder");
            return None;
        }
        state.pending_reminder = None;
        let now = self.clock.now();
        Some(self.respond_locked(&mut state, generation, response, now))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, CooldownState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn extend_locked(&self, state: &mut CooldownState, seconds: u64) -> Event {
        let now = self.clock.now();
        let added = secs(seconds);

        let (until, started) = match state.disabled_until {
            Some(until) if now <= until => (saturating_add(until, added), false),
            _ => (saturating_add(now, added), true),
        };
        state.disabled_until = Some(until);
        if started {
            self.apply_locked(state, false);
        }

        tracing::info!(
            "Wi-Fi disabled until {}",
            until.with_timezone(&Local).format("%H:%M:%S")
        );
        Event::CooldownExtended {
            added_secs: seconds,
            disabled_until: until,
            started,
            at: now,
        }
    }

    fn respond_locked(
        &self,
        state: &mut CooldownState,
        generation: u64,
        response: ReminderResponse,
        now: DateTime<Utc>,
    ) -> Event {
        let from = state.anger;
        let to = from.after(response);
        state.anger = to;

        match (from.is_punished(), response) {
            (true, _) => tracing::info!(generation, "anger stays {}", to),
            (false, ReminderResponse::Compliance) => {
                tracing::info!(generation, "user complied with task switch")
            }
            (false, ReminderResponse::Ignored) => {
                tracing::info!(generation, anger = %to, "user ignored task switch, increasing anger")
            }
        }

        Event::AngerChanged {
            generation,
            response,
            from,
            to,
            at: now,
        }
    }

    /// Ask the backend for `enabled`. Returns whether it succeeded.
    fn apply_locked(&self, state: &mut CooldownState, enabled: bool) -> bool {
        match self.network.set_interface_admin(&self.interface, enabled) {
            Ok(()) => {
                state.applied = Some(enabled);
                if enabled {
                    tracing::info!(interface = %self.interface, "Wi-Fi re-enabled");
                } else {
                    tracing::info!(interface = %self.interface, "Wi-Fi disabled");
                }
                true
            }
            Err(e) => {
                tracing::warn!(interface = %self.interface, enabled, error = %e, "interface toggle failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for CooldownManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownManager")
            .field("interface", &self.interface)
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

fn secs(seconds: u64) -> TimeDelta {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

fn saturating_add(at: DateTime<Utc>, by: TimeDelta) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
