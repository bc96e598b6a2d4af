//! Reminder and cooldown loops.
//!
//! [`Nudger::spawn`] starts two tokio tasks sharing one
//! [`CooldownManager`]:
//!
//! - the **reminder loop** issues a reminder, waits `reminder_interval`,
//!   then waits the presentation duration of the current mood. While a
//!   cooldown is recorded it only idles on `poll_interval`.
//! - the **cooldown loop** calls `check_and_expire()` every
//!   `poll_interval`.
//!
//! Both stop once the shared running flag is cleared. Sleeps in flight are
//! not interrupted, so shutdown can lag by up to the longest sleep.
//! Manager calls may run the interface toggle command, so they go through
//! `spawn_blocking`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{self, JoinHandle};
use tokio::time::sleep;

use crate::cooldown::CooldownManager;
use crate::escalation::{EscalationPolicy, ReminderResponse};
use crate::events::Event;
use crate::menu::Menu;
use crate::notify::{ActivationCallback, Notifier, Reminder};

pub type EventSink = UnboundedSender<Event>;

#[derive(Clone)]
pub struct Nudger {
    manager: Arc<CooldownManager>,
    notifier: Arc<dyn Notifier>,
    policy: EscalationPolicy,
    running: Arc<AtomicBool>,
    events: Option<EventSink>,
}

impl Nudger {
    pub fn new(
        manager: Arc<CooldownManager>,
        notifier: Arc<dyn Notifier>,
        policy: EscalationPolicy,
    ) -> Self {
        Self {
            manager,
            notifier,
            policy,
            running: Arc::new(AtomicBool::new(true)),
            events: None,
        }
    }

    /// Forward every state change to `sink`.
    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn manager(&self) -> Arc<CooldownManager> {
        self.manager.clone()
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Menu bound to this nudger's state and running flag.
    pub fn menu(&self) -> Menu {
        Menu::new(self.manager.clone(), self.running.clone(), &self.policy)
    }

    /// Start both loops on the current tokio runtime.
    pub fn spawn(&self) -> NudgerHandle {
        let reminder = tokio::spawn(self.clone().reminder_loop());
        let cooldown = tokio::spawn(self.clone().cooldown_loop());
        NudgerHandle {
            reminder,
            cooldown,
            running: self.running.clone(),
        }
    }

    pub async fn reminder_loop(self) {
        tracing::debug!("reminder loop started");
        while self.is_running() {
            let manager = self.manager.clone();
            let policy = self.policy.clone();
            let cycle = match task::spawn_blocking(move || manager.start_cycle(&policy)).await {
                Ok(cycle) => cycle,
                Err(e) => {
                    tracing::error!(error = %e, "reminder cycle task failed");
                    break;
                }
            };

            let Some(cycle) = cycle else {
                sleep(self.policy.poll_interval).await;
                continue;
            };

            self.emit_all(cycle.events);
            self.show(&cycle.reminder);

            sleep(self.policy.reminder_interval).await;
            // Mood may have changed while we slept.
            let hold = self.manager.presentation(&self.policy).duration;
            sleep(hold).await;
        }
        tracing::debug!("reminder loop stopped");
    }

    pub async fn cooldown_loop(self) {
        tracing::debug!("cooldown loop started");
        while self.is_running() {
            let manager = self.manager.clone();
            match task::spawn_blocking(move || manager.check_and_expire()).await {
                Ok(events) => self.emit_all(events),
                Err(e) => {
                    tracing::error!(error = %e, "cooldown check task failed");
                    break;
                }
            }
            sleep(self.policy.poll_interval).await;
        }
        tracing::debug!("cooldown loop stopped");
    }

    fn show(&self, reminder: &Reminder) {
        let manager = self.manager.clone();
        let events = self.events.clone();
        let generation = reminder.generation;

        let on_activated: ActivationCallback = Box::new(move |activation| {
            tracing::debug!(generation, ?activation, "reminder activated");
            let response = ReminderResponse::from_activation(&activation);
            if let (Some(event), Some(sink)) = (manager.respond(generation, response), &events) {
                let _ = sink.send(event);
            }
        });

        if let Err(e) = self.notifier.show(reminder, on_activated) {
            tracing::warn!(generation, error = %e, "reminder could not be shown");
        }
    }

    fn emit_all(&self, events: Vec<Event>) {
        for event in events {
            tracing::debug!(?event, "state change");
            if let Some(sink) = &self.events {
                let _ = sink.send(event);
            }
        }
    }
}

/// Join handles for the two loops.
pub struct NudgerHandle {
    reminder: JoinHandle<()>,
    cooldown: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

impl NudgerHandle {
    /// Ask both loops to stop after their current sleep.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for both loops to finish.
    pub async fn join(self) {
        let (reminder, cooldown) = tokio::join!(self.reminder, self.cooldown);
        for (name, result) in [("reminder", reminder), ("cooldown", cooldown)] {
            if let Err(e) = result {
                tracing::error!(loop_name = name, error = %e, "loop ended abnormally");
            }
        }
    }
}
