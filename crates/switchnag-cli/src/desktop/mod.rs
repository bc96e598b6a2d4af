//! Desktop toast notifications.
//!
//! On Windows toasts are posted through WinRT with a "next thing" text box,
//! an "Okay" button and one button per configured choice. Elsewhere
//! `notify-rust` shows them with one "Okay" action per choice. Either way
//! closing the toast counts as a dismissal, and answers go through the
//! shared [`ReplySlot`] so the console can answer the same reminder.
//!
//! macOS notification servers never report actions back; there the user
//! answers in the terminal.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use switchnag_core::{Activation, ActivationCallback, Notifier, NotifyError, Reminder, ReplySlot};

#[cfg(not(windows))]
mod portable;
#[cfg(windows)]
mod winrt;

#[cfg(not(windows))]
use portable as backend;
#[cfg(windows)]
use winrt as backend;

/// Whether answers given on the toast itself reach the reminder loop.
pub const ACTIONS_SUPPORTED: bool = backend::ACTIONS_SUPPORTED;

const SUBMIT_PREFIX: &str = "submit:";
const CLOSED_ACTION: &str = "__closed";

/// Everything a backend needs to post one toast.
struct ToastSpec {
    generation: u64,
    app_name: String,
    text: String,
    /// Zero keeps the toast up until it is answered.
    duration: Duration,
    choices: Vec<String>,
}

pub struct DesktopNotifier {
    app_name: String,
    choices: Vec<String>,
    replies: ReplySlot,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>, choices: Vec<String>, replies: ReplySlot) -> Self {
        Self {
            app_name: app_name.into(),
            choices,
            replies,
        }
    }
}

impl Notifier for DesktopNotifier {
    fn show(&self, reminder: &Reminder, on_activated: ActivationCallback) -> Result<(), NotifyError> {
        self.replies.arm(reminder.generation, on_activated);

        let spec = ToastSpec {
            generation: reminder.generation,
            app_name: self.app_name.clone(),
            text: reminder.text.clone(),
            duration: reminder.duration,
            choices: self.choices.clone(),
        };
        let replies = self.replies.clone();
        let (shown_tx, shown_rx) = mpsc::channel();

        // The toast thread lives until the toast is answered or closed.
        thread::Builder::new()
            .name(format!("toast-{}", reminder.generation))
            .spawn(move || backend::watch(spec, replies, shown_tx))
            .map_err(|e| NotifyError::ShowFailed(e.to_string()))?;

        match shown_rx.recv() {
            Ok(result) => result,
            Err(_) => Err(NotifyError::ShowFailed("toast thread exited early".into())),
        }
    }
}

/// Map a toast action id to the activation it stands for.
fn activation_for(action: &str) -> Option<Activation> {
    if let Some(choice) = action.strip_prefix(SUBMIT_PREFIX) {
        return Some(Activation::submit(choice));
    }
    (action == CLOSED_ACTION).then(Activation::dismissed)
}

/// Hand a toast answer to reminder `generation`, if it is still pending.
fn answer(replies: &ReplySlot, generation: u64, action: &str, activation: Option<Activation>) {
    match activation {
        Some(activation) => {
            if !replies.deliver_to(generation, activation) {
                tracing::debug!(generation, action, "toast answered after it was superseded");
            }
        }
        None => tracing::debug!(generation, action, "toast action ignored"),
    }
}
