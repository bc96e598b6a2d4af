//! # switchnag Core Library
//!
//! Core logic for a task-switch nudger: it reminds the user to switch tasks,
//! gets angrier every time a reminder is ignored, and takes the Wi-Fi
//! interface down for a while once it has been ignored too often.
//!
//! ## Architecture
//!
//! - **Cooldown Manager**: one lock-guarded object holding the
//!   disabled-until timestamp and the anger counter, shared by everything
//! - **Escalation Policy**: pure rules for reminder text, on-screen
//!   duration, response handling and the anger threshold
//! - **Nudger**: the reminder loop and the cooldown expiry loop, as tokio
//!   tasks
//! - **Menu**: manual cooldown and exit commands
//! - **Storage**: TOML configuration
//!
//! OS plumbing (notifications, interface toggling, elevation) sits behind
//! the [`Notifier`] and [`NetworkControl`] traits and the [`privilege`]
//! module.
//!
//! ## Key Components
//!
//! - [`CooldownManager`]: shared cooldown/anger state machine
//! - [`Nudger`]: loop orchestration
//! - [`Config`]: application configuration management

pub mod clock;
pub mod cooldown;
pub mod error;
pub mod escalation;
pub mod events;
pub mod menu;
pub mod network;
pub mod notify;
pub mod nudger;
pub mod privilege;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cooldown::{CooldownManager, CooldownSnapshot, ReminderCycle};
pub use error::{ConfigError, CoreError, NetworkError, NotifyError, PrivilegeError, ValidationError};
pub use escalation::{Anger, EscalationPolicy, Mood, Presentation, ReminderResponse};
pub use events::Event;
pub use menu::{Menu, MenuCommand, MenuOutcome};
pub use network::{NetworkBackend, NetworkControl};
pub use notify::{Activation, ActivationCallback, Notifier, Reminder, ReplySlot};
pub use nudger::{Nudger, NudgerHandle};
pub use storage::Config;
