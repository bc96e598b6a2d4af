//! Tray-style menu commands.
//!
//! Whatever front end hosts the menu (tray icon, console) maps its items to
//! [`MenuCommand`]s and hands them to [`Menu::dispatch`]. Manual cooldowns
//! go through the same `extend_cooldown` entry point as escalation and
//! never touch anger.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cooldown::{CooldownManager, CooldownSnapshot};
use crate::error::ValidationError;
use crate::escalation::EscalationPolicy;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuCommand {
    Exit,
    DisableShort,
    DisableLong,
    Status,
}

impl MenuCommand {
    /// Items in tray order.
    pub const ITEMS: [MenuCommand; 3] = [
        MenuCommand::Exit,
        MenuCommand::DisableShort,
        MenuCommand::DisableLong,
    ];
}

/// Result of dispatching a command.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuOutcome {
    Exiting,
    Extended(Event),
    Status(CooldownSnapshot),
}

pub struct Menu {
    manager: Arc<CooldownManager>,
    running: Arc<AtomicBool>,
    short_secs: u64,
    long_secs: u64,
}

impl Menu {
    pub fn new(
        manager: Arc<CooldownManager>,
        running: Arc<AtomicBool>,
        policy: &EscalationPolicy,
    ) -> Self {
        Self {
            manager,
            running,
            short_secs: policy.short_manual_secs(),
            long_secs: policy.long_manual_secs(),
        }
    }

    pub fn label(&self, command: MenuCommand) -> String {
        match command {
            MenuCommand::Exit => "Exit".to_string(),
            MenuCommand::DisableShort => format!("Disable Wifi (+{})", humanize(self.short_secs)),
            MenuCommand::DisableLong => format!("Disable Wifi (+{})", humanize(self.long_secs)),
            MenuCommand::Status => "Status".to_string(),
        }
    }

    /// `(command, label)` pairs in tray order.
    pub fn items(&self) -> Vec<(MenuCommand, String)> {
        MenuCommand::ITEMS
            .iter()
            .map(|&command| (command, self.label(command)))
            .collect()
    }

    /// # Errors
    ///
    /// Returns a validation error if the configured manual duration is zero.
    pub fn dispatch(&self, command: MenuCommand) -> Result<MenuOutcome, ValidationError> {
        match command {
            MenuCommand::Exit => {
                tracing::info!("exit requested from menu");
                self.running.store(false, Ordering::SeqCst);
                Ok(MenuOutcome::Exiting)
            }
            MenuCommand::DisableShort => self
                .manager
                .extend_cooldown(self.short_secs)
                .map(MenuOutcome::Extended),
            MenuCommand::DisableLong => self
                .manager
                .extend_cooldown(self.long_secs)
                .map(MenuOutcome::Extended),
            MenuCommand::Status => Ok(MenuOutcome::Status(self.manager.snapshot())),
        }
    }
}

/// "20 min", "1 hour", "2 hours", "45 s".
pub fn humanize(secs: u64) -> String {
    if secs >= 3600 && secs % 3600 == 0 {
        let hours = secs / 3600;
        if hours == 1 {
            "1 hour".to_string()
        } else {
            format!("{hours} hours")
        }
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{secs} s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escalation::Anger;
    use crate::network::MemoryControl;

    fn menu() -> (Menu, Arc<CooldownManager>, Arc<AtomicBool>) {
        let manager = Arc::new(CooldownManager::new(Arc::new(MemoryControl::new()), "Wi-Fi"));
        let running = Arc::new(AtomicBool::new(true));
        let menu = Menu::new(manager.clone(), running.clone(), &EscalationPolicy::default());
        (menu, manager, running)
    }

    #[test]
    fn labels_render_manual_durations() {
        let (menu, _, _) = menu();
        let labels: Vec<String> = menu.items().into_iter().map(|(_, label)| label).collect();
        assert_eq!(
            labels,
            vec!["Exit", "Disable Wifi (+20 min)", "Disable Wifi (+1 hour)"]
        );
    }

    #[test]
    fn exit_clears_running_flag() {
        let (menu, _, running) = menu();
        assert_eq!(menu.dispatch(MenuCommand::Exit).unwrap(), MenuOutcome::Exiting);
        assert!(!running.load(Ordering::SeqCst));
    }

    #[test]
    fn long_disable_is_three_short_and_keeps_anger() {
        let (menu, manager, _) = menu();
        let outcome = menu.dispatch(MenuCommand::DisableLong).unwrap();
        match outcome {
            MenuOutcome::Extended(Event::CooldownExtended { added_secs, started, .. }) => {
                assert_eq!(added_secs, 3600);
                assert!(started);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(manager.anger(), Anger::NEUTRAL);
    }

    #[test]
    fn status_reports_remaining_time() {
        let (menu, _, _) = menu();
        menu.dispatch(MenuCommand::DisableShort).unwrap();
        match menu.dispatch(MenuCommand::Status).unwrap() {
            MenuOutcome::Status(snap) => {
                assert!(snap.is_cooling_down());
                assert!(snap.remaining_secs > 1190 && snap.remaining_secs <= 1200);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn humanize_picks_largest_whole_unit() {
        assert_eq!(humanize(1200), "20 min");
        assert_eq!(humanize(3600), "1 hour");
        assert_eq!(humanize(7200), "2 hours");
        assert_eq!(humanize(90), "90 s");
    }
}
