//! Integration tests for the reminder and cooldown loops.
//!
//! Loops run on a real tokio runtime with millisecond timings and an
//! in-memory network backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use switchnag_core::escalation::PresentationDurations;
use switchnag_core::network::MemoryControl;
use switchnag_core::notify::LogNotifier;
use switchnag_core::{
    Activation, ActivationCallback, Anger, CooldownManager, EscalationPolicy, Event, MenuCommand,
    Notifier, NotifyError, Nudger, Reminder,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::timeout;

/// Answers each reminder with the next scripted activation; stays silent
/// once the script runs out.
struct ScriptedNotifier {
    script: Mutex<VecDeque<Activation>>,
    shown: Mutex<Vec<Reminder>>,
}

impl ScriptedNotifier {
    fn new(script: impl IntoIterator<Item = Activation>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            shown: Mutex::new(Vec::new()),
        }
    }

    fn always(activation: Activation, times: usize) -> Self {
        Self::new(std::iter::repeat(activation).take(times))
    }

    fn shown(&self) -> Vec<Reminder> {
        self.shown.lock().unwrap().clone()
    }
}

impl Notifier for ScriptedNotifier {
    fn show(&self, reminder: &Reminder, on_activated: ActivationCallback) -> Result<(), NotifyError> {
        self.shown.lock().unwrap().push(reminder.clone());
        if let Some(activation) = self.script.lock().unwrap().pop_front() {
            on_activated(activation);
        }
        Ok(())
    }
}

struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn show(&self, _: &Reminder, _: ActivationCallback) -> Result<(), NotifyError> {
        Err(NotifyError::ShowFailed("no notification daemon".into()))
    }
}

fn fast_policy(threshold: u32, anger_secs: u64) -> EscalationPolicy {
    EscalationPolicy {
        anger_threshold: threshold,
        duration_on_anger_secs: anger_secs,
        duration_on_manual_secs: 60,
        reminder_interval: Duration::from_millis(5),
        poll_interval: Duration::from_millis(5),
        durations: PresentationDurations {
            neutral: Duration::ZERO,
            angry: Duration::ZERO,
            disabled: Duration::ZERO,
        },
    }
}

fn nudger(
    notifier: Arc<dyn Notifier>,
    policy: EscalationPolicy,
) -> (Nudger, Arc<MemoryControl>, UnboundedReceiver<Event>) {
    let network = Arc::new(MemoryControl::new());
    let manager = Arc::new(CooldownManager::new(network.clone(), "Wi-Fi"));
    let (tx, rx) = unbounded_channel();
    let nudger = Nudger::new(manager, notifier, policy).with_events(tx);
    (nudger, network, rx)
}

/// Pull events until one matches, failing after two seconds.
async fn wait_for(
    rx: &mut UnboundedReceiver<Event>,
    mut pred: impl FnMut(&Event) -> bool,
) -> Vec<Event> {
    let mut seen = Vec::new();
    let found = timeout(Duration::from_secs(2), async {
        while let Some(event) = rx.recv().await {
            let hit = pred(&event);
            seen.push(event);
            if hit {
                return true;
            }
        }
        false
    })
    .await;
    assert!(matches!(found, Ok(true)), "event never arrived; saw {seen:?}");
    seen
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ignored_reminders_escalate_to_a_single_cooldown() {
    let (nudger, network, mut rx) = nudger(Arc::new(LogNotifier), fast_policy(3, 3600));
    let manager = nudger.manager();
    let handle = nudger.spawn();

    let seen = wait_for(&mut rx, |e| matches!(e, Event::Escalated { .. })).await;
    let angers: Vec<Anger> = seen
        .iter()
        .filter_map(|e| match e {
            Event::AngerChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(angers, vec![Anger::ignored(1), Anger::ignored(2), Anger::ignored(3)]);

    // Give the loops a few more ticks; nothing new should be disabled.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(manager.anger(), Anger::PUNISHED);
    assert!(manager.is_cooling_down());
    assert_eq!(network.disable_count(), 1);

    handle.stop();
    handle.join().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn compliance_keeps_anger_neutral() {
    let notifier = Arc::new(ScriptedNotifier::always(Activation::submit("write tests"), 1000));
    let (nudger, network, mut rx) = nudger(notifier.clone(), fast_policy(2, 3600));
    let manager = nudger.manager();
    let handle = nudger.spawn();

    let mut shown = 0;
    wait_for(&mut rx, |e| {
        if matches!(e, Event::ReminderShown { .. }) {
            shown += 1;
        }
        shown >= 5
    })
    .await;

    handle.stop();
    handle.join().await;

    assert_eq!(manager.anger(), Anger::NEUTRAL);
    assert!(!manager.is_cooling_down());
    assert_eq!(network.disable_count(), 0);
    assert!(notifier
        .shown()
        .iter()
        .all(|r| r.text == switchnag_core::escalation::NEUTRAL_TEXT));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn punitive_cooldown_expires_and_reminders_resume() {
    let (nudger, network, mut rx) = nudger(Arc::new(LogNotifier), fast_policy(1, 1));
    let handle = nudger.spawn();

    wait_for(&mut rx, |e| matches!(e, Event::Escalated { .. })).await;
    let seen = timeout(Duration::from_secs(4), async {
        let mut seen = Vec::new();
        while let Some(event) = rx.recv().await {
            let expired = matches!(event, Event::CooldownExpired { .. });
            seen.push(event);
            if expired {
                break;
            }
        }
        seen
    })
    .await
    .expect("cooldown should expire");

    // Only the angered reminder from the escalating cycle itself.
    assert!(
        !seen
            .iter()
            .any(|e| matches!(e, Event::ReminderShown { anger, .. } if !anger.is_punished())),
        "no reminders while the network is down: {seen:?}"
    );
    match seen.last() {
        Some(Event::CooldownExpired { anger, .. }) => assert_eq!(*anger, Anger::NEUTRAL),
        other => panic!("expected expiry, got {other:?}"),
    }
    assert_eq!(network.enable_count(), 1);

    wait_for(&mut rx, |e| matches!(e, Event::ReminderShown { anger, .. } if anger.is_neutral())).await;

    handle.stop();
    handle.join().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn manual_cooldown_pauses_reminders_without_touching_anger() {
    let (nudger, network, mut rx) = nudger(Arc::new(LogNotifier), fast_policy(100, 3600));
    let manager = nudger.manager();
    let menu = nudger.menu();

    menu.dispatch(MenuCommand::DisableShort).unwrap();
    menu.dispatch(MenuCommand::DisableShort).unwrap();
    let handle = nudger.spawn();

    tokio::time::sleep(Duration::from_millis(60)).await;
    handle.stop();
    handle.join().await;

    while let Ok(event) = rx.try_recv() {
        assert!(
            !matches!(event, Event::ReminderShown { .. }),
            "reminder shown during cooldown: {event:?}"
        );
    }
    assert_eq!(manager.anger(), Anger::NEUTRAL);
    assert_eq!(network.disable_count(), 1);
    assert!(manager.snapshot().remaining_secs > 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unshown_reminders_still_count_as_ignored() {
    let (nudger, _network, mut rx) = nudger(Arc::new(FailingNotifier), fast_policy(2, 3600));
    let handle = nudger.spawn();

    wait_for(&mut rx, |e| matches!(e, Event::Escalated { .. })).await;

    handle.stop();
    handle.join().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exit_command_stops_both_loops() {
    let (nudger, _network, _rx) = nudger(Arc::new(LogNotifier), fast_policy(100, 3600));
    let menu = nudger.menu();
    let handle = nudger.spawn();

    tokio::time::sleep(Duration::from_millis(20)).await;
    menu.dispatch(MenuCommand::Exit).unwrap();

    timeout(Duration::from_secs(2), handle.join())
        .await
        .expect("loops should observe the running flag");
}
