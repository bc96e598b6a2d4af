use std::io::BufRead;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use clap::Args;
use switchnag_core::menu::humanize;
use switchnag_core::privilege::{self, Elevation};
use switchnag_core::{
    Config, CooldownManager, CooldownSnapshot, Event, Menu, MenuOutcome, NetworkBackend,
    NetworkControl, Notifier, Nudger, ReplySlot,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task;

use crate::console::{ConsoleInput, ConsoleNotifier, HELP};
use crate::desktop::{self, DesktopNotifier};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Args)]
pub struct RunArgs {
    /// Print reminders to the terminal instead of desktop notifications
    #[arg(long)]
    console: bool,

    /// Log interface changes instead of running netsh
    #[arg(long)]
    dry_run: bool,

    /// Do not relaunch with administrator rights
    #[arg(long)]
    no_elevate: bool,

    /// Interface to toggle (overrides network.interface)
    #[arg(long)]
    interface: Option<String>,

    /// Print every state change as a JSON line
    #[arg(long)]
    events: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if args.dry_run {
        config.network.backend = NetworkBackend::DryRun;
    }
    if let Some(interface) = &args.interface {
        config.network.interface = interface.clone();
    }

    if config.network.backend.needs_elevation()
        && !args.no_elevate
        && privilege::ensure_elevated()? == Elevation::Relaunched
    {
        println!("Relaunched with administrator rights.");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config, args))
}

async fn serve(config: Config, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let network: Arc<dyn NetworkControl> = Arc::from(config.network.backend.build());
    let manager = Arc::new(CooldownManager::new(network, config.network.interface.clone()));
    let replies = ReplySlot::new();
    let notifier: Arc<dyn Notifier> = if args.console {
        Arc::new(ConsoleNotifier::new(replies.clone()))
    } else {
        Arc::new(DesktopNotifier::new(
            config.notifications.app_name.clone(),
            config.notifications.choices.clone(),
            replies.clone(),
        ))
    };

    let (event_tx, mut events) = unbounded_channel();
    let nudger = Nudger::new(manager.clone(), notifier, config.policy()).with_events(event_tx);
    let menu = Arc::new(nudger.menu());

    tracing::info!(
        interface = %config.network.interface,
        backend = ?config.network.backend,
        "switchnag started"
    );
    print_menu(&menu);
    if let Some(hint) = reply_hint(args.console, desktop::ACTIONS_SUPPORTED) {
        println!("{hint}");
    }

    let handle = nudger.spawn();
    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while nudger.is_running() {
        tokio::select! {
            line = lines.recv(), if stdin_open => match line {
                Some(line) => handle_line(&line, &menu, &replies, args.events).await,
                None => {
                    tracing::debug!("stdin closed; menu input disabled");
                    stdin_open = false;
                }
            },
            Some(event) = events.recv() => print_event(&event, args.events),
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                handle.stop();
            }
        }
    }

    handle.stop();
    // A loop may be in the middle of a long presentation sleep.
    if tokio::time::timeout(SHUTDOWN_GRACE, handle.join()).await.is_err() {
        tracing::debug!("loops still sleeping; leaving them to the runtime");
    }

    if manager.is_cooling_down() {
        tracing::warn!(
            interface = %config.network.interface,
            "exiting with the interface still disabled"
        );
    }
    Ok(())
}

async fn handle_line(line: &str, menu: &Arc<Menu>, replies: &ReplySlot, as_json: bool) {
    match ConsoleInput::parse(line) {
        ConsoleInput::Menu(command) => {
            // Disabling may run the toggle command.
            let menu = Arc::clone(menu);
            match task::spawn_blocking(move || menu.dispatch(command)).await {
                Ok(Ok(MenuOutcome::Exiting)) => println!("Bye."),
                Ok(Ok(MenuOutcome::Status(snapshot))) => print_status(&snapshot),
                Ok(Ok(MenuOutcome::Extended(event))) => print_event(&event, as_json),
                Ok(Err(e)) => eprintln!("error: {e}"),
                Err(e) => tracing::error!(error = %e, "menu command task failed"),
            }
        }
        ConsoleInput::Reply(activation) => {
            if !replies.deliver(activation) {
                println!("No reminder is waiting for an answer.");
            }
        }
        ConsoleInput::Help => println!("{HELP}"),
        ConsoleInput::Empty => {}
        ConsoleInput::Unknown(input) => println!("Unknown command '{input}'. Type 'help'."),
    }
}

/// Lines from stdin, read on a plain thread so a blocked read never holds
/// up runtime shutdown.
fn spawn_stdin_reader() -> UnboundedReceiver<String> {
    let (tx, rx) = unbounded_channel();
    let spawned = thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "could not read stdin; menu input disabled");
    }
    rx
}

/// Where to answer reminders when toasts cannot report answers back.
fn reply_hint(console: bool, actions_supported: bool) -> Option<&'static str> {
    (!console && !actions_supported)
        .then_some("Desktop notifications here cannot take answers; reply in this terminal with 'ok <next thing>'.")
}

fn print_menu(menu: &Menu) {
    println!("Menu:");
    for (i, (_, label)) in menu.items().iter().enumerate() {
        println!("  {}. {label}", i + 1);
    }
    println!("Type 'help' for all commands.");
}

fn print_status(snapshot: &CooldownSnapshot) {
    match snapshot.disabled_until {
        Some(until) => println!(
            "Wi-Fi disabled until {} ({} left), anger {}",
            until.with_timezone(&Local).format("%H:%M:%S"),
            humanize(snapshot.remaining_secs),
            snapshot.anger
        ),
        None => println!(
            "Wi-Fi enabled, anger {}{}",
            snapshot.anger,
            if snapshot.awaiting_reply { ", waiting for an answer" } else { "" }
        ),
    }
}

fn print_event(event: &Event, as_json: bool) {
    if as_json {
        match serde_json::to_string(event) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "could not serialize event"),
        }
        return;
    }
    if let Some(line) = describe(event) {
        println!("{line}");
    }
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::CooldownExtended { added_secs, disabled_until, started, .. } => {
            let until = disabled_until.with_timezone(&Local).format("%H:%M:%S");
            Some(if *started {
                format!("Wi-Fi disabled until {until}")
            } else {
                format!("Cooldown extended by {}, now until {until}", humanize(*added_secs))
            })
        }
        Event::CooldownExpired { .. } => Some("Wi-Fi re-enabled".to_string()),
        Event::Escalated { previous, .. } => {
            Some(format!("Ignored {} reminders in a row.", previous.value()))
        }
        Event::NetworkReasserted { enabled, ok: false, .. } => Some(format!(
            "Could not {} Wi-Fi, will retry",
            if *enabled { "enable" } else { "disable" }
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use switchnag_core::Anger;

    #[test]
    fn describes_cooldown_changes() {
        let now = Utc::now();
        let started = Event::CooldownExtended {
            added_secs: 1200,
            disabled_until: now,
            started: true,
            at: now,
        };
        assert!(describe(&started).unwrap().starts_with("Wi-Fi disabled until"));

        let extended = Event::CooldownExtended {
            added_secs: 1200,
            disabled_until: now,
            started: false,
            at: now,
        };
        assert!(describe(&extended).unwrap().starts_with("Cooldown extended by 20 min"));
    }

    #[test]
    fn reply_hint_only_when_toasts_cannot_answer() {
        assert!(reply_hint(false, false).unwrap().contains("ok <next thing>"));
        assert_eq!(reply_hint(false, true), None);
        assert_eq!(reply_hint(true, false), None);
    }

    #[test]
    fn quiet_events_are_not_described() {
        let shown = Event::ReminderShown {
            generation: 1,
            anger: Anger::NEUTRAL,
            text: "Time to Switch!".into(),
            at: Utc::now(),
        };
        assert_eq!(describe(&shown), None);
    }
}
