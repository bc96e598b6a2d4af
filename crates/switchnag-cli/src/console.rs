//! Console front end: stdin commands stand in for the tray menu and for
//! answering reminders.

use std::io::Write;

use switchnag_core::{Activation, ActivationCallback, MenuCommand, Notifier, NotifyError, Reminder, ReplySlot};

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Menu(MenuCommand),
    Reply(Activation),
    Help,
    Empty,
    Unknown(String),
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "exit" | "quit" | "q" | "1" => Self::Menu(MenuCommand::Exit),
            "+" | "2" => Self::Menu(MenuCommand::DisableShort),
            "++" | "3" => Self::Menu(MenuCommand::DisableLong),
            "status" | "s" => Self::Menu(MenuCommand::Status),
            "help" | "?" => Self::Help,
            "ok" => Self::Reply(Activation::submit(rest)),
            "dismiss" | "no" => Self::Reply(Activation::dismissed()),
            _ => Self::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
commands:
  ok <next thing>   answer the current reminder
  dismiss           dismiss the current reminder
  status, s         show cooldown and anger
  +                 disable Wi-Fi for the short period
  ++                disable Wi-Fi for the long period
  exit, q           quit";

/// Prints reminders to stdout; the answer comes back through the shared
/// [`ReplySlot`] when the user types `ok ...` or `dismiss`.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    replies: ReplySlot,
}

impl ConsoleNotifier {
    pub fn new(replies: ReplySlot) -> Self {
        Self { replies }
    }
}

impl Notifier for ConsoleNotifier {
    fn show(&self, reminder: &Reminder, on_activated: ActivationCallback) -> Result<(), NotifyError> {
        if self.replies.arm(reminder.generation, on_activated) {
            tracing::debug!(generation = reminder.generation, "previous reminder went unanswered");
        }

        print_reminder(&mut std::io::stdout().lock(), reminder)
            .map_err(|e| NotifyError::ShowFailed(e.to_string()))
    }
}

fn print_reminder(out: &mut impl Write, reminder: &Reminder) -> std::io::Result<()> {
    writeln!(out, "\n>> {}", reminder.text)?;
    writeln!(out, "   Next thing? (ok <thing> / dismiss)")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use switchnag_core::escalation::{Mood, NEUTRAL_TEXT};

    #[test]
    fn parses_menu_commands() {
        assert_eq!(ConsoleInput::parse("exit"), ConsoleInput::Menu(MenuCommand::Exit));
        assert_eq!(ConsoleInput::parse(" Q "), ConsoleInput::Menu(MenuCommand::Exit));
        assert_eq!(ConsoleInput::parse("+"), ConsoleInput::Menu(MenuCommand::DisableShort));
        assert_eq!(ConsoleInput::parse("++"), ConsoleInput::Menu(MenuCommand::DisableLong));
        assert_eq!(ConsoleInput::parse("3"), ConsoleInput::Menu(MenuCommand::DisableLong));
        assert_eq!(ConsoleInput::parse("status"), ConsoleInput::Menu(MenuCommand::Status));
    }

    #[test]
    fn parses_replies() {
        assert_eq!(
            ConsoleInput::parse("ok  answer email "),
            ConsoleInput::Reply(Activation::submit("answer email"))
        );
        assert_eq!(ConsoleInput::parse("ok"), ConsoleInput::Reply(Activation::submit("")));
        assert_eq!(ConsoleInput::parse("dismiss"), ConsoleInput::Reply(Activation::dismissed()));
    }

    #[test]
    fn parses_everything_else() {
        assert_eq!(ConsoleInput::parse("   "), ConsoleInput::Empty);
        assert_eq!(ConsoleInput::parse("?"), ConsoleInput::Help);
        assert_eq!(ConsoleInput::parse("lunch"), ConsoleInput::Unknown("lunch".into()));
    }

    #[test]
    fn show_arms_the_reply_slot() {
        let replies = ReplySlot::new();
        let notifier = ConsoleNotifier::new(replies.clone());
        let (tx, rx) = mpsc::channel();
        let reminder = Reminder {
            generation: 7,
            mood: Mood::Neutral,
            text: NEUTRAL_TEXT.to_string(),
            duration: Duration::ZERO,
        };

        notifier
            .show(&reminder, Box::new(move |activation: Activation| tx.send(activation).unwrap()))
            .unwrap();
        assert_eq!(replies.pending_generation(), Some(7));

        assert!(replies.deliver(Activation::submit("tests")));
        assert_eq!(rx.recv().unwrap(), Activation::submit("tests"));
    }
}
