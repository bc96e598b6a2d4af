use clap::Args;
use serde::Serialize;
use switchnag_core::{Anger, Config, Mood};

#[derive(Args)]
pub struct PreviewArgs {
    /// Anger level: -1 (punished), 0 (neutral) or a count of ignored reminders
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    anger: i32,
}

#[derive(Serialize)]
struct PreviewOutput {
    anger: Anger,
    mood: Mood,
    text: &'static str,
    duration_secs: u64,
    escalates_next_cycle: bool,
}

pub fn run(args: PreviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let anger = parse_anger(args.anger)?;
    let policy = Config::load()?.policy();
    let presentation = policy.presentation(anger);

    let output = PreviewOutput {
        anger,
        mood: presentation.mood,
        text: presentation.text,
        duration_secs: presentation.duration.as_secs(),
        escalates_next_cycle: policy.should_escalate(anger),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_anger(value: i32) -> Result<Anger, String> {
    match value {
        -1 => Ok(Anger::PUNISHED),
        v if v >= 0 => Ok(Anger::ignored(v.unsigned_abs())),
        v => Err(format!("anger must be -1 or at least 0, got {v}")),
    }
}
