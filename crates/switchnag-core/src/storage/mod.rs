mod config;

pub use config::{
    Config, CooldownConfig, DurationsConfig, NetworkConfig, NotificationsConfig, ReminderConfig,
};

use std::path::PathBuf;

/// Returns the config directory, creating it if needed.
///
/// Resolution order:
/// - `SWITCHNAG_HOME` if set
/// - `~/.config/switchnag-dev/` when `SWITCHNAG_ENV=dev`
/// - `~/.config/switchnag/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("SWITCHNAG_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SWITCHNAG_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("switchnag-dev")
            } else {
                base_dir.join("switchnag")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
