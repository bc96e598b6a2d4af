//! tracing-subscriber setup.
//!
//! `SWITCHNAG_LOG` takes an `EnvFilter` directive and wins over `-v`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SWITCHNAG_LOG";

pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // Logs go to stderr so stdout stays machine-readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
