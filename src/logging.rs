use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Overrides the verbosity flags when set, e.g. `SCOUT_LOG=scout=trace`.
pub const LOG_ENV: &str = "SCOUT_LOG";

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,Scout=info",
        1 => "info,Scout=debug",
        _ => "debug,Scout=trace",
    }
}

/// Installs the global subscriber. Logs go to stderr so headless output
/// on stdout stays clean.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // Ignore a subscriber that is already set
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
