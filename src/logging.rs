use std::env;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging to stderr so stdout only carries the report.
///
/// `RUST_LOG`, when it names a level, takes precedence over `-v`.
pub fn init(verbosity: u8) {
    let level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| level_for(verbosity));

    // A subscriber may already be installed (tests)
    let _ = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Map the `-v` count to a level
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}
