use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count; `RUST_LOG` takes precedence when set.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "modpkg=info",
        1 => "modpkg=debug",
        _ => "modpkg=trace,reqwest=debug",
    }
}

/// Install the global subscriber. Diagnostics go to stderr so stdout stays clean.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
