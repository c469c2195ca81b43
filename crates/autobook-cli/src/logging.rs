use tracing_subscriber::EnvFilter;

const CRATES: &[&str] = &[
    "autobook",
    "autobook_cli",
    "autobook_core",
    "autobook_browser",
    "autobook_session",
];

/// Filter directives giving our crates `level` and everything else warnings
pub fn directives(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(CRATES.iter().map(|name| format!("{}={}", name, level)));
    directives.join(",")
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`, which wins over `LOG_LEVEL`.
pub fn init_logging(verbose: bool, log_level: &str) {
    let level = if verbose { "debug" } else { log_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
