//! Tracing setup for the binary.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATE_TARGET: &str = "fxconv";

/// Dependencies only report errors; the crate itself follows `--verbose`.
fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    format!("error,{CRATE_TARGET}={level}")
}

fn build_filter(from_env: Option<&str>, verbose: bool) -> EnvFilter {
    from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbose)))
}

/// Installs a stderr subscriber. `RUST_LOG`, when set and valid, wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(from_env.as_deref(), verbose);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_target(verbose)
                .with_writer(std::io::stderr),
        )
        .init();
}
