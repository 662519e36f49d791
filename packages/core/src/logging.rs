use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: our own decisions at `info`, the
/// HTTP and TLS stacks only when something goes wrong.
const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,rustls=warn,lettre=warn";

/// Initialize structured logging for the application.
///
/// Call once, before the configuration is loaded, so config errors are
/// logged too. Output goes to stderr; a scheduler capturing the job log
/// sees one line per decision and a closing run summary.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
