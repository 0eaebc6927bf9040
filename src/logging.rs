use tracing_subscriber::EnvFilter;

/// Installs the `RUST_LOG`-driven fmt subscriber on stderr. Defaults to
/// `info` when `RUST_LOG` is unset. Calling it twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
