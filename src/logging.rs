use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wires up the global tracing subscriber: human-readable output on stdout
/// plus JSON lines in `logs/`, rotated daily. Call once, before anything
/// emits a span.
pub fn init_logging() {
    // rolling::daily fails at write time if the directory is absent
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "retail_etl.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // this crate at info, plus whatever RUST_LOG asks for
    let filter = EnvFilter::from_default_env().add_directive("retail_etl=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    // The worker guard flushes the file writer when dropped; the subscriber
    // lives for the whole process, so leak it rather than hold it somewhere.
    std::mem::forget(guard);
}
