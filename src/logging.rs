//! Leveled logging sink: §6 of `SPEC_FULL.md`.
//!
//! Grounded on `examples/original_source/include_public/log.h`'s level enum
//! and stdout/stderr split, rebuilt on `tracing`/`tracing-subscriber` rather
//! than the source's hand-rolled `LOG` macro.

use tracing::Level;
use tracing_subscriber::filter::{filter_fn, FilterExt, LevelFilter};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Installs the global subscriber: DEBUG/INFO to stdout, WARN/ERROR to
/// stderr, mirroring the source's leveled sink split. `verbose` lowers the
/// threshold from INFO to DEBUG.
pub fn init(verbose: bool) {
    let threshold = if verbose { Level::DEBUG } else { Level::INFO };
    let env_filter = || {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(threshold).into())
            .from_env_lossy()
    };

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::NONE)
        .with_target(false)
        .with_writer(std::io::stdout)
        .with_filter(env_filter().and(filter_fn(|metadata| metadata.level() >= &Level::INFO)));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::NONE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter().and(filter_fn(|metadata| metadata.level() <= &Level::WARN)));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(stderr_layer)
        .init();
}
