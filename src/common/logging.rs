//! Logging and tracing configuration
//!
//! Step banners and the summary go to stdout through `colored`; everything
//! else is a tracing event on stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a verbosity level
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "hibernate_harness=info,warn",
        1 => "hibernate_harness=debug,info",
        _ => "hibernate_harness=trace,debug",
    }
}

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable when set,
/// otherwise by the number of `-v` flags.
pub fn init_cli(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
