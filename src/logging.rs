//! Diagnostic side channel.
//!
//! The protocol owns stdout, so every human-readable line goes to stderr,
//! and only when diagnostics were asked for. Without the debug flag the
//! subscriber filters everything out; with it, `RUST_LOG` is honored and
//! falls back to debug-level output for this crate.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolforge=debug"))
    } else {
        EnvFilter::new("off")
    };

    // ANSI escapes are disabled so a supervising process can parse stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
