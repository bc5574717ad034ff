//! Panic handling, diagnostic rendering, and logging setup shared by both
//! binaries.

use human_panic::{setup_panic, Metadata};
use tracing_subscriber::EnvFilter;

/// Install a human-readable panic hook and a `miette` diagnostic renderer.
/// Call once, before doing anything else in `main`.
pub fn install(name: &str, version: &str) {
    setup_panic!(
        Metadata::new(name, version)
            .support("Please open an issue with the command you ran and the output above.")
    );

    let _ = miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().break_words(false).tab_width(2).build())
    }));
}

/// Initialize `tracing`, honoring `RUST_LOG` if set and otherwise falling
/// back to a level derived from `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).without_time().with_target(false).try_init();
}
