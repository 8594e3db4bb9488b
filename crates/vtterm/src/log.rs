//! Installs a `tracing-subscriber` formatter honoring `RUST_LOG`. The core
//! never calls this itself — a host embedding it decides whether it wants
//! the core's events on stderr or routed elsewhere via its own subscriber —
//! but it is the conventional entry point for a standalone binary built on
//! top of this crate.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `tracing` subscriber reading its level from `RUST_LOG`
/// (defaulting to `warn`). Returns an error if a subscriber was already
/// installed.
pub fn init() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
}
