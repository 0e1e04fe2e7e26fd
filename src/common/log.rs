//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; hosts that want them printed call
//! [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::common::config::EvalCfg;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to `cfg.log_level`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(cfg: &EvalCfg) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
