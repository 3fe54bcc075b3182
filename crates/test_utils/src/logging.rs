//! Tracing initialization for tests
//!
//! Call [`init_test_tracing`] at the top of a test to see the engine's
//! tracing events. Initialization happens once per process; repeated calls
//! are no-ops.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static INIT: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Initializes a test tracing subscriber honoring `RUST_LOG`
pub fn init_test_tracing() {
    Lazy::force(&INIT);
}
