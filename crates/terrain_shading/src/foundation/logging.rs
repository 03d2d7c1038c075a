//! Logging setup
//!
//! The library only emits through the `log` macros; binaries and tests pick
//! the backend here.

/// Install `env_logger`, honoring `RUST_LOG` and defaulting to `info`
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

/// Install a test-friendly logger that writes through the test harness capture
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Debug).try_init();
}
