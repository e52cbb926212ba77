//! Test utilities for the Murmur Room Controller.
//!
//! Provides a scriptable mock RTC backend and one-time tracing setup shared
//! across the controller's integration tests.

pub mod mock_backend;

pub use mock_backend::{
    IssuedCall, MockBackendHandle, MockBehavior, MockRtcBackend, MockRtcBackendBuilder,
};

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a compact tracing subscriber for test output.
///
/// Safe to call from every test; only the first call installs. Honors
/// `RUST_LOG` when set.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "room_controller=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}
