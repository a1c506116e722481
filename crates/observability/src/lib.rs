//! Tracing/logging setup shared by binaries and integration tests.

/// Tracing configuration (filters, formatting).
pub mod tracing;

pub use self::tracing::{LOG_ENV, init, init_for_tests};
