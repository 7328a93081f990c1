//! Tracing and logging (shared setup).

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{init_with, TracingOptions};

/// Initialize process-wide tracing with default options.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    init_with(&TracingOptions::default());
}
