//! Tracing and logging setup shared by every binary in the workspace.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::LogConfig;

/// Initialize process-wide observability with default settings.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    crate::tracing::init(&LogConfig::default());
}

/// Initialize process-wide observability from explicit settings.
pub fn init_with(config: &LogConfig) {
    crate::tracing::init(config);
}
