// ============================================================
// Layer 6 — Logging
// ============================================================
// Installs the global tracing subscriber once, from options
// main() builds out of the command line. RUST_LOG, when set,
// takes precedence over --log_level.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Filter directive applied to this crate, e.g. "info" or "debug"
    pub level: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl LoggingOptions {
    pub fn new(level: impl Into<String>) -> Self {
        Self { level: level.into() }
    }

    /// Filter used when RUST_LOG is not set: our crate at `level`,
    /// everything else (wgpu, burn internals) at warn.
    pub fn filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(format!("warn,news_textcat={}", self.level))
            .map_err(|e| anyhow!("Invalid log level '{}': {}", self.level, e))
    }

    pub fn init(&self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(self.filter()?)
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow!("Cannot install tracing subscriber: {e}"))
    }
}
