//! Telemetry and observability
//!
//! Structured logging built on the tracing stack.

pub mod logging;

pub use logging::{init_logging, init_logging_default, LogConfig, LogGuard};
