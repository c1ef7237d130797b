//! Structured logging for AutoInspect.
//!
//! Console output plus an optional daily-rolling JSON file, and redaction of
//! credentials from strings that may end up in logs.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
