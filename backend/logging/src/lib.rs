//! Structured logging for geoclass.
//!
//! Console + rolling NDJSON output, secret redaction, and per-stage pipeline events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{PipelineEvent, PipelineEventEntry, PipelineEventLogger};
pub use logger::{init_logger, LoggerGuard};
pub use redact::redact_sensitive_data;
