//! Pipeline Event Logger
//!
//! One structured record per pipeline stage (describe, reason, fallback, completion),
//! emitted on the `pipeline_events` tracing target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Described {
        service: String,
        chars: usize,
        elapsed_ms: u64,
    },
    Reasoned {
        service: String,
        chars: usize,
        elapsed_ms: u64,
    },
    Fallback {
        stage: String,
        reason: String,
    },
    Completed {
        country: String,
        confidence: u8,
        elapsed_ms: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct PipelineEventEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct PipelineEventLogger;

impl PipelineEventLogger {
    /// Log a pipeline event; free-text reasons are redacted first.
    pub fn log_event(request_id: &str, mut event: PipelineEvent) {
        if let PipelineEvent::Fallback { reason, .. } = &mut event {
            *reason = redact_sensitive_data(reason);
        }

        let entry = PipelineEventEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "pipeline_events", event = %json, "Pipeline event");
    }
}
