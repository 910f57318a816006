//! Log Redaction Layer
//!
//! Scrubs API keys and bearer tokens from strings prior to logging. Upstream
//! error bodies sometimes echo the request headers back.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(hf_[a-zA-Z0-9]{16,})|(nvapi-[a-zA-Z0-9\-_]{16,})|(sk-[a-zA-Z0-9]{32,})")
        .expect("static regex")
});
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").expect("static regex"));

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "Bearer [REDACTED_TOKEN]");
    API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string()
}
