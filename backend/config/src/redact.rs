//! Config redaction: produce safe-to-share config snapshots by masking secrets.

use serde_json::Value;

/// Keys whose string values are secrets.
static SECRET_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "token",
    "accessToken",
    "access_token",
    "secret",
    "password",
];

/// Redact a config JSON value, replacing every secret with a short hint
/// followed by `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Keep a prefix such as `hf_` or `nvapi-` visible; it tells which key is loaded.
fn mask(s: &str) -> String {
    let hint: String = s.chars().take(4).collect();
    if s.chars().count() > 8 {
        format!("{hint}***")
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_api_keys() {
        let v = json!({
            "description": { "apiKey": "hf_abcdefghijklmnop" },
            "reasoning": { "apiKey": "nvapi-secretsecret" }
        });
        let redacted = redact(&v);
        assert_eq!(redacted["description"]["apiKey"], "hf_a***");
        assert_eq!(redacted["reasoning"]["apiKey"], "nvap***");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let redacted = redact(&json!({ "apiKey": "abc" }));
        assert_eq!(redacted["apiKey"], "***");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "logging": { "level": "debug" }, "server": { "port": 8000 } });
        assert_eq!(redact(&v), v);
    }
}
