//! Log Redaction
//!
//! Scrubs API keys and bearer tokens from strings before they are logged or
//! returned in error messages, e.g. error bodies echoed by a vision provider.

use std::sync::LazyLock;

use regex::Regex;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{16,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)")
        .expect("API key pattern is valid")
});

static KEY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)("?(?:api_?key|authorization)"?\s*[:=]\s*"?)[^"\s,}]+"#)
        .expect("key field pattern is valid")
});

/// Redacts credentials in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    KEY_FIELD_RE
        .replace_all(&redacted, "${1}[REDACTED]")
        .into_owned()
}
