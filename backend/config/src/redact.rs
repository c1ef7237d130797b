//! Config redaction: a secrets-free snapshot of the effective config for
//! logs and `check-config` output.

use serde_json::Value;

/// Keys whose string values are masked, compared case-insensitively.
static SECRET_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "authorization",
    "token",
    "secret",
    "password",
];

/// Replace every secret string in the tree with its first four characters
/// followed by `***`. Values of four characters or fewer become `***`.
pub fn redact(value: &Value) -> Value {
    redact_under(value, "")
}

fn is_secret_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    if s.chars().count() > 4 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_under(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_secret_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_under(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_under(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Dotted paths of every masked value.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(value, "", &mut paths);
    paths
}

fn collect_paths(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_secret_key(key) {
                out.push(path.to_string());
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths(v, &child, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_api_key() {
        let v = json!({"vision": {"apiKey": "sk-abcdef123456", "model": "gpt-4o"}});
        let redacted = redact(&v);
        assert_eq!(redacted["vision"]["apiKey"], "sk-a***");
        assert_eq!(redacted["vision"]["model"], "gpt-4o");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let redacted = redact(&json!({"token": "abc"}));
        assert_eq!(redacted["token"], "***");
    }

    #[test]
    fn numbers_and_empty_strings_untouched() {
        let v = json!({"server": {"port": 8080}, "vision": {"apiKey": ""}});
        assert_eq!(redact(&v), v);
    }

    #[test]
    fn reports_redacted_paths() {
        let v = json!({"vision": {"apiKey": "sk-abcdef123456"}, "logging": {"level": "info"}});
        assert_eq!(collect_redacted_paths(&v), vec!["vision.apiKey".to_string()]);
    }
}
