//! Environment variable substitution for config values.
//!
//! String values may reference `${VAR}` or `${VAR:-fallback}`. Only uppercase
//! `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` yields a literal `${VAR}`.
//! A string that is exactly one reference and resolves to a number or boolean
//! becomes that scalar, so `port: ${PORT:-8080}` still parses as a port.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

/// `$` + optional escaping `$` + `{NAME}` or `{NAME:-fallback}`.
static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(\$?)\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("valid env reference regex")
});

/// A referenced variable that is unset or empty and has no fallback.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute references throughout a config value tree using the process
/// environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute references using the given variables.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => {
            let substituted = substitute_string(s, env, path)?;
            if is_single_reference(s) {
                Ok(coerce_scalar(substituted))
            } else {
                Ok(Value::String(substituted))
            }
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let out = REFERENCE.replace_all(s, |caps: &Captures| {
        let whole = &caps[0];
        if !caps[1].is_empty() {
            return whole[1..].to_string();
        }
        let name = &caps[2];
        match (env.get(name).filter(|v| !v.is_empty()), caps.get(3)) {
            (Some(v), _) => v.clone(),
            (None, Some(fallback)) => fallback.as_str().to_string(),
            (None, None) => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(out.into_owned())
}

fn is_single_reference(s: &str) -> bool {
    REFERENCE
        .captures(s)
        .map(|caps| caps[1].is_empty() && caps[0].len() == s.len())
        .unwrap_or(false)
}

fn coerce_scalar(s: String) -> Value {
    match serde_json::from_str::<Value>(&s) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(s),
    }
}

/// Variable names referenced anywhere in the tree, sorted and deduplicated.
/// Escaped references are not counted.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            REFERENCE
                .captures_iter(s)
                .filter(|caps| caps[1].is_empty())
                .map(|caps| caps[2].to_string()),
        ),
        Value::Array(items) => items.iter().for_each(|v| collect_vars(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars(v, out)),
        _ => {}
    }
}
