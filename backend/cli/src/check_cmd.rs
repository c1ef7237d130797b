//! `autoinspect check-config`: print the effective config and its problems.

use std::path::Path;

use anyhow::Result;

use autoinspect_config::{
    collect_referenced_vars, load_raw, redacted_snapshot, validate, AutoInspectConfig,
    ValidationReport,
};

/// Returns `true` when the config has no errors.
pub async fn run(path: &Path, config: &AutoInspectConfig) -> Result<bool> {
    println!("\nChecking AutoInspect config...\n");
    println!("Config file: {}", path.display());
    if !path.exists() {
        println!("  (not found, using defaults)");
    }

    let raw = load_raw(path).await?;
    let vars = collect_referenced_vars(&raw);
    if !vars.is_empty() {
        println!("\nEnvironment variables:");
        for var in &vars {
            match std::env::var(var) {
                Ok(val) if !val.is_empty() => println!("  [set]     {var}"),
                _ => println!("  [missing] {var}"),
            }
        }
    }

    println!("\nEffective config:");
    println!("{}", serde_json::to_string_pretty(&redacted_snapshot(config)?)?);

    let report = validate(config);
    print_report(&report);
    Ok(report.is_valid())
}

fn print_report(report: &ValidationReport) {
    println!();
    for warning in &report.warnings {
        println!("  warning: {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("  error:   {}: {}", error.path, error.message);
    }
    if report.is_valid() {
        println!("Config OK.");
    } else {
        println!("{} error(s) found. Please fix the config above.", report.errors.len());
    }
}
