//! Turning a provider's JSON reply into a [`PhotoAnalysis`].

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use autoinspect_core::{DetectedFinding, FindingType, PhotoAnalysis, Severity};

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    score: f64,
    #[serde(default)]
    findings: Vec<RawFinding>,
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    #[serde(rename = "type")]
    kind: String,
    severity: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    confidence: f64,
}

/// Pull the JSON object out of a reply that may be wrapped in a code fence
/// or surrounded by prose.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let text = text.trim();
    if let Some(start) = text.find("```") {
        let after_fence = &text[start + 3..];
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            return Some(body[..end].trim());
        }
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Parse a provider reply.
///
/// The score is rounded and clamped to 1..=10 and confidences to [0, 1].
/// Findings with a type or severity outside the closed sets are dropped.
pub fn parse_analysis(content: &str) -> Result<PhotoAnalysis> {
    let json = extract_json_object(content).context("No JSON object in vision response")?;
    let raw: RawAnalysis =
        serde_json::from_str(json).context("Failed to parse vision response JSON")?;

    let score = if raw.score.is_finite() {
        (raw.score.round() as i32).clamp(1, 10)
    } else {
        1
    };

    let findings = raw
        .findings
        .into_iter()
        .filter_map(|f| {
            let finding_type = match f.kind.trim().to_lowercase().parse::<FindingType>() {
                Ok(t) => t,
                Err(_) => {
                    warn!(finding_type = %f.kind, "Dropping finding with unknown type");
                    return None;
                }
            };
            let severity = match f.severity.trim().to_lowercase().parse::<Severity>() {
                Ok(s) => s,
                Err(_) => {
                    warn!(severity = %f.severity, "Dropping finding with unknown severity");
                    return None;
                }
            };
            let confidence = if f.confidence.is_finite() {
                f.confidence.clamp(0.0, 1.0)
            } else {
                0.0
            };
            Some(DetectedFinding {
                finding_type,
                severity,
                location: f.location.trim().to_string(),
                description: f.description.trim().to_string(),
                confidence,
            })
        })
        .collect();

    Ok(PhotoAnalysis { score, findings })
}
