use autoinspect_core::FindingZone;

/// User turn sent alongside the image.
pub const USER_PROMPT: &str =
    "Analyze this vehicle photo and provide your inspection findings as JSON.";

/// System prompt asking for a 1-10 condition score and structured findings
/// for one zone of one vehicle.
pub fn system_prompt(zone: FindingZone, vehicle_description: &str) -> String {
    format!(
        r#"You are a professional vehicle inspector for a used-car dealership.

Analyze this photo of the {zone} ({zone_text}) of a {vehicle_description}.

Evaluate and return JSON:
{{
  "score": <1-10 integer, 10 being perfect condition>,
  "findings": [
    {{
      "type": "{types}",
      "severity": "minor|moderate|major",
      "location": "descriptive location within the zone",
      "description": "detailed description of the finding",
      "confidence": <0.0-1.0>
    }}
  ]
}}

Rules:
- Be precise but do not invent damage you cannot clearly see
- If the zone looks perfect, return score 10 with an empty findings array
- Score 8-10: Excellent, like new
- Score 6-7: Good with minor cosmetic issues
- Score 4-5: Fair with visible wear
- Score 1-3: Poor with significant damage
- Only return the JSON object"#,
        zone = zone.as_str(),
        zone_text = zone.describe(),
        types = finding_type_choices(),
    )
}

fn finding_type_choices() -> String {
    autoinspect_core::FindingType::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join("|")
}
