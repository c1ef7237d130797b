//! Score aggregation. Everything here is pure and integer-only.

use autoinspect_core::{InspectionScores, PhotoZone, ScoreCategory};

pub const DEFAULT_EXTERIOR: i32 = 10;
pub const DEFAULT_INTERIOR: i32 = 10;
/// No capture zone feeds the tire bucket, so every run reports this value.
pub const DEFAULT_TIRES: i32 = 8;

/// Integer mean rounded toward zero, or `None` for no scores.
pub fn truncating_mean(scores: &[i32]) -> Option<i32> {
    if scores.is_empty() {
        return None;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    Some((sum / scores.len() as i64) as i32)
}

/// Expected mechanical condition from age and mileage alone, used when no
/// engine photo was scored.
///
/// Starts at 10; age over 5 years costs 2 (over 2 years costs 1); mileage
/// over 100 000 km costs 3 (over 50 000 costs 2, over 20 000 costs 1).
/// Never below 1.
pub fn mechanical_base(model_year: i32, mileage_km: i64, current_year: i32) -> i32 {
    let age = current_year - model_year;
    let mut base = 10;

    base -= match age {
        a if a > 5 => 2,
        a if a > 2 => 1,
        _ => 0,
    };
    base -= match mileage_km {
        m if m > 100_000 => 3,
        m if m > 50_000 => 2,
        m if m > 20_000 => 1,
        _ => 0,
    };

    base.max(1)
}

/// Weighted overall score on 0..=100.
///
/// `round(ext*3.5 + int*3.0 + mech*2.0 + tires*1.5)`, computed in tenths so
/// halves round up exactly.
pub fn overall_score(exterior: i32, interior: i32, mechanical: i32, tires: i32) -> i32 {
    let tenths = ScoreCategory::Exterior.weight_percent() * exterior
        + ScoreCategory::Interior.weight_percent() * interior
        + ScoreCategory::Mechanical.weight_percent() * mechanical
        + ScoreCategory::Tires.weight_percent() * tires;
    ((tenths + 5).div_euclid(10)).min(100)
}

/// Fold per-photo scores into the five inspection scores.
///
/// Observations from zones that feed no category are ignored. Empty
/// categories fall back to their defaults; mechanical falls back to
/// `mechanical_base`.
pub fn aggregate(observations: &[(PhotoZone, i32)], mechanical_base: i32) -> InspectionScores {
    let bucket = |category: ScoreCategory| -> Vec<i32> {
        observations
            .iter()
            .filter(|(zone, _)| zone.score_category() == Some(category))
            .map(|&(_, score)| score)
            .collect()
    };

    let exterior = truncating_mean(&bucket(ScoreCategory::Exterior)).unwrap_or(DEFAULT_EXTERIOR);
    let interior = truncating_mean(&bucket(ScoreCategory::Interior)).unwrap_or(DEFAULT_INTERIOR);
    let mechanical = truncating_mean(&bucket(ScoreCategory::Mechanical)).unwrap_or(mechanical_base);
    let tires = truncating_mean(&bucket(ScoreCategory::Tires)).unwrap_or(DEFAULT_TIRES);

    InspectionScores {
        overall: overall_score(exterior, interior, mechanical, tires),
        exterior,
        interior,
        mechanical,
        tires,
    }
}
