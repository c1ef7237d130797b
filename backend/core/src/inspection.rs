use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InspectError;
use crate::vehicle::{Vehicle, VehicleEquipment, VehicleSpecs};
use crate::zones::{FindingZone, PhotoZone};

/// Lifecycle of an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Approved,
}

impl InspectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InspectionStatus::Pending => "pending",
            InspectionStatus::Processing => "processing",
            InspectionStatus::Completed => "completed",
            InspectionStatus::Approved => "approved",
        }
    }

    /// Allowed lifecycle moves. A run left in `processing` or a completed
    /// inspection may be re-run; approval is final.
    pub fn can_transition_to(self, next: InspectionStatus) -> bool {
        use InspectionStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Processing)
                | (Processing, Completed)
                | (Completed, Processing)
                | (Completed, Approved)
        )
    }
}

/// One inspection of a vehicle. Scores stay `None` until a run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inspection {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub inspector_name: Option<String>,
    pub inspector_branch: Option<String>,
    pub score_overall: Option<i32>,
    pub score_exterior: Option<i32>,
    pub score_interior: Option<i32>,
    pub score_mechanical: Option<i32>,
    pub score_tires: Option<i32>,
    pub photos_count: i32,
    pub findings_count: i32,
    pub status: InspectionStatus,
    pub report_path: Option<String>,
    pub inspected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Inspection {
    pub fn new(vehicle_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            inspector_name: None,
            inspector_branch: None,
            score_overall: None,
            score_exterior: None,
            score_interior: None,
            score_mechanical: None,
            score_tires: None,
            photos_count: 0,
            findings_count: 0,
            status: InspectionStatus::Pending,
            report_path: None,
            inspected_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_inspector(mut self, name: Option<String>, branch: Option<String>) -> Self {
        self.inspector_name = name.filter(|s| !s.is_empty());
        self.inspector_branch = branch.filter(|s| !s.is_empty());
        self
    }

    pub fn apply_scores(&mut self, scores: &InspectionScores) {
        self.score_overall = Some(scores.overall);
        self.score_exterior = Some(scores.exterior);
        self.score_interior = Some(scores.interior);
        self.score_mechanical = Some(scores.mechanical);
        self.score_tires = Some(scores.tires);
    }
}

/// The five scores produced by one inspection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionScores {
    pub overall: i32,
    pub exterior: i32,
    pub interior: i32,
    pub mechanical: i32,
    pub tires: i32,
}

/// A photo uploaded for an inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionPhoto {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub photo_path: String,
    pub zone: PhotoZone,
    pub sort_order: i32,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    Scratch,
    Dent,
    Rust,
    PaintMismatch,
    Wear,
    Crack,
    Stain,
    MissingPart,
}

impl FindingType {
    pub const ALL: [FindingType; 8] = [
        FindingType::Scratch,
        FindingType::Dent,
        FindingType::Rust,
        FindingType::PaintMismatch,
        FindingType::Wear,
        FindingType::Crack,
        FindingType::Stain,
        FindingType::MissingPart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FindingType::Scratch => "scratch",
            FindingType::Dent => "dent",
            FindingType::Rust => "rust",
            FindingType::PaintMismatch => "paint_mismatch",
            FindingType::Wear => "wear",
            FindingType::Crack => "crack",
            FindingType::Stain => "stain",
            FindingType::MissingPart => "missing_part",
        }
    }
}

/// Finding severity; ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Minor, Severity::Moderate, Severity::Major];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Major => "major",
        }
    }
}

/// A defect or condition observation tied to a report zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionFinding {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub photo_path: Option<String>,
    pub zone: FindingZone,
    pub finding_type: FindingType,
    pub severity: Severity,
    pub description: Option<String>,
    pub ai_confidence: Option<f64>,
    #[serde(default)]
    pub confirmed_by_human: bool,
}

impl InspectionFinding {
    /// Read order: most severe first, then by zone.
    pub fn read_order(a: &InspectionFinding, b: &InspectionFinding) -> Ordering {
        b.severity.cmp(&a.severity).then(a.zone.cmp(&b.zone))
    }
}

/// Reviewer edit of a finding; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingPatch {
    pub zone: Option<FindingZone>,
    pub finding_type: Option<FindingType>,
    pub severity: Option<Severity>,
    pub description: Option<String>,
    pub confirmed_by_human: Option<bool>,
}

impl FindingPatch {
    pub fn is_empty(&self) -> bool {
        self.zone.is_none()
            && self.finding_type.is_none()
            && self.severity.is_none()
            && self.description.is_none()
            && self.confirmed_by_human.is_none()
    }

    pub fn apply(self, finding: &mut InspectionFinding) {
        if let Some(zone) = self.zone {
            finding.zone = zone;
        }
        if let Some(kind) = self.finding_type {
            finding.finding_type = kind;
        }
        if let Some(severity) = self.severity {
            finding.severity = severity;
        }
        if let Some(description) = self.description {
            finding.description = Some(description);
        }
        if let Some(confirmed) = self.confirmed_by_human {
            finding.confirmed_by_human = confirmed;
        }
    }
}

/// An inspection together with its findings and photos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionView {
    pub inspection: Inspection,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<InspectionFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<InspectionPhoto>,
}

/// Everything known about a vehicle, as shown before publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclePreview {
    pub vehicle: Vehicle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<VehicleSpecs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equipment: Vec<VehicleEquipment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection: Option<InspectionView>,
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspectionStatus {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            InspectionStatus::Pending,
            InspectionStatus::Processing,
            InspectionStatus::Completed,
            InspectionStatus::Approved,
        ]
        .into_iter()
        .find(|v| v.as_str() == s)
        .ok_or_else(|| InspectError::Validation(format!("unknown inspection status '{s}'")))
    }
}

impl FromStr for FindingType {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FindingType::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| InspectError::Validation(format!("unknown finding type '{s}'")))
    }
}

impl FromStr for Severity {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| InspectError::Validation(format!("unknown severity '{s}'")))
    }
}
