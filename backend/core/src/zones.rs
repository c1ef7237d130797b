//! Vehicle zones at two granularities and the fixed tables between them.
//!
//! Photos are captured per [`PhotoZone`]; findings are reported per the
//! coarser [`FindingZone`]. Scores are aggregated per [`ScoreCategory`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InspectError;

/// Capture zone of an uploaded inspection photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoZone {
    Front,
    Rear,
    Left,
    Right,
    FrontLeft,
    RearRight,
    InteriorDriver,
    InteriorPassenger,
    InteriorRear,
    Dashboard,
    Infotainment,
    Engine,
    Trunk,
    Closeup,
}

impl PhotoZone {
    pub const ALL: [PhotoZone; 14] = [
        PhotoZone::Front,
        PhotoZone::Rear,
        PhotoZone::Left,
        PhotoZone::Right,
        PhotoZone::FrontLeft,
        PhotoZone::RearRight,
        PhotoZone::InteriorDriver,
        PhotoZone::InteriorPassenger,
        PhotoZone::InteriorRear,
        PhotoZone::Dashboard,
        PhotoZone::Infotainment,
        PhotoZone::Engine,
        PhotoZone::Trunk,
        PhotoZone::Closeup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PhotoZone::Front => "front",
            PhotoZone::Rear => "rear",
            PhotoZone::Left => "left",
            PhotoZone::Right => "right",
            PhotoZone::FrontLeft => "front_left",
            PhotoZone::RearRight => "rear_right",
            PhotoZone::InteriorDriver => "interior_driver",
            PhotoZone::InteriorPassenger => "interior_passenger",
            PhotoZone::InteriorRear => "interior_rear",
            PhotoZone::Dashboard => "dashboard",
            PhotoZone::Infotainment => "infotainment",
            PhotoZone::Engine => "engine",
            PhotoZone::Trunk => "trunk",
            PhotoZone::Closeup => "closeup",
        }
    }

    /// The report zone a photo's findings are filed under.
    pub fn finding_zone(self) -> FindingZone {
        match self {
            PhotoZone::Front | PhotoZone::FrontLeft | PhotoZone::Closeup => FindingZone::Front,
            PhotoZone::Rear | PhotoZone::RearRight => FindingZone::Rear,
            PhotoZone::Left => FindingZone::Left,
            PhotoZone::Right => FindingZone::Right,
            PhotoZone::InteriorDriver | PhotoZone::Dashboard | PhotoZone::Infotainment => {
                FindingZone::InteriorFront
            }
            PhotoZone::InteriorPassenger | PhotoZone::InteriorRear => FindingZone::InteriorRear,
            PhotoZone::Engine => FindingZone::Engine,
            PhotoZone::Trunk => FindingZone::Trunk,
        }
    }

    /// The score bucket a photo's score contributes to, if any.
    ///
    /// No capture zone feeds [`ScoreCategory::Tires`]; trunk and close-up
    /// shots only contribute findings.
    pub fn score_category(self) -> Option<ScoreCategory> {
        match self {
            PhotoZone::Front
            | PhotoZone::Rear
            | PhotoZone::Left
            | PhotoZone::Right
            | PhotoZone::FrontLeft
            | PhotoZone::RearRight => Some(ScoreCategory::Exterior),
            PhotoZone::InteriorDriver
            | PhotoZone::InteriorPassenger
            | PhotoZone::InteriorRear
            | PhotoZone::Dashboard
            | PhotoZone::Infotainment => Some(ScoreCategory::Interior),
            PhotoZone::Engine => Some(ScoreCategory::Mechanical),
            PhotoZone::Trunk | PhotoZone::Closeup => None,
        }
    }
}

/// Coarse zone findings are reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingZone {
    Front,
    Rear,
    Left,
    Right,
    Roof,
    InteriorFront,
    InteriorRear,
    Engine,
    Trunk,
    Tires,
}

impl FindingZone {
    pub const ALL: [FindingZone; 10] = [
        FindingZone::Front,
        FindingZone::Rear,
        FindingZone::Left,
        FindingZone::Right,
        FindingZone::Roof,
        FindingZone::InteriorFront,
        FindingZone::InteriorRear,
        FindingZone::Engine,
        FindingZone::Trunk,
        FindingZone::Tires,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FindingZone::Front => "front",
            FindingZone::Rear => "rear",
            FindingZone::Left => "left",
            FindingZone::Right => "right",
            FindingZone::Roof => "roof",
            FindingZone::InteriorFront => "interior_front",
            FindingZone::InteriorRear => "interior_rear",
            FindingZone::Engine => "engine",
            FindingZone::Trunk => "trunk",
            FindingZone::Tires => "tires",
        }
    }

    /// Human-readable zone name used in prompts.
    pub fn describe(self) -> &'static str {
        match self {
            FindingZone::Front => "front",
            FindingZone::Rear => "rear",
            FindingZone::Left => "left side",
            FindingZone::Right => "right side",
            FindingZone::Roof => "roof",
            FindingZone::InteriorFront => "front interior",
            FindingZone::InteriorRear => "rear interior",
            FindingZone::Engine => "engine bay",
            FindingZone::Trunk => "trunk",
            FindingZone::Tires => "tires and wheels",
        }
    }
}

/// One of the four category scores of an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Exterior,
    Interior,
    Mechanical,
    Tires,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 4] = [
        ScoreCategory::Exterior,
        ScoreCategory::Interior,
        ScoreCategory::Mechanical,
        ScoreCategory::Tires,
    ];

    /// Weight of this category in the overall score, in percent.
    pub fn weight_percent(self) -> i32 {
        match self {
            ScoreCategory::Exterior => 35,
            ScoreCategory::Interior => 30,
            ScoreCategory::Mechanical => 20,
            ScoreCategory::Tires => 15,
        }
    }
}

impl fmt::Display for PhotoZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FindingZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoZone {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhotoZone::ALL
            .iter()
            .copied()
            .find(|z| z.as_str() == s)
            .ok_or_else(|| InspectError::Validation(format!("unknown photo zone '{s}'")))
    }
}

impl FromStr for FindingZone {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FindingZone::ALL
            .iter()
            .copied()
            .find(|z| z.as_str() == s)
            .ok_or_else(|| InspectError::Validation(format!("unknown finding zone '{s}'")))
    }
}
