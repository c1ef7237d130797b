use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InspectError;

/// Publication state of a vehicle in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[default]
    Draft,
    Review,
    Published,
}

impl VehicleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleStatus::Draft => "draft",
            VehicleStatus::Review => "review",
            VehicleStatus::Published => "published",
        }
    }
}

/// A catalogued vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate: Option<String>,
    pub brand: String,
    pub model: String,
    pub version: Option<String>,
    pub trim: Option<String>,
    pub year: i32,
    pub mileage_km: i64,
    pub color_exterior: Option<String>,
    pub color_interior: Option<String>,
    pub price_usd: Option<f64>,
    pub branch: Option<String>,
    pub origin: Option<String>,
    #[serde(default)]
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(
        brand: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        mileage_km: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            plate: None,
            brand: brand.into(),
            model: model.into(),
            version: None,
            trim: None,
            year,
            mileage_km,
            color_exterior: None,
            color_interior: None,
            price_usd: None,
            branch: None,
            origin: None,
            status: VehicleStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// "Brand Model [Version] Year", as handed to the image-analysis provider.
    pub fn description(&self) -> String {
        match self.version.as_deref().filter(|v| !v.is_empty()) {
            Some(version) => format!("{} {} {} {}", self.brand, self.model, version, self.year),
            None => format!("{} {} {}", self.brand, self.model, self.year),
        }
    }
}

/// Partial update of a vehicle; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehiclePatch {
    pub plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub version: Option<String>,
    pub trim: Option<String>,
    pub year: Option<i32>,
    pub mileage_km: Option<i64>,
    pub color_exterior: Option<String>,
    pub color_interior: Option<String>,
    pub price_usd: Option<f64>,
    pub branch: Option<String>,
    pub origin: Option<String>,
    pub status: Option<VehicleStatus>,
}

impl VehiclePatch {
    pub fn apply(self, vehicle: &mut Vehicle) {
        if let Some(v) = self.plate {
            vehicle.plate = Some(v);
        }
        if let Some(v) = self.brand {
            vehicle.brand = v;
        }
        if let Some(v) = self.model {
            vehicle.model = v;
        }
        if let Some(v) = self.version {
            vehicle.version = Some(v);
        }
        if let Some(v) = self.trim {
            vehicle.trim = Some(v);
        }
        if let Some(v) = self.year {
            vehicle.year = v;
        }
        if let Some(v) = self.mileage_km {
            vehicle.mileage_km = v;
        }
        if let Some(v) = self.color_exterior {
            vehicle.color_exterior = Some(v);
        }
        if let Some(v) = self.color_interior {
            vehicle.color_interior = Some(v);
        }
        if let Some(v) = self.price_usd {
            vehicle.price_usd = Some(v);
        }
        if let Some(v) = self.branch {
            vehicle.branch = Some(v);
        }
        if let Some(v) = self.origin {
            vehicle.origin = Some(v);
        }
        if let Some(v) = self.status {
            vehicle.status = v;
        }
    }
}

/// Technical data sheet of a vehicle. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpecs {
    #[serde(default)]
    pub vehicle_id: Uuid,

    pub engine_type: Option<String>,
    pub engine_cc: Option<i32>,
    pub engine_cylinders: Option<i32>,
    pub power_hp: Option<f64>,
    pub power_kw: Option<f64>,
    pub torque_nm: Option<i32>,
    pub torque_rpm_range: Option<String>,
    pub fuel_type: Option<String>,
    pub fuel_system: Option<String>,

    pub transmission_type: Option<String>,
    pub transmission_gears: Option<i32>,
    pub drivetrain: Option<String>,

    pub accel_0_100: Option<f64>,
    pub top_speed_kmh: Option<i32>,

    pub fuel_city_kml: Option<f64>,
    pub fuel_highway_kml: Option<f64>,
    pub fuel_combined_kml: Option<f64>,
    pub fuel_tank_liters: Option<i32>,

    pub length_mm: Option<i32>,
    pub width_mm: Option<i32>,
    pub height_mm: Option<i32>,
    pub wheelbase_mm: Option<i32>,
    pub cargo_liters: Option<i32>,
    pub cargo_max_liters: Option<i32>,
    pub curb_weight_kg: Option<i32>,

    pub tire_size: Option<String>,
    pub spare_tire: Option<String>,

    pub specs_source: Option<String>,
    pub specs_confidence: Option<f64>,
    pub enriched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    Safety,
    Comfort,
    Infotainment,
    Exterior,
    Interior,
}

impl EquipmentCategory {
    /// Report order.
    pub const ALL: [EquipmentCategory; 5] = [
        EquipmentCategory::Safety,
        EquipmentCategory::Comfort,
        EquipmentCategory::Infotainment,
        EquipmentCategory::Exterior,
        EquipmentCategory::Interior,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentCategory::Safety => "safety",
            EquipmentCategory::Comfort => "comfort",
            EquipmentCategory::Infotainment => "infotainment",
            EquipmentCategory::Exterior => "exterior",
            EquipmentCategory::Interior => "interior",
        }
    }
}

/// Where an equipment entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSource {
    FactorySpec,
    VisualDetection,
    #[default]
    ManualInput,
}

impl EquipmentSource {
    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentSource::FactorySpec => "factory_spec",
            EquipmentSource::VisualDetection => "visual_detection",
            EquipmentSource::ManualInput => "manual_input",
        }
    }
}

/// A single equipment feature of a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleEquipment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub vehicle_id: Uuid,
    pub category: EquipmentCategory,
    pub feature_name: String,
    pub feature_description: Option<String>,
    #[serde(default)]
    pub is_standard: bool,
    #[serde(default)]
    pub is_confirmed: bool,
    #[serde(default)]
    pub source: EquipmentSource,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [VehicleStatus::Draft, VehicleStatus::Review, VehicleStatus::Published]
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| InspectError::Validation(format!("unknown vehicle status '{s}'")))
    }
}

impl FromStr for EquipmentCategory {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EquipmentCategory::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| InspectError::Validation(format!("unknown equipment category '{s}'")))
    }
}

impl FromStr for EquipmentSource {
    type Err = InspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            EquipmentSource::FactorySpec,
            EquipmentSource::VisualDetection,
            EquipmentSource::ManualInput,
        ]
        .into_iter()
        .find(|v| v.as_str() == s)
        .ok_or_else(|| InspectError::Validation(format!("unknown equipment source '{s}'")))
    }
}
