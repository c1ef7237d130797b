//! Collaborator seams: image analysis, blob storage, and record storage.
//!
//! Implementations live in `autoinspect-vision` and `autoinspect-store`.
//! All methods return `anyhow::Result`; services translate failures into
//! [`crate::InspectError`] at their boundary.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::inspection::{
    FindingType, Inspection, InspectionFinding, InspectionPhoto, Severity,
};
use crate::vehicle::{Vehicle, VehicleEquipment, VehicleSpecs};
use crate::zones::FindingZone;

/// Input to one image-analysis call.
#[derive(Debug, Clone)]
pub struct PhotoAnalysisRequest {
    pub image: Bytes,
    pub zone: FindingZone,
    pub vehicle_description: String,
}

/// Result of analysing one photo.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoAnalysis {
    /// Condition score, 1 (poor) to 10 (like new).
    pub score: i32,
    pub findings: Vec<DetectedFinding>,
}

/// A finding as reported by the provider, before it is tied to an inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedFinding {
    pub finding_type: FindingType,
    pub severity: Severity,
    pub location: String,
    pub description: String,
    /// In `[0, 1]`.
    pub confidence: f64,
}

/// Trait for image-analysis providers used by the inspection orchestrator.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Provider name (e.g., "openai", "mock").
    fn name(&self) -> &str;

    /// Score one photo of the given zone and list what is wrong with it.
    async fn analyze(&self, request: &PhotoAnalysisRequest) -> Result<PhotoAnalysis>;
}

/// Byte storage for photos and rendered reports, addressed by relative path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn write(&self, path: &str, data: Bytes) -> Result<()>;

    async fn read(&self, path: &str) -> Result<Bytes>;
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn create_vehicle(&self, vehicle: &Vehicle) -> Result<()>;

    async fn get_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>>;

    /// Fails if the vehicle does not exist.
    async fn update_vehicle(&self, vehicle: &Vehicle) -> Result<()>;

    /// Returns whether a row was removed.
    async fn delete_vehicle(&self, id: Uuid) -> Result<bool>;

    /// Newest first. Returns the page and the total number of vehicles.
    async fn list_vehicles(&self, page: usize, page_size: usize) -> Result<(Vec<Vehicle>, usize)>;
}

#[async_trait]
pub trait SpecsRepository: Send + Sync {
    async fn upsert_specs(&self, specs: &VehicleSpecs) -> Result<()>;

    async fn get_specs(&self, vehicle_id: Uuid) -> Result<Option<VehicleSpecs>>;
}

#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    /// Replace the whole equipment list of a vehicle.
    async fn replace_equipment(
        &self,
        vehicle_id: Uuid,
        equipment: &[VehicleEquipment],
    ) -> Result<()>;

    async fn list_equipment(&self, vehicle_id: Uuid) -> Result<Vec<VehicleEquipment>>;
}

#[async_trait]
pub trait InspectionRepository: Send + Sync {
    async fn create_inspection(&self, inspection: &Inspection) -> Result<()>;

    async fn get_inspection(&self, id: Uuid) -> Result<Option<Inspection>>;

    /// The most recently created inspection of a vehicle.
    async fn latest_inspection(&self, vehicle_id: Uuid) -> Result<Option<Inspection>>;

    /// Fails if the inspection does not exist.
    async fn update_inspection(&self, inspection: &Inspection) -> Result<()>;
}

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Store a photo with the caller's `sort_order`.
    async fn create_photo(&self, photo: &InspectionPhoto) -> Result<()>;

    /// Store a photo after every existing photo of its inspection.
    ///
    /// In one write the store assigns `sort_order` (current maximum + 1, or 0)
    /// and recounts the inspection's `photos_count`; no other inspection
    /// field is touched. Fails if the inspection does not exist. Returns the
    /// photo as stored.
    async fn append_photo(&self, photo: &InspectionPhoto) -> Result<InspectionPhoto>;

    /// Ordered by sort order.
    async fn list_photos(&self, inspection_id: Uuid) -> Result<Vec<InspectionPhoto>>;

    async fn delete_photo(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait FindingRepository: Send + Sync {
    /// Insert all findings or none.
    async fn create_findings(&self, findings: &[InspectionFinding]) -> Result<()>;

    /// Swap every finding of an inspection for `findings`, all or nothing.
    async fn replace_findings(
        &self,
        inspection_id: Uuid,
        findings: &[InspectionFinding],
    ) -> Result<()>;

    /// Ordered by [`InspectionFinding::read_order`].
    async fn list_findings(&self, inspection_id: Uuid) -> Result<Vec<InspectionFinding>>;

    async fn get_finding(&self, id: Uuid) -> Result<Option<InspectionFinding>>;

    /// Fails if the finding does not exist.
    async fn update_finding(&self, finding: &InspectionFinding) -> Result<()>;
}

/// Every record repository a service may need, behind shared trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub vehicles: Arc<dyn VehicleRepository>,
    pub specs: Arc<dyn SpecsRepository>,
    pub equipment: Arc<dyn EquipmentRepository>,
    pub inspections: Arc<dyn InspectionRepository>,
    pub photos: Arc<dyn PhotoRepository>,
    pub findings: Arc<dyn FindingRepository>,
}

impl Repositories {
    /// Use one store for every repository.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: VehicleRepository
            + SpecsRepository
            + EquipmentRepository
            + InspectionRepository
            + PhotoRepository
            + FindingRepository
            + 'static,
    {
        Self {
            vehicles: store.clone(),
            specs: store.clone(),
            equipment: store.clone(),
            inspections: store.clone(),
            photos: store.clone(),
            findings: store,
        }
    }
}
