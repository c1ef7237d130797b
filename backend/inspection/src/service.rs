//! Inspection lifecycle: creation, photo intake, runs, review and approval.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use autoinspect_core::{
    BlobStore, FindingPatch, InspectError, Inspection, InspectionFinding, InspectionPhoto,
    InspectionStatus, InspectionView, PhotoZone, Repositories, Vehicle,
};

use crate::orchestrator::{InspectionRunner, RunSummary};

/// Blob path of an uploaded photo.
pub fn photo_path(inspection_id: Uuid, photo_id: Uuid, filename: &str) -> String {
    format!("inspections/{inspection_id}/photos/{photo_id}_{filename}")
}

/// Keep only the final path segment of a client-supplied name and replace
/// anything outside `[A-Za-z0-9._-]`.
fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "photo.jpg".to_string()
    } else {
        cleaned
    }
}

/// Who performs an inspection; both parts are optional.
#[derive(Debug, Clone, Default)]
pub struct Inspector {
    pub name: Option<String>,
    pub branch: Option<String>,
}

pub struct InspectionService {
    repos: Repositories,
    blobs: Arc<dyn BlobStore>,
    runner: InspectionRunner,
}

impl InspectionService {
    pub fn new(repos: Repositories, blobs: Arc<dyn BlobStore>, runner: InspectionRunner) -> Self {
        Self {
            repos,
            blobs,
            runner,
        }
    }

    async fn vehicle(&self, vehicle_id: Uuid) -> Result<Vehicle, InspectError> {
        self.repos
            .vehicles
            .get_vehicle(vehicle_id)
            .await
            .map_err(|e| InspectError::storage("loading vehicle", e))?
            .ok_or_else(|| InspectError::not_found("vehicle", vehicle_id))
    }

    async fn inspection(&self, inspection_id: Uuid) -> Result<Inspection, InspectError> {
        self.repos
            .inspections
            .get_inspection(inspection_id)
            .await
            .map_err(|e| InspectError::storage("loading inspection", e))?
            .ok_or_else(|| InspectError::not_found("inspection", inspection_id))
    }

    pub async fn create_inspection(
        &self,
        vehicle_id: Uuid,
        inspector: Inspector,
    ) -> Result<Inspection, InspectError> {
        self.vehicle(vehicle_id).await?;
        let inspection = Inspection::new(vehicle_id).with_inspector(inspector.name, inspector.branch);
        self.repos
            .inspections
            .create_inspection(&inspection)
            .await
            .map_err(|e| InspectError::storage("creating inspection", e))?;
        info!(inspection_id = %inspection.id, vehicle_id = %vehicle_id, "Inspection created");
        Ok(inspection)
    }

    /// Store a photo and attach it to the inspection.
    ///
    /// Photos are numbered in upload order starting at 0. Uploads are refused
    /// while a run is processing the inspection. Only the photo count of the
    /// stored inspection changes, so an upload never rewinds a finished run.
    pub async fn upload_photo(
        &self,
        inspection_id: Uuid,
        zone: PhotoZone,
        data: Bytes,
        filename: &str,
    ) -> Result<InspectionPhoto, InspectError> {
        if data.is_empty() {
            return Err(InspectError::Validation("photo is empty".to_string()));
        }
        let inspection = self.inspection(inspection_id).await?;
        if inspection.status == InspectionStatus::Processing {
            return Err(InspectError::InvalidStatus(
                "cannot add photos while the inspection is processing".to_string(),
            ));
        }

        let photo_id = Uuid::new_v4();
        let path = photo_path(inspection_id, photo_id, &sanitize_filename(filename));
        let size = data.len();
        self.blobs
            .write(&path, data)
            .await
            .map_err(|e| InspectError::storage("storing photo", e))?;

        let photo = self
            .repos
            .photos
            .append_photo(&InspectionPhoto {
                id: photo_id,
                inspection_id,
                photo_path: path,
                zone,
                sort_order: 0,
                uploaded_at: Utc::now(),
            })
            .await
            .map_err(|e| InspectError::storage("recording photo", e))?;

        info!(
            inspection_id = %inspection_id,
            photo_id = %photo.id,
            zone = %zone,
            sort_order = photo.sort_order,
            bytes = size,
            "Photo uploaded"
        );
        Ok(photo)
    }

    /// Upload to the vehicle's latest inspection, starting one if needed.
    pub async fn upload_vehicle_photo(
        &self,
        vehicle_id: Uuid,
        zone: PhotoZone,
        data: Bytes,
        filename: &str,
        inspector: Inspector,
    ) -> Result<InspectionPhoto, InspectError> {
        let latest = self
            .repos
            .inspections
            .latest_inspection(vehicle_id)
            .await
            .map_err(|e| InspectError::storage("loading inspection", e))?;
        let inspection = match latest {
            Some(inspection) => inspection,
            None => self.create_inspection(vehicle_id, inspector).await?,
        };
        self.upload_photo(inspection.id, zone, data, filename).await
    }

    pub async fn inspection_view(&self, inspection_id: Uuid) -> Result<InspectionView, InspectError> {
        let inspection = self.inspection(inspection_id).await?;
        load_view(&self.repos, inspection).await
    }

    pub async fn latest_inspection_view(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Option<InspectionView>, InspectError> {
        latest_view(&self.repos, vehicle_id).await
    }

    pub async fn run_inspection(&self, inspection_id: Uuid) -> Result<RunSummary, InspectError> {
        let inspection = self.inspection(inspection_id).await?;
        let vehicle = self.vehicle(inspection.vehicle_id).await?;
        self.runner.run_inspection(&vehicle, inspection_id).await
    }

    /// Run the vehicle's latest inspection and return the refreshed view.
    pub async fn run_vehicle_inspection(&self, vehicle_id: Uuid) -> Result<InspectionView, InspectError> {
        let vehicle = self.vehicle(vehicle_id).await?;
        let inspection = self
            .repos
            .inspections
            .latest_inspection(vehicle_id)
            .await
            .map_err(|e| InspectError::storage("loading inspection", e))?
            .ok_or_else(|| InspectError::not_found("inspection for vehicle", vehicle_id))?;
        let summary = self.runner.run_inspection(&vehicle, inspection.id).await?;
        load_view(&self.repos, summary.inspection).await
    }

    /// Reviewer edit of a single finding.
    pub async fn update_finding(
        &self,
        finding_id: Uuid,
        patch: FindingPatch,
    ) -> Result<InspectionFinding, InspectError> {
        if patch.is_empty() {
            return Err(InspectError::Validation("no finding fields to update".to_string()));
        }
        let mut finding = self
            .repos
            .findings
            .get_finding(finding_id)
            .await
            .map_err(|e| InspectError::storage("loading finding", e))?
            .ok_or_else(|| InspectError::not_found("finding", finding_id))?;

        patch.apply(&mut finding);
        self.repos
            .findings
            .update_finding(&finding)
            .await
            .map_err(|e| InspectError::storage("updating finding", e))?;
        info!(finding_id = %finding_id, inspection_id = %finding.inspection_id, "Finding updated");
        Ok(finding)
    }

    pub async fn approve_inspection(&self, inspection_id: Uuid) -> Result<Inspection, InspectError> {
        let mut inspection = self.inspection(inspection_id).await?;
        if inspection.status != InspectionStatus::Completed {
            return Err(InspectError::InvalidStatus(format!(
                "only completed inspections can be approved (status is {})",
                inspection.status
            )));
        }
        inspection.status = InspectionStatus::Approved;
        inspection.updated_at = Utc::now();
        self.repos
            .inspections
            .update_inspection(&inspection)
            .await
            .map_err(|e| InspectError::storage("approving inspection", e))?;
        info!(inspection_id = %inspection_id, "Inspection approved");
        Ok(inspection)
    }
}

/// Attach findings and photos to an inspection.
pub(crate) async fn load_view(
    repos: &Repositories,
    inspection: Inspection,
) -> Result<InspectionView, InspectError> {
    let findings = repos
        .findings
        .list_findings(inspection.id)
        .await
        .map_err(|e| InspectError::storage("listing findings", e))?;
    let photos = repos
        .photos
        .list_photos(inspection.id)
        .await
        .map_err(|e| InspectError::storage("listing photos", e))?;
    Ok(InspectionView {
        inspection,
        findings,
        photos,
    })
}

pub(crate) async fn latest_view(
    repos: &Repositories,
    vehicle_id: Uuid,
) -> Result<Option<InspectionView>, InspectError> {
    let latest = repos
        .inspections
        .latest_inspection(vehicle_id)
        .await
        .map_err(|e| InspectError::storage("loading inspection", e))?;
    match latest {
        Some(inspection) => load_view(repos, inspection).await.map(Some),
        None => Ok(None),
    }
}
