use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use autoinspect_core::{BlobStore, InspectError, Repositories};

use crate::layout::{render_report, ReportInput, ReportOptions};

/// Blob path of a vehicle's rendered report.
pub fn report_path(vehicle_id: Uuid) -> String {
    format!("reports/{vehicle_id}/inspection_report.pdf")
}

/// Renders and stores the inspection report of a vehicle.
pub struct ReportService {
    repos: Repositories,
    blobs: Arc<dyn BlobStore>,
    options: ReportOptions,
}

impl ReportService {
    pub fn new(repos: Repositories, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            repos,
            blobs,
            options: ReportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// Render the report for the vehicle's latest inspection.
    ///
    /// Returns the blob path and the PDF bytes. Storing the bytes and
    /// recording the path on the inspection are best effort: failures are
    /// logged and the rendered bytes are still returned.
    pub async fn generate_report(&self, vehicle_id: Uuid) -> Result<(String, Vec<u8>), InspectError> {
        let vehicle = self
            .repos
            .vehicles
            .get_vehicle(vehicle_id)
            .await
            .map_err(|e| InspectError::storage("loading vehicle", e))?
            .ok_or_else(|| InspectError::not_found("vehicle", vehicle_id))?;

        let mut inspection = self
            .repos
            .inspections
            .latest_inspection(vehicle_id)
            .await
            .map_err(|e| InspectError::storage("loading inspection", e))?
            .ok_or_else(|| InspectError::not_found("inspection for vehicle", vehicle_id))?;

        let specs = match self.repos.specs.get_specs(vehicle_id).await {
            Ok(specs) => specs,
            Err(e) => {
                warn!(vehicle_id = %vehicle_id, error = %e, "Failed to load specs; omitting page");
                None
            }
        };
        let equipment = self
            .repos
            .equipment
            .list_equipment(vehicle_id)
            .await
            .unwrap_or_else(|e| {
                warn!(vehicle_id = %vehicle_id, error = %e, "Failed to load equipment; omitting page");
                Vec::new()
            });
        let findings = self
            .repos
            .findings
            .list_findings(inspection.id)
            .await
            .unwrap_or_else(|e| {
                warn!(inspection_id = %inspection.id, error = %e, "Failed to load findings");
                Vec::new()
            });

        let pdf = render_report(
            ReportInput {
                vehicle: &vehicle,
                specs: specs.as_ref(),
                equipment: &equipment,
                inspection: &inspection,
                findings: &findings,
            },
            &self.options,
        );

        let path = report_path(vehicle_id);
        if let Err(e) = self.blobs.write(&path, Bytes::from(pdf.clone())).await {
            error!(vehicle_id = %vehicle_id, path = %path, error = %e, "Failed to store PDF report");
        }

        inspection.report_path = Some(path.clone());
        inspection.updated_at = Utc::now();
        if let Err(e) = self.repos.inspections.update_inspection(&inspection).await {
            warn!(inspection_id = %inspection.id, error = %e, "Failed to record report path");
        }

        info!(
            vehicle_id = %vehicle_id,
            inspection_id = %inspection.id,
            bytes = pdf.len(),
            findings = findings.len(),
            "Generated inspection report"
        );
        Ok((path, pdf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoinspect_core::{
        EquipmentCategory, EquipmentRepository, EquipmentSource, FindingRepository, FindingType,
        FindingZone, Inspection, InspectionFinding, InspectionRepository, Severity,
        SpecsRepository, Vehicle, VehicleEquipment, VehicleRepository, VehicleSpecs,
    };
    use autoinspect_store::{InMemoryBlobStore, InMemoryStore};

    async fn setup() -> (ReportService, Arc<InMemoryStore>, Arc<InMemoryBlobStore>, Vehicle) {
        let store = Arc::new(InMemoryStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let service = ReportService::new(Repositories::from_store(store.clone()), blobs.clone());
        let vehicle = Vehicle::new("Chevrolet", "Onix", 2023, 12_000);
        store.create_vehicle(&vehicle).await.unwrap();
        (service, store, blobs, vehicle)
    }

    #[tokio::test]
    async fn unknown_vehicle_is_not_found() {
        let (service, _, _, _) = setup().await;
        let err = service.generate_report(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, InspectError::NotFound { entity: "vehicle", .. }));
    }

    #[tokio::test]
    async fn vehicle_without_inspection_is_not_found() {
        let (service, _, blobs, vehicle) = setup().await;
        let err = service.generate_report(vehicle.id).await.unwrap_err();
        assert!(matches!(err, InspectError::NotFound { .. }));
        assert!(blobs.is_empty());
    }

    #[tokio::test]
    async fn report_is_stored_and_path_recorded() {
        let (service, store, blobs, vehicle) = setup().await;
        let inspection = Inspection::new(vehicle.id);
        store.create_inspection(&inspection).await.unwrap();

        let (path, pdf) = service.generate_report(vehicle.id).await.unwrap();
        assert_eq!(path, format!("reports/{}/inspection_report.pdf", vehicle.id));
        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert_eq!(blobs.read(&path).await.unwrap().as_ref(), pdf.as_slice());

        let updated = store.get_inspection(inspection.id).await.unwrap().unwrap();
        assert_eq!(updated.report_path.as_deref(), Some(path.as_str()));
    }

    #[tokio::test]
    async fn report_includes_specs_equipment_and_findings() {
        let (service, store, _, vehicle) = setup().await;
        let inspection = Inspection::new(vehicle.id);
        store.create_inspection(&inspection).await.unwrap();
        store
            .upsert_specs(&VehicleSpecs {
                vehicle_id: vehicle.id,
                transmission_type: Some("CVT".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .replace_equipment(
                vehicle.id,
                &[VehicleEquipment {
                    id: Uuid::new_v4(),
                    vehicle_id: vehicle.id,
                    category: EquipmentCategory::Infotainment,
                    feature_name: "Apple CarPlay".into(),
                    feature_description: None,
                    is_standard: true,
                    is_confirmed: true,
                    source: EquipmentSource::FactorySpec,
                }],
            )
            .await
            .unwrap();
        store
            .create_findings(&[InspectionFinding {
                id: Uuid::new_v4(),
                inspection_id: inspection.id,
                photo_path: None,
                zone: FindingZone::InteriorFront,
                finding_type: FindingType::Stain,
                severity: Severity::Moderate,
                description: Some("driver seat - coffee stain".into()),
                ai_confidence: Some(0.9),
                confirmed_by_human: false,
            }])
            .await
            .unwrap();

        let (_, pdf) = service.generate_report(vehicle.id).await.unwrap();
        let doc = String::from_utf8(pdf).unwrap();
        assert!(doc.contains("/Count 4 >>"));
        assert!(doc.contains("CVT"));
        assert!(doc.contains("([OK*] Apple CarPlay) Tj T*"));
        assert!(doc.contains("Zone: INTERIOR_FRONT | Type: stain | Severity: MODERATE"));
    }

    #[tokio::test]
    async fn custom_title_and_footer_are_used() {
        let (service, store, _, vehicle) = setup().await;
        store.create_inspection(&Inspection::new(vehicle.id)).await.unwrap();
        let service = service.with_options(ReportOptions {
            title: "NORTH MOTORS - Inspection".into(),
            footer: "North Motors certified".into(),
        });
        let (_, pdf) = service.generate_report(vehicle.id).await.unwrap();
        let doc = String::from_utf8(pdf).unwrap();
        assert!(doc.contains("(NORTH MOTORS - Inspection) Tj T*"));
        assert!(doc.contains("(North Motors certified) Tj T*"));
    }
}
