//! Vehicle catalogue operations.

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use autoinspect_core::{
    InspectError, Repositories, Vehicle, VehicleEquipment, VehiclePatch, VehiclePreview,
    VehicleSpecs, VehicleStatus,
};

use crate::service::latest_view;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of the catalogue, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct VehiclePage {
    pub items: Vec<Vehicle>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Brand and model present, a plausible model year, nothing negative.
pub fn validate_vehicle(vehicle: &Vehicle) -> Result<(), InspectError> {
    if vehicle.brand.trim().is_empty() {
        return Err(InspectError::Validation("brand is required".to_string()));
    }
    if vehicle.model.trim().is_empty() {
        return Err(InspectError::Validation("model is required".to_string()));
    }
    if !(1900..=2100).contains(&vehicle.year) {
        return Err(InspectError::Validation(format!(
            "year {} is outside 1900..=2100",
            vehicle.year
        )));
    }
    if vehicle.mileage_km < 0 {
        return Err(InspectError::Validation("mileage cannot be negative".to_string()));
    }
    if vehicle.price_usd.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(InspectError::Validation("price must be a non-negative amount".to_string()));
    }
    Ok(())
}

pub struct VehicleService {
    repos: Repositories,
}

impl VehicleService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(&self, mut vehicle: Vehicle) -> Result<Vehicle, InspectError> {
        vehicle.brand = vehicle.brand.trim().to_string();
        vehicle.model = vehicle.model.trim().to_string();
        validate_vehicle(&vehicle)?;
        self.repos
            .vehicles
            .create_vehicle(&vehicle)
            .await
            .map_err(|e| InspectError::storage("creating vehicle", e))?;
        info!(vehicle_id = %vehicle.id, vehicle = %vehicle.description(), "Vehicle created");
        Ok(vehicle)
    }

    pub async fn get(&self, id: Uuid) -> Result<Vehicle, InspectError> {
        self.repos
            .vehicles
            .get_vehicle(id)
            .await
            .map_err(|e| InspectError::storage("loading vehicle", e))?
            .ok_or_else(|| InspectError::not_found("vehicle", id))
    }

    /// Apply a partial update; the result must still validate.
    pub async fn update(&self, id: Uuid, patch: VehiclePatch) -> Result<Vehicle, InspectError> {
        let mut vehicle = self.get(id).await?;
        patch.apply(&mut vehicle);
        validate_vehicle(&vehicle)?;
        vehicle.updated_at = Utc::now();
        self.repos
            .vehicles
            .update_vehicle(&vehicle)
            .await
            .map_err(|e| InspectError::storage("updating vehicle", e))?;
        Ok(vehicle)
    }

    /// Removes the vehicle together with its specs, equipment and inspections.
    pub async fn delete(&self, id: Uuid) -> Result<(), InspectError> {
        let removed = self
            .repos
            .vehicles
            .delete_vehicle(id)
            .await
            .map_err(|e| InspectError::storage("deleting vehicle", e))?;
        if !removed {
            return Err(InspectError::not_found("vehicle", id));
        }
        info!(vehicle_id = %id, "Vehicle deleted");
        Ok(())
    }

    /// Pages start at 1. A page size outside 1..=100 falls back to 20.
    pub async fn list(&self, page: usize, page_size: usize) -> Result<VehiclePage, InspectError> {
        let page = page.max(1);
        let page_size = if (1..=MAX_PAGE_SIZE).contains(&page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        let (items, total) = self
            .repos
            .vehicles
            .list_vehicles(page, page_size)
            .await
            .map_err(|e| InspectError::storage("listing vehicles", e))?;
        Ok(VehiclePage {
            items,
            total,
            page,
            page_size,
        })
    }

    pub async fn upsert_specs(
        &self,
        vehicle_id: Uuid,
        mut specs: VehicleSpecs,
    ) -> Result<VehicleSpecs, InspectError> {
        self.get(vehicle_id).await?;
        if specs
            .specs_confidence
            .is_some_and(|c| !(0.0..=1.0).contains(&c))
        {
            return Err(InspectError::Validation(
                "specs confidence must be within [0, 1]".to_string(),
            ));
        }
        specs.vehicle_id = vehicle_id;
        self.repos
            .specs
            .upsert_specs(&specs)
            .await
            .map_err(|e| InspectError::storage("saving specs", e))?;
        Ok(specs)
    }

    /// Replace the whole equipment list. Items are re-homed onto the vehicle.
    pub async fn replace_equipment(
        &self,
        vehicle_id: Uuid,
        mut equipment: Vec<VehicleEquipment>,
    ) -> Result<Vec<VehicleEquipment>, InspectError> {
        self.get(vehicle_id).await?;
        for item in &mut equipment {
            item.feature_name = item.feature_name.trim().to_string();
            if item.feature_name.is_empty() {
                return Err(InspectError::Validation("feature name is required".to_string()));
            }
            item.vehicle_id = vehicle_id;
        }
        self.repos
            .equipment
            .replace_equipment(vehicle_id, &equipment)
            .await
            .map_err(|e| InspectError::storage("saving equipment", e))?;
        info!(vehicle_id = %vehicle_id, items = equipment.len(), "Equipment replaced");
        Ok(equipment)
    }

    /// Vehicle with specs, equipment and its latest inspection.
    pub async fn preview(&self, vehicle_id: Uuid) -> Result<VehiclePreview, InspectError> {
        let vehicle = self.get(vehicle_id).await?;
        let specs = self
            .repos
            .specs
            .get_specs(vehicle_id)
            .await
            .map_err(|e| InspectError::storage("loading specs", e))?;
        let equipment = self
            .repos
            .equipment
            .list_equipment(vehicle_id)
            .await
            .map_err(|e| InspectError::storage("loading equipment", e))?;
        let inspection = latest_view(&self.repos, vehicle_id).await?;
        Ok(VehiclePreview {
            vehicle,
            specs,
            equipment,
            inspection,
        })
    }

    pub async fn publish(&self, vehicle_id: Uuid) -> Result<Vehicle, InspectError> {
        let mut vehicle = self.get(vehicle_id).await?;
        vehicle.status = VehicleStatus::Published;
        vehicle.updated_at = Utc::now();
        self.repos
            .vehicles
            .update_vehicle(&vehicle)
            .await
            .map_err(|e| InspectError::storage("publishing vehicle", e))?;
        info!(vehicle_id = %vehicle_id, "Vehicle published");
        Ok(vehicle)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use autoinspect_core::{EquipmentCategory, EquipmentSource, Inspection, InspectionRepository};
    use autoinspect_store::InMemoryStore;

    fn service() -> (VehicleService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (VehicleService::new(Repositories::from_store(store.clone())), store)
    }

    fn equipment(name: &str) -> VehicleEquipment {
        VehicleEquipment {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::nil(),
            category: EquipmentCategory::Safety,
            feature_name: name.to_string(),
            feature_description: None,
            is_standard: true,
            is_confirmed: false,
            source: EquipmentSource::ManualInput,
        }
    }

    #[tokio::test]
    async fn create_validates_and_trims() {
        let (svc, _) = service();
        let created = svc.create(Vehicle::new("  Mazda ", "CX-5", 2020, 61_000)).await.unwrap();
        assert_eq!(created.brand, "Mazda");
        assert_eq!(created.status, VehicleStatus::Draft);
        assert_eq!(svc.get(created.id).await.unwrap().model, "CX-5");

        for bad in [
            Vehicle::new("", "CX-5", 2020, 0),
            Vehicle::new("Mazda", " ", 2020, 0),
            Vehicle::new("Mazda", "CX-5", 1899, 0),
            Vehicle::new("Mazda", "CX-5", 2101, 0),
            Vehicle::new("Mazda", "CX-5", 2020, -1),
        ] {
            assert!(matches!(svc.create(bad).await, Err(InspectError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn update_applies_patch_and_revalidates() {
        let (svc, _) = service();
        let vehicle = svc.create(Vehicle::new("Kia", "Rio", 2019, 70_000)).await.unwrap();

        let updated = svc
            .update(
                vehicle.id,
                VehiclePatch {
                    plate: Some("ABC-1234".into()),
                    mileage_km: Some(72_500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.plate.as_deref(), Some("ABC-1234"));
        assert_eq!(updated.mileage_km, 72_500);
        assert_eq!(updated.brand, "Kia");

        let err = svc
            .update(
                vehicle.id,
                VehiclePatch {
                    year: Some(1800),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, InspectError::Validation(_)));
        assert_eq!(svc.get(vehicle.id).await.unwrap().year, 2019);
    }

    #[tokio::test]
    async fn delete_and_missing() {
        let (svc, _) = service();
        let vehicle = svc.create(Vehicle::new("Fiat", "Argo", 2022, 5_000)).await.unwrap();
        svc.delete(vehicle.id).await.unwrap();
        assert!(matches!(svc.get(vehicle.id).await, Err(InspectError::NotFound { .. })));
        assert!(matches!(svc.delete(vehicle.id).await, Err(InspectError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_clamps_paging() {
        let (svc, _) = service();
        for i in 0..3 {
            svc.create(Vehicle::new("VW", format!("Model {i}"), 2020, 0)).await.unwrap();
        }
        let page = svc.list(0, 0).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 3);

        let page = svc.list(2, 2).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(svc.list(1, 101).await.unwrap().page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(svc.list(1, 100).await.unwrap().page_size, 100);
    }

    #[tokio::test]
    async fn specs_and_equipment_attach_to_vehicle() {
        let (svc, _) = service();
        let vehicle = svc.create(Vehicle::new("Renault", "Duster", 2021, 40_000)).await.unwrap();

        let specs = svc
            .upsert_specs(
                vehicle.id,
                VehicleSpecs {
                    engine_cc: Some(1598),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(specs.vehicle_id, vehicle.id);

        let bad = VehicleSpecs {
            specs_confidence: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(
            svc.upsert_specs(vehicle.id, bad).await,
            Err(InspectError::Validation(_))
        ));

        let items = svc
            .replace_equipment(vehicle.id, vec![equipment(" ABS "), equipment("ESC")])
            .await
            .unwrap();
        assert!(items.iter().all(|e| e.vehicle_id == vehicle.id));
        assert_eq!(items[0].feature_name, "ABS");

        assert!(matches!(
            svc.replace_equipment(vehicle.id, vec![equipment("  ")]).await,
            Err(InspectError::Validation(_))
        ));
        assert!(matches!(
            svc.replace_equipment(Uuid::new_v4(), vec![]).await,
            Err(InspectError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn preview_and_publish() {
        let (svc, store) = service();
        let vehicle = svc.create(Vehicle::new("Nissan", "Kicks", 2023, 9_000)).await.unwrap();

        let preview = svc.preview(vehicle.id).await.unwrap();
        assert!(preview.specs.is_none());
        assert!(preview.inspection.is_none());

        store.create_inspection(&Inspection::new(vehicle.id)).await.unwrap();
        svc.replace_equipment(vehicle.id, vec![equipment("Airbags")]).await.unwrap();
        let preview = svc.preview(vehicle.id).await.unwrap();
        assert_eq!(preview.equipment.len(), 1);
        assert!(preview.inspection.is_some());

        let published = svc.publish(vehicle.id).await.unwrap();
        assert_eq!(published.status, VehicleStatus::Published);
    }
}
