use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use autoinspect_core::{
    EquipmentRepository, FindingRepository, Inspection, InspectionFinding, InspectionPhoto,
    InspectionRepository, PhotoRepository, SpecsRepository, Vehicle, VehicleEquipment,
    VehicleRepository, VehicleSpecs,
};

/// In-memory implementation of every repository trait.
///
/// Deleting a vehicle removes its specs, equipment, inspections, photos and
/// findings, matching the cascade of the SQLite schema.
#[derive(Default)]
pub struct InMemoryStore {
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
    specs: RwLock<HashMap<Uuid, VehicleSpecs>>,
    equipment: RwLock<HashMap<Uuid, Vec<VehicleEquipment>>>,
    /// Keyed by id; the sequence number breaks `created_at` ties.
    inspections: RwLock<HashMap<Uuid, (u64, Inspection)>>,
    next_seq: AtomicU64,
    photos: RwLock<HashMap<Uuid, InspectionPhoto>>,
    findings: RwLock<HashMap<Uuid, InspectionFinding>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

#[async_trait]
impl VehicleRepository for InMemoryStore {
    async fn create_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        let mut vehicles = write(&self.vehicles)?;
        if vehicles.contains_key(&vehicle.id) {
            anyhow::bail!("Vehicle {} already exists", vehicle.id);
        }
        vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn get_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>> {
        Ok(read(&self.vehicles)?.get(&id).cloned())
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        let mut vehicles = write(&self.vehicles)?;
        match vehicles.get_mut(&vehicle.id) {
            Some(existing) => {
                *existing = vehicle.clone();
                Ok(())
            }
            None => anyhow::bail!("Vehicle {} not found", vehicle.id),
        }
    }

    async fn delete_vehicle(&self, id: Uuid) -> Result<bool> {
        if write(&self.vehicles)?.remove(&id).is_none() {
            return Ok(false);
        }
        write(&self.specs)?.remove(&id);
        write(&self.equipment)?.remove(&id);

        let removed: Vec<Uuid> = {
            let mut inspections = write(&self.inspections)?;
            let ids: Vec<Uuid> = inspections
                .values()
                .map(|(_, i)| i)
                .filter(|i| i.vehicle_id == id)
                .map(|i| i.id)
                .collect();
            for inspection_id in &ids {
                inspections.remove(inspection_id);
            }
            ids
        };
        write(&self.photos)?.retain(|_, p| !removed.contains(&p.inspection_id));
        write(&self.findings)?.retain(|_, f| !removed.contains(&f.inspection_id));
        Ok(true)
    }

    async fn list_vehicles(&self, page: usize, page_size: usize) -> Result<(Vec<Vehicle>, usize)> {
        let vehicles = read(&self.vehicles)?;
        let mut all: Vec<Vehicle> = vehicles.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = all.len();
        let offset = page.saturating_sub(1) * page_size;
        let items = all.into_iter().skip(offset).take(page_size).collect();
        Ok((items, total))
    }
}

#[async_trait]
impl SpecsRepository for InMemoryStore {
    async fn upsert_specs(&self, specs: &VehicleSpecs) -> Result<()> {
        write(&self.specs)?.insert(specs.vehicle_id, specs.clone());
        Ok(())
    }

    async fn get_specs(&self, vehicle_id: Uuid) -> Result<Option<VehicleSpecs>> {
        Ok(read(&self.specs)?.get(&vehicle_id).cloned())
    }
}

#[async_trait]
impl EquipmentRepository for InMemoryStore {
    async fn replace_equipment(
        &self,
        vehicle_id: Uuid,
        equipment: &[VehicleEquipment],
    ) -> Result<()> {
        write(&self.equipment)?.insert(vehicle_id, equipment.to_vec());
        Ok(())
    }

    async fn list_equipment(&self, vehicle_id: Uuid) -> Result<Vec<VehicleEquipment>> {
        Ok(read(&self.equipment)?
            .get(&vehicle_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl InspectionRepository for InMemoryStore {
    async fn create_inspection(&self, inspection: &Inspection) -> Result<()> {
        let mut inspections = write(&self.inspections)?;
        if inspections.contains_key(&inspection.id) {
            anyhow::bail!("Inspection {} already exists", inspection.id);
        }
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        inspections.insert(inspection.id, (seq, inspection.clone()));
        Ok(())
    }

    async fn get_inspection(&self, id: Uuid) -> Result<Option<Inspection>> {
        Ok(read(&self.inspections)?.get(&id).map(|(_, i)| i.clone()))
    }

    async fn latest_inspection(&self, vehicle_id: Uuid) -> Result<Option<Inspection>> {
        Ok(read(&self.inspections)?
            .values()
            .filter(|(_, i)| i.vehicle_id == vehicle_id)
            .max_by_key(|(seq, i)| (i.created_at, *seq))
            .map(|(_, i)| i.clone()))
    }

    async fn update_inspection(&self, inspection: &Inspection) -> Result<()> {
        let mut inspections = write(&self.inspections)?;
        match inspections.get_mut(&inspection.id) {
            Some((_, existing)) => {
                *existing = inspection.clone();
                Ok(())
            }
            None => anyhow::bail!("Inspection {} not found", inspection.id),
        }
    }
}

#[async_trait]
impl PhotoRepository for InMemoryStore {
    async fn create_photo(&self, photo: &InspectionPhoto) -> Result<()> {
        write(&self.photos)?.insert(photo.id, photo.clone());
        Ok(())
    }

    async fn append_photo(&self, photo: &InspectionPhoto) -> Result<InspectionPhoto> {
        let mut inspections = write(&self.inspections)?;
        let Some((_, inspection)) = inspections.get_mut(&photo.inspection_id) else {
            anyhow::bail!("Inspection {} not found", photo.inspection_id);
        };
        let mut photos = write(&self.photos)?;
        let siblings = photos
            .values()
            .filter(|p| p.inspection_id == photo.inspection_id);
        let next = siblings.map(|p| p.sort_order + 1).max().unwrap_or(0);

        let stored = InspectionPhoto {
            sort_order: next,
            ..photo.clone()
        };
        photos.insert(stored.id, stored.clone());
        inspection.photos_count = photos
            .values()
            .filter(|p| p.inspection_id == photo.inspection_id)
            .count() as i32;
        Ok(stored)
    }

    async fn list_photos(&self, inspection_id: Uuid) -> Result<Vec<InspectionPhoto>> {
        let mut photos: Vec<InspectionPhoto> = read(&self.photos)?
            .values()
            .filter(|p| p.inspection_id == inspection_id)
            .cloned()
            .collect();
        photos.sort_by_key(|p| (p.sort_order, p.uploaded_at));
        Ok(photos)
    }

    async fn delete_photo(&self, id: Uuid) -> Result<bool> {
        Ok(write(&self.photos)?.remove(&id).is_some())
    }
}

#[async_trait]
impl FindingRepository for InMemoryStore {
    async fn create_findings(&self, findings: &[InspectionFinding]) -> Result<()> {
        let mut stored = write(&self.findings)?;
        if let Some(dup) = findings.iter().find(|f| stored.contains_key(&f.id)) {
            anyhow::bail!("Finding {} already exists", dup.id);
        }
        for finding in findings {
            stored.insert(finding.id, finding.clone());
        }
        Ok(())
    }

    async fn replace_findings(
        &self,
        inspection_id: Uuid,
        findings: &[InspectionFinding],
    ) -> Result<()> {
        let mut stored = write(&self.findings)?;
        if let Some(dup) = findings
            .iter()
            .find(|f| stored.get(&f.id).is_some_and(|s| s.inspection_id != inspection_id))
        {
            anyhow::bail!("Finding {} already exists", dup.id);
        }
        stored.retain(|_, f| f.inspection_id != inspection_id);
        for finding in findings {
            stored.insert(finding.id, finding.clone());
        }
        Ok(())
    }

    async fn list_findings(&self, inspection_id: Uuid) -> Result<Vec<InspectionFinding>> {
        let mut findings: Vec<InspectionFinding> = read(&self.findings)?
            .values()
            .filter(|f| f.inspection_id == inspection_id)
            .cloned()
            .collect();
        findings.sort_by(|a, b| InspectionFinding::read_order(a, b).then(a.id.cmp(&b.id)));
        Ok(findings)
    }

    async fn get_finding(&self, id: Uuid) -> Result<Option<InspectionFinding>> {
        Ok(read(&self.findings)?.get(&id).cloned())
    }

    async fn update_finding(&self, finding: &InspectionFinding) -> Result<()> {
        let mut findings = write(&self.findings)?;
        match findings.get_mut(&finding.id) {
            Some(existing) => {
                *existing = finding.clone();
                Ok(())
            }
            None => anyhow::bail!("Finding {} not found", finding.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoinspect_core::{FindingType, FindingZone, PhotoZone, Severity};
    use chrono::{Duration, Utc};

    fn finding(inspection_id: Uuid, zone: FindingZone, severity: Severity) -> InspectionFinding {
        InspectionFinding {
            id: Uuid::new_v4(),
            inspection_id,
            photo_path: None,
            zone,
            finding_type: FindingType::Scratch,
            severity,
            description: None,
            ai_confidence: Some(0.7),
            confirmed_by_human: false,
        }
    }

    #[tokio::test]
    async fn vehicles_list_newest_first_with_total() {
        let store = InMemoryStore::new();
        let base = Utc::now();
        for i in 0..5 {
            let mut v = Vehicle::new("Kia", format!("Model {i}"), 2020, 1000);
            v.created_at = base + Duration::seconds(i);
            store.create_vehicle(&v).await.unwrap();
        }

        let (page1, total) = store.list_vehicles(1, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].model, "Model 4");
        assert_eq!(page1[1].model, "Model 3");

        let (page3, _) = store.list_vehicles(3, 2).await.unwrap();
        assert_eq!(page3.len(), 1);
        assert_eq!(page3[0].model, "Model 0");
    }

    #[tokio::test]
    async fn update_missing_vehicle_fails() {
        let store = InMemoryStore::new();
        let v = Vehicle::new("Kia", "Rio", 2020, 1000);
        assert!(store.update_vehicle(&v).await.is_err());
    }

    #[tokio::test]
    async fn latest_inspection_wins_by_creation_time() {
        let store = InMemoryStore::new();
        let vehicle_id = Uuid::new_v4();
        let mut older = Inspection::new(vehicle_id);
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = Inspection::new(vehicle_id);
        store.create_inspection(&older).await.unwrap();
        store.create_inspection(&newer).await.unwrap();

        let latest = store.latest_inspection(vehicle_id).await.unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
        assert!(store.latest_inspection(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_inspection_tie_goes_to_last_created() {
        let store = InMemoryStore::new();
        let vehicle_id = Uuid::new_v4();
        let created_at = Utc::now();
        let mut ids = Vec::new();
        for _ in 0..8 {
            let mut inspection = Inspection::new(vehicle_id);
            inspection.created_at = created_at;
            store.create_inspection(&inspection).await.unwrap();
            ids.push(inspection.id);
        }
        for _ in 0..3 {
            let latest = store.latest_inspection(vehicle_id).await.unwrap().unwrap();
            assert_eq!(latest.id, ids[7]);
        }
    }

    #[tokio::test]
    async fn appended_photos_are_numbered_and_counted() {
        let store = InMemoryStore::new();
        let mut inspection = Inspection::new(Uuid::new_v4());
        inspection.score_overall = Some(90);
        store.create_inspection(&inspection).await.unwrap();

        let mut orders = Vec::new();
        for zone in [PhotoZone::Front, PhotoZone::Rear, PhotoZone::Engine] {
            let photo = InspectionPhoto {
                id: Uuid::new_v4(),
                inspection_id: inspection.id,
                photo_path: format!("{zone}.jpg"),
                zone,
                sort_order: 0,
                uploaded_at: Utc::now(),
            };
            orders.push(store.append_photo(&photo).await.unwrap().sort_order);
        }
        assert_eq!(orders, vec![0, 1, 2]);

        let stored = store.get_inspection(inspection.id).await.unwrap().unwrap();
        assert_eq!(stored.photos_count, 3);
        assert_eq!(stored.score_overall, Some(90));

        let orphan = InspectionPhoto {
            id: Uuid::new_v4(),
            inspection_id: Uuid::new_v4(),
            photo_path: "x.jpg".into(),
            zone: PhotoZone::Front,
            sort_order: 0,
            uploaded_at: Utc::now(),
        };
        assert!(store.append_photo(&orphan).await.is_err());
    }

    #[tokio::test]
    async fn replacing_findings_drops_the_previous_batch() {
        let store = InMemoryStore::new();
        let inspection_id = Uuid::new_v4();
        let other_id = Uuid::new_v4();
        let other = finding(other_id, FindingZone::Engine, Severity::Minor);
        store
            .create_findings(&[
                finding(inspection_id, FindingZone::Front, Severity::Minor),
                finding(inspection_id, FindingZone::Rear, Severity::Minor),
                other.clone(),
            ])
            .await
            .unwrap();

        let fresh = finding(inspection_id, FindingZone::Left, Severity::Major);
        store.replace_findings(inspection_id, &[fresh.clone()]).await.unwrap();
        let listed = store.list_findings(inspection_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, fresh.id);
        assert_eq!(store.list_findings(other_id).await.unwrap().len(), 1);

        // Reusing another inspection's finding id changes nothing.
        assert!(store.replace_findings(inspection_id, &[other]).await.is_err());
        assert_eq!(store.list_findings(inspection_id).await.unwrap().len(), 1);

        store.replace_findings(inspection_id, &[]).await.unwrap();
        assert!(store.list_findings(inspection_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn photos_come_back_in_sort_order() {
        let store = InMemoryStore::new();
        let inspection_id = Uuid::new_v4();
        for order in [2, 0, 1] {
            let photo = InspectionPhoto {
                id: Uuid::new_v4(),
                inspection_id,
                photo_path: format!("p{order}.jpg"),
                zone: PhotoZone::Front,
                sort_order: order,
                uploaded_at: Utc::now(),
            };
            store.create_photo(&photo).await.unwrap();
        }
        let orders: Vec<i32> = store
            .list_photos(inspection_id)
            .await
            .unwrap()
            .iter()
            .map(|p| p.sort_order)
            .collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn finding_batch_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let inspection_id = Uuid::new_v4();
        let first = finding(inspection_id, FindingZone::Front, Severity::Minor);
        store.create_findings(&[first.clone()]).await.unwrap();

        let fresh = finding(inspection_id, FindingZone::Rear, Severity::Major);
        let result = store.create_findings(&[fresh.clone(), first]).await;
        assert!(result.is_err());
        assert!(store.get_finding(fresh.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn findings_listed_in_read_order() {
        let store = InMemoryStore::new();
        let inspection_id = Uuid::new_v4();
        store
            .create_findings(&[
                finding(inspection_id, FindingZone::Rear, Severity::Minor),
                finding(inspection_id, FindingZone::Front, Severity::Major),
                finding(Uuid::new_v4(), FindingZone::Front, Severity::Major),
            ])
            .await
            .unwrap();
        let listed = store.list_findings(inspection_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].severity, Severity::Major);
        assert_eq!(listed[1].zone, FindingZone::Rear);
    }

    #[tokio::test]
    async fn deleting_vehicle_cascades() {
        let store = InMemoryStore::new();
        let v = Vehicle::new("Ford", "Ranger", 2018, 90_000);
        store.create_vehicle(&v).await.unwrap();
        let insp = Inspection::new(v.id);
        store.create_inspection(&insp).await.unwrap();
        store
            .create_findings(&[finding(insp.id, FindingZone::Engine, Severity::Moderate)])
            .await
            .unwrap();

        assert!(store.delete_vehicle(v.id).await.unwrap());
        assert!(!store.delete_vehicle(v.id).await.unwrap());
        assert!(store.get_inspection(insp.id).await.unwrap().is_none());
        assert!(store.list_findings(insp.id).await.unwrap().is_empty());
    }
}
