//! Inspection runs: photos in, scores and findings out.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::{Datelike, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use autoinspect_core::{
    BlobStore, DetectedFinding, InspectError, Inspection, InspectionFinding, InspectionPhoto,
    InspectionScores, InspectionStatus, PhotoAnalysis, PhotoAnalysisRequest, Repositories,
    Vehicle, VisionAnalyzer,
};

use crate::scoring::{aggregate, mechanical_base};

/// Photos analysed at once when no limit is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// What one run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The inspection as persisted at the end of the run.
    pub inspection: Inspection,
    pub scores: InspectionScores,
    pub photos_analyzed: usize,
    pub photos_failed: usize,
    pub findings_created: usize,
    /// False when the finding batch could not be stored.
    pub findings_persisted: bool,
}

struct PhotoOutcome {
    photo: InspectionPhoto,
    result: Result<PhotoAnalysis>,
}

/// Drives an inspection from uploaded photos to stored scores and findings.
pub struct InspectionRunner {
    repos: Repositories,
    blobs: Arc<dyn BlobStore>,
    analyzer: Arc<dyn VisionAnalyzer>,
    max_concurrency: usize,
    current_year: Option<i32>,
}

impl InspectionRunner {
    pub fn new(
        repos: Repositories,
        blobs: Arc<dyn BlobStore>,
        analyzer: Arc<dyn VisionAnalyzer>,
    ) -> Self {
        Self {
            repos,
            blobs,
            analyzer,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            current_year: None,
        }
    }

    /// Zero is treated as one.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// Pin the year used for vehicle age instead of the system clock.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    /// Analyse every photo of the inspection and store the outcome.
    ///
    /// Per-photo read or provider failures are logged and skipped, and a
    /// failed finding batch is logged. Only a failure to store the final
    /// inspection is returned, leaving the inspection in `processing`.
    /// Dropping the returned future before it resolves never marks the
    /// inspection completed.
    pub async fn run_inspection(
        &self,
        vehicle: &Vehicle,
        inspection_id: Uuid,
    ) -> Result<RunSummary, InspectError> {
        let start = Instant::now();
        let mut inspection = self
            .repos
            .inspections
            .get_inspection(inspection_id)
            .await
            .map_err(|e| InspectError::storage("loading inspection", e))?
            .ok_or_else(|| InspectError::not_found("inspection", inspection_id))?;

        if inspection.vehicle_id != vehicle.id {
            return Err(InspectError::Validation(format!(
                "inspection {inspection_id} does not belong to vehicle {}",
                vehicle.id
            )));
        }
        if !inspection.status.can_transition_to(InspectionStatus::Processing) {
            return Err(InspectError::InvalidStatus(format!(
                "cannot run an inspection that is {}",
                inspection.status
            )));
        }

        let photos = self
            .repos
            .photos
            .list_photos(inspection_id)
            .await
            .map_err(|e| InspectError::storage("listing photos", e))?;
        if photos.is_empty() {
            return Err(InspectError::Validation("no photos uploaded".to_string()));
        }

        inspection.status = InspectionStatus::Processing;
        inspection.updated_at = Utc::now();
        self.repos
            .inspections
            .update_inspection(&inspection)
            .await
            .map_err(|e| InspectError::storage("marking inspection processing", e))?;

        info!(
            inspection_id = %inspection_id,
            vehicle_id = %vehicle.id,
            photos = photos.len(),
            provider = self.analyzer.name(),
            "Inspection run started"
        );

        let photo_count = photos.len();
        let outcomes = self.analyze_photos(photos, vehicle.description()).await;

        let mut observations = Vec::with_capacity(outcomes.len());
        let mut findings = Vec::new();
        let mut failed = 0;
        for outcome in outcomes {
            let photo = outcome.photo;
            match outcome.result {
                Ok(analysis) => {
                    observations.push((photo.zone, analysis.score));
                    findings.extend(
                        analysis
                            .findings
                            .into_iter()
                            .map(|f| to_finding(inspection_id, &photo, f)),
                    );
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        inspection_id = %inspection_id,
                        photo_id = %photo.id,
                        zone = %photo.zone,
                        error = %format!("{e:#}"),
                        "Photo analysis failed; skipping"
                    );
                }
            }
        }

        let current_year = self.current_year.unwrap_or_else(|| Utc::now().year());
        let scores = aggregate(
            &observations,
            mechanical_base(vehicle.year, vehicle.mileage_km, current_year),
        );

        // A re-run supersedes the findings of the previous run.
        let findings_persisted = match self
            .repos
            .findings
            .replace_findings(inspection_id, &findings)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(
                    inspection_id = %inspection_id,
                    findings = findings.len(),
                    error = %format!("{e:#}"),
                    "Failed to store findings"
                );
                false
            }
        };

        let now = Utc::now();
        inspection.apply_scores(&scores);
        inspection.findings_count = findings.len() as i32;
        inspection.photos_count = photo_count as i32;
        inspection.status = InspectionStatus::Completed;
        inspection.inspected_at = Some(now);
        inspection.updated_at = now;
        self.repos
            .inspections
            .update_inspection(&inspection)
            .await
            .map_err(|e| InspectError::Internal(format!("saving inspection result: {e:#}")))?;

        info!(
            inspection_id = %inspection_id,
            overall = scores.overall,
            analyzed = observations.len(),
            failed,
            findings = findings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Inspection run completed"
        );

        Ok(RunSummary {
            inspection,
            scores,
            photos_analyzed: observations.len(),
            photos_failed: failed,
            findings_created: findings.len(),
            findings_persisted,
        })
    }

    /// Analyse photos concurrently, at most `max_concurrency` at a time.
    /// Outcomes come back in photo sort order.
    async fn analyze_photos(
        &self,
        photos: Vec<InspectionPhoto>,
        vehicle_description: String,
    ) -> Vec<PhotoOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for photo in photos {
            let semaphore = Arc::clone(&semaphore);
            let blobs = Arc::clone(&self.blobs);
            let analyzer = Arc::clone(&self.analyzer);
            let description = vehicle_description.clone();
            join_set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => analyze_photo(&*blobs, &*analyzer, &photo, description).await,
                    Err(e) => Err(e.into()),
                };
                PhotoOutcome { photo, result }
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(error = %e, "Photo analysis task panicked"),
            }
        }
        outcomes.sort_by(|a, b| {
            a.photo
                .sort_order
                .cmp(&b.photo.sort_order)
                .then(a.photo.id.cmp(&b.photo.id))
        });
        outcomes
    }
}

async fn analyze_photo(
    blobs: &dyn BlobStore,
    analyzer: &dyn VisionAnalyzer,
    photo: &InspectionPhoto,
    vehicle_description: String,
) -> Result<PhotoAnalysis> {
    let image = blobs.read(&photo.photo_path).await?;
    let request = PhotoAnalysisRequest {
        image,
        zone: photo.zone.finding_zone(),
        vehicle_description,
    };
    let analysis = analyzer.analyze(&request).await?;
    debug!(
        photo_id = %photo.id,
        zone = %photo.zone,
        score = analysis.score,
        findings = analysis.findings.len(),
        "Photo analysed"
    );
    Ok(analysis)
}

fn to_finding(inspection_id: Uuid, photo: &InspectionPhoto, detected: DetectedFinding) -> InspectionFinding {
    InspectionFinding {
        id: Uuid::new_v4(),
        inspection_id,
        photo_path: Some(photo.photo_path.clone()),
        zone: photo.zone.finding_zone(),
        finding_type: detected.finding_type,
        severity: detected.severity,
        description: describe(&detected.location, &detected.description),
        ai_confidence: Some(detected.confidence),
        confirmed_by_human: false,
    }
}

/// "location - description", or whichever half is present; `None` when
/// both are empty. Unlike a plain `"{location} - {description}"` join this
/// never yields a dangling "loc - " or an empty string.
fn describe(location: &str, description: &str) -> Option<String> {
    match (location.is_empty(), description.is_empty()) {
        (false, false) => Some(format!("{location} - {description}")),
        (false, true) => Some(location.to_string()),
        (true, false) => Some(description.to_string()),
        (true, true) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::bail;
    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use autoinspect_core::{
        FindingRepository, FindingType, FindingZone, InspectionRepository, PhotoRepository,
        PhotoZone, Severity, VehicleRepository,
    };
    use autoinspect_store::{InMemoryBlobStore, InMemoryStore};
    use autoinspect_vision::MockVisionProvider;

    struct Fixture {
        store: Arc<InMemoryStore>,
        blobs: Arc<InMemoryBlobStore>,
        vehicle: Vehicle,
        inspection: Inspection,
    }

    async fn fixture(zones: &[PhotoZone]) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let vehicle = Vehicle::new("Toyota", "Corolla", 2022, 30_000);
        store.create_vehicle(&vehicle).await.unwrap();
        let inspection = Inspection::new(vehicle.id);
        store.create_inspection(&inspection).await.unwrap();

        for (i, zone) in zones.iter().enumerate() {
            let path = format!("inspections/{}/photos/{i}.jpg", inspection.id);
            blobs
                .write(&path, Bytes::from(vec![0xFF, 0xD8, 0xFF, i as u8]))
                .await
                .unwrap();
            store
                .create_photo(&InspectionPhoto {
                    id: Uuid::new_v4(),
                    inspection_id: inspection.id,
                    photo_path: path,
                    zone: *zone,
                    sort_order: i as i32,
                    uploaded_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        Fixture {
            store,
            blobs,
            vehicle,
            inspection,
        }
    }

    fn runner(f: &Fixture, analyzer: impl VisionAnalyzer + 'static) -> InspectionRunner {
        InspectionRunner::new(
            Repositories::from_store(f.store.clone()),
            f.blobs.clone(),
            Arc::new(analyzer),
        )
        .with_current_year(2026)
    }

    fn dent(confidence: f64) -> DetectedFinding {
        DetectedFinding {
            finding_type: FindingType::Dent,
            severity: Severity::Moderate,
            location: "valve cover".into(),
            description: "shallow dent".into(),
            confidence,
        }
    }

    #[tokio::test]
    async fn engine_photo_sets_mechanical_and_files_finding() {
        let f = fixture(&[PhotoZone::Engine]).await;
        let mock = MockVisionProvider::new().with_zone(
            FindingZone::Engine,
            PhotoAnalysis {
                score: 6,
                findings: vec![dent(0.8)],
            },
        );
        let summary = runner(&f, mock).run_inspection(&f.vehicle, f.inspection.id).await.unwrap();

        assert_eq!(summary.scores.mechanical, 6);
        assert_eq!(summary.scores.exterior, 10);
        assert_eq!(summary.scores.interior, 10);
        assert_eq!(summary.scores.tires, 8);
        assert_eq!(summary.findings_created, 1);

        let stored = f.store.get_inspection(f.inspection.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InspectionStatus::Completed);
        assert_eq!(stored.score_mechanical, Some(6));
        assert_eq!(stored.score_overall, Some(summary.scores.overall));
        assert_eq!(stored.findings_count, 1);
        assert_eq!(stored.photos_count, 1);
        assert!(stored.inspected_at.is_some());

        let findings = f.store.list_findings(f.inspection.id).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].zone, FindingZone::Engine);
        assert_eq!(findings[0].severity, Severity::Moderate);
        assert_eq!(findings[0].ai_confidence, Some(0.8));
        assert_eq!(findings[0].description.as_deref(), Some("valve cover - shallow dent"));
        assert!(findings[0].photo_path.as_deref().unwrap().ends_with("0.jpg"));
        assert!(!findings[0].confirmed_by_human);
    }

    #[tokio::test]
    async fn zero_photos_is_rejected_without_side_effects() {
        let f = fixture(&[]).await;
        let mock = Arc::new(MockVisionProvider::new());
        let runner = InspectionRunner::new(
            Repositories::from_store(f.store.clone()),
            f.blobs.clone(),
            mock.clone(),
        );
        let err = runner.run_inspection(&f.vehicle, f.inspection.id).await.unwrap_err();
        assert!(matches!(err, InspectError::Validation(ref m) if m.contains("no photos")));

        let stored = f.store.get_inspection(f.inspection.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InspectionStatus::Pending);
        assert_eq!(stored.score_overall, None);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_inspection_is_not_found() {
        let f = fixture(&[PhotoZone::Front]).await;
        let err = runner(&f, MockVisionProvider::new())
            .run_inspection(&f.vehicle, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, InspectError::NotFound { entity: "inspection", .. }));
    }

    #[tokio::test]
    async fn approved_inspection_cannot_rerun() {
        let f = fixture(&[PhotoZone::Front]).await;
        let mut approved = f.inspection.clone();
        approved.status = InspectionStatus::Approved;
        f.store.update_inspection(&approved).await.unwrap();

        let err = runner(&f, MockVisionProvider::new())
            .run_inspection(&f.vehicle, f.inspection.id)
            .await
            .unwrap_err();
        assert!(matches!(err, InspectError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn completed_inspection_can_rerun() {
        let f = fixture(&[PhotoZone::Front]).await;
        let runner = runner(&f, MockVisionProvider::new());
        runner.run_inspection(&f.vehicle, f.inspection.id).await.unwrap();
        let again = runner.run_inspection(&f.vehicle, f.inspection.id).await.unwrap();
        assert_eq!(again.inspection.status, InspectionStatus::Completed);
    }

    #[tokio::test]
    async fn rerun_replaces_previous_findings() {
        let f = fixture(&[PhotoZone::Engine]).await;
        let mock = MockVisionProvider::new().with_zone(
            FindingZone::Engine,
            PhotoAnalysis {
                score: 6,
                findings: vec![dent(0.8)],
            },
        );
        let runner = runner(&f, mock);
        let first = runner.run_inspection(&f.vehicle, f.inspection.id).await.unwrap();
        let second = runner.run_inspection(&f.vehicle, f.inspection.id).await.unwrap();
        assert_eq!(second.scores, first.scores);

        let stored = f.store.get_inspection(f.inspection.id).await.unwrap().unwrap();
        let findings = f.store.list_findings(f.inspection.id).await.unwrap();
        assert_eq!(stored.findings_count, 1);
        assert_eq!(findings.len(), stored.findings_count as usize);
    }

    #[tokio::test]
    async fn clean_rerun_clears_old_findings() {
        let f = fixture(&[PhotoZone::Front]).await;
        let dented = MockVisionProvider::new().with_default(PhotoAnalysis {
            score: 6,
            findings: vec![dent(0.7), dent(0.6)],
        });
        runner(&f, dented)
            .run_inspection(&f.vehicle, f.inspection.id)
            .await
            .unwrap();
        assert_eq!(f.store.list_findings(f.inspection.id).await.unwrap().len(), 2);

        let summary = runner(&f, MockVisionProvider::new())
            .run_inspection(&f.vehicle, f.inspection.id)
            .await
            .unwrap();
        assert_eq!(summary.inspection.findings_count, 0);
        assert!(f.store.list_findings(f.inspection.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_for_one_photo_still_completes() {
        let f = fixture(&[PhotoZone::Front, PhotoZone::Dashboard, PhotoZone::Engine]).await;
        let mock = MockVisionProvider::new()
            .with_default(PhotoAnalysis {
                score: 7,
                findings: vec![],
            })
            .failing_for(FindingZone::InteriorFront);
        let summary = runner(&f, mock).run_inspection(&f.vehicle, f.inspection.id).await.unwrap();

        assert_eq!(summary.photos_analyzed, 2);
        assert_eq!(summary.photos_failed, 1);
        assert_eq!(summary.scores.exterior, 7);
        // Interior photo failed, so the default applies.
        assert_eq!(summary.scores.interior, 10);
        assert_eq!(summary.scores.mechanical, 7);
        assert_eq!(summary.inspection.photos_count, 3);
        assert_eq!(summary.inspection.status, InspectionStatus::Completed);
    }

    #[tokio::test]
    async fn missing_blob_is_skipped() {
        let f = fixture(&[PhotoZone::Front]).await;
        f.store
            .create_photo(&InspectionPhoto {
                id: Uuid::new_v4(),
                inspection_id: f.inspection.id,
                photo_path: "inspections/gone.jpg".into(),
                zone: PhotoZone::Rear,
                sort_order: 1,
                uploaded_at: Utc::now(),
            })
            .await
            .unwrap();
        let summary = runner(&f, MockVisionProvider::new())
            .run_inspection(&f.vehicle, f.inspection.id)
            .await
            .unwrap();
        assert_eq!(summary.photos_analyzed, 1);
        assert_eq!(summary.photos_failed, 1);
    }

    #[tokio::test]
    async fn all_photos_failing_uses_defaults() {
        let f = fixture(&[PhotoZone::Front]).await;
        let mock = MockVisionProvider::new().failing_for(FindingZone::Front);
        let summary = runner(&f, mock).run_inspection(&f.vehicle, f.inspection.id).await.unwrap();
        assert_eq!(summary.photos_analyzed, 0);
        // 2022 model with 30 000 km in 2026: age 4 and mileage over 20 000.
        assert_eq!(summary.scores.mechanical, 8);
        assert_eq!(summary.scores.exterior, 10);
    }

    #[tokio::test]
    async fn scores_do_not_depend_on_photo_order() {
        let zones = [PhotoZone::Front, PhotoZone::Rear, PhotoZone::Left, PhotoZone::Dashboard];
        let mut reversed = zones;
        reversed.reverse();

        let mut overall = Vec::new();
        for set in [&zones[..], &reversed[..]] {
            let f = fixture(set).await;
            let mock = MockVisionProvider::new()
                .with_zone(FindingZone::Front, PhotoAnalysis { score: 9, findings: vec![] })
                .with_zone(FindingZone::Rear, PhotoAnalysis { score: 4, findings: vec![] })
                .with_zone(FindingZone::Left, PhotoAnalysis { score: 6, findings: vec![] })
                .with_zone(FindingZone::InteriorFront, PhotoAnalysis { score: 5, findings: vec![] });
            let summary = runner(&f, mock)
                .with_max_concurrency(2)
                .run_inspection(&f.vehicle, f.inspection.id)
                .await
                .unwrap();
            overall.push(summary.scores);
        }
        assert_eq!(overall[0], overall[1]);
        assert_eq!(overall[0].exterior, 6);
        assert_eq!(overall[0].interior, 5);
    }

    #[tokio::test]
    async fn findings_carry_their_photo() {
        let f = fixture(&[PhotoZone::FrontLeft, PhotoZone::RearRight, PhotoZone::InteriorRear]).await;
        let mock = MockVisionProvider::new().with_default(PhotoAnalysis {
            score: 8,
            findings: vec![dent(0.5)],
        });
        runner(&f, mock)
            .with_max_concurrency(3)
            .run_inspection(&f.vehicle, f.inspection.id)
            .await
            .unwrap();

        let photos = f.store.list_photos(f.inspection.id).await.unwrap();
        let findings = f.store.list_findings(f.inspection.id).await.unwrap();
        assert_eq!(findings.len(), 3);
        for finding in &findings {
            let photo = photos
                .iter()
                .find(|p| finding.photo_path.as_deref() == Some(p.photo_path.as_str()))
                .unwrap();
            assert_eq!(finding.zone, photo.zone.finding_zone());
        }
    }

    /// Finding repository whose batch insert always fails.
    struct BrokenFindings;

    #[async_trait]
    impl FindingRepository for BrokenFindings {
        async fn create_findings(&self, _findings: &[InspectionFinding]) -> Result<()> {
            bail!("database is locked")
        }
        async fn replace_findings(
            &self,
            _inspection_id: Uuid,
            _findings: &[InspectionFinding],
        ) -> Result<()> {
            bail!("database is locked")
        }
        async fn list_findings(&self, _inspection_id: Uuid) -> Result<Vec<InspectionFinding>> {
            Ok(Vec::new())
        }
        async fn get_finding(&self, _id: Uuid) -> Result<Option<InspectionFinding>> {
            Ok(None)
        }
        async fn update_finding(&self, _finding: &InspectionFinding) -> Result<()> {
            bail!("database is locked")
        }
    }

    #[tokio::test]
    async fn finding_batch_failure_still_completes() {
        let f = fixture(&[PhotoZone::Front]).await;
        let mut repos = Repositories::from_store(f.store.clone());
        repos.findings = Arc::new(BrokenFindings);
        let mock = MockVisionProvider::new().with_default(PhotoAnalysis {
            score: 5,
            findings: vec![dent(0.9), dent(0.4)],
        });
        let summary = InspectionRunner::new(repos, f.blobs.clone(), Arc::new(mock))
            .run_inspection(&f.vehicle, f.inspection.id)
            .await
            .unwrap();

        assert!(!summary.findings_persisted);
        assert_eq!(summary.findings_created, 2);
        let stored = f.store.get_inspection(f.inspection.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InspectionStatus::Completed);
        assert_eq!(stored.findings_count, 2);
    }

    /// Lets the `processing` update through and rejects the final one.
    struct RejectsCompletion(Arc<InMemoryStore>);

    #[async_trait]
    impl InspectionRepository for RejectsCompletion {
        async fn create_inspection(&self, inspection: &Inspection) -> Result<()> {
            self.0.create_inspection(inspection).await
        }
        async fn get_inspection(&self, id: Uuid) -> Result<Option<Inspection>> {
            self.0.get_inspection(id).await
        }
        async fn latest_inspection(&self, vehicle_id: Uuid) -> Result<Option<Inspection>> {
            self.0.latest_inspection(vehicle_id).await
        }
        async fn update_inspection(&self, inspection: &Inspection) -> Result<()> {
            if inspection.status == InspectionStatus::Completed {
                bail!("disk I/O error");
            }
            self.0.update_inspection(inspection).await
        }
    }

    #[tokio::test]
    async fn result_update_failure_is_surfaced() {
        let f = fixture(&[PhotoZone::Front]).await;
        let mut repos = Repositories::from_store(f.store.clone());
        repos.inspections = Arc::new(RejectsCompletion(f.store.clone()));
        let err = InspectionRunner::new(repos, f.blobs.clone(), Arc::new(MockVisionProvider::new()))
            .run_inspection(&f.vehicle, f.inspection.id)
            .await
            .unwrap_err();

        assert!(matches!(err, InspectError::Internal(ref m) if m.contains("disk I/O error")));
        let stored = f.store.get_inspection(f.inspection.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InspectionStatus::Processing);
        assert_eq!(stored.score_overall, None);
    }

    /// Never answers within any reasonable test timeout.
    struct StalledAnalyzer;

    #[async_trait]
    impl VisionAnalyzer for StalledAnalyzer {
        fn name(&self) -> &str {
            "stalled"
        }
        async fn analyze(&self, _request: &PhotoAnalysisRequest) -> Result<PhotoAnalysis> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            bail!("unreachable")
        }
    }

    #[tokio::test]
    async fn cancelled_run_never_completes() {
        let f = fixture(&[PhotoZone::Front]).await;
        let runner = runner(&f, StalledAnalyzer);
        let run = runner.run_inspection(&f.vehicle, f.inspection.id);
        assert!(tokio::time::timeout(Duration::from_millis(50), run).await.is_err());

        let stored = f.store.get_inspection(f.inspection.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InspectionStatus::Processing);
    }

    #[tokio::test]
    async fn foreign_vehicle_is_rejected() {
        let f = fixture(&[PhotoZone::Front]).await;
        let other = Vehicle::new("Ford", "Ka", 2015, 90_000);
        let err = runner(&f, MockVisionProvider::new())
            .run_inspection(&other, f.inspection.id)
            .await
            .unwrap_err();
        assert!(matches!(err, InspectError::Validation(_)));
    }

    #[test]
    fn description_joins_present_parts() {
        assert_eq!(describe("hood", "chip").as_deref(), Some("hood - chip"));
        assert_eq!(describe("hood", "").as_deref(), Some("hood"));
        assert_eq!(describe("", "chip").as_deref(), Some("chip"));
        assert_eq!(describe("", ""), None);
    }
}
