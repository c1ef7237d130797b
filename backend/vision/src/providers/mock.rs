use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;

use autoinspect_core::{FindingZone, PhotoAnalysis, PhotoAnalysisRequest, VisionAnalyzer};

/// A deterministic vision provider that returns canned analyses per zone.
///
/// Zones without a canned analysis get the default: score 10, no findings.
pub struct MockVisionProvider {
    default: PhotoAnalysis,
    by_zone: HashMap<FindingZone, PhotoAnalysis>,
    failing: HashSet<FindingZone>,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    pub fn new() -> Self {
        Self {
            default: PhotoAnalysis {
                score: 10,
                findings: Vec::new(),
            },
            by_zone: HashMap::new(),
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_default(mut self, analysis: PhotoAnalysis) -> Self {
        self.default = analysis;
        self
    }

    pub fn with_zone(mut self, zone: FindingZone, analysis: PhotoAnalysis) -> Self {
        self.by_zone.insert(zone, analysis);
        self
    }

    /// Make every call for `zone` fail.
    pub fn failing_for(mut self, zone: FindingZone) -> Self {
        self.failing.insert(zone);
        self
    }

    /// Number of `analyze` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockVisionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionAnalyzer for MockVisionProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, request: &PhotoAnalysisRequest) -> Result<PhotoAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&request.zone) {
            anyhow::bail!("mock provider failure for zone {}", request.zone);
        }
        Ok(self
            .by_zone
            .get(&request.zone)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}
