pub mod error;
pub mod inspection;
pub mod traits;
pub mod vehicle;
pub mod zones;

pub use error::InspectError;
pub use inspection::{
    FindingPatch, FindingType, Inspection, InspectionFinding, InspectionPhoto, InspectionScores,
    InspectionStatus, InspectionView, Severity, VehiclePreview,
};
pub use traits::{
    BlobStore, DetectedFinding, EquipmentRepository, FindingRepository, InspectionRepository,
    PhotoAnalysis, PhotoAnalysisRequest, PhotoRepository, Repositories, SpecsRepository,
    VehicleRepository, VisionAnalyzer,
};
pub use vehicle::{
    EquipmentCategory, EquipmentSource, Vehicle, VehicleEquipment, VehiclePatch, VehicleSpecs,
    VehicleStatus,
};
pub use zones::{FindingZone, PhotoZone, ScoreCategory};
