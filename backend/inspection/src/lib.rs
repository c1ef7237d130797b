//! Inspection scoring and the services around it.
//!
//! [`InspectionRunner`] turns uploaded photos into scores and findings;
//! [`InspectionService`] and [`VehicleService`] cover the rest of the
//! inspection and catalogue lifecycle.

pub mod orchestrator;
pub mod scoring;
pub mod service;
pub mod vehicles;

pub use orchestrator::{InspectionRunner, RunSummary, DEFAULT_MAX_CONCURRENCY};
pub use scoring::{aggregate, mechanical_base, overall_score, truncating_mean};
pub use service::{photo_path, InspectionService, Inspector};
pub use vehicles::{validate_vehicle, VehiclePage, VehicleService};
