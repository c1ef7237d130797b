use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use autoinspect_core::{
    FindingPatch, InspectError, PhotoZone, Vehicle, VehicleEquipment, VehiclePatch, VehicleSpecs,
};
use autoinspect_inspection::{Inspector, VehiclePage};

use crate::app::AppState;

/// Largest accepted photo upload.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/api/vehicles/:id",
            get(get_vehicle).patch(update_vehicle).delete(delete_vehicle),
        )
        .route("/api/vehicles/:id/preview", get(preview_vehicle))
        .route("/api/vehicles/:id/publish", post(publish_vehicle))
        .route("/api/vehicles/:id/specs", put(put_specs))
        .route("/api/vehicles/:id/equipment", put(put_equipment))
        .route("/api/vehicles/:id/photos", post(upload_photo))
        .route("/api/vehicles/:id/inspect", post(inspect_vehicle))
        .route("/api/vehicles/:id/report.pdf", get(vehicle_report))
        .route("/api/inspections/:id", get(get_inspection))
        .route("/api/inspections/:id/approve", post(approve_inspection))
        .route("/api/findings/:id", patch(update_finding))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Maps service errors onto HTTP statuses with a `{"error": ...}` body.
pub struct ApiError(InspectError);

impl From<InspectError> for ApiError {
    fn from(err: InspectError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InspectError::Validation(_) | InspectError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            InspectError::NotFound { .. } => StatusCode::NOT_FOUND,
            InspectError::Provider { .. } => StatusCode::BAD_GATEWAY,
            InspectError::Storage(_) | InspectError::Internal(_) | InspectError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "autoinspect",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Deserialize)]
struct NewVehicle {
    brand: String,
    model: String,
    year: i32,
    #[serde(default)]
    mileage_km: i64,
    plate: Option<String>,
    version: Option<String>,
    trim: Option<String>,
    color_exterior: Option<String>,
    color_interior: Option<String>,
    price_usd: Option<f64>,
    branch: Option<String>,
    origin: Option<String>,
}

impl From<NewVehicle> for Vehicle {
    fn from(input: NewVehicle) -> Self {
        let mut vehicle = Vehicle::new(input.brand, input.model, input.year, input.mileage_km);
        vehicle.plate = input.plate;
        vehicle.version = input.version;
        vehicle.trim = input.trim;
        vehicle.color_exterior = input.color_exterior;
        vehicle.color_interior = input.color_interior;
        vehicle.price_usd = input.price_usd;
        vehicle.branch = input.branch;
        vehicle.origin = input.origin;
        vehicle
    }
}

async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewVehicle>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    let vehicle = state.vehicles.create(input.into()).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<usize>,
    page_size: Option<usize>,
}

async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<VehiclePage>> {
    let page = state
        .vehicles
        .list(params.page.unwrap_or(1), params.page_size.unwrap_or(0))
        .await?;
    Ok(Json(page))
}

async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vehicle>> {
    Ok(Json(state.vehicles.get(id).await?))
}

async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<VehiclePatch>,
) -> ApiResult<Json<Vehicle>> {
    Ok(Json(state.vehicles.update(id, patch).await?))
}

async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.vehicles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn preview_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.vehicles.preview(id).await?))
}

async fn publish_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vehicle>> {
    Ok(Json(state.vehicles.publish(id).await?))
}

async fn put_specs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(specs): Json<VehicleSpecs>,
) -> ApiResult<Json<VehicleSpecs>> {
    Ok(Json(state.vehicles.upsert_specs(id, specs).await?))
}

async fn put_equipment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(items): Json<Vec<VehicleEquipment>>,
) -> ApiResult<Json<Value>> {
    let items = state.vehicles.replace_equipment(id, items).await?;
    Ok(Json(json!({ "equipment": items })))
}

#[derive(Debug, Deserialize)]
struct PhotoParams {
    zone: PhotoZone,
    filename: Option<String>,
    inspector_name: Option<String>,
    inspector_branch: Option<String>,
}

/// Raw image bytes in the body; metadata in the query string.
async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<PhotoParams>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let filename = params.filename.unwrap_or_else(|| format!("{}.jpg", params.zone));
    let photo = state
        .inspections
        .upload_vehicle_photo(
            id,
            params.zone,
            body,
            &filename,
            Inspector {
                name: params.inspector_name,
                branch: params.inspector_branch,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

async fn inspect_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.inspections.run_vehicle_inspection(id).await?))
}

async fn vehicle_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let (_, pdf) = state.reports.generate_report(id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=\"inspection_report.pdf\"",
            ),
        ],
        pdf,
    )
        .into_response())
}

async fn get_inspection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.inspections.inspection_view(id).await?))
}

async fn approve_inspection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.inspections.approve_inspection(id).await?))
}

async fn update_finding(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<FindingPatch>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.inspections.update_finding(id, patch).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoinspect_core::{
        DetectedFinding, FindingType, FindingZone, PhotoAnalysis, Repositories, Severity,
    };
    use autoinspect_report::ReportOptions;
    use autoinspect_store::{InMemoryBlobStore, InMemoryStore};
    use autoinspect_vision::MockVisionProvider;

    async fn serve() -> String {
        let mock = MockVisionProvider::new().with_zone(
            FindingZone::Front,
            PhotoAnalysis {
                score: 6,
                findings: vec![DetectedFinding {
                    finding_type: FindingType::Dent,
                    severity: Severity::Major,
                    location: "hood".into(),
                    description: "large dent".into(),
                    confidence: 0.95,
                }],
            },
        );
        let state = AppState::new(
            Repositories::from_store(Arc::new(InMemoryStore::new())),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(mock),
            2,
            ReportOptions::default(),
        );
        let app = build_router(Arc::new(state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let base = serve().await;
        let body: Value = reqwest::get(format!("{base}/api/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn full_inspection_flow() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/api/vehicles"))
            .json(&json!({"brand": "Peugeot", "model": "208", "year": 2022, "mileage_km": 18000}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let vehicle: Value = resp.json().await.unwrap();
        let id = vehicle["id"].as_str().unwrap().to_string();

        let resp = client
            .post(format!("{base}/api/vehicles/{id}/photos?zone=front&filename=front.jpg&inspector_name=Lu"))
            .body(vec![0xFF, 0xD8, 0xFF, 0xE0])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);

        let resp = client
            .post(format!("{base}/api/vehicles/{id}/inspect"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let view: Value = resp.json().await.unwrap();
        assert_eq!(view["inspection"]["status"], "completed");
        assert_eq!(view["inspection"]["score_exterior"], 6);
        assert_eq!(view["inspection"]["inspector_name"], "Lu");
        assert_eq!(view["findings"][0]["severity"], "major");
        let finding_id = view["findings"][0]["id"].as_str().unwrap().to_string();
        let inspection_id = view["inspection"]["id"].as_str().unwrap().to_string();

        let resp = client
            .patch(format!("{base}/api/findings/{finding_id}"))
            .json(&json!({"confirmed_by_human": true}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let resp = client
            .post(format!("{base}/api/inspections/{inspection_id}/approve"))
            .send()
            .await
            .unwrap();
        let approved: Value = resp.json().await.unwrap();
        assert_eq!(approved["status"], "approved");

        let resp = client
            .get(format!("{base}/api/vehicles/{id}/report.pdf"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "application/pdf");
        let pdf = resp.bytes().await.unwrap();
        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(String::from_utf8_lossy(&pdf).contains("[Confirmed by inspector]"));
    }

    #[tokio::test]
    async fn errors_map_to_statuses() {
        let base = serve().await;
        let client = reqwest::Client::new();

        let resp = client
            .get(format!("{base}/api/vehicles/{}", Uuid::new_v4()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("vehicle not found"));

        let resp = client
            .post(format!("{base}/api/vehicles"))
            .json(&json!({"brand": "", "model": "X", "year": 2020}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        let vehicle: Value = client
            .post(format!("{base}/api/vehicles"))
            .json(&json!({"brand": "Jeep", "model": "Renegade", "year": 2020}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = vehicle["id"].as_str().unwrap();

        // No inspection yet.
        let resp = client
            .post(format!("{base}/api/vehicles/{id}/inspect"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = client
            .post(format!("{base}/api/vehicles/{id}/photos?zone=engine"))
            .body(Vec::<u8>::new())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn catalogue_endpoints() {
        let base = serve().await;
        let client = reqwest::Client::new();
        let vehicle: Value = client
            .post(format!("{base}/api/vehicles"))
            .json(&json!({"brand": "BYD", "model": "Dolphin", "year": 2024, "price_usd": 21990.0}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let id = vehicle["id"].as_str().unwrap();

        let resp = client
            .put(format!("{base}/api/vehicles/{id}/specs"))
            .json(&json!({"engine_type": "Electric", "power_hp": 94.0}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let resp = client
            .put(format!("{base}/api/vehicles/{id}/equipment"))
            .json(&json!([{"category": "safety", "feature_name": "6 airbags", "is_standard": true}]))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let preview: Value = client
            .get(format!("{base}/api/vehicles/{id}/preview"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(preview["specs"]["engine_type"], "Electric");
        assert_eq!(preview["equipment"][0]["feature_name"], "6 airbags");

        let published: Value = client
            .post(format!("{base}/api/vehicles/{id}/publish"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(published["status"], "published");

        let page: Value = client
            .get(format!("{base}/api/vehicles?page=1&page_size=500"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(page["total"], 1);
        assert_eq!(page["page_size"], 20);

        let resp = client
            .delete(format!("{base}/api/vehicles/{id}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);
    }
}
