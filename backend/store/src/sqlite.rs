//! SQLite-backed durable store for vehicles, inspections and findings.
//!
//! Identifiers and timestamps are stored as text (UUID and fixed-width
//! RFC 3339, so text order is time order), enums by their snake_case string
//! form. Vehicle specs are kept as one JSON document per vehicle.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use autoinspect_core::{
    EquipmentRepository, FindingRepository, Inspection, InspectionFinding, InspectionPhoto,
    InspectionRepository, PhotoRepository, SpecsRepository, Vehicle, VehicleEquipment,
    VehicleRepository, VehicleSpecs,
};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS vehicles (
        id             TEXT PRIMARY KEY,
        plate          TEXT,
        brand          TEXT NOT NULL,
        model          TEXT NOT NULL,
        version        TEXT,
        trim           TEXT,
        year           INTEGER NOT NULL,
        mileage_km     INTEGER NOT NULL,
        color_exterior TEXT,
        color_interior TEXT,
        price_usd      REAL,
        branch         TEXT,
        origin         TEXT,
        status         TEXT NOT NULL,
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_vehicles_created ON vehicles(created_at);

    CREATE TABLE IF NOT EXISTS vehicle_specs (
        vehicle_id TEXT PRIMARY KEY REFERENCES vehicles(id) ON DELETE CASCADE,
        data       TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS vehicle_equipment (
        id                  TEXT PRIMARY KEY,
        vehicle_id          TEXT NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
        category            TEXT NOT NULL,
        feature_name        TEXT NOT NULL,
        feature_description TEXT,
        is_standard         INTEGER NOT NULL,
        is_confirmed        INTEGER NOT NULL,
        source              TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_equipment_vehicle ON vehicle_equipment(vehicle_id);

    CREATE TABLE IF NOT EXISTS inspections (
        id               TEXT PRIMARY KEY,
        vehicle_id       TEXT NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
        inspector_name   TEXT,
        inspector_branch TEXT,
        score_overall    INTEGER,
        score_exterior   INTEGER,
        score_interior   INTEGER,
        score_mechanical INTEGER,
        score_tires      INTEGER,
        photos_count     INTEGER NOT NULL,
        findings_count   INTEGER NOT NULL,
        status           TEXT NOT NULL,
        report_path      TEXT,
        inspected_at     TEXT,
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_inspections_vehicle ON inspections(vehicle_id, created_at);

    CREATE TABLE IF NOT EXISTS inspection_photos (
        id            TEXT PRIMARY KEY,
        inspection_id TEXT NOT NULL REFERENCES inspections(id) ON DELETE CASCADE,
        photo_path    TEXT NOT NULL,
        zone          TEXT NOT NULL,
        sort_order    INTEGER NOT NULL,
        uploaded_at   TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_photos_inspection ON inspection_photos(inspection_id);

    CREATE TABLE IF NOT EXISTS inspection_findings (
        id                 TEXT PRIMARY KEY,
        inspection_id      TEXT NOT NULL REFERENCES inspections(id) ON DELETE CASCADE,
        photo_path         TEXT,
        zone               TEXT NOT NULL,
        finding_type       TEXT NOT NULL,
        severity           TEXT NOT NULL,
        description        TEXT,
        ai_confidence      REAL,
        confirmed_by_human INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_findings_inspection ON inspection_findings(inspection_id);
";

const VEHICLE_COLUMNS: &str = "id, plate, brand, model, version, trim, year, mileage_km, \
     color_exterior, color_interior, price_usd, branch, origin, status, created_at, updated_at";

const INSPECTION_COLUMNS: &str = "id, vehicle_id, inspector_name, inspector_branch, \
     score_overall, score_exterior, score_interior, score_mechanical, score_tires, \
     photos_count, findings_count, status, report_path, inspected_at, created_at, updated_at";

const PHOTO_COLUMNS: &str = "id, inspection_id, photo_path, zone, sort_order, uploaded_at";

const FINDING_COLUMNS: &str = "id, inspection_id, photo_path, zone, finding_type, severity, \
     description, ai_confidence, confirmed_by_human";

const EQUIPMENT_COLUMNS: &str = "id, vehicle_id, category, feature_name, feature_description, \
     is_standard, is_confirmed, source";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to enable WAL")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize schema")?;

        info!("SqliteStore opened at {:?}", path);
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

// ---------------------------------------------------------------------------
// Column conversion
// ---------------------------------------------------------------------------

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn get_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn get_opt_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| conversion_error(idx, e))
    })
    .transpose()
}

fn get_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

fn time_text(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_vehicle(row: &Row<'_>) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        id: get_uuid(row, 0)?,
        plate: row.get(1)?,
        brand: row.get(2)?,
        model: row.get(3)?,
        version: row.get(4)?,
        trim: row.get(5)?,
        year: row.get(6)?,
        mileage_km: row.get(7)?,
        color_exterior: row.get(8)?,
        color_interior: row.get(9)?,
        price_usd: row.get(10)?,
        branch: row.get(11)?,
        origin: row.get(12)?,
        status: get_enum(row, 13)?,
        created_at: get_time(row, 14)?,
        updated_at: get_time(row, 15)?,
    })
}

fn row_to_inspection(row: &Row<'_>) -> rusqlite::Result<Inspection> {
    Ok(Inspection {
        id: get_uuid(row, 0)?,
        vehicle_id: get_uuid(row, 1)?,
        inspector_name: row.get(2)?,
        inspector_branch: row.get(3)?,
        score_overall: row.get(4)?,
        score_exterior: row.get(5)?,
        score_interior: row.get(6)?,
        score_mechanical: row.get(7)?,
        score_tires: row.get(8)?,
        photos_count: row.get(9)?,
        findings_count: row.get(10)?,
        status: get_enum(row, 11)?,
        report_path: row.get(12)?,
        inspected_at: get_opt_time(row, 13)?,
        created_at: get_time(row, 14)?,
        updated_at: get_time(row, 15)?,
    })
}

fn row_to_photo(row: &Row<'_>) -> rusqlite::Result<InspectionPhoto> {
    Ok(InspectionPhoto {
        id: get_uuid(row, 0)?,
        inspection_id: get_uuid(row, 1)?,
        photo_path: row.get(2)?,
        zone: get_enum(row, 3)?,
        sort_order: row.get(4)?,
        uploaded_at: get_time(row, 5)?,
    })
}

fn row_to_finding(row: &Row<'_>) -> rusqlite::Result<InspectionFinding> {
    Ok(InspectionFinding {
        id: get_uuid(row, 0)?,
        inspection_id: get_uuid(row, 1)?,
        photo_path: row.get(2)?,
        zone: get_enum(row, 3)?,
        finding_type: get_enum(row, 4)?,
        severity: get_enum(row, 5)?,
        description: row.get(6)?,
        ai_confidence: row.get(7)?,
        confirmed_by_human: row.get(8)?,
    })
}

fn row_to_equipment(row: &Row<'_>) -> rusqlite::Result<VehicleEquipment> {
    Ok(VehicleEquipment {
        id: get_uuid(row, 0)?,
        vehicle_id: get_uuid(row, 1)?,
        category: get_enum(row, 2)?,
        feature_name: row.get(3)?,
        feature_description: row.get(4)?,
        is_standard: row.get(5)?,
        is_confirmed: row.get(6)?,
        source: get_enum(row, 7)?,
    })
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

#[async_trait]
impl VehicleRepository for SqliteStore {
    async fn create_vehicle(&self, v: &Vehicle) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO vehicles ({VEHICLE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                v.id.to_string(),
                v.plate,
                v.brand,
                v.model,
                v.version,
                v.trim,
                v.year,
                v.mileage_km,
                v.color_exterior,
                v.color_interior,
                v.price_usd,
                v.branch,
                v.origin,
                v.status.as_str(),
                time_text(&v.created_at),
                time_text(&v.updated_at),
            ],
        )
        .context("Failed to insert vehicle")?;
        debug!(vehicle_id = %v.id, "Inserted vehicle");
        Ok(())
    }

    async fn get_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>> {
        let conn = self.conn.lock().await;
        let vehicle = conn
            .query_row(
                &format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?1"),
                params![id.to_string()],
                row_to_vehicle,
            )
            .optional()?;
        Ok(vehicle)
    }

    async fn update_vehicle(&self, v: &Vehicle) -> Result<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE vehicles SET plate = ?2, brand = ?3, model = ?4, version = ?5, trim = ?6,
                 year = ?7, mileage_km = ?8, color_exterior = ?9, color_interior = ?10,
                 price_usd = ?11, branch = ?12, origin = ?13, status = ?14, updated_at = ?15
             WHERE id = ?1",
            params![
                v.id.to_string(),
                v.plate,
                v.brand,
                v.model,
                v.version,
                v.trim,
                v.year,
                v.mileage_km,
                v.color_exterior,
                v.color_interior,
                v.price_usd,
                v.branch,
                v.origin,
                v.status.as_str(),
                time_text(&v.updated_at),
            ],
        )?;
        if changed == 0 {
            anyhow::bail!("Vehicle {} not found", v.id);
        }
        Ok(())
    }

    async fn delete_vehicle(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM vehicles WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }

    async fn list_vehicles(&self, page: usize, page_size: usize) -> Result<(Vec<Vehicle>, usize)> {
        let conn = self.conn.lock().await;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM vehicles", [], |row| row.get(0))?;
        let offset = page.saturating_sub(1) * page_size;

        let mut stmt = conn.prepare(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        ))?;
        let vehicles = stmt
            .query_map(params![page_size as i64, offset as i64], row_to_vehicle)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((vehicles, total as usize))
    }
}

#[async_trait]
impl SpecsRepository for SqliteStore {
    async fn upsert_specs(&self, specs: &VehicleSpecs) -> Result<()> {
        let conn = self.conn.lock().await;
        let data = serde_json::to_string(specs)?;
        conn.execute(
            "INSERT OR REPLACE INTO vehicle_specs (vehicle_id, data) VALUES (?1, ?2)",
            params![specs.vehicle_id.to_string(), data],
        )
        .context("Failed to upsert vehicle specs")?;
        Ok(())
    }

    async fn get_specs(&self, vehicle_id: Uuid) -> Result<Option<VehicleSpecs>> {
        let conn = self.conn.lock().await;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM vehicle_specs WHERE vehicle_id = ?1",
                params![vehicle_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        data.map(|json| serde_json::from_str(&json).context("Corrupt vehicle specs document"))
            .transpose()
    }
}

#[async_trait]
impl EquipmentRepository for SqliteStore {
    async fn replace_equipment(
        &self,
        vehicle_id: Uuid,
        equipment: &[VehicleEquipment],
    ) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM vehicle_equipment WHERE vehicle_id = ?1",
            params![vehicle_id.to_string()],
        )?;
        for item in equipment {
            tx.execute(
                &format!(
                    "INSERT INTO vehicle_equipment ({EQUIPMENT_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    item.id.to_string(),
                    vehicle_id.to_string(),
                    item.category.as_str(),
                    item.feature_name,
                    item.feature_description,
                    item.is_standard,
                    item.is_confirmed,
                    item.source.as_str(),
                ],
            )?;
        }
        tx.commit().context("Failed to replace equipment")?;
        Ok(())
    }

    async fn list_equipment(&self, vehicle_id: Uuid) -> Result<Vec<VehicleEquipment>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EQUIPMENT_COLUMNS} FROM vehicle_equipment WHERE vehicle_id = ?1 ORDER BY rowid"
        ))?;
        let items = stmt
            .query_map(params![vehicle_id.to_string()], row_to_equipment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

#[async_trait]
impl InspectionRepository for SqliteStore {
    async fn create_inspection(&self, i: &Inspection) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO inspections ({INSPECTION_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                i.id.to_string(),
                i.vehicle_id.to_string(),
                i.inspector_name,
                i.inspector_branch,
                i.score_overall,
                i.score_exterior,
                i.score_interior,
                i.score_mechanical,
                i.score_tires,
                i.photos_count,
                i.findings_count,
                i.status.as_str(),
                i.report_path,
                i.inspected_at.as_ref().map(time_text),
                time_text(&i.created_at),
                time_text(&i.updated_at),
            ],
        )
        .context("Failed to insert inspection")?;
        debug!(inspection_id = %i.id, vehicle_id = %i.vehicle_id, "Inserted inspection");
        Ok(())
    }

    async fn get_inspection(&self, id: Uuid) -> Result<Option<Inspection>> {
        let conn = self.conn.lock().await;
        let inspection = conn
            .query_row(
                &format!("SELECT {INSPECTION_COLUMNS} FROM inspections WHERE id = ?1"),
                params![id.to_string()],
                row_to_inspection,
            )
            .optional()?;
        Ok(inspection)
    }

    async fn latest_inspection(&self, vehicle_id: Uuid) -> Result<Option<Inspection>> {
        let conn = self.conn.lock().await;
        let inspection = conn
            .query_row(
                &format!(
                    "SELECT {INSPECTION_COLUMNS} FROM inspections WHERE vehicle_id = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                params![vehicle_id.to_string()],
                row_to_inspection,
            )
            .optional()?;
        Ok(inspection)
    }

    async fn update_inspection(&self, i: &Inspection) -> Result<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE inspections SET inspector_name = ?2, inspector_branch = ?3,
                 score_overall = ?4, score_exterior = ?5, score_interior = ?6,
                 score_mechanical = ?7, score_tires = ?8, photos_count = ?9,
                 findings_count = ?10, status = ?11, report_path = ?12, inspected_at = ?13,
                 updated_at = ?14
             WHERE id = ?1",
            params![
                i.id.to_string(),
                i.inspector_name,
                i.inspector_branch,
                i.score_overall,
                i.score_exterior,
                i.score_interior,
                i.score_mechanical,
                i.score_tires,
                i.photos_count,
                i.findings_count,
                i.status.as_str(),
                i.report_path,
                i.inspected_at.as_ref().map(time_text),
                time_text(&i.updated_at),
            ],
        )?;
        if changed == 0 {
            anyhow::bail!("Inspection {} not found", i.id);
        }
        Ok(())
    }
}

#[async_trait]
impl PhotoRepository for SqliteStore {
    async fn create_photo(&self, p: &InspectionPhoto) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            &format!("INSERT INTO inspection_photos ({PHOTO_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                p.id.to_string(),
                p.inspection_id.to_string(),
                p.photo_path,
                p.zone.as_str(),
                p.sort_order,
                time_text(&p.uploaded_at),
            ],
        )
        .context("Failed to insert photo")?;
        Ok(())
    }

    async fn append_photo(&self, p: &InspectionPhoto) -> Result<InspectionPhoto> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let inspection_id = p.inspection_id.to_string();
        let sort_order: i32 = tx.query_row(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM inspection_photos WHERE inspection_id = ?1",
            params![inspection_id],
            |row| row.get(0),
        )?;
        let stored = InspectionPhoto {
            sort_order,
            ..p.clone()
        };
        tx.execute(
            &format!("INSERT INTO inspection_photos ({PHOTO_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                stored.id.to_string(),
                inspection_id,
                stored.photo_path,
                stored.zone.as_str(),
                stored.sort_order,
                time_text(&stored.uploaded_at),
            ],
        )
        .context("Failed to insert photo")?;
        let changed = tx.execute(
            "UPDATE inspections SET photos_count =
                 (SELECT COUNT(*) FROM inspection_photos WHERE inspection_id = ?1)
             WHERE id = ?1",
            params![inspection_id],
        )?;
        if changed == 0 {
            anyhow::bail!("Inspection {} not found", p.inspection_id);
        }
        tx.commit().context("Failed to commit photo")?;
        debug!(inspection_id = %p.inspection_id, sort_order, "Appended photo");
        Ok(stored)
    }

    async fn list_photos(&self, inspection_id: Uuid) -> Result<Vec<InspectionPhoto>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PHOTO_COLUMNS} FROM inspection_photos WHERE inspection_id = ?1
             ORDER BY sort_order, uploaded_at"
        ))?;
        let photos = stmt
            .query_map(params![inspection_id.to_string()], row_to_photo)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(photos)
    }

    async fn delete_photo(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "DELETE FROM inspection_photos WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(changed > 0)
    }
}

#[async_trait]
impl FindingRepository for SqliteStore {
    async fn create_findings(&self, findings: &[InspectionFinding]) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        for f in findings {
            insert_finding(&tx, f)?;
        }
        tx.commit().context("Failed to commit findings batch")?;
        debug!(count = findings.len(), "Inserted findings batch");
        Ok(())
    }

    async fn replace_findings(
        &self,
        inspection_id: Uuid,
        findings: &[InspectionFinding],
    ) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM inspection_findings WHERE inspection_id = ?1",
            params![inspection_id.to_string()],
        )?;
        for f in findings {
            insert_finding(&tx, f)?;
        }
        tx.commit().context("Failed to commit findings batch")?;
        debug!(inspection_id = %inspection_id, removed, count = findings.len(), "Replaced findings");
        Ok(())
    }

    async fn list_findings(&self, inspection_id: Uuid) -> Result<Vec<InspectionFinding>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FINDING_COLUMNS} FROM inspection_findings WHERE inspection_id = ?1 ORDER BY rowid"
        ))?;
        let mut findings = stmt
            .query_map(params![inspection_id.to_string()], row_to_finding)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // Severity is stored as text; order in Rust so "major" sorts first.
        findings.sort_by(InspectionFinding::read_order);
        Ok(findings)
    }

    async fn get_finding(&self, id: Uuid) -> Result<Option<InspectionFinding>> {
        let conn = self.conn.lock().await;
        let finding = conn
            .query_row(
                &format!("SELECT {FINDING_COLUMNS} FROM inspection_findings WHERE id = ?1"),
                params![id.to_string()],
                row_to_finding,
            )
            .optional()?;
        Ok(finding)
    }

    async fn update_finding(&self, f: &InspectionFinding) -> Result<()> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE inspection_findings SET zone = ?2, finding_type = ?3, severity = ?4,
                 description = ?5, confirmed_by_human = ?6
             WHERE id = ?1",
            params![
                f.id.to_string(),
                f.zone.as_str(),
                f.finding_type.as_str(),
                f.severity.as_str(),
                f.description,
                f.confirmed_by_human,
            ],
        )?;
        if changed == 0 {
            anyhow::bail!("Finding {} not found", f.id);
        }
        Ok(())
    }
}

fn insert_finding(conn: &Connection, f: &InspectionFinding) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO inspection_findings ({FINDING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
        ),
        params![
            f.id.to_string(),
            f.inspection_id.to_string(),
            f.photo_path,
            f.zone.as_str(),
            f.finding_type.as_str(),
            f.severity.as_str(),
            f.description,
            f.ai_confidence,
            f.confirmed_by_human,
        ],
    )
    .context("Failed to insert finding")?;
    Ok(())
}
