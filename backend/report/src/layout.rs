//! Page text for the inspection report.
//!
//! Pages are built as plain lines and handed to [`PdfWriter`] one page per
//! section: cover, technical specs, equipment, findings. The specs and
//! equipment pages are skipped when there is nothing to print.

use autoinspect_core::{
    EquipmentCategory, Inspection, InspectionFinding, Severity, Vehicle, VehicleEquipment,
    VehicleSpecs,
};

use crate::pdf::PdfWriter;

const RULE_WIDTH: usize = 60;
const SECTION_RULE_WIDTH: usize = 40;

/// Configurable report text.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub footer: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "AUTOINSPECT - Vehicle Inspection Report".to_string(),
            footer: "Report generated by AutoInspect".to_string(),
        }
    }
}

/// Everything the report renders, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub vehicle: &'a Vehicle,
    pub specs: Option<&'a VehicleSpecs>,
    pub equipment: &'a [VehicleEquipment],
    pub inspection: &'a Inspection,
    pub findings: &'a [InspectionFinding],
}

/// Render the full report to PDF bytes.
pub fn render_report(input: ReportInput<'_>, options: &ReportOptions) -> Vec<u8> {
    build_document(input, options).render()
}

/// Lay out all report pages without rendering.
pub fn build_document(input: ReportInput<'_>, options: &ReportOptions) -> PdfWriter {
    let mut writer = PdfWriter::new();
    writer.add_page(cover_page(input.vehicle, input.inspection, options));
    if let Some(specs) = input.specs {
        writer.add_page(specs_page(specs));
    }
    if !input.equipment.is_empty() {
        writer.add_page(equipment_page(input.equipment));
    }

    let mut findings = input.findings.to_vec();
    findings.sort_by(InspectionFinding::read_order);
    writer.add_page(findings_page(&findings, options));
    writer
}

/// Line accumulator with the label formatting shared by every page.
#[derive(Default)]
struct Page {
    lines: Vec<String>,
}

impl Page {
    fn titled(title: &str) -> Self {
        let mut page = Self::default();
        page.line(title);
        page.line("=".repeat(RULE_WIDTH));
        page
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn section(&mut self, name: &str) {
        self.blank();
        self.line(name);
        self.line("-".repeat(SECTION_RULE_WIDTH));
    }

    /// `label:` padded to `width`, then the value.
    fn field(&mut self, width: usize, label: &str, value: impl std::fmt::Display) {
        let label = format!("{label}:");
        self.line(format!("  {label:<width$} {value}"));
    }

    fn text_field(&mut self, width: usize, label: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.field(width, label, value);
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

const COVER_LABEL_WIDTH: usize = 20;

fn cover_page(vehicle: &Vehicle, inspection: &Inspection, options: &ReportOptions) -> String {
    let mut page = Page::titled(&options.title);
    page.blank();
    page.line(format!("Vehicle: {}", vehicle.description()));
    if let Some(overall) = inspection.score_overall {
        page.line(format!("OVERALL SCORE: {overall} / 100"));
    }

    page.blank();
    page.line("--- Vehicle Data ---");
    let w = COVER_LABEL_WIDTH;
    page.field(w, "Brand", &vehicle.brand);
    page.field(w, "Model", &vehicle.model);
    page.field(w, "Year", vehicle.year);
    page.field(w, "Mileage", format!("{} km", vehicle.mileage_km));
    page.text_field(w, "Plate", vehicle.plate.as_deref());
    page.text_field(w, "Colour", vehicle.color_exterior.as_deref());
    if let Some(price) = vehicle.price_usd {
        page.field(w, "Price", format!("USD ${price:.0}"));
    }
    page.text_field(w, "Branch", vehicle.branch.as_deref());
    page.text_field(w, "Origin", vehicle.origin.as_deref());

    page.blank();
    page.line("--- Inspection ---");
    if let Some(name) = &inspection.inspector_name {
        page.line(format!("  Inspector: {name}"));
    }
    if let Some(at) = inspection.inspected_at {
        page.line(format!("  Date: {}", at.format("%d/%m/%Y %H:%M")));
    }
    page.line(format!("  Photos analysed: {}", inspection.photos_count));
    page.line(format!("  Findings: {}", inspection.findings_count));

    page.blank();
    page.line("--- Scores by Area ---");
    let areas = [
        ("Exterior", inspection.score_exterior),
        ("Interior", inspection.score_interior),
        ("Mechanical", inspection.score_mechanical),
        ("Tires", inspection.score_tires),
    ];
    for (label, score) in areas {
        if let Some(score) = score {
            let label = format!("{label}:");
            page.line(format!("  {label:<13} {score} / 10"));
        }
    }

    page.finish()
}

const SPEC_LABEL_WIDTH: usize = 28;

fn specs_page(specs: &VehicleSpecs) -> String {
    let mut page = Page::titled("TECHNICAL SPECIFICATIONS");
    let w = SPEC_LABEL_WIDTH;

    let int = |page: &mut Page, label: &str, value: Option<i32>, suffix: &str| {
        if let Some(v) = value {
            page.field(w, label, format!("{v}{suffix}"));
        }
    };
    let float = |page: &mut Page, label: &str, value: Option<f64>, suffix: &str| {
        if let Some(v) = value {
            page.field(w, label, format!("{v:.1}{suffix}"));
        }
    };

    page.section("Engine & Performance");
    page.text_field(w, "Engine type", specs.engine_type.as_deref());
    int(&mut page, "Displacement", specs.engine_cc, " cc");
    int(&mut page, "Cylinders", specs.engine_cylinders, "");
    float(&mut page, "Power", specs.power_hp, " HP");
    float(&mut page, "Power", specs.power_kw, " kW");
    int(&mut page, "Torque", specs.torque_nm, " Nm");
    page.text_field(w, "Torque RPM range", specs.torque_rpm_range.as_deref());
    page.text_field(w, "Fuel", specs.fuel_type.as_deref());
    page.text_field(w, "Fuel system", specs.fuel_system.as_deref());
    float(&mut page, "0-100 km/h", specs.accel_0_100, " s");
    int(&mut page, "Top speed", specs.top_speed_kmh, " km/h");

    page.section("Transmission & Drivetrain");
    page.text_field(w, "Transmission", specs.transmission_type.as_deref());
    int(&mut page, "Gears", specs.transmission_gears, "");
    page.text_field(w, "Drivetrain", specs.drivetrain.as_deref());

    page.section("Dimensions & Capacities");
    int(&mut page, "Length", specs.length_mm, " mm");
    int(&mut page, "Width", specs.width_mm, " mm");
    int(&mut page, "Height", specs.height_mm, " mm");
    int(&mut page, "Wheelbase", specs.wheelbase_mm, " mm");
    int(&mut page, "Cargo", specs.cargo_liters, " litres");
    int(&mut page, "Cargo max.", specs.cargo_max_liters, " litres");
    int(&mut page, "Curb weight", specs.curb_weight_kg, " kg");
    page.text_field(w, "Tires", specs.tire_size.as_deref());
    page.text_field(w, "Spare tire", specs.spare_tire.as_deref());

    page.section("Fuel Consumption");
    float(&mut page, "City", specs.fuel_city_kml, " km/L");
    float(&mut page, "Highway", specs.fuel_highway_kml, " km/L");
    float(&mut page, "Combined", specs.fuel_combined_kml, " km/L");
    int(&mut page, "Tank", specs.fuel_tank_liters, " litres");

    page.finish()
}

fn category_heading(category: EquipmentCategory) -> &'static str {
    match category {
        EquipmentCategory::Safety => "Safety",
        EquipmentCategory::Comfort => "Comfort",
        EquipmentCategory::Infotainment => "Infotainment & Connectivity",
        EquipmentCategory::Exterior => "Exterior",
        EquipmentCategory::Interior => "Interior",
    }
}

fn equipment_page(equipment: &[VehicleEquipment]) -> String {
    let mut page = Page::titled("STANDARD EQUIPMENT");
    for category in EquipmentCategory::ALL {
        let mut items = equipment.iter().filter(|e| e.category == category).peekable();
        if items.peek().is_none() {
            continue;
        }
        page.section(category_heading(category));
        for item in items {
            let mark = if item.is_confirmed { "[OK*]" } else { "[OK]" };
            page.line(format!("  {mark} {}", item.feature_name));
        }
    }
    page.finish()
}

fn findings_page(findings: &[InspectionFinding], options: &ReportOptions) -> String {
    let mut page = Page::titled("VISUAL INSPECTION RESULTS");

    if findings.is_empty() {
        page.blank();
        page.line("No significant findings.");
        page.line("The vehicle is in excellent overall condition.");
    } else {
        page.blank();
        page.line("Findings summary:");
        for severity in [Severity::Major, Severity::Moderate, Severity::Minor] {
            let count = findings.iter().filter(|f| f.severity == severity).count();
            if count > 0 {
                let label = format!("{}:", severity.as_str().to_uppercase());
                page.line(format!("  {label:<9} {count} finding(s)"));
            }
        }

        page.blank();
        page.line("Finding details:");
        page.line("-".repeat(RULE_WIDTH));
        for (i, finding) in findings.iter().enumerate() {
            page.blank();
            page.line(format!(
                "#{} | Zone: {} | Type: {} | Severity: {}",
                i + 1,
                finding.zone.as_str().to_uppercase(),
                finding.finding_type,
                finding.severity.as_str().to_uppercase()
            ));
            if let Some(confidence) = finding.ai_confidence {
                page.line(format!("   AI confidence: {:.0}%", confidence * 100.0));
            }
            if let Some(description) = &finding.description {
                page.line(format!("   {description}"));
            }
            if finding.confirmed_by_human {
                page.line("   [Confirmed by inspector]");
            }
        }
    }

    page.blank();
    page.line("-".repeat(RULE_WIDTH));
    page.line(options.footer.as_str());
    page.finish()
}
