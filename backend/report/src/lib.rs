//! Inspection report rendering.
//!
//! [`pdf::PdfWriter`] turns plain-text pages into a minimal PDF 1.4 file;
//! [`layout`] decides what goes on each page; [`ReportService`] loads the
//! records, renders and stores the result.

pub mod layout;
pub mod pdf;
pub mod service;

pub use layout::{render_report, ReportInput, ReportOptions};
pub use pdf::PdfWriter;
pub use service::{report_path, ReportService};
