//! Minimal PDF 1.4 writer.
//!
//! Every page is a block of pre-formatted lines set in the built-in Courier
//! font from a fixed top-left origin. There is no overflow handling: one
//! `add_page` call is one output page, however many lines it holds.
//!
//! Object layout:
//! - `1` catalog, `2` page tree, `3` font
//! - page `i` (0-based): page object `4 + 2i`, content stream `5 + 2i`

/// Catalog, page tree and font.
const FIXED_OBJECTS: usize = 3;
const FONT_SIZE: u32 = 9;
const LEADING: u32 = 12;
const ORIGIN_X: u32 = 40;
const ORIGIN_Y: u32 = 800;
/// A4 in points.
const MEDIA_BOX: &str = "[0 0 595 842]";

/// Collects plain-text pages and renders them into one PDF document.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    pages: Vec<String>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page of newline-separated lines.
    pub fn add_page(&mut self, text: impl Into<String>) {
        self.pages.push(text.into());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Render the document. Identical pages always yield identical bytes.
    pub fn render(&self) -> Vec<u8> {
        let mut out = String::new();
        let mut offsets: Vec<usize> = Vec::with_capacity(FIXED_OBJECTS + 2 * self.pages.len());

        out.push_str("%PDF-1.4\n");

        offsets.push(out.len());
        out.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        let kids = (0..self.pages.len())
            .map(|i| format!("{} 0 R", page_object(i)))
            .collect::<Vec<_>>()
            .join(" ");
        offsets.push(out.len());
        out.push_str(&format!(
            "2 0 obj\n<< /Type /Pages /Kids [ {} ] /Count {} >>\nendobj\n",
            kids,
            self.pages.len()
        ));

        offsets.push(out.len());
        out.push_str("3 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Courier >>\nendobj\n");

        for (i, text) in self.pages.iter().enumerate() {
            let page_obj = page_object(i);
            let content_obj = page_obj + 1;

            offsets.push(out.len());
            out.push_str(&format!(
                "{page_obj} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox {MEDIA_BOX} \
                 /Contents {content_obj} 0 R /Resources << /Font << /F1 3 0 R >> >> >>\nendobj\n"
            ));

            let stream = content_stream(text);
            offsets.push(out.len());
            out.push_str(&format!(
                "{content_obj} 0 obj\n<< /Length {} >>\nstream\n{stream}\nendstream\nendobj\n",
                stream.len()
            ));
        }

        let xref_offset = out.len();
        // +1 for the reserved free entry of object 0
        let size = offsets.len() + 1;
        out.push_str(&format!("xref\n0 {size}\n"));
        out.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            out.push_str(&format!("{offset:010} 00000 n \n"));
        }

        out.push_str(&format!(
            "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        ));

        out.into_bytes()
    }
}

fn page_object(index: usize) -> usize {
    FIXED_OBJECTS + 1 + 2 * index
}

/// Text-showing operators for one page: one `Tj T*` pair per line.
fn content_stream(text: &str) -> String {
    let mut stream = String::new();
    stream.push_str("BT\n");
    stream.push_str(&format!("/F1 {FONT_SIZE} Tf\n"));
    stream.push_str(&format!("1 0 0 1 {ORIGIN_X} {ORIGIN_Y} Tm\n"));
    stream.push_str(&format!("{LEADING} TL\n"));
    for line in text.split('\n') {
        stream.push('(');
        stream.push_str(&escape_text(line));
        stream.push_str(") Tj T*\n");
    }
    stream.push_str("ET");
    stream
}

/// Escape a line for a PDF literal string.
///
/// Backslash and parentheses are escaped; anything outside printable ASCII
/// becomes `?` since no text encoding is declared.
pub fn escape_text(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}
