//! Minimal PDF 1.4 writer for plain text listings.
//!
//! Uses the two standard Helvetica faces with `WinAnsiEncoding`, so no fonts
//! are embedded. Latin-1 text plus the Windows-1252 punctuation block renders
//! as-is; characters outside that set are written as `?`.

use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 56.0;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Title,
    Heading,
    Body,
}

impl Style {
    fn font(self) -> &'static str {
        match self {
            Style::Title | Style::Heading => "F2",
            Style::Body => "F1",
        }
    }

    fn size(self) -> f32 {
        match self {
            Style::Title => 20.0,
            Style::Heading => 12.0,
            Style::Body => 11.0,
        }
    }

    fn leading(self) -> f32 {
        self.size() * 1.4
    }

    fn max_chars(self) -> usize {
        ((PAGE_WIDTH - 2.0 * MARGIN) / (self.size() * GLYPH_WIDTH)) as usize
    }
}

pub struct PdfWriter {
    pages: Vec<String>,
    current: String,
    y: f32,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn break_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Writes one logical line, wrapping at word boundaries.
    pub fn line(&mut self, style: Style, text: &str) {
        for row in wrap(text, style.max_chars()) {
            if self.y - style.leading() < MARGIN {
                self.break_page();
            }
            self.y -= style.leading();

            let x = match style {
                Style::Title => {
                    let width = row.chars().count() as f32 * style.size() * GLYPH_WIDTH;
                    ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
                }
                _ => MARGIN,
            };

            let _ = writeln!(
                self.current,
                "BT /{} {} Tf {:.1} {:.1} Td ({}) Tj ET",
                style.font(),
                style.size(),
                x,
                self.y,
                escape(&row)
            );
        }
    }

    /// Vertical space between blocks.
    pub fn gap(&mut self) {
        self.y -= Style::Body.leading() / 2.0;
    }

    pub fn finish(mut self) -> Vec<u8> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }

        // 1 catalog, 2 page tree, 3-4 fonts, then a (page, content) pair per page.
        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| 5 + 2 * i).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids,
                self.pages.len()
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        for (content, page_id) in self.pages.iter().zip(&page_ids) {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                page_id + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = writeln!(out, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );

        out.into_bytes()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.current.is_empty())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => match win_ansi(c) {
                // Octal keeps the content stream pure ASCII.
                Some(byte) => {
                    let _ = write!(out, "\\{:03o}", byte);
                }
                None => out.push('?'),
            },
        }
    }
    out
}

/// Code point in `WinAnsiEncoding` for a non-ASCII character.
fn win_ansi(c: char) -> Option<u8> {
    let byte = match c {
        '\u{A0}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let indent: String = text.chars().take_while(|c| *c == ' ').collect();
    let mut rows = Vec::new();
    let mut row = indent.clone();

    for word in text.split_whitespace() {
        let fits = row.trim().is_empty() || row.chars().count() + 1 + word.chars().count() <= max_chars;
        if !fits {
            rows.push(std::mem::replace(&mut row, indent.clone()));
        }
        if !row.trim().is_empty() {
            row.push(' ');
        }
        row.push_str(word);
    }

    if !row.trim().is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn produces_well_formed_document() {
        let mut pdf = PdfWriter::new();
        pdf.line(Style::Title, "Alumni Directory");
        pdf.line(Style::Body, "Company: Acme (Europe)");
        let out = text(&pdf.finish());

        assert!(out.starts_with("%PDF-1.4\n"));
        assert!(out.ends_with("%%EOF\n"));
        assert!(out.contains("(Company: Acme \\(Europe\\)) Tj"));
        assert!(out.contains("/Count 1"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let mut pdf = PdfWriter::new();
        pdf.line(Style::Body, "hello");
        let out = text(&pdf.finish());

        let xref_at: usize = out
            .lines()
            .skip_while(|l| *l != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert!(out[xref_at..].starts_with("xref"));

        let first_entry = out[xref_at..].lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(out[offset..].starts_with("1 0 obj"));
    }

    #[test]
    fn long_listings_span_pages() {
        let mut pdf = PdfWriter::new();
        for i in 0..200 {
            pdf.line(Style::Body, &format!("line {}", i));
        }
        assert!(pdf.page_count() > 1);
        let out = text(&pdf.finish());
        assert!(!out.contains("/Count 1 "));
    }

    #[test]
    fn latin_text_is_written_in_win_ansi() {
        assert_eq!(escape("José Núñez"), "Jos\\351 N\\372\\361ez");
        assert_eq!(escape("Zoë \u{2013} €5"), "Zo\\353 \\226 \\2005");
        assert_eq!(escape("a\\b"), "a\\\\b");
    }

    #[test]
    fn characters_outside_win_ansi_are_replaced() {
        assert_eq!(escape("東京"), "??");
        assert_eq!(escape("tab\there"), "tab?here");
    }

    #[test]
    fn wrap_keeps_indent_and_width() {
        let rows = wrap("   Email: a very long address that keeps going", 20);
        assert!(rows.len() > 1);
        assert!(rows.iter().all(|r| r.starts_with("   ")));
        assert!(rows.iter().all(|r| r.chars().count() <= 20));
        assert_eq!(wrap("", 20), vec![String::new()]);
    }
}
