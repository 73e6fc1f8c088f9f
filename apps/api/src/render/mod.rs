//! Markdown-to-PDF rendering — maps parsed blocks onto a styled, paginated
//! A4 document via `lopdf`. Pure presentation: the semantic content of the
//! markdown is never altered here.
//!
//! Style contract: serif body (Times), indigo accent on H1/H2 with a thin
//! rule under H2, sizes 24/18/16pt for headings and 12pt body, 1.6 line
//! height, 10mm top/bottom and 15mm left/right margins, portrait A4.

use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, ObjectId, Stream, StringFormat,
};
use std::collections::HashMap;
use thiserror::Error;

use crate::markdown::{self, Block, Span};

/// Fixed artifact name for every download.
pub const OUTPUT_FILENAME: &str = "optimized-resume.pdf";

// A4 portrait with the app's margins, all in millimeters.
const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_TOP: Mm = Mm(10.0);
const MARGIN_BOTTOM: Mm = Mm(10.0);
const MARGIN_LEFT: Mm = Mm(15.0);
const MARGIN_RIGHT: Mm = Mm(15.0);

const BODY_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 1.6;
const LIST_INDENT: Mm = Mm(5.0);

// Heading accent (#4338ca) and body ink (#1a1a1a), as DeviceRGB.
const ACCENT: (f32, f32, f32) = (0.263, 0.220, 0.792);
const INK: (f32, f32, f32) = (0.102, 0.102, 0.102);
const RULE_GRAY: (f32, f32, f32) = (0.898, 0.898, 0.898);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode PDF content: {0}")]
    Encode(String),
}

/// Renders the markdown subset into a finished PDF byte buffer.
pub fn render_pdf(md: &str) -> Result<Vec<u8>, RenderError> {
    let blocks = markdown::parse(md);
    let mut builder = PdfBuilder::new();

    for block in &blocks {
        match block {
            Block::Heading { level, spans } => builder.heading(*level, spans),
            Block::ListItem(spans) => builder.list_item(spans),
            Block::Paragraph(spans) => builder.paragraph(spans),
        }
    }

    builder.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement
// ────────────────────────────────────────────────────────────────────────────

/// Millimeters, converted to PDF points (1 mm = 2.83465 pt) at emit time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct Mm(f32);

impl Mm {
    fn to_points(self) -> f32 {
        self.0 * 2.83465
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Face {
    Serif,
    SerifBold,
}

impl Face {
    fn base_font(self) -> &'static str {
        match self {
            Face::Serif => "Times-Roman",
            Face::SerifBold => "Times-Bold",
        }
    }

    fn key(self) -> &'static str {
        match self {
            Face::Serif => "F1",
            Face::SerifBold => "F2",
        }
    }
}

/// Approximate glyph advance as a fraction of the font size. Times metrics
/// vary per glyph; this is close enough for wrap decisions at resume scale.
fn char_width_factor(c: char) -> f32 {
    match c {
        'i' | 'l' | 'j' | 'I' | '!' | '|' | '.' | ',' | ';' | ':' | '\'' | '`' => 0.45,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' | '"' => 0.6,
        'm' | 'w' => 1.15,
        'M' | 'W' => 1.3,
        'A'..='Z' | '0'..='9' => 0.95,
        _ => 0.78,
    }
}

fn text_width(text: &str, face: Face, size: f32) -> Mm {
    let base = match face {
        Face::Serif => 0.5,
        Face::SerifBold => 0.53,
    };
    let units: f32 = text.chars().map(char_width_factor).sum();
    Mm(units * size * base / 2.83465)
}

/// Encodes text as WinAnsi (CP1252) bytes, the encoding declared on the
/// standard Type1 font dictionaries. ASCII and Latin-1 map through directly,
/// the CP1252 extras are translated, and anything unrepresentable becomes
/// `?` rather than corrupting the byte stream.
fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{0000}'..='\u{007e}' => c as u8,
            '\u{00a0}'..='\u{00ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{201a}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201e}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02c6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8a,
            '\u{2039}' => 0x8b,
            '\u{0152}' => 0x8c,
            '\u{017d}' => 0x8e,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02dc}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9a,
            '\u{203a}' => 0x9b,
            '\u{0153}' => 0x9c,
            '\u{017e}' => 0x9e,
            '\u{0178}' => 0x9f,
            _ => b'?',
        })
        .collect()
}

fn encoded_string(text: &str) -> Object {
    Object::String(encode_winansi(text), StringFormat::Literal)
}

/// A wrap unit: one word plus its face and measured width.
struct Word {
    text: String,
    face: Face,
    width: Mm,
}

fn spans_to_words(spans: &[Span], size: f32) -> Vec<Word> {
    let mut words = Vec::new();
    for span in spans {
        let (text, face) = match span {
            Span::Text(t) => (t.as_str(), Face::Serif),
            Span::Bold(t) => (t.as_str(), Face::SerifBold),
        };
        for word in text.split_whitespace() {
            words.push(Word {
                text: word.to_string(),
                face,
                width: text_width(word, face, size),
            });
        }
    }
    words
}

// ────────────────────────────────────────────────────────────────────────────
// Page builder
// ────────────────────────────────────────────────────────────────────────────

struct PdfBuilder {
    doc: Document,
    ops: Vec<Operation>,
    y: Mm,
    font_ids: HashMap<&'static str, ObjectId>,
    page_ids: Vec<ObjectId>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let info_id = doc.add_object(dictionary! {
            "Creator" => Object::string_literal("tailor-api"),
        });
        doc.trailer.set("Info", Object::Reference(info_id));

        Self {
            doc,
            ops: Vec::new(),
            y: Mm(PAGE_HEIGHT.0 - MARGIN_TOP.0),
            font_ids: HashMap::new(),
            page_ids: Vec::new(),
        }
    }

    fn heading(&mut self, level: u8, spans: &[Span]) {
        let (size, color) = match level {
            1 => (24.0, ACCENT),
            2 => (18.0, ACCENT),
            _ => (16.0, INK),
        };
        // Top-of-page headings skip the leading gap.
        if self.y.0 < PAGE_HEIGHT.0 - MARGIN_TOP.0 {
            self.advance(Mm(line_advance(size).0 * 0.6));
        }
        self.ensure_room(line_advance(size));

        let text: String = spans
            .iter()
            .map(|s| match s {
                Span::Text(t) | Span::Bold(t) => t.as_str(),
            })
            .collect::<Vec<_>>()
            .join("");
        self.advance(Mm(size / 2.83465));
        self.text_line(&text, Face::SerifBold, size, MARGIN_LEFT, color);

        if level == 2 {
            self.advance(Mm(1.5));
            self.rule();
        }
        self.advance(Mm(line_advance(size).0 * 0.35));
    }

    fn paragraph(&mut self, spans: &[Span]) {
        let words = spans_to_words(spans, BODY_SIZE);
        self.wrapped(&words, MARGIN_LEFT, BODY_SIZE);
        self.advance(Mm(line_advance(BODY_SIZE).0 * 0.4));
    }

    fn list_item(&mut self, spans: &[Span]) {
        self.ensure_room(line_advance(BODY_SIZE));
        // The marker must enter the page buffer before wrapping runs: a page
        // break inside the continuation lines would otherwise carry it onto
        // the next page at a stale coordinate.
        self.marker(self.y);
        let words = spans_to_words(spans, BODY_SIZE);
        self.wrapped(&words, Mm(MARGIN_LEFT.0 + LIST_INDENT.0), BODY_SIZE);
        self.advance(Mm(line_advance(BODY_SIZE).0 * 0.15));
    }

    /// Greedy word wrap within the text column, breaking pages as needed.
    fn wrapped(&mut self, words: &[Word], x: Mm, size: f32) {
        let space = text_width(" ", Face::Serif, size);
        let max_width = Mm(PAGE_WIDTH.0 - MARGIN_RIGHT.0 - x.0);

        let mut line: Vec<&Word> = Vec::new();
        let mut line_width = Mm(0.0);
        for word in words {
            let needed = if line.is_empty() {
                word.width
            } else {
                Mm(line_width.0 + space.0 + word.width.0)
            };
            if !line.is_empty() && needed.0 > max_width.0 {
                self.emit_line(&line, x, size);
                line.clear();
                line_width = word.width;
                line.push(word);
            } else {
                line_width = needed;
                line.push(word);
            }
        }
        if !line.is_empty() {
            self.emit_line(&line, x, size);
        }
    }

    fn emit_line(&mut self, line: &[&Word], x: Mm, size: f32) {
        self.ensure_room(line_advance(size));
        self.advance(Mm(size / 2.83465)); // drop to this line's baseline

        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Td",
            vec![x.to_points().into(), self.y.to_points().into()],
        ));
        self.ops.push(Operation::new(
            "rg",
            vec![INK.0.into(), INK.1.into(), INK.2.into()],
        ));
        for (idx, word) in line.iter().enumerate() {
            let font_key = self.ensure_font(word.face);
            self.ops
                .push(Operation::new("Tf", vec![font_key.into(), size.into()]));
            let shown = if idx < line.len() - 1 {
                format!("{} ", word.text)
            } else {
                word.text.clone()
            };
            self.ops
                .push(Operation::new("Tj", vec![encoded_string(&shown)]));
        }
        self.ops.push(Operation::new("ET", vec![]));

        self.advance(Mm(line_advance(size).0 - size / 2.83465));
    }

    fn text_line(&mut self, text: &str, face: Face, size: f32, x: Mm, color: (f32, f32, f32)) {
        let font_key = self.ensure_font(face);
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Td",
            vec![x.to_points().into(), self.y.to_points().into()],
        ));
        self.ops.push(Operation::new(
            "rg",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
        self.ops
            .push(Operation::new("Tf", vec![font_key.into(), size.into()]));
        self.ops
            .push(Operation::new("Tj", vec![encoded_string(text)]));
        self.ops.push(Operation::new("ET", vec![]));
        self.advance(Mm(line_advance(size).0 - size / 2.83465));
    }

    /// Thin full-width rule under an H2.
    fn rule(&mut self) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new("w", vec![0.5.into()]));
        self.ops.push(Operation::new(
            "RG",
            vec![RULE_GRAY.0.into(), RULE_GRAY.1.into(), RULE_GRAY.2.into()],
        ));
        self.ops.push(Operation::new(
            "m",
            vec![MARGIN_LEFT.to_points().into(), self.y.to_points().into()],
        ));
        self.ops.push(Operation::new(
            "l",
            vec![
                Mm(PAGE_WIDTH.0 - MARGIN_RIGHT.0).to_points().into(),
                self.y.to_points().into(),
            ],
        ));
        self.ops.push(Operation::new("S", vec![]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    /// Dash marker for a list item, aligned to the item's first baseline.
    fn marker(&mut self, top_y: Mm) {
        let baseline = Mm(top_y.0 - BODY_SIZE / 2.83465);
        let font_key = self.ensure_font(Face::Serif);
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Td",
            vec![
                MARGIN_LEFT.to_points().into(),
                baseline.to_points().into(),
            ],
        ));
        self.ops.push(Operation::new(
            "rg",
            vec![INK.0.into(), INK.1.into(), INK.2.into()],
        ));
        self.ops
            .push(Operation::new("Tf", vec![font_key.into(), BODY_SIZE.into()]));
        self.ops
            .push(Operation::new("Tj", vec![encoded_string("-")]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn advance(&mut self, amount: Mm) {
        self.y = Mm(self.y.0 - amount.0);
    }

    fn ensure_room(&mut self, needed: Mm) {
        if self.y.0 - needed.0 < MARGIN_BOTTOM.0 {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        if !self.ops.is_empty() {
            self.close_page();
        }
        self.y = Mm(PAGE_HEIGHT.0 - MARGIN_TOP.0);
    }

    fn ensure_font(&mut self, face: Face) -> &'static str {
        let key = face.key();
        if !self.font_ids.contains_key(key) {
            let font_id = self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            self.font_ids.insert(key, font_id);
        }
        key
    }

    fn close_page(&mut self) {
        let operations = std::mem::take(&mut self.ops);
        let content = Content { operations };
        // Content::encode only fails on unencodable operands; ours are all
        // numbers, names, and literal strings.
        let data = match content.encode() {
            Ok(data) => data,
            Err(_) => Vec::new(),
        };
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, data));

        let mut fonts = lopdf::Dictionary::new();
        for (key, id) in &self.font_ids {
            fonts.set(*key, Object::Reference(*id));
        }
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                0.into(),
                0.into(),
                PAGE_WIDTH.to_points().into(),
                PAGE_HEIGHT.to_points().into(),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => fonts },
        });
        self.page_ids.push(page_id);
    }

    fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        // Always emit at least one page, even for empty markdown.
        if !self.ops.is_empty() || self.page_ids.is_empty() {
            self.close_page();
        }

        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let count = self.page_ids.len() as i64;
        let pages_id = self.doc.add_object(dictionary! {
            "Type" => "Pages",
            "Count" => count,
            "Kids" => kids,
        });

        for page_id in &self.page_ids {
            if let Ok(Object::Dictionary(dict)) = self.doc.get_object_mut(*page_id) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(out)
    }
}

fn line_advance(size: f32) -> Mm {
    Mm(size * LINE_HEIGHT / 2.83465)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted_text(pdf: &[u8]) -> String {
        let doc = Document::load_mem(pdf).unwrap();
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&pages).unwrap()
    }

    #[test]
    fn test_renders_valid_pdf_header() {
        let pdf = render_pdf("# Jane Doe").unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_resume_sample_content_survives_rendering() {
        let pdf = render_pdf("# Jane Doe\n\n## Skills\n- Python\n- **Leadership**\n").unwrap();
        let text = extracted_text(&pdf);
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Skills"));
        assert!(text.contains("Python"));
        assert!(text.contains("Leadership"));
    }

    #[test]
    fn test_page_dimensions_are_a4_portrait() {
        let pdf = render_pdf("hello").unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        let (_, page_id) = doc.get_pages().into_iter().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!((width - 595.28).abs() < 1.0);
        assert!((height - 841.89).abs() < 1.0);
    }

    #[test]
    fn test_long_document_spills_onto_multiple_pages() {
        let mut md = String::from("# Long Resume\n\n");
        for i in 0..120 {
            md.push_str(&format!("- Bullet number {i} describing an achievement\n"));
        }
        let pdf = render_pdf(&md).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert!(doc.get_pages().len() >= 2);
    }

    #[test]
    fn test_empty_markdown_still_produces_a_document() {
        let pdf = render_pdf("").unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_long_paragraph_wraps_instead_of_overflowing() {
        let md = "word ".repeat(200);
        let pdf = render_pdf(&md).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        let text = extracted_text(&pdf);
        assert!(text.matches("word").count() >= 200);
    }

    #[test]
    fn test_accented_characters_survive_rendering() {
        let pdf = render_pdf("# José Martínez\n\nRésumé of a café manager").unwrap();
        let text = extracted_text(&pdf);
        assert!(text.contains("José Martínez"));
        assert!(text.contains("Résumé of a café manager"));
    }

    #[test]
    fn test_winansi_maps_latin1_and_substitutes_unknown() {
        assert_eq!(encode_winansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_winansi("\u{20ac}"), vec![0x80]);
        assert_eq!(encode_winansi("\u{65e5}"), vec![b'?']);
    }

    #[test]
    fn test_list_marker_stays_with_its_first_line_across_page_breaks() {
        // One list item long enough that its continuation lines spill onto a
        // second page. The dash must land on the page holding the first line,
        // and no page may end in a stranded marker.
        let words: Vec<String> = (0..1200).map(|i| format!("w{i}")).collect();
        let pdf = render_pdf(&format!("- {}", words.join(" "))).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();

        let mut pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        pages.sort_unstable();
        assert!(pages.len() >= 2);

        let first_page = doc.extract_text(&pages[..1]).unwrap();
        assert!(first_page.contains('-'));
        for page in &pages {
            let text = doc.extract_text(&[*page]).unwrap();
            assert_ne!(text.trim_end().chars().last(), Some('-'));
        }
    }

    #[test]
    fn test_text_width_scales_with_length() {
        let short = text_width("ab", Face::Serif, 12.0);
        let long = text_width("abcdef", Face::Serif, 12.0);
        assert!(long.0 > short.0);
    }
}
