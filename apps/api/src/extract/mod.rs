//! PDF text extraction — uploaded resume bytes to plain text.
//!
//! Lossy: no layout reconstruction (columns, tables). Each page's
//! text fragments are joined with a single space, pages are joined with one
//! blank line in document order, and the full result is trimmed.

use lopdf::Document;
use thiserror::Error;

/// Upload capability set, enforced by the handler before extraction runs.
pub const MAX_PDF_BYTES: usize = 5 * 1024 * 1024;
pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input bytes do not decode as a PDF at all.
    #[error("Failed to extract text from PDF. Please ensure the file is a valid PDF.")]
    Parse(String),
}

/// Extracts the concatenated text of all pages, in ascending page order.
///
/// A page whose content streams carry no text yields an empty fragment and is
/// skipped silently — an empty result is valid (e.g. a scanned image with no
/// text layer) and is not an error. Only a document that fails to load at all
/// is reported as `ExtractError::Parse`.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;

    let page_map = doc.get_pages();
    let mut page_numbers: Vec<u32> = page_map.keys().copied().collect();
    page_numbers.sort_unstable();

    let pages: Vec<String> = page_numbers
        .iter()
        .map(|page_number| {
            let raw = doc
                .extract_text(&[*page_number])
                .unwrap_or_else(|_| String::new());
            join_fragments(&raw)
        })
        .collect();

    Ok(pages.join("\n\n").trim().to_string())
}

/// Collapses a page's raw text runs into a single space-joined line.
fn join_fragments(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    /// Builds a minimal single-font PDF with one page per text argument.
    /// An empty string produces a page with no text operations.
    fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 12 Tf 50 700 Td ({text}) Tj ET")
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_extracts_single_page_text() {
        let pdf = build_pdf(&["Experienced backend engineer."]);
        let text = extract_text(&pdf).unwrap();
        assert_eq!(text, "Experienced backend engineer.");
    }

    #[test]
    fn test_pages_in_order_separated_by_blank_line() {
        let pdf = build_pdf(&["First page text", "Second page text"]);
        let text = extract_text(&pdf).unwrap();
        assert_eq!(text, "First page text\n\nSecond page text");
    }

    #[test]
    fn test_no_leading_or_trailing_whitespace() {
        let pdf = build_pdf(&["Only page"]);
        let text = extract_text(&pdf).unwrap();
        assert_eq!(text, text.trim());
    }

    #[test]
    fn test_textless_pdf_is_empty_string_not_error() {
        let pdf = build_pdf(&[""]);
        let text = extract_text(&pdf).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_corrupt_input_is_parse_error() {
        let result = extract_text(b"this is not a pdf");
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }

    #[test]
    fn test_parse_error_message_is_user_facing() {
        let err = extract_text(&[]).unwrap_err();
        assert!(err.to_string().contains("valid PDF"));
    }

    #[test]
    fn test_fragments_are_space_joined() {
        assert_eq!(join_fragments("Jane\nDoe\n  Engineer"), "Jane Doe Engineer");
        assert_eq!(join_fragments(""), "");
    }
}
