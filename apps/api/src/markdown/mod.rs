//! Markdown block parser for the constrained subset the rewrite model emits:
//! headings 1–3, unordered list items (`- `), bold spans (`**text**`), and
//! blank-line-separated paragraphs.
//!
//! Parsing produces typed blocks so rendering is a pure mapping step — no
//! order-dependent string substitution, and no way for a list line to end up
//! nested inside a paragraph. The parser never reorders, rewrites, or drops
//! text content.

/// An inline run of text, either plain or bold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
}

/// A top-level block in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Heading level 1–3.
    Heading { level: u8, spans: Vec<Span> },
    ListItem(Vec<Span>),
    Paragraph(Vec<Span>),
}

/// Parses markdown into a flat block sequence.
///
/// Consecutive plain lines merge into one paragraph (joined with a space);
/// blank lines end the current paragraph. Heading and list lines always
/// terminate any open paragraph first, so a heading immediately followed by a
/// bullet list produces exactly `Heading, ListItem, ...` with no empty
/// paragraph wrappers.
pub fn parse(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();

    let flush_paragraph = |paragraph: &mut Vec<String>, blocks: &mut Vec<Block>| {
        if !paragraph.is_empty() {
            let text = paragraph.join(" ");
            blocks.push(Block::Paragraph(parse_spans(&text)));
            paragraph.clear();
        }
    };

    for line in markdown.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
        } else if let Some((level, rest)) = heading_line(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading {
                level,
                spans: parse_spans(rest),
            });
        } else if let Some(rest) = trimmed.strip_prefix("- ") {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::ListItem(parse_spans(rest.trim())));
        } else {
            paragraph.push(trimmed.to_string());
        }
    }
    flush_paragraph(&mut paragraph, &mut blocks);

    blocks
}

/// Returns `(level, text)` for `#`, `##`, `###` lines.
/// Four or more hashes is outside the subset and reads as paragraph text.
fn heading_line(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if (1..=3).contains(&hashes) {
        line[hashes..]
            .strip_prefix(' ')
            .map(|rest| (hashes as u8, rest.trim()))
    } else {
        None
    }
}

/// Splits inline text into plain and bold spans on `**` pairs.
/// An unmatched `**` carries no formatting and stays literal text.
fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        match after_open.find("**") {
            Some(close) => {
                if open > 0 {
                    spans.push(Span::Text(rest[..open].to_string()));
                }
                let bold = &after_open[..close];
                if !bold.is_empty() {
                    spans.push(Span::Bold(bold.to_string()));
                }
                rest = &after_open[close + 2..];
            }
            None => break, // unmatched opener: leave the remainder literal
        }
    }
    if !rest.is_empty() {
        spans.push(Span::Text(rest.to_string()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }

    fn bold(s: &str) -> Span {
        Span::Bold(s.to_string())
    }

    #[test]
    fn test_heading_levels() {
        let blocks = parse("# One\n## Two\n### Three");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, spans: vec![text("One")] },
                Block::Heading { level: 2, spans: vec![text("Two")] },
                Block::Heading { level: 3, spans: vec![text("Three")] },
            ]
        );
    }

    #[test]
    fn test_four_hashes_is_not_a_heading() {
        let blocks = parse("#### Deep");
        assert_eq!(blocks, vec![Block::Paragraph(vec![text("#### Deep")])]);
    }

    #[test]
    fn test_resume_sample_shape() {
        let blocks = parse("# Jane Doe\n\n## Skills\n- Python\n- **Leadership**\n");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, spans: vec![text("Jane Doe")] },
                Block::Heading { level: 2, spans: vec![text("Skills")] },
                Block::ListItem(vec![text("Python")]),
                Block::ListItem(vec![bold("Leadership")]),
            ]
        );
    }

    #[test]
    fn test_heading_immediately_followed_by_bullets_has_no_empty_paragraph() {
        let blocks = parse("## Work Experience\n- Led a team\n- Shipped a product");
        assert!(blocks
            .iter()
            .all(|b| !matches!(b, Block::Paragraph(spans) if spans.is_empty())));
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn test_paragraph_lines_merge_until_blank_line() {
        let blocks = parse("First line\nsecond line\n\nNext paragraph");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![text("First line second line")]),
                Block::Paragraph(vec![text("Next paragraph")]),
            ]
        );
    }

    #[test]
    fn test_bold_span_inside_paragraph() {
        let blocks = parse("Delivered **40% faster** builds");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![
                text("Delivered "),
                bold("40% faster"),
                text(" builds"),
            ])]
        );
    }

    #[test]
    fn test_unmatched_bold_marker_stays_literal() {
        assert_eq!(parse_spans("a ** b"), vec![text("a ** b")]);
    }

    #[test]
    fn test_multiple_bold_spans() {
        assert_eq!(
            parse_spans("**a** and **b**"),
            vec![bold("a"), text(" and "), bold("b")]
        );
    }

    #[test]
    fn test_empty_input_parses_to_no_blocks() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n\n").is_empty());
    }

    #[test]
    fn test_list_item_with_leading_indent() {
        let blocks = parse("  - indented bullet");
        assert_eq!(blocks, vec![Block::ListItem(vec![text("indented bullet")])]);
    }
}
