//! Word documents.
//!
//! Paragraph text is read from `word/document.xml` and regrouped into one
//! review per line. Documents that number, bullet, or label their reviews
//! (`1.`, `2)`, `•`, `Review 3:`) are grouped on those markers, with
//! unmarked lines continuing the current review. Documents without any
//! markers yield one review per paragraph.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use zip::ZipArchive;

use super::unreadable;
use crate::error::IngestError;

const FORMAT: &str = "DOCX";
const DOCUMENT_PART: &str = "word/document.xml";
/// Segments this short or shorter are dropped.
const MIN_REVIEW_CHARS: usize = 10;

static REVIEW_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d+(?:[.)]\s|\.\w)|[•*-]\s|(?:review|customer|feedback)(?:\s*\d+\s*:?|\s*:))")
        .expect("valid regex")
});

static LEADING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d+[.)]\s*)?(?:[•*-]\s*)?(?:(?:review|customer|feedback)(?:\s*\d+\s*:?|\s*:)\s*)?")
        .expect("valid regex")
});

pub(super) fn parse_docx(name: &str, bytes: &[u8]) -> Result<String, IngestError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| unreadable(name, FORMAT, e))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| unreadable(name, FORMAT, e))?
        .read_to_string(&mut xml)
        .map_err(|e| unreadable(name, FORMAT, e))?;

    let text = paragraph_text(name, &xml)?;
    Ok(segment_reviews(&text).join("\n"))
}

/// Text of every `w:t` run, one line per paragraph.
fn paragraph_text(name: &str, xml: &str) -> Result<String, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(|e| unreadable(name, FORMAT, e))? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_run_text = true,
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"br" | b"cr" => out.push('\n'),
                b"tab" => out.push(' '),
                _ => {}
            },
            Event::Text(e) if in_run_text => {
                let text = e.unescape().map_err(|e| unreadable(name, FORMAT, e))?;
                out.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

/// Group document lines into reviews.
fn segment_reviews(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let marked = lines.iter().any(|l| REVIEW_START.is_match(l));

    let mut reviews = Vec::new();
    let mut current = String::new();
    for line in lines {
        if !marked || REVIEW_START.is_match(line) {
            flush(&mut reviews, &mut current);
        }
        let cleaned = LEADING_MARKER.replace(line, "");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(cleaned);
        }
    }
    flush(&mut reviews, &mut current);

    reviews.retain(|r| r.chars().count() > MIN_REVIEW_CHARS);
    reviews
}

fn flush(reviews: &mut Vec<String>, current: &mut String) {
    let review = current.trim();
    if !review.is_empty() {
        reviews.push(review.to_owned());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_start_reviews_and_continuations_join() {
        let text = "1. The blender is powerful\nand easy to clean.\n2) Lid cracked\n\
                    - Motor smells hot after use\nReview 4: Stopped working after a week\n";
        assert_eq!(
            segment_reviews(text),
            vec![
                "The blender is powerful and easy to clean.",
                "Lid cracked",
                "Motor smells hot after use",
                "Stopped working after a week",
            ]
        );
    }

    #[test]
    fn unmarked_paragraphs_are_separate_reviews() {
        let text = "Fast shipping and great support\n\nok\nWould buy again from this seller\n";
        assert_eq!(
            segment_reviews(text),
            vec!["Fast shipping and great support", "Would buy again from this seller"]
        );
    }

    #[test]
    fn labels_need_a_number_or_colon() {
        let text = "Customer 1: Arrived broken\nCustomer service answered within an hour\n";
        assert_eq!(
            segment_reviews(text),
            vec!["Arrived broken Customer service answered within an hour"]
        );

        let text = "Feedback: Colours faded after one wash\nFeedback 2 Seams came apart quickly\n";
        assert_eq!(
            segment_reviews(text),
            vec!["Colours faded after one wash", "Seams came apart quickly"]
        );
    }

    #[test]
    fn short_segments_are_dropped() {
        assert_eq!(
            segment_reviews("1. Good\n2. Bad value\n3. Works as described"),
            vec!["Works as described"]
        );
    }

    #[test]
    fn paragraphs_and_breaks_become_lines() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body>
            <w:p><w:r><w:t>Great</w:t></w:r><w:r><w:t xml:space="preserve"> value &amp; fit</w:t></w:r></w:p>
            <w:p><w:r><w:t>First line</w:t><w:br/><w:t>second line</w:t></w:r></w:p>
            <w:p/>
        </w:body></w:document>"#;
        let text = paragraph_text("r.docx", xml).unwrap();
        assert_eq!(text, "Great value & fit\nFirst line\nsecond line\n");
    }

    #[test]
    fn non_zip_bytes_are_unreadable() {
        let err = parse_docx("r.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, IngestError::Unreadable { format: "DOCX", .. }));
    }
}
