//! DOCX and XLSX ingestion against small packages assembled in memory.

use std::io::{Cursor, Write};

use revlens_analysis::{parse_document, reviews_from_text};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, body) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn docx(body: &str) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    package(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
        ),
        ("word/document.xml", &document),
    ])
}

fn inline(cell: &str, text: &str) -> String {
    format!(r#"<c r="{cell}" t="inlineStr"><is><t>{text}</t></is></c>"#)
}

fn xlsx(sheet_data: &str) -> Vec<u8> {
    let sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_data}</sheetData></worksheet>"#
    );
    package(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Reviews" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
        ),
        ("xl/worksheets/sheet1.xml", &sheet),
    ])
}

#[test]
fn docx_numbered_reviews_become_records() {
    let bytes = docx(concat!(
        r#"<w:p><w:r><w:t>1. The blender is </w:t></w:r><w:r><w:t xml:space="preserve">powerful &amp; quiet</w:t></w:r></w:p>"#,
        r"<w:p><w:r><w:t>and easy to clean.</w:t></w:r></w:p>",
        r"<w:p><w:r><w:t>2) Lid cracked</w:t></w:r></w:p>",
        r"<w:p/>",
        r"<w:p><w:r><w:t>Review 3: Stopped working after a week</w:t></w:r></w:p>",
    ));

    let text = parse_document("feedback.docx", DOCX_MIME, &bytes).unwrap();
    assert_eq!(
        text,
        "The blender is powerful & quiet and easy to clean.\nLid cracked\nStopped working after a week"
    );

    let reviews = reviews_from_text(&text);
    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews[2].position, 3);
}

#[test]
fn docx_without_document_part_is_unreadable() {
    let bytes = package(&[("word/styles.xml", "<w:styles/>")]);
    let err = parse_document("empty.docx", "", &bytes).unwrap_err();
    assert!(err.to_string().contains("DOCX"), "{err}");
}

#[test]
fn xlsx_first_sheet_rows_become_reviews() {
    let rows = [
        format!(
            r#"<row r="1">{}{}{}<c r="D1" t="inlineStr"><is><t>Rating</t></is></c></row>"#,
            inline("A1", "Date"),
            inline("B1", "Name"),
            inline("C1", "Review"),
        ),
        format!(
            r#"<row r="2">{}{}{}<c r="D2"><v>5</v></c></row>"#,
            inline("A2", "2024-03-01"),
            inline("B2", "Ana"),
            inline("C2", "Battery life is fantastic"),
        ),
        format!(
            r#"<row r="3">{}{}<c r="D3"><v>2</v></c></row>"#,
            inline("B3", "Bo"),
            inline("C3", "Too slow to charge"),
        ),
    ]
    .concat();

    let text = parse_document("export.xlsx", XLSX_MIME, &xlsx(&rows)).unwrap();
    assert_eq!(
        text,
        "[2024-03-01] Battery life is fantastic\nToo slow to charge"
    );
}
