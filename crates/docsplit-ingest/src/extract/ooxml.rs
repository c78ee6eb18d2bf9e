//! Shared reading of Office Open XML packages (DOCX, PPTX).
//!
//! Both formats are zip archives of XML parts. Parts are streamed with
//! `quick-xml`; only text runs, paragraph boundaries and a few relationship
//! attributes are kept.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::ZipArchive;

use docsplit_core::{Error, Result};

/// Upper bound on the decompressed size of the XML read from one package.
pub(crate) const MAX_PART_BYTES: u64 = 64 * 1024 * 1024;

/// Markup-compatibility branch repeating the content of its `mc:Choice`.
const FALLBACK: &[u8] = b"mc:Fallback";

/// Element names that carry text for one OOXML vocabulary.
pub(crate) struct TextMarkup {
    pub paragraph: &'static str,
    pub text: &'static str,
    pub tab: Option<&'static str>,
    pub line_breaks: &'static [&'static str],
}

/// WordprocessingML (`word/document.xml`).
pub(crate) const WORDPROCESSING: TextMarkup = TextMarkup {
    paragraph: "w:p",
    text: "w:t",
    tab: Some("w:tab"),
    line_breaks: &["w:br", "w:cr"],
};

/// DrawingML text bodies inside presentation slides.
pub(crate) const DRAWING: TextMarkup = TextMarkup {
    paragraph: "a:p",
    text: "a:t",
    tab: None,
    line_breaks: &["a:br"],
};

impl TextMarkup {
    /// Character emitted for an empty control element such as `<w:tab/>`.
    fn control(&self, name: &[u8]) -> Option<char> {
        if self.tab.map_or(false, |tab| tab.as_bytes() == name) {
            Some('\t')
        } else if self.line_breaks.iter().any(|b| b.as_bytes() == name) {
            Some('\n')
        } else {
            None
        }
    }
}

/// Open `bytes`-backed `reader` as a zip package, mapping failures to `format`.
pub(crate) fn open_package<R: Read + Seek>(reader: R, format: &str) -> Result<ZipArchive<R>> {
    ZipArchive::new(reader)
        .map_err(|e| Error::extraction(format, format!("not a valid {format} package: {e}")))
}

/// Whether the package contains a part called `name`.
pub(crate) fn has_part<R: Read + Seek>(archive: &ZipArchive<R>, name: &str) -> bool {
    archive.file_names().any(|n| n == name)
}

/// Read one XML part as UTF-8, refusing to inflate more than `limit` bytes.
pub(crate) fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    format: &str,
    limit: u64,
) -> Result<String> {
    let part = archive
        .by_name(name)
        .map_err(|e| Error::extraction(format, format!("missing {name}: {e}")))?;

    let declared = part.size();
    if declared > limit {
        return Err(too_large(format, name, limit));
    }

    // The declared size comes from the archive itself, so the read is capped too.
    let mut xml = Vec::new();
    part.take(limit.saturating_add(1))
        .read_to_end(&mut xml)
        .map_err(|e| Error::extraction(format, format!("unreadable {name}: {e}")))?;
    if xml.len() as u64 > limit {
        return Err(too_large(format, name, limit));
    }

    String::from_utf8(xml)
        .map_err(|e| Error::extraction(format, format!("{name} is not UTF-8: {e}")))
}

fn too_large(format: &str, name: &str, limit: u64) -> Error {
    Error::extraction(
        format,
        format!("{name} inflates beyond the {limit} byte limit"),
    )
}

fn malformed(format: &str, err: impl std::fmt::Display) -> Error {
    Error::extraction(format, format!("malformed XML: {err}"))
}

/// Paragraph texts of an XML part, in document order.
///
/// Paragraphs nested in another paragraph (text boxes) get their own line,
/// placed after the paragraph that anchors them. `mc:Fallback` branches are
/// skipped. Paragraphs without any text run are kept as empty strings so the
/// caller can reproduce blank lines between paragraphs.
pub(crate) fn paragraphs(xml: &str, markup: &TextMarkup, format: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<String> = Vec::new();
    // Indexes into `lines` of the open paragraphs, innermost last.
    let mut open: Vec<usize> = Vec::new();
    let mut text_depth = 0usize;
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event().map_err(|e| malformed(format, e))? {
            Event::Start(e) => {
                let qname = e.name();
                let name = qname.as_ref();
                if skip_depth > 0 || name == FALLBACK {
                    skip_depth += 1;
                } else if name == markup.paragraph.as_bytes() {
                    open.push(lines.len());
                    lines.push(String::new());
                } else if name == markup.text.as_bytes() {
                    text_depth += 1;
                }
            }
            Event::Empty(e) => {
                if skip_depth > 0 {
                    continue;
                }
                let qname = e.name();
                let name = qname.as_ref();
                if name == markup.paragraph.as_bytes() {
                    lines.push(String::new());
                } else if let (Some(c), Some(&line)) = (markup.control(name), open.last()) {
                    lines[line].push(c);
                }
            }
            Event::End(e) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
                let qname = e.name();
                let name = qname.as_ref();
                if name == markup.paragraph.as_bytes() {
                    open.pop();
                } else if name == markup.text.as_bytes() {
                    text_depth = text_depth.saturating_sub(1);
                }
            }
            Event::Text(e) if skip_depth == 0 && text_depth > 0 => {
                let text = e
                    .unescape()
                    .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned().into());
                push_text(&mut lines, &open, &text);
            }
            Event::CData(e) if skip_depth == 0 && text_depth > 0 => {
                push_text(&mut lines, &open, &String::from_utf8_lossy(&e));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(lines)
}

/// Text outside any paragraph element still belongs to the document.
fn push_text(lines: &mut Vec<String>, open: &[usize], text: &str) {
    match open.last() {
        Some(&line) => lines[line].push_str(text),
        None => lines.push(text.to_string()),
    }
}

/// Attributes of every `element` in `xml`, in document order.
pub(crate) fn elements(
    xml: &str,
    element: &str,
    format: &str,
) -> Result<Vec<HashMap<String, String>>> {
    let mut reader = Reader::from_str(xml);
    let mut found = Vec::new();

    loop {
        match reader.read_event().map_err(|e| malformed(format, e))? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == element.as_bytes() => {
                found.push(attributes(&e, format)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(found)
}

fn attributes(element: &BytesStart<'_>, format: &str) -> Result<HashMap<String, String>> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| malformed(format, e))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map(Cow::into_owned)
                .map_err(|e| malformed(format, e))?;
            Ok((key, value))
        })
        .collect()
}

/// Resolve a relationship `target` against the directory of its source part.
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;

    /// Build an in-memory zip package from `(path, contents)` parts.
    pub fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let buf = std::io::Cursor::new(Vec::new());
        let mut zip = zip::ZipWriter::new(buf);
        let options = zip::write::SimpleFileOptions::default();
        for (name, contents) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}
