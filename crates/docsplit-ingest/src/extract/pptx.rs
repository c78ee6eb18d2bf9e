use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};

use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::SpooledTempFile;
use tracing::debug;
use zip::ZipArchive;

use docsplit_core::Result;

use super::ooxml::{self, DRAWING};
use super::FormatHandler;

/// Uploads larger than this spill from memory to an anonymous temp file.
const SPOOL_THRESHOLD: usize = 8 * 1024 * 1024;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

static SLIDE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").unwrap());

/// Presentations: text of every slide, in presentation order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxHandler;

impl FormatHandler for PptxHandler {
    fn name(&self) -> &'static str {
        "pptx"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // The archive reader needs random access; the spool is dropped (and any
        // backing file removed) on every return path.
        let mut spool = SpooledTempFile::new(SPOOL_THRESHOLD);
        spool.write_all(bytes)?;
        spool.seek(SeekFrom::Start(0))?;

        let mut archive = ooxml::open_package(spool, self.name())?;
        let mut budget = ooxml::MAX_PART_BYTES;
        let presentation =
            ooxml::read_part(&mut archive, PRESENTATION_PART, self.name(), budget)?;
        budget -= presentation.len() as u64;

        let slides = if ooxml::has_part(&archive, PRESENTATION_RELS) {
            let rels = ooxml::read_part(&mut archive, PRESENTATION_RELS, self.name(), budget)?;
            budget -= rels.len() as u64;
            listed_slides(&presentation, &rels, self.name())?
        } else {
            numbered_slides(&archive)
        };

        let mut lines = Vec::new();
        for slide in slides {
            let xml = ooxml::read_part(&mut archive, &slide, self.name(), budget)?;
            budget -= xml.len() as u64;
            lines.extend(ooxml::paragraphs(&xml, &DRAWING, self.name())?);
        }
        Ok(lines.join("\n"))
    }
}

/// Slide parts in the order of `<p:sldIdLst>`, resolved through the
/// presentation relationships.
fn listed_slides(presentation: &str, rels: &str, format: &str) -> Result<Vec<String>> {
    let targets: HashMap<String, String> = ooxml::elements(rels, "Relationship", format)?
        .into_iter()
        .filter_map(|mut rel| Some((rel.remove("Id")?, rel.remove("Target")?)))
        .collect();

    let mut slides = Vec::new();
    for slide_id in ooxml::elements(presentation, "p:sldId", format)? {
        let Some(rel_id) = slide_id.get("r:id") else {
            continue;
        };
        match targets.get(rel_id) {
            Some(target) => slides.push(ooxml::resolve_target("ppt", target)),
            None => debug!("Slide relationship {} has no target, skipping", rel_id),
        }
    }
    Ok(slides)
}

/// Slide part names sorted by slide number (`slide10` after `slide9`), for
/// packages without presentation relationships.
fn numbered_slides<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = SLIDE_RE.captures(name)?.get(1)?.as_str().parse().ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort_by_key(|(number, _)| *number);
    slides.into_iter().map(|(_, name)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ooxml::fixtures;
    use docsplit_core::Error;

    fn slide(paragraphs: &[&str]) -> String {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<a:p><a:r><a:t>{p}</a:t></a:r></a:p>"))
            .collect();
        format!(r#"<p:sld><p:cSld><p:spTree><p:sp><p:txBody>{body}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#)
    }

    #[test]
    fn test_slides_in_numeric_order() {
        let s1 = slide(&["Intro"]);
        let s2 = slide(&["Second slide", "with two paragraphs"]);
        let s10 = slide(&["Tenth"]);
        let bytes = fixtures::package(&[
            (PRESENTATION_PART, "<p:presentation/>"),
            ("ppt/slides/slide10.xml", s10.as_str()),
            ("ppt/slides/slide2.xml", s2.as_str()),
            ("ppt/slides/slide1.xml", s1.as_str()),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
        ]);

        let text = PptxHandler.extract(&bytes).unwrap();
        assert_eq!(text, "Intro\nSecond slide\nwith two paragraphs\nTenth");
    }

    fn presentation(rel_ids: &[&str]) -> String {
        let ids: String = rel_ids
            .iter()
            .enumerate()
            .map(|(i, id)| format!(r#"<p:sldId id="{}" r:id="{id}"/>"#, 256 + i))
            .collect();
        format!(r#"<p:presentation><p:sldIdLst>{ids}</p:sldIdLst></p:presentation>"#)
    }

    fn relationships(rels: &[(&str, &str)]) -> String {
        let body: String = rels
            .iter()
            .map(|(id, target)| {
                format!(r#"<Relationship Id="{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="{target}"/>"#)
            })
            .collect();
        format!("<Relationships>{body}</Relationships>")
    }

    #[test]
    fn test_reordered_deck_follows_slide_list() {
        let first = slide(&["Shown first"]);
        let second = slide(&["Shown second"]);
        let pres = presentation(&["rId3", "rId2"]);
        let rels = relationships(&[
            ("rId1", "slideMasters/slideMaster1.xml"),
            ("rId2", "slides/slide1.xml"),
            ("rId3", "slides/slide2.xml"),
        ]);
        let bytes = fixtures::package(&[
            (PRESENTATION_PART, pres.as_str()),
            (PRESENTATION_RELS, rels.as_str()),
            ("ppt/slides/slide1.xml", second.as_str()),
            ("ppt/slides/slide2.xml", first.as_str()),
        ]);

        let text = PptxHandler.extract(&bytes).unwrap();
        assert_eq!(text, "Shown first\nShown second");
    }

    #[test]
    fn test_slide_list_skips_unknown_ids_and_accepts_absolute_targets() {
        let a = slide(&["A"]);
        let b = slide(&["B"]);
        let orphan = slide(&["Not in the deck"]);
        let pres = presentation(&["rId7", "rId8", "rId9"]);
        let rels = relationships(&[("rId7", "/ppt/slides/slide4.xml"), ("rId8", "slides/slide3.xml")]);
        let bytes = fixtures::package(&[
            (PRESENTATION_PART, pres.as_str()),
            (PRESENTATION_RELS, rels.as_str()),
            ("ppt/slides/slide3.xml", b.as_str()),
            ("ppt/slides/slide4.xml", a.as_str()),
            ("ppt/slides/slide5.xml", orphan.as_str()),
        ]);

        assert_eq!(PptxHandler.extract(&bytes).unwrap(), "A\nB");
    }

    #[test]
    fn test_presentation_without_slides_is_empty() {
        let bytes = fixtures::package(&[(PRESENTATION_PART, "<p:presentation/>")]);
        assert_eq!(PptxHandler.extract(&bytes).unwrap(), "");
    }

    #[test]
    fn test_docx_uploaded_as_pptx_rejected() {
        let bytes = fixtures::package(&[("word/document.xml", "<w:document/>")]);
        let err = PptxHandler.extract(&bytes).unwrap_err();
        assert!(matches!(err, Error::Extraction { ref format, .. } if format == "pptx"));
    }
}
