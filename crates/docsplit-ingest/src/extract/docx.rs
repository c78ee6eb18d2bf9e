use std::io::Cursor;

use docsplit_core::Result;

use super::ooxml::{self, WORDPROCESSING};
use super::FormatHandler;

const DOCUMENT_PART: &str = "word/document.xml";

/// Word documents: body paragraphs joined by newlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxHandler;

impl FormatHandler for DocxHandler {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = ooxml::open_package(Cursor::new(bytes), self.name())?;
        let xml = ooxml::read_part(
            &mut archive,
            DOCUMENT_PART,
            self.name(),
            ooxml::MAX_PART_BYTES,
        )?;
        Ok(ooxml::paragraphs(&xml, &WORDPROCESSING, self.name())?.join("\n"))
    }
}
