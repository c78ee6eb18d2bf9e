use docsplit_core::{Error, Result};

use super::FormatHandler;

/// Strict UTF-8 decoding; the text is returned exactly as uploaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextHandler;

impl FormatHandler for PlainTextHandler {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes).map(str::to_owned).map_err(|e| {
            Error::extraction(
                self.name(),
                format!("invalid UTF-8 sequence at byte {}", e.valid_up_to()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim() {
        let raw = "\u{feff}Ünïcödé  text\r\nwith 🎉\n\n";
        assert_eq!(PlainTextHandler.extract(raw.as_bytes()).unwrap(), raw);
    }

    #[test]
    fn test_empty() {
        assert_eq!(PlainTextHandler.extract(b"").unwrap(), "");
    }

    #[test]
    fn test_invalid_utf8_reports_offset() {
        let err = PlainTextHandler.extract(b"abc\xc3\x28").unwrap_err();
        assert!(err.to_string().contains("byte 3"), "{err}");
    }
}
