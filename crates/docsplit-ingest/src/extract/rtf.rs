//! Rich Text Format reader.
//!
//! Walks the control-word stream once, tracking group state on a stack.
//! Destination groups that hold no body text (font tables, pictures,
//! document info, headers) are skipped entirely.

use docsplit_core::{Error, Result};

use super::FormatHandler;

const FORMAT: &str = "rtf";

/// Destinations whose content is never part of the visible body text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "author",
    "colortbl",
    "comment",
    "datastore",
    "filetbl",
    "fonttbl",
    "footer",
    "footerf",
    "footerl",
    "footerr",
    "footnote",
    "generator",
    "header",
    "headerf",
    "headerl",
    "headerr",
    "info",
    "latentstyles",
    "listoverridetable",
    "listtable",
    "object",
    "operator",
    "pict",
    "revtbl",
    "rsidtbl",
    "stylesheet",
    "themedata",
    "title",
    "xmlnstbl",
];

/// Windows-1252 code points for bytes 0x80..=0x9F; the rest match Latin-1.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{FFFD}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{FFFD}', '\u{017D}', '\u{FFFD}',
    '\u{FFFD}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{FFFD}', '\u{017E}', '\u{0178}',
];

/// RTF documents: body text with paragraph and tab structure kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct RtfHandler;

impl FormatHandler for RtfHandler {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        RtfReader::new(bytes).read()
    }
}

#[derive(Debug, Clone, Copy)]
struct GroupState {
    skip: bool,
    /// Fallback characters following each `\uN` (set by `\ucN`).
    unicode_skip: usize,
}

struct RtfReader<'a> {
    input: &'a [u8],
    pos: usize,
    state: GroupState,
    stack: Vec<GroupState>,
    pending_fallback: usize,
    out: String,
}

impl<'a> RtfReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            state: GroupState {
                skip: false,
                unicode_skip: 1,
            },
            stack: Vec::new(),
            pending_fallback: 0,
            out: String::new(),
        }
    }

    fn read(mut self) -> Result<String> {
        let start = self
            .input
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(self.input.len());
        if !self.input[start..].starts_with(b"{\\rtf") {
            return Err(Error::extraction(FORMAT, "missing {\\rtf header"));
        }
        self.pos = start;

        while let Some(&byte) = self.input.get(self.pos) {
            self.pos += 1;
            match byte {
                b'{' => self.stack.push(self.state),
                b'}' => {
                    self.state = self.stack.pop().ok_or_else(|| {
                        Error::extraction(FORMAT, format!("unbalanced '}}' at byte {}", self.pos - 1))
                    })?;
                    // Fallback skipping never outlives the group of its \u.
                    self.pending_fallback = 0;
                }
                b'\\' => self.control()?,
                b'\r' | b'\n' => {}
                _ => self.emit_byte(byte),
            }
        }

        if !self.stack.is_empty() {
            return Err(Error::extraction(
                FORMAT,
                format!("{} unclosed group(s)", self.stack.len()),
            ));
        }
        Ok(self.out.trim().to_string())
    }

    /// Handle the sequence following a backslash.
    fn control(&mut self) -> Result<()> {
        let Some(&next) = self.input.get(self.pos) else {
            return Ok(());
        };

        if !next.is_ascii_alphabetic() {
            self.pos += 1;
            match next {
                b'\\' | b'{' | b'}' => self.emit_char(next as char),
                b'\'' => self.hex_escape()?,
                b'*' => self.state.skip = true,
                b'~' => self.emit_char('\u{00A0}'),
                b'_' => self.emit_char('-'),
                b'\r' | b'\n' => self.emit_char('\n'),
                // Optional hyphens and other symbols carry no text.
                _ => {}
            }
            return Ok(());
        }

        let word_start = self.pos;
        while self.input.get(self.pos).is_some_and(u8::is_ascii_alphabetic) {
            self.pos += 1;
        }
        let word = String::from_utf8_lossy(&self.input[word_start..self.pos]).into_owned();

        let param_start = self.pos;
        if self.input.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        while self.input.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        let param = std::str::from_utf8(&self.input[param_start..self.pos])
            .ok()
            .and_then(|p| p.parse::<i32>().ok());

        // A single space delimits the control word and is not text.
        if self.input.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }

        self.control_word(&word, param);
        Ok(())
    }

    fn control_word(&mut self, word: &str, param: Option<i32>) {
        if SKIPPED_DESTINATIONS.iter().any(|d| *d == word) {
            self.state.skip = true;
            return;
        }

        match word {
            "par" | "line" | "sect" | "page" | "row" => self.emit_char('\n'),
            "tab" | "cell" => self.emit_char('\t'),
            "emdash" => self.emit_char('\u{2014}'),
            "endash" => self.emit_char('\u{2013}'),
            "bullet" => self.emit_char('\u{2022}'),
            "lquote" => self.emit_char('\u{2018}'),
            "rquote" => self.emit_char('\u{2019}'),
            "ldblquote" => self.emit_char('\u{201C}'),
            "rdblquote" => self.emit_char('\u{201D}'),
            "uc" => self.state.unicode_skip = param.unwrap_or(1).max(0) as usize,
            "u" => {
                if let Some(code) = param {
                    // Code points above 32767 are written as negative numbers.
                    let code = if code < 0 { code + 65536 } else { code };
                    let ch = char::from_u32(code as u32).unwrap_or('\u{FFFD}');
                    self.emit_char(ch);
                    self.pending_fallback = self.state.unicode_skip;
                }
            }
            "bin" => {
                let len = param.unwrap_or(0).max(0) as usize;
                self.pos = (self.pos + len).min(self.input.len());
            }
            _ => {}
        }
    }

    /// `\'hh`: one byte in the document code page.
    fn hex_escape(&mut self) -> Result<()> {
        let digits = self
            .input
            .get(self.pos..self.pos + 2)
            .and_then(|d| std::str::from_utf8(d).ok())
            .and_then(|d| u8::from_str_radix(d, 16).ok())
            .ok_or_else(|| {
                Error::extraction(FORMAT, format!("bad hex escape at byte {}", self.pos))
            })?;
        self.pos += 2;
        self.emit_byte(digits);
        Ok(())
    }

    fn emit_byte(&mut self, byte: u8) {
        let ch = match byte {
            0x80..=0x9F => CP1252_HIGH[(byte - 0x80) as usize],
            _ => byte as char,
        };
        self.emit_char(ch);
    }

    fn emit_char(&mut self, ch: char) {
        if self.pending_fallback > 0 {
            self.pending_fallback -= 1;
            return;
        }
        if !self.state.skip {
            self.out.push(ch);
        }
    }
}
