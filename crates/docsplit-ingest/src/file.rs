//! Format tag resolution from upload filenames.

use std::path::Path;

/// Document formats with a dedicated extraction handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
    Pptx,
    Html,
    Rtf,
    PlainText,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "pptx" => Self::Pptx,
            "html" | "htm" | "xhtml" => Self::Html,
            "rtf" => Self::Rtf,
            "txt" | "text" | "md" | "markdown" | "csv" | "log" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    pub fn from_filename(filename: &str) -> Self {
        format_tag(filename)
            .map(|tag| Self::from_extension(&tag))
            .unwrap_or(Self::Unknown)
    }

    /// Extensions that resolve to this file type.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Pdf => &["pdf"],
            Self::Docx => &["docx"],
            Self::Pptx => &["pptx"],
            Self::Html => &["html", "htm", "xhtml"],
            Self::Rtf => &["rtf"],
            Self::PlainText => &["txt", "text", "md", "markdown", "csv", "log"],
            Self::Unknown => &[],
        }
    }
}

/// Lower-cased extension of the final path component, if any.
///
/// Dot-files (`.bashrc`) and names ending in a dot have no extension.
pub fn format_tag(filename: &str) -> Option<String> {
    // Uploads from Windows clients may carry backslash separators.
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag_lowercases() {
        assert_eq!(format_tag("Report.PDF").as_deref(), Some("pdf"));
        assert_eq!(format_tag("slides.PpTx").as_deref(), Some("pptx"));
    }

    #[test]
    fn test_format_tag_uses_last_extension() {
        assert_eq!(format_tag("backup.tar.gz").as_deref(), Some("gz"));
        assert_eq!(format_tag("uploads/2024/notes.md").as_deref(), Some("md"));
        assert_eq!(format_tag(r"C:\Users\me\letter.docx").as_deref(), Some("docx"));
    }

    #[test]
    fn test_format_tag_absent() {
        assert_eq!(format_tag("README"), None);
        assert_eq!(format_tag(".bashrc"), None);
        assert_eq!(format_tag("trailing."), None);
        assert_eq!(format_tag(""), None);
    }

    #[test]
    fn test_from_filename() {
        assert_eq!(FileType::from_filename("a.HTM"), FileType::Html);
        assert_eq!(FileType::from_filename("a.markdown"), FileType::PlainText);
        assert_eq!(FileType::from_filename("a.doc"), FileType::Unknown);
        assert_eq!(FileType::from_filename("noext"), FileType::Unknown);
        assert!(FileType::Unknown.extensions().is_empty());
    }
}
