use scraper::{ElementRef, Html, Selector};

use docsplit_core::Result;

use super::FormatHandler;

/// Visible text of an HTML page, one line per block element.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlHandler;

impl HtmlHandler {
    fn extract_element_text(element: &ElementRef, out: &mut String) {
        for node in element.children() {
            if let Some(el) = ElementRef::wrap(node) {
                let tag_name = el.value().name();

                if matches!(tag_name, "script" | "style" | "noscript" | "head" | "template") {
                    continue;
                }

                let block = is_block(tag_name);
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }

                Self::extract_element_text(&el, out);

                if block {
                    out.push('\n');
                }
            } else if let Some(text) = node.value().as_text() {
                out.push_str(text);
            }
        }
    }

    fn normalize_lines(text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn is_block(tag_name: &str) -> bool {
    matches!(
        tag_name,
        "p" | "div"
            | "br"
            | "li"
            | "tr"
            | "td"
            | "th"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "blockquote"
            | "pre"
    )
}

impl FormatHandler for HtmlHandler {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // HTML parsing is error-tolerant; any byte sequence yields a document.
        let source = String::from_utf8_lossy(bytes);
        let document = Html::parse_document(&source);

        let mut text = String::new();
        let body_selector = Selector::parse("body").ok();
        let body = body_selector
            .as_ref()
            .and_then(|sel| document.select(sel).next());
        match body {
            Some(body) => Self::extract_element_text(&body, &mut text),
            None => Self::extract_element_text(&document.root_element(), &mut text),
        }

        Ok(Self::normalize_lines(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_elements_become_lines() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head><title>Page title</title></head>
            <body>
                <h1>Hello World</h1>
                <p>This is a <b>bold</b> paragraph.</p>
                <ul><li>one</li><li>two</li></ul>
            </body>
            </html>
        "#;
        let text = HtmlHandler.extract(html.as_bytes()).unwrap();
        assert_eq!(text, "Hello World\nThis is a bold paragraph.\none\ntwo");
    }

    #[test]
    fn test_scripts_and_styles_stripped() {
        let html = r#"
            <html>
            <head><style>.hidden { display: none; }</style></head>
            <body>
                <p>Visible text</p>
                <script>var x = 'hidden';</script>
                <noscript>enable js</noscript>
                <p>More visible text</p>
            </body>
            </html>
        "#;
        let text = HtmlHandler.extract(html.as_bytes()).unwrap();
        assert!(text.contains("Visible text"));
        assert!(text.contains("More visible text"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("display"));
        assert!(!text.contains("enable js"));
    }

    #[test]
    fn test_entities_decoded() {
        let text = HtmlHandler
            .extract(b"<p>Fish &amp; chips &mdash; &lt;cheap&gt;</p>")
            .unwrap();
        assert_eq!(text, "Fish & chips \u{2014} <cheap>");
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(HtmlHandler.extract(b"").unwrap(), "");
    }
}
