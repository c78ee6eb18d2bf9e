//! One-shot CLI commands that run the pipeline on a local file.

use std::path::Path;

use anyhow::Context;

use docsplit_core::DocSplitConfig;
use docsplit_ingest::{sentences, ChunkParams, ExtractorRegistry, Ingester};

/// `docsplit extract <file>`: print the extracted text.
pub fn extract(path: &str) -> anyhow::Result<()> {
    println!("{}", extract_file(path)?);
    Ok(())
}

/// `docsplit chunk <file> [spc] [overlap]`: print `{"chunks": [...]}`.
pub fn chunk(
    path: &str,
    sentences_per_chunk: Option<&str>,
    overlap: Option<&str>,
) -> anyhow::Result<()> {
    let config = DocSplitConfig::from_env()?;
    let params = chunk_params(&config, sentences_per_chunk, overlap)?;
    let chunks = chunk_file(path, &params)?;
    println!("{}", render_chunks(&chunks)?);
    Ok(())
}

/// `docsplit formats`: list every extension with a dedicated handler.
pub fn formats() {
    let registry = ExtractorRegistry::with_defaults();
    for tag in registry.supported_formats() {
        println!("{}", tag);
    }
}

/// Chunk parameters from CLI arguments; missing ones fall back to `config`.
fn chunk_params(
    config: &DocSplitConfig,
    sentences_per_chunk: Option<&str>,
    overlap: Option<&str>,
) -> anyhow::Result<ChunkParams> {
    let sentences_per_chunk = match sentences_per_chunk {
        Some(raw) => parse_arg(raw, "sentences-per-chunk")?,
        None => config.default_sentences_per_chunk,
    };
    let overlap = match overlap {
        Some(raw) => parse_arg(raw, "overlap")?,
        None => config.default_overlap,
    };
    Ok(ChunkParams::new(sentences_per_chunk, overlap)?)
}

fn extract_file(path: &str) -> anyhow::Result<String> {
    let (bytes, filename) = read_file(path)?;
    let registry = ExtractorRegistry::with_defaults();
    let ingester = Ingester::new(&registry, sentences::init());
    Ok(ingester.extract_text(&bytes, &filename)?)
}

fn chunk_file(path: &str, params: &ChunkParams) -> anyhow::Result<Vec<String>> {
    let (bytes, filename) = read_file(path)?;
    let registry = ExtractorRegistry::with_defaults();
    let ingester = Ingester::new(&registry, sentences::init());
    Ok(ingester.extract_chunks(&bytes, &filename, params)?)
}

fn render_chunks(chunks: &[String]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serde_json::json!({ "chunks": chunks }))
}

fn read_file(path: &str) -> anyhow::Result<(Vec<u8>, String)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    let filename = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    Ok((bytes, filename))
}

fn parse_arg(raw: &str, name: &str) -> anyhow::Result<i64> {
    raw.parse()
        .with_context(|| format!("{} must be an integer, got '{}'", name, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &[u8]) -> String {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("3", "overlap").unwrap(), 3);
        assert_eq!(parse_arg("-1", "overlap").unwrap(), -1);

        let err = parse_arg("three", "overlap").unwrap_err();
        assert_eq!(err.to_string(), "overlap must be an integer, got 'three'");
    }

    #[test]
    fn test_chunk_params_fall_back_to_config() {
        let config = DocSplitConfig {
            default_sentences_per_chunk: 4,
            default_overlap: 1,
            ..DocSplitConfig::default()
        };

        let params = chunk_params(&config, None, None).unwrap();
        assert_eq!((params.sentences_per_chunk(), params.overlap()), (4, 1));

        let params = chunk_params(&config, Some("6"), None).unwrap();
        assert_eq!((params.sentences_per_chunk(), params.overlap()), (6, 1));

        let params = chunk_params(&config, None, Some("3")).unwrap();
        assert_eq!((params.sentences_per_chunk(), params.overlap()), (4, 3));
    }

    #[test]
    fn test_chunk_params_rejected() {
        let config = DocSplitConfig::default();
        assert!(chunk_params(&config, Some("1"), None).is_err());
        assert!(chunk_params(&config, Some("3"), Some("3")).is_err());
        assert!(chunk_params(&config, Some("x"), None).is_err());
    }

    #[test]
    fn test_extract_file_dispatches_on_name() {
        let dir = tempfile::tempdir().unwrap();
        let html = write(
            dir.path(),
            "page.HTML",
            b"<html><head><style>p{}</style></head><body><p>Hello.</p><p>Again.</p></body></html>",
        );
        assert_eq!(extract_file(&html).unwrap(), "Hello.\nAgain.");

        let text = write(dir.path(), "notes.txt", b"Plain <p>kept</p>");
        assert_eq!(extract_file(&text).unwrap(), "Plain <p>kept</p>");
    }

    #[test]
    fn test_extract_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.txt");
        let err = extract_file(&missing.to_string_lossy()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"), "{err}");
    }

    #[test]
    fn test_chunk_file_and_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "doc.md", b"One.\nTwo.\n\nThree.");
        let params = ChunkParams::new(2, 0).unwrap();

        let chunks = chunk_file(&path, &params).unwrap();
        assert_eq!(chunks, vec!["One. Two.", "Three."]);

        let json: serde_json::Value = serde_json::from_str(&render_chunks(&chunks).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "chunks": ["One. Two.", "Three."] }));
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "blank.txt", b"  \n");
        let err = chunk_file(&path, &ChunkParams::default()).unwrap_err();
        assert!(err.to_string().starts_with("Empty or unreadable input"), "{err}");
    }
}
