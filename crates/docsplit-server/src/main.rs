//! DocSplit: document text extraction and sentence chunking server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use docsplit_core::DocSplitConfig;
use docsplit_ingest::{sentences, ExtractorRegistry};
use docsplit_server::{build_router, AppState};

mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "extract" => {
                let Some(path) = args.get(2) else {
                    eprintln!("Usage: docsplit extract <file>");
                    std::process::exit(1);
                };
                return commands::extract(path);
            }
            "chunk" => {
                let Some(path) = args.get(2) else {
                    eprintln!("Usage: docsplit chunk <file> [sentences-per-chunk] [overlap]");
                    std::process::exit(1);
                };
                return commands::chunk(
                    path,
                    args.get(3).map(String::as_str),
                    args.get(4).map(String::as_str),
                );
            }
            "formats" => {
                commands::formats();
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("DocSplit: document text extraction and chunking server");
                println!();
                println!("Usage: docsplit [command]");
                println!();
                println!("Commands:");
                println!("  (none)                          Start the server");
                println!("  extract <file>                  Print the text of a document");
                println!("  chunk <file> [spc] [overlap]    Print the chunks of a document as JSON");
                println!("  formats                         List the supported file extensions");
                println!("  help                            Show this help message");
                println!();
                println!("Environment:");
                println!("  DOCSPLIT_HOST, PORT, DOCSPLIT_SENTENCES_PER_CHUNK,");
                println!("  DOCSPLIT_OVERLAP, DOCSPLIT_MAX_UPLOAD_MB, RUST_LOG");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'docsplit help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let config = DocSplitConfig::from_env()?;
    let addr = config.bind_addr();

    // Load the sentence model before accepting requests
    let tokenizer = sentences::init();

    let state = Arc::new(AppState::new(
        config,
        ExtractorRegistry::with_defaults(),
        tokenizer,
    ));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("DocSplit server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
