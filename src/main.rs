// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG controls how chatty it is)
// 2. Parse command-line arguments using clap
// 3. Turn them into an ExportConfig and run the export
// 4. Exit with proper code (0 = success, 1 = error)
//
// Rust concepts used:
// - async/await: The HTTP client is async, even though we make one request
//   at a time
// - Result<T, E>: For error handling (T = success type, E = error type)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - settings for one export run
mod error; // src/error.rs - the ExportError type
mod export; // src/export.rs - runs the whole export
mod github; // src/github/ - talking to the GitHub API
mod images; // src/images.rs - downloading attached images
mod model; // src/model.rs - typed issues, comments and events
mod render; // src/render/ - Markdown output

use anyhow::{Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole chain: "export of a/b failed: ... returned status code 404 (Not Found)"
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.command.into_config();

    println!("🔍 Exporting issues from {}", config.repo);
    println!("📁 Output folder: {}", config.output_dir.display());

    let summary = export::run_export(&config)
        .await
        .with_context(|| format!("export of {} failed", config.repo))?;

    println!();
    println!("📊 Summary:");
    println!("   📋 Issues: {}", summary.issues);
    println!("   🖼️  Images: {}", summary.images);
    println!("   📄 JSON: {}", summary.json_path.display());
    println!("   📝 Markdown: {}", summary.markdown_path.display());

    Ok(())
}

// Logs go to stderr so stdout stays readable; default level is info
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
