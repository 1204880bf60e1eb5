//! Strictly Bingo - Unified CLI
//!
//! Participant view, resolution and link tools, and a document host.

#![warn(missing_docs)]

mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use strictly_bingo::{
    BingoSettings, ConfigResolver, GRID_SIZE, HttpFetcher, generate_grid, publish, tui,
    validate_document,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            location,
            src,
            settings,
        } => run_play(location, src, settings).await,
        Command::Resolve { location } => run_resolve(location).await,
        Command::Link {
            src,
            page_url,
            settings,
        } => run_link(src, page_url, settings),
        Command::Preview { document, category } => run_preview(document, category),
        Command::Serve {
            document,
            route,
            port,
            host,
        } => run_serve(host, port, document, route).await,
    }
}

/// Logging for the non-interactive commands goes to stderr.
fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Loads settings and applies command-line overrides.
fn load_settings(
    path: &Path,
    src: Option<String>,
    page_url: Option<String>,
) -> Result<BingoSettings> {
    let mut settings = BingoSettings::load_or_default(path)?;
    if let Some(src) = src {
        settings = settings.with_data_url(src);
    }
    if let Some(page_url) = page_url {
        settings = settings.with_page_url(page_url);
    }
    Ok(settings)
}

/// Run the terminal participant view
async fn run_play(location: Option<String>, src: Option<String>, settings: PathBuf) -> Result<()> {
    let settings = load_settings(&settings, src, None)?;
    let href = match location {
        Some(href) => href,
        None => settings.player_link()?,
    };
    tui::run_player(&href, settings.log_file()).await
}

/// Resolve a link and print the config
#[instrument]
async fn run_resolve(location: String) -> Result<()> {
    init_stderr_tracing();

    let resolver = ConfigResolver::new(HttpFetcher::new());
    let config = resolver.resolve_location(&location).await;
    println!("{}", serde_json::to_string_pretty(&config)?);

    if let Some(reason) = config.error() {
        anyhow::bail!("Resolution failed: {}", reason);
    }
    Ok(())
}

/// Print the participant link
fn run_link(src: Option<String>, page_url: Option<String>, settings: PathBuf) -> Result<()> {
    let settings = load_settings(&settings, src, page_url)?;
    if settings.data_url().is_none() {
        anyhow::bail!("No document address: pass --src or set data_url in the settings file");
    }
    println!("{}", settings.player_link()?);
    Ok(())
}

/// Print one card from a local document
fn run_preview(document: PathBuf, category: String) -> Result<()> {
    init_stderr_tracing();

    let body = std::fs::read_to_string(&document)
        .with_context(|| format!("Failed to read {}", document.display()))?;
    let config = validate_document(Some("application/json"), &body)?;
    let words = config
        .words(&category)
        .with_context(|| format!("Unknown category '{}'", category))?;

    let grid = generate_grid(words, GRID_SIZE, &mut rand::thread_rng())?;
    info!(category = %category, "Previewing card");
    for row in grid.rows() {
        println!("{}", row.join(" | "));
    }
    Ok(())
}

/// Serve a document over HTTP
async fn run_serve(host: String, port: u16, document: PathBuf, route: String) -> Result<()> {
    init_stderr_tracing();
    publish::serve(&host, port, document, &route).await
}
