//! Command-line interface for strictly_bingo.

use clap::{Parser, Subcommand};

/// Strictly Bingo - word bingo from a shared category document
#[derive(Parser, Debug)]
#[command(name = "strictly_bingo")]
#[command(about = "Word bingo cards from a shared, URL-addressed category document", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal participant view
    Play {
        /// Full participant link (e.g. `https://host/?view=player&src=/bingo.json`).
        /// Built from the settings when omitted.
        #[arg(long)]
        location: Option<String>,

        /// Config document address, overriding the settings file
        #[arg(long)]
        src: Option<String>,

        /// Path to the settings file
        #[arg(long, default_value = "strictly_bingo.toml")]
        settings: std::path::PathBuf,
    },

    /// Resolve a participant link and print the resulting config as JSON
    Resolve {
        /// Full participant link
        location: String,
    },

    /// Print the participant link for a published document
    Link {
        /// Config document address, overriding the settings file
        #[arg(long)]
        src: Option<String>,

        /// Page the link opens, overriding the settings file
        #[arg(long)]
        page_url: Option<String>,

        /// Path to the settings file
        #[arg(long, default_value = "strictly_bingo.toml")]
        settings: std::path::PathBuf,
    },

    /// Print one card drawn from a local config document
    Preview {
        /// Path to the JSON config document
        #[arg(short, long)]
        document: std::path::PathBuf,

        /// Category to draw from
        #[arg(short, long)]
        category: String,
    },

    /// Serve a config document over HTTP
    Serve {
        /// Path to the JSON config document
        #[arg(short, long)]
        document: std::path::PathBuf,

        /// Route the document is served at
        #[arg(long, default_value = "/bingo.json")]
        route: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
