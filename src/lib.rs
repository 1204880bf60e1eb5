//! Strictly Bingo - word bingo cards from a shared configuration document
//!
//! An organizer publishes one JSON document mapping category names to word
//! lists. Participants open a link whose `src` parameter points at that
//! document, pick a category, and play a randomized 4x4 card.
//!
//! # Architecture
//!
//! - **Bingo**: card generation and line scoring
//! - **Resolver**: turns a page location into a validated [`Config`]
//! - **Loader**: background fetch per address change, stale results dropped
//! - **Session**: per-participant state machine over one card
//! - **TUI**: terminal participant view
//!
//! # Example
//!
//! ```no_run
//! use strictly_bingo::{ConfigResolver, GameSession, HttpFetcher};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = ConfigResolver::new(HttpFetcher::new());
//! let config = resolver
//!     .resolve_location("https://bingo.example/?view=player&src=/bingo.json")
//!     .await;
//!
//! let mut session = GameSession::new();
//! session.install_config(config);
//! if let Some(name) = session.category_names().first().map(|n| n.to_string()) {
//!     session.select_category(&name)?;
//!     session.toggle_cell(0, 0)?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bingo;
mod config;
mod loader;
mod location;
pub mod publish;
mod resolver;
mod session;
mod settings;
pub mod tui;

// Crate-level exports - Card engine
pub use bingo::{
    GRID_SIZE, Grid, InsufficientPoolError, Line, LineKind, MarkMatrix, REQUIRED_LINES,
    completed_lines, count_completed_lines, generate_grid, is_win,
};

// Crate-level exports - Config document
pub use config::{Categories, Config};

// Crate-level exports - Location addressing
pub use location::{
    LocationError, PLAYER_VIEW, PageLocation, SOURCE_PARAM, VIEW_PARAM, is_player_route,
    normalize_source, parse_location_params, player_link,
};

// Crate-level exports - Resolution
pub use loader::ConfigLoader;
pub use resolver::{
    CACHE_BUST_PARAM, ConfigResolver, Fetch, FetchedDocument, HttpFetcher, ResolveError,
    cache_busted, validate_document,
};

// Crate-level exports - Session
pub use session::{
    ActiveCard, CardStatus, CategoryEntry, GameSession, PlayerView, SessionError, SessionState,
};

// Crate-level exports - Settings
pub use settings::{BingoSettings, SettingsError};
