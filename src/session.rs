//! A single participant's bingo session.
//!
//! The session owns the active config snapshot, the current card, and its
//! marks. A card is created fresh on every selection or regeneration and its
//! marks always start cleared.

use derive_getters::Getters;
use derive_more::{Display, Error, From};
use derive_new::new;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

use crate::bingo::{
    GRID_SIZE, Grid, InsufficientPoolError, Line, MarkMatrix, completed_lines, count_completed_lines,
    generate_grid, is_win,
};
use crate::config::Config;

/// A user action the session rejected. State is unchanged after any error.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// The category's pool cannot fill a card.
    #[display("{_0}")]
    #[from]
    InsufficientPool(InsufficientPoolError),
    /// The name is not in the displayed category list.
    #[display("Unknown category '{name}'")]
    UnknownCategory {
        /// Requested name.
        name: String,
    },
    /// The config has no usable categories.
    #[display("No categories available")]
    EmptyCategoryList,
    /// The action needs a selected category.
    #[display("No category selected")]
    NoCategorySelected,
    /// The cell is outside the card.
    #[display("Cell ({row}, {col}) is outside the card")]
    CellOutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
}

/// The card currently in play.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ActiveCard {
    /// Category the card was drawn from.
    category: String,
    /// Words.
    grid: Grid,
    /// Marks, one per cell.
    marks: MarkMatrix,
}

/// Session state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Choosing a category.
    #[default]
    NoCategorySelected,
    /// Playing a card.
    CategorySelected(ActiveCard),
}

/// Line count and win flag for the current marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct CardStatus {
    /// Completed rows, columns, and diagonals.
    pub lines: usize,
    /// Whether `lines` reached [`REQUIRED_LINES`](crate::bingo::REQUIRED_LINES).
    pub is_win: bool,
}

/// A category as listed for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryEntry<'a> {
    /// Name.
    pub name: &'a str,
    /// Words in its pool.
    pub word_count: usize,
}

/// What the participant view should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerView<'a> {
    /// No config has resolved yet.
    Loading,
    /// Resolution failed; nothing else is shown.
    Failed {
        /// Failure reason.
        reason: &'a str,
    },
    /// The config resolved but lists no categories.
    NoCategories,
    /// Category list.
    ChooseCategory {
        /// Categories in display order.
        categories: Vec<CategoryEntry<'a>>,
    },
    /// A card in play.
    Playing {
        /// Category name.
        category: &'a str,
        /// Words.
        grid: &'a Grid,
        /// Marks.
        marks: &'a MarkMatrix,
        /// Lines that are fully marked.
        completed: Vec<Line>,
        /// Line count and win flag.
        status: CardStatus,
    },
}

/// One participant's session against a resolved config.
#[derive(Debug)]
pub struct GameSession {
    config: Option<Config>,
    state: SessionState,
    rng: StdRng,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates a session with no config, seeded from OS entropy.
    #[instrument]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a session drawing cards from `rng`.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            config: None,
            state: SessionState::NoCategorySelected,
            rng,
        }
    }

    /// Current config snapshot, if one has resolved.
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Selected category, if any.
    pub fn selected_category(&self) -> Option<&str> {
        match &self.state {
            SessionState::CategorySelected(card) => Some(card.category.as_str()),
            SessionState::NoCategorySelected => None,
        }
    }

    /// Replaces the config snapshot and returns to category selection.
    #[instrument(skip(self, config), fields(failed = config.is_failed()))]
    pub fn install_config(&mut self, config: Config) {
        info!(categories = config.categories().len(), "Installing config");
        self.config = Some(config);
        self.state = SessionState::NoCategorySelected;
    }

    /// Config that may be played; failed configs are never usable.
    fn usable_config(&self) -> Option<&Config> {
        self.config.as_ref().filter(|c| !c.is_failed())
    }

    /// Categories offered for selection, in display order.
    pub fn category_names(&self) -> Vec<&str> {
        self.usable_config()
            .map(Config::category_names)
            .unwrap_or_default()
    }

    /// Selects a category and deals a fresh card with cleared marks.
    ///
    /// # Errors
    ///
    /// Fails without changing state when the category is not listed or its
    /// pool holds fewer than 16 words.
    #[instrument(skip(self))]
    pub fn select_category(&mut self, name: &str) -> Result<(), SessionError> {
        let names = self.category_names();
        if names.is_empty() {
            warn!("Selection attempted with no categories");
            return Err(SessionError::EmptyCategoryList);
        }
        if !names.contains(&name) {
            warn!("Selection of unknown category");
            return Err(SessionError::UnknownCategory {
                name: name.to_string(),
            });
        }

        let pool = self
            .config
            .as_ref()
            .and_then(|c| c.words(name))
            .unwrap_or_default();
        let grid = generate_grid(pool, GRID_SIZE, &mut self.rng)?;

        info!("Category selected");
        self.state = SessionState::CategorySelected(ActiveCard {
            category: name.to_string(),
            grid,
            marks: MarkMatrix::new(GRID_SIZE),
        });
        Ok(())
    }

    /// Deals a new card from the same category and clears the marks.
    ///
    /// # Errors
    ///
    /// Fails without changing the current card when nothing is selected or
    /// the pool is too small.
    #[instrument(skip(self))]
    pub fn regenerate(&mut self) -> Result<(), SessionError> {
        let SessionState::CategorySelected(card) = &mut self.state else {
            return Err(SessionError::NoCategorySelected);
        };

        let pool = self
            .config
            .as_ref()
            .and_then(|c| c.words(&card.category))
            .ok_or_else(|| SessionError::UnknownCategory {
                name: card.category.clone(),
            })?;
        let grid = generate_grid(pool, GRID_SIZE, &mut self.rng)?;

        debug!(category = %card.category, "Regenerated card");
        card.grid = grid;
        card.marks = MarkMatrix::new(GRID_SIZE);
        Ok(())
    }

    /// Flips one mark and returns its new value. The grid is untouched.
    #[instrument(skip(self))]
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<bool, SessionError> {
        let SessionState::CategorySelected(card) = &mut self.state else {
            return Err(SessionError::NoCategorySelected);
        };
        let marked = card
            .marks
            .toggle(row, col)
            .ok_or(SessionError::CellOutOfBounds { row, col })?;
        debug!(marked, "Toggled cell");
        Ok(marked)
    }

    /// Drops the current card and returns to category selection.
    #[instrument(skip(self))]
    pub fn deselect_category(&mut self) {
        debug!("Returning to category selection");
        self.state = SessionState::NoCategorySelected;
    }

    /// Line count and win flag, computed from the current marks.
    pub fn status(&self) -> Option<CardStatus> {
        match &self.state {
            SessionState::CategorySelected(card) => {
                let lines = count_completed_lines(&card.marks);
                Some(CardStatus::new(lines, is_win(lines)))
            }
            SessionState::NoCategorySelected => None,
        }
    }

    /// Derives what the participant view should show.
    pub fn view(&self) -> PlayerView<'_> {
        let Some(config) = &self.config else {
            return PlayerView::Loading;
        };
        if let Some(reason) = config.error() {
            return PlayerView::Failed { reason };
        }
        let names = config.category_names();
        if names.is_empty() {
            return PlayerView::NoCategories;
        }

        match &self.state {
            SessionState::NoCategorySelected => PlayerView::ChooseCategory {
                categories: names
                    .into_iter()
                    .map(|name| CategoryEntry {
                        name,
                        word_count: config.words(name).map_or(0, <[String]>::len),
                    })
                    .collect(),
            },
            SessionState::CategorySelected(card) => {
                let lines = count_completed_lines(&card.marks);
                PlayerView::Playing {
                    category: &card.category,
                    grid: &card.grid,
                    marks: &card.marks,
                    completed: completed_lines(&card.marks),
                    status: CardStatus::new(lines, is_win(lines)),
                }
            }
        }
    }
}
