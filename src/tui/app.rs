//! Participant view state and key handling.

use crossterm::event::KeyCode;
use tracing::{debug, info, instrument, warn};

use super::input::{move_cursor, move_selection};
use crate::bingo::GRID_SIZE;
use crate::config::Config;
use crate::session::{GameSession, SessionState};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Keep going.
    None,
    /// Leave the view.
    Quit,
    /// Fetch the config again.
    Reload,
}

/// Participant view state: the session plus cursors and any open notice.
#[derive(Debug)]
pub struct PlayerApp {
    session: GameSession,
    category_index: usize,
    cursor: (usize, usize),
    notice: Option<String>,
}

impl PlayerApp {
    /// Creates the view around a session.
    pub fn new(session: GameSession) -> Self {
        Self {
            session,
            category_index: 0,
            cursor: (0, 0),
            notice: None,
        }
    }

    /// The session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Highlighted entry in the category list.
    pub fn category_index(&self) -> usize {
        self.category_index
    }

    /// Highlighted card cell.
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Message waiting to be dismissed.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Installs a freshly resolved config and resets navigation.
    #[instrument(skip(self, config))]
    pub fn install_config(&mut self, config: Config) {
        self.session.install_config(config);
        self.category_index = 0;
        self.cursor = (0, 0);
    }

    /// Handles one key press.
    ///
    /// While a notice is open the key only dismisses it.
    #[instrument(skip(self))]
    pub fn handle_key(&mut self, key: KeyCode) -> AppAction {
        if self.notice.take().is_some() {
            debug!("Notice dismissed");
            return AppAction::None;
        }

        match key {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Char('r') => {
                info!("Reload requested");
                return AppAction::Reload;
            }
            _ => {}
        }

        match self.session.state() {
            SessionState::NoCategorySelected => self.handle_category_key(key),
            SessionState::CategorySelected(_) => self.handle_card_key(key),
        }
    }

    fn handle_category_key(&mut self, key: KeyCode) -> AppAction {
        let names = self.session.category_names();
        match key {
            KeyCode::Esc => AppAction::Quit,
            KeyCode::Enter => {
                let Some(name) = names.get(self.category_index).map(|n| n.to_string()) else {
                    return AppAction::None;
                };
                if let Err(e) = self.session.select_category(&name) {
                    warn!(error = %e, "Category selection failed");
                    self.notice = Some(e.to_string());
                } else {
                    self.cursor = (0, 0);
                }
                AppAction::None
            }
            _ => {
                self.category_index = move_selection(self.category_index, key, names.len());
                AppAction::None
            }
        }
    }

    fn handle_card_key(&mut self, key: KeyCode) -> AppAction {
        match key {
            KeyCode::Enter | KeyCode::Char(' ') => {
                let (row, col) = self.cursor;
                if let Err(e) = self.session.toggle_cell(row, col) {
                    self.notice = Some(e.to_string());
                }
            }
            KeyCode::Char('n') => {
                if let Err(e) = self.session.regenerate() {
                    warn!(error = %e, "Regeneration failed");
                    self.notice = Some(e.to_string());
                } else {
                    self.cursor = (0, 0);
                }
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('c') => {
                self.session.deselect_category();
                self.cursor = (0, 0);
            }
            _ => self.cursor = move_cursor(self.cursor, key, GRID_SIZE),
        }
        AppAction::None
    }
}
