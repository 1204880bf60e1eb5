//! Local settings for the command-line tools.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::location::{LocationError, PageLocation, normalize_source, player_link};

/// Settings read from a TOML file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct BingoSettings {
    /// Page the participant link points at.
    #[serde(default = "default_page_url")]
    page_url: String,

    /// Published config document address.
    #[serde(default)]
    data_url: Option<String>,

    /// Log file for the terminal view.
    #[serde(default = "default_log_file")]
    log_file: PathBuf,
}

fn default_page_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("strictly_bingo.log")
}

impl Default for BingoSettings {
    fn default() -> Self {
        Self {
            page_url: default_page_url(),
            data_url: None,
            log_file: default_log_file(),
        }
    }
}

impl BingoSettings {
    /// Loads settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SettingsError::new(format!("Failed to read settings file: {}", e)))?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| SettingsError::new(format!("Failed to parse settings: {}", e)))?;

        info!(page_url = %settings.page_url, "Settings loaded");
        Ok(settings)
    }

    /// Loads settings from `path` when it exists, defaults otherwise.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Settings file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the page URL.
    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = page_url.into();
        self
    }

    /// Overrides the document address.
    pub fn with_data_url(mut self, data_url: impl Into<String>) -> Self {
        self.data_url = Some(data_url.into());
        self
    }

    /// Participant link for the configured document. The document address
    /// is made absolute against `page_url` first. Without a document
    /// address the link still opens the participant view, which then reports
    /// the missing source.
    pub fn player_link(&self) -> Result<String, LocationError> {
        let page = PageLocation::parse(&self.page_url)?;
        let source = normalize_source(self.data_url.as_deref(), &page);
        player_link(&self.page_url, &source)
    }
}

/// Settings error.
#[derive(Debug, Clone, Display, Error)]
#[display("Settings error: {} at {}:{}", message, file, line)]
pub struct SettingsError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SettingsError {
    /// Creates a new settings error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
