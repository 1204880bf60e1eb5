//! Terminal participant view.

mod app;
mod input;
mod ui;

use std::io::{self, Stdout};
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::time::{Duration, sleep};
use tracing::{error, info, instrument};

pub use app::{AppAction, PlayerApp};
pub use input::{move_cursor, move_selection};
pub use ui::draw;

use crate::loader::ConfigLoader;
use crate::resolver::{ConfigResolver, Fetch, HttpFetcher};
use crate::session::GameSession;

/// Runs the participant view for `href` until the user quits.
///
/// Logs go to `log_file` so they never land on the alternate screen.
pub async fn run_player(href: &str, log_file: &Path) -> Result<()> {
    let log = std::fs::File::create(log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log))
        .with_ansi(false)
        .try_init();

    info!(href = %href, "Starting participant view");

    let mut loader = ConfigLoader::new(ConfigResolver::new(HttpFetcher::new()));
    loader.navigate(href);
    let mut app = PlayerApp::new(GameSession::new());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_loop(&mut terminal, &mut app, &mut loader).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Participant view error");
    }
    res
}

#[instrument(skip_all)]
async fn run_loop<F: Fetch + 'static>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut PlayerApp,
    loader: &mut ConfigLoader<F>,
) -> Result<()> {
    loop {
        while let Some(config) = loader.try_recv() {
            app.install_config(config);
        }

        let refreshing = loader.is_pending();
        terminal.draw(|f| draw(f, app, refreshing))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // crossterm reports both press and release on some platforms
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match app.handle_key(key.code) {
                    AppAction::Quit => {
                        info!("Participant view closed");
                        return Ok(());
                    }
                    AppAction::Reload => {
                        loader.reload();
                    }
                    AppAction::None => {}
                }
            }
        }

        sleep(Duration::from_millis(10)).await;
    }
}
