//! Background config loading tied to the current page location.
//!
//! One fetch runs per address change. Starting a new fetch clears the
//! previous fetch's liveness flag, and results whose flag is cleared are
//! dropped, so an older response can never replace a newer config.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::location::PageLocation;
use crate::resolver::{ConfigResolver, Fetch, ResolveError};

/// A fetch that has been started and not yet superseded.
#[derive(Debug)]
struct ActiveFetch {
    source: String,
    generation: u64,
    live: Arc<AtomicBool>,
}

/// A finished resolution, tagged with the fetch that produced it.
#[derive(Debug)]
struct Completed {
    generation: u64,
    live: Arc<AtomicBool>,
    config: Config,
}

/// Owns the fetch lifecycle for one participant view.
#[derive(Debug)]
pub struct ConfigLoader<F> {
    resolver: Arc<ConfigResolver<F>>,
    active: Option<ActiveFetch>,
    pending: bool,
    generation: u64,
    tx: mpsc::UnboundedSender<Completed>,
    rx: mpsc::UnboundedReceiver<Completed>,
}

impl<F: Fetch + 'static> ConfigLoader<F> {
    /// Creates an idle loader.
    pub fn new(resolver: ConfigResolver<F>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            resolver: Arc::new(resolver),
            active: None,
            pending: false,
            generation: 0,
            tx,
            rx,
        }
    }

    /// Address of the current fetch, if any.
    pub fn source(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.source.as_str())
    }

    /// Whether a fetch is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Points the loader at a new page location.
    ///
    /// Starts a fetch when the resolved address differs from the current
    /// one and returns whether it did. An unparseable location produces a
    /// failed config without touching the network.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(self))]
    pub fn navigate(&mut self, href: &str) -> bool {
        let source = match PageLocation::parse(href) {
            Ok(page) => page.source(),
            Err(e) => {
                warn!(error = %e, "Unusable page location");
                let reason = ResolveError::InvalidLocation {
                    message: e.to_string(),
                };
                self.deliver_now(Config::failed(reason.to_string()));
                return false;
            }
        };

        if self.source() == Some(source.as_str()) {
            debug!(source = %source, "Address unchanged, keeping current fetch");
            return false;
        }
        self.start(source);
        true
    }

    /// Fetches the current address again, superseding any outstanding fetch.
    ///
    /// Returns `false` when nothing has been navigated to yet.
    #[instrument(skip(self))]
    pub fn reload(&mut self) -> bool {
        match self.source().map(str::to_string) {
            Some(source) => {
                self.start(source);
                true
            }
            None => false,
        }
    }

    /// Next config from the current fetch, without waiting.
    pub fn try_recv(&mut self) -> Option<Config> {
        while let Ok(completed) = self.rx.try_recv() {
            if let Some(config) = self.accept(completed) {
                return Some(config);
            }
        }
        None
    }

    /// Waits for the next config from the current fetch.
    pub async fn recv(&mut self) -> Option<Config> {
        while let Some(completed) = self.rx.recv().await {
            if let Some(config) = self.accept(completed) {
                return Some(config);
            }
        }
        None
    }

    /// Keeps a completion only if it belongs to the live fetch.
    fn accept(&mut self, completed: Completed) -> Option<Config> {
        if completed.generation != self.generation || !completed.live.load(Ordering::Acquire) {
            debug!(generation = completed.generation, "Discarding stale config");
            return None;
        }
        self.pending = false;
        Some(completed.config)
    }

    /// Supersedes the current fetch and returns the new fetch's flag.
    fn supersede(&mut self, source: String) -> Arc<AtomicBool> {
        if let Some(previous) = self.active.take() {
            debug!(generation = previous.generation, "Cancelling previous fetch");
            previous.live.store(false, Ordering::Release);
        }
        self.generation += 1;
        let live = Arc::new(AtomicBool::new(true));
        self.active = Some(ActiveFetch {
            source,
            generation: self.generation,
            live: Arc::clone(&live),
        });
        live
    }

    /// Delivers a config that needs no fetch. Leaves no current address, so
    /// the next navigation always fetches.
    fn deliver_now(&mut self, config: Config) {
        let live = self.supersede(String::new());
        self.active = None;
        self.pending = true;
        let _ = self.tx.send(Completed {
            generation: self.generation,
            live,
            config,
        });
    }

    fn start(&mut self, source: String) {
        let live = self.supersede(source.clone());
        let generation = self.generation;
        self.pending = true;
        info!(source = %source, generation, "Starting config fetch");

        let resolver = Arc::clone(&self.resolver);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let config = resolver.resolve_source(&source).await;
            if !live.load(Ordering::Acquire) {
                debug!(generation, "Fetch superseded, dropping result");
                return;
            }
            let _ = tx.send(Completed {
                generation,
                live,
                config,
            });
        });
    }
}

impl<F> Drop for ConfigLoader<F> {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.live.store(false, Ordering::Release);
        }
    }
}
