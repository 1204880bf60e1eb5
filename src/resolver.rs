//! Fetches and validates the shared configuration document.
//!
//! Resolution never fails outward: every problem becomes a [`Config`] whose
//! `error` field names it. Internally each step returns a [`ResolveError`] so
//! branches stay typed until the boundary in [`ConfigResolver::resolve_source`].

use async_trait::async_trait;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::location::PageLocation;

/// Query parameter appended to defeat intermediary caches.
pub const CACHE_BUST_PARAM: &str = "_ts";

/// Why a resolution attempt ended without a usable document.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ResolveError {
    /// The location carried no `src`.
    #[display("no source provided")]
    MissingSource,
    /// The page location itself did not parse.
    #[display("{message}")]
    InvalidLocation {
        /// Parser message.
        message: String,
    },
    /// Non-2xx response.
    #[display("HTTP {status}")]
    Http {
        /// Response status code.
        status: u16,
    },
    /// Neither a JSON content type nor a JSON-object-shaped body.
    #[display("response is not JSON")]
    NotJson,
    /// The body failed to parse.
    #[display("{message}")]
    Parse {
        /// Parser message.
        message: String,
    },
    /// No object-typed `categories`/`cats` field.
    #[display("missing categories field")]
    MissingCategories,
    /// The request never produced a response.
    #[display("{message}")]
    Transport {
        /// Client message.
        message: String,
    },
}

/// A raw HTTP response, before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct FetchedDocument {
    /// Status code.
    status: u16,
    /// `Content-Type` header, if sent.
    content_type: Option<String>,
    /// Body text.
    body: String,
}

impl FetchedDocument {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetch capability injected into the resolver.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Performs a cache-bypassing GET of `url`.
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, ResolveError>;
}

/// [`Fetch`] backed by `reqwest`.
///
/// The client keeps no response cache, so every call goes to the network.
/// `Cache-Control: no-store, no-cache` and `Pragma: no-cache` keep
/// intermediaries from answering out of their own caches.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, ResolveError> {
        debug!("Sending config request");
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store, no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Config request failed");
                ResolveError::Transport {
                    message: e.to_string(),
                }
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read config response");
            ResolveError::Transport {
                message: e.to_string(),
            }
        })?;

        debug!(status, content_type = ?content_type, body_len = body.len(), "Got config response");
        Ok(FetchedDocument::new(status, content_type, body))
    }
}

/// Appends `_ts=<millis>` with `&` or `?` depending on whether `source`
/// already has a query.
pub fn cache_busted(source: &str, epoch_millis: i64) -> String {
    let separator = if source.contains('?') { '&' } else { '?' };
    format!("{source}{separator}{CACHE_BUST_PARAM}={epoch_millis}")
}

/// Whether `body`, once trimmed, is shaped like a single JSON object.
fn looks_like_json_object(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

/// Checks a response body and turns it into a [`Config`].
///
/// Requires a content type mentioning `json` (any case) or an
/// object-shaped body, then valid JSON, then an object-typed
/// `categories` (or `cats`) field.
#[instrument(skip(body), fields(body_len = body.len()))]
pub fn validate_document(content_type: Option<&str>, body: &str) -> Result<Config, ResolveError> {
    let json_type = content_type
        .map(|t| t.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);
    if !json_type && !looks_like_json_object(body) {
        warn!(content_type = ?content_type, "Response is not JSON");
        return Err(ResolveError::NotJson);
    }

    let value: Value = serde_json::from_str(body).map_err(|e| ResolveError::Parse {
        message: e.to_string(),
    })?;

    let categories = value.get("categories").or_else(|| value.get("cats"));
    if !matches!(categories, Some(Value::Object(_))) {
        warn!("Document has no categories object");
        return Err(ResolveError::MissingCategories);
    }

    Config::from_value(value).map_err(|e| ResolveError::Parse {
        message: e.to_string(),
    })
}

/// Turns a participant location into a validated [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigResolver<F> {
    fetcher: F,
}

impl<F: Fetch> ConfigResolver<F> {
    /// Creates a resolver over the given fetch capability.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Resolves the `src` carried by a page location.
    #[instrument(skip(self))]
    pub async fn resolve_location(&self, href: &str) -> Config {
        match PageLocation::parse(href) {
            Ok(page) => self.resolve_source(&page.source()).await,
            Err(e) => {
                warn!(error = %e, "Unusable page location");
                Config::failed(
                    ResolveError::InvalidLocation {
                        message: e.to_string(),
                    }
                    .to_string(),
                )
            }
        }
    }

    /// Resolves an already-normalized document address, folding any failure
    /// into `Config::error`.
    #[instrument(skip(self))]
    pub async fn resolve_source(&self, source: &str) -> Config {
        match self.try_resolve(source).await {
            Ok(config) => {
                info!(categories = config.categories().len(), "Config resolved");
                config
            }
            Err(e) => {
                warn!(error = %e, "Config resolution failed");
                Config::failed(e.to_string())
            }
        }
    }

    /// Resolves `source`, keeping the failure typed.
    #[instrument(skip(self))]
    pub async fn try_resolve(&self, source: &str) -> Result<Config, ResolveError> {
        if source.is_empty() {
            return Err(ResolveError::MissingSource);
        }

        let url = cache_busted(source, chrono::Utc::now().timestamp_millis());
        let document = self.fetcher.fetch(&url).await?;
        if !document.is_success() {
            return Err(ResolveError::Http {
                status: *document.status(),
            });
        }

        validate_document(document.content_type().as_deref(), document.body())
    }
}
