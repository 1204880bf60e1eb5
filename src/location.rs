//! Participant addressing carried entirely in the page URL.
//!
//! The config document address travels as a `src` parameter, either in the
//! query string or in a query-like block after a `?` inside the fragment
//! (`#/play?src=...`). Fragment values override query values.

use std::collections::BTreeMap;

use derive_more::{Display, Error};
use reqwest::Url;
use tracing::{debug, instrument};

/// Query key holding the config document address.
pub const SOURCE_PARAM: &str = "src";

/// Query key selecting the participant view.
pub const VIEW_PARAM: &str = "view";

/// Value of [`VIEW_PARAM`] for the participant view.
pub const PLAYER_VIEW: &str = "player";

/// A page address that could not be parsed as an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Invalid page location '{href}': {message}")]
pub struct LocationError {
    /// The rejected address.
    pub href: String,
    /// Parser message.
    pub message: String,
}

/// The participant's current page address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    /// Parses an absolute page URL.
    #[instrument]
    pub fn parse(href: &str) -> Result<Self, LocationError> {
        let url = Url::parse(href.trim()).map_err(|e| LocationError {
            href: href.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { url })
    }

    /// Full address.
    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    /// Scheme without the trailing colon, e.g. `https`.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// `scheme://host[:port]`.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Origin plus path, without query or fragment.
    pub fn base(&self) -> String {
        let mut base = self.url.clone();
        base.set_query(None);
        base.set_fragment(None);
        base.to_string()
    }

    /// Merged query and fragment parameters. See [`parse_location_params`].
    pub fn params(&self) -> BTreeMap<String, String> {
        parse_location_params(self.url.as_str())
    }

    /// Whether the query string asks for the participant view.
    pub fn is_player_route(&self) -> bool {
        is_player_route(self.url.as_str())
    }

    /// Absolute config document address, or an empty string when no `src`
    /// was given.
    #[instrument(skip(self), fields(href = %self.url))]
    pub fn source(&self) -> String {
        let params = self.params();
        let source = normalize_source(params.get(SOURCE_PARAM).map(String::as_str), self);
        debug!(source = %source, "Resolved source address");
        source
    }
}

/// Splits `href` into its raw query and the query-like block inside the
/// fragment.
fn split_href(href: &str) -> (Option<&str>, Option<&str>) {
    let (before_fragment, fragment) = match href.split_once('#') {
        Some((before, fragment)) => (before, Some(fragment)),
        None => (href, None),
    };
    let query = before_fragment.split_once('?').map(|(_, q)| q);
    let fragment_query = fragment.and_then(|f| f.split('?').nth(1));
    (query, fragment_query)
}

/// Decodes an `application/x-www-form-urlencoded` block.
fn decode_pairs(block: &str) -> Vec<(String, String)> {
    let Ok(mut scratch) = Url::parse("http://localhost/") else {
        return Vec::new();
    };
    scratch.set_query(Some(block));
    scratch
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Reads parameters from both the query string and the fragment block.
///
/// The fragment block is the text between the first and second `?` of the
/// fragment; anything after a second `?` is ignored.
///
/// Within the query the first occurrence of a key wins. Every key found in
/// the fragment block then overrides the query value, the last fragment
/// occurrence winning.
pub fn parse_location_params(href: &str) -> BTreeMap<String, String> {
    let (query, fragment_query) = split_href(href);
    let mut params = BTreeMap::new();

    if let Some(query) = query {
        for (key, value) in decode_pairs(query) {
            params.entry(key).or_insert(value);
        }
    }
    if let Some(fragment_query) = fragment_query {
        for (key, value) in decode_pairs(fragment_query) {
            params.insert(key, value);
        }
    }
    params
}

/// Whether the query string selects the participant view: `view=player` or
/// any `src` parameter. The fragment is not consulted.
pub fn is_player_route(href: &str) -> bool {
    let (query, _) = split_href(href);
    let Some(query) = query else {
        return false;
    };
    decode_pairs(query)
        .iter()
        .any(|(k, v)| (k == VIEW_PARAM && v == PLAYER_VIEW) || k == SOURCE_PARAM)
}

/// Whether `s` starts with `scheme://`.
fn has_explicit_scheme(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Turns a raw `src` value into an absolute address.
///
/// - explicit scheme: unchanged
/// - `//host/path`: the page's scheme is prepended
/// - anything else: resolved against the page origin
///
/// Missing or blank input yields an empty string. A relative address that
/// cannot be joined is returned trimmed but otherwise as given.
pub fn normalize_source(raw: Option<&str>, page: &PageLocation) -> String {
    let s = raw.unwrap_or_default().trim();
    if s.is_empty() {
        return String::new();
    }
    if has_explicit_scheme(s) {
        return s.to_string();
    }
    if s.starts_with("//") {
        return format!("{}:{}", page.scheme(), s);
    }

    let mut origin = page.url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    match origin.join(s) {
        Ok(url) => url.to_string(),
        Err(e) => {
            debug!(raw = %s, error = %e, "Could not resolve relative source");
            s.to_string()
        }
    }
}

/// Builds the participant link for a published document:
/// `<page base>?view=player&src=<source>`.
#[instrument]
pub fn player_link(page_base: &str, source: &str) -> Result<String, LocationError> {
    let mut url = Url::parse(page_base).map_err(|e| LocationError {
        href: page_base.to_string(),
        message: e.to_string(),
    })?;
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut()
        .append_pair(VIEW_PARAM, PLAYER_VIEW)
        .append_pair(SOURCE_PARAM, source);
    Ok(url.to_string())
}
