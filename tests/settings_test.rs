//! Tests for local settings.

use std::path::Path;

use strictly_bingo::{BingoSettings, PageLocation, parse_location_params};

#[test]
fn test_defaults() {
    let settings = BingoSettings::default();
    assert_eq!(settings.page_url(), "http://localhost:8080/");
    assert_eq!(settings.data_url(), &None);
    assert_eq!(settings.log_file(), Path::new("strictly_bingo.log"));
}

#[test]
fn test_from_file_fills_missing_fields() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("strictly_bingo.toml");
    std::fs::write(&path, "data_url = \"https://data.test/bingo.json\"\n").expect("Write settings");

    let settings = BingoSettings::from_file(&path).expect("Settings parse");
    assert_eq!(
        settings.data_url().as_deref(),
        Some("https://data.test/bingo.json")
    );
    assert_eq!(settings.page_url(), "http://localhost:8080/");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let settings =
        BingoSettings::load_or_default(dir.path().join("absent.toml")).expect("Defaults");
    assert_eq!(settings, BingoSettings::default());
}

#[test]
fn test_malformed_file_reports_error() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "page_url = [").expect("Write settings");

    let err = BingoSettings::from_file(&path).unwrap_err();
    assert!(err.message.contains("Failed to parse settings"));
    assert!(err.to_string().starts_with("Settings error:"));
}

#[test]
fn test_player_link_carries_data_url() {
    let settings = BingoSettings::default()
        .with_page_url("https://bingo.test/play")
        .with_data_url("https://data.test/bingo.json");

    let link = settings.player_link().expect("Valid page URL");
    let page = PageLocation::parse(&link).expect("Link parses");
    assert!(page.is_player_route());
    assert_eq!(page.source(), "https://data.test/bingo.json");
}

#[test]
fn test_player_link_rejects_bad_page_url() {
    let settings = BingoSettings::default().with_page_url("not a url");
    assert!(settings.player_link().is_err());
}

#[test]
fn test_player_link_makes_data_url_absolute() {
    for (data_url, expected) in [
        ("data/bingo.json", "https://bingo.test/data/bingo.json"),
        ("//cdn.test/bingo.json", "https://cdn.test/bingo.json"),
    ] {
        let settings = BingoSettings::default()
            .with_page_url("https://bingo.test/play/")
            .with_data_url(data_url);

        let link = settings.player_link().expect("Valid page URL");
        let params = parse_location_params(&link);
        assert_eq!(params.get("src").map(String::as_str), Some(expected));
    }
}
