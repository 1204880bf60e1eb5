//! Tests for URL-carried participant addressing.

use strictly_bingo::{
    PageLocation, is_player_route, normalize_source, parse_location_params, player_link,
};

fn page(href: &str) -> PageLocation {
    PageLocation::parse(href).expect("Valid page URL")
}

#[test]
fn test_query_params() {
    let params = parse_location_params("https://bingo.test/app?view=player&src=%2Fdata.json");
    assert_eq!(params.get("view").map(String::as_str), Some("player"));
    assert_eq!(params.get("src").map(String::as_str), Some("/data.json"));
}

#[test]
fn test_fragment_params_override_query() {
    let params = parse_location_params(
        "https://bingo.test/?src=query.json&keep=1#/player?src=fragment.json&extra=2",
    );
    assert_eq!(params.get("src").map(String::as_str), Some("fragment.json"));
    assert_eq!(params.get("keep").map(String::as_str), Some("1"));
    assert_eq!(params.get("extra").map(String::as_str), Some("2"));
}

#[test]
fn test_fragment_without_question_mark_is_ignored() {
    let params = parse_location_params("https://bingo.test/?src=a.json#src=b.json");
    assert_eq!(params.get("src").map(String::as_str), Some("a.json"));
}

#[test]
fn test_fragment_block_ends_at_second_question_mark() {
    let params = parse_location_params("https://bingo.test/#/p?src=a?b&extra=1");
    assert_eq!(params.get("src").map(String::as_str), Some("a"));
    assert_eq!(params.get("extra"), None);
}

#[test]
fn test_first_query_occurrence_wins() {
    let params = parse_location_params("https://bingo.test/?src=first&src=second");
    assert_eq!(params.get("src").map(String::as_str), Some("first"));
}

#[test]
fn test_plus_decodes_to_space() {
    let params = parse_location_params("https://bingo.test/?name=word+bingo");
    assert_eq!(params.get("name").map(String::as_str), Some("word bingo"));
}

#[test]
fn test_player_route_detection() {
    assert!(is_player_route("https://bingo.test/?view=player"));
    assert!(is_player_route("https://bingo.test/?src=/x.json"));
    assert!(!is_player_route("https://bingo.test/?view=editor"));
    assert!(!is_player_route("https://bingo.test/"));
    assert!(!is_player_route("https://bingo.test/#/x?src=/x.json"));
}

#[test]
fn test_relative_source_resolves_against_origin() {
    let page = page("https://bingo.test/nested/app/index.html?view=player");
    assert_eq!(
        normalize_source(Some("data/bingo.json"), &page),
        "https://bingo.test/data/bingo.json"
    );
    assert_eq!(
        normalize_source(Some("/bingo.json"), &page),
        "https://bingo.test/bingo.json"
    );
}

#[test]
fn test_scheme_relative_source_inherits_scheme() {
    let http = page("http://bingo.test/");
    let https = page("https://bingo.test/");
    assert_eq!(
        normalize_source(Some("//cdn.test/bingo.json"), &http),
        "http://cdn.test/bingo.json"
    );
    assert_eq!(
        normalize_source(Some("//cdn.test/bingo.json"), &https),
        "https://cdn.test/bingo.json"
    );
}

#[test]
fn test_absolute_source_is_unchanged() {
    let page = page("https://bingo.test/");
    assert_eq!(
        normalize_source(Some("http://other.test/a.json?x=1"), &page),
        "http://other.test/a.json?x=1"
    );
    assert_eq!(
        normalize_source(Some("  HTTPS://other.test/a.json "), &page),
        "HTTPS://other.test/a.json"
    );
}

#[test]
fn test_missing_source_is_empty() {
    let page = page("https://bingo.test/");
    assert_eq!(normalize_source(None, &page), "");
    assert_eq!(normalize_source(Some("   "), &page), "");
}

#[test]
fn test_page_source_reads_params() {
    let page = page("http://localhost:8080/?view=player#/p?src=/bingo.json");
    assert_eq!(page.source(), "http://localhost:8080/bingo.json");
    assert_eq!(page.origin(), "http://localhost:8080");
    assert!(page.is_player_route());
}

#[test]
fn test_player_link_round_trips_source() {
    let link = player_link("https://bingo.test/app?old=1#frag", "https://data.test/b.json?v=2")
        .expect("Valid base");
    assert!(link.starts_with("https://bingo.test/app?view=player&src="));

    let page = page(&link);
    assert_eq!(page.source(), "https://data.test/b.json?v=2");
}

#[test]
fn test_invalid_page_rejected() {
    assert!(PageLocation::parse("not a url").is_err());
}
