//! Unit tests for page parsing and cursor extraction

use super::*;
use serde_json::json;

#[test]
fn test_parse_list_page() {
    let raw = r#"{"results": [{"name": "ceph"}, {"name": "nomad"}]}"#;

    let page = parse_page(raw).unwrap();
    assert_eq!(
        page,
        ParsedPage::Items(vec![json!({"name": "ceph"}), json!({"name": "nomad"})])
    );
}

#[test]
fn test_parse_single_object() {
    let raw = r#"{"username": "norisnetwork", "display_name": "noris network AG"}"#;

    let page = parse_page(raw).unwrap();
    assert_eq!(
        page,
        ParsedPage::Single(json!({"username": "norisnetwork", "display_name": "noris network AG"}))
    );
}

#[test]
fn test_parse_empty_results() {
    let page = parse_page(r#"{"pagination": {"next": null}, "results": []}"#).unwrap();
    assert_eq!(page, ParsedPage::Items(vec![]));
    assert!(page.into_items().is_empty());
}

#[test]
fn test_parse_invalid_json() {
    assert!(matches!(parse_page("{not json"), Err(ForgeError::Parse { .. })));
}

#[test]
fn test_parse_results_not_an_array() {
    assert!(matches!(parse_page(r#"{"results": 3}"#), Err(ForgeError::Parse { .. })));
}

#[test]
fn test_into_items_of_single_values() {
    assert_eq!(ParsedPage::Single(json!({"a": 1})).into_items(), vec![json!({"a": 1})]);
    assert_eq!(ParsedPage::Single(json!([1, 2])).into_items(), vec![json!(1), json!(2)]);
}

#[test]
fn test_into_single_rejects_lists() {
    let result = ParsedPage::Items(vec![json!({})]).into_single();
    assert!(matches!(result, Err(ForgeError::Protocol { .. })));
}

#[test]
fn test_next_cursor_present() {
    let page = json!({"pagination": {"next": "/v3/modules?limit=2&offset=2&sort_by=latest_release"}});
    assert_eq!(
        next_cursor(&page).unwrap().as_deref(),
        Some("/v3/modules?limit=2&offset=2&sort_by=latest_release")
    );
}

#[test]
fn test_next_cursor_exhausted() {
    assert_eq!(next_cursor(&json!({"pagination": {"next": null}})).unwrap(), None);
    assert_eq!(next_cursor(&json!({"pagination": {"next": ""}})).unwrap(), None);
    assert_eq!(next_cursor(&json!({"pagination": {}})).unwrap(), None);
}

#[test]
fn test_next_cursor_without_pagination_key() {
    assert_eq!(next_cursor(&json!({"username": "sshuyskiy"})).unwrap(), None);
    assert_eq!(next_cursor(&json!({"results": [{"name": "ceph"}]})).unwrap(), None);
    assert_eq!(next_cursor(&json!([1, 2, 3])).unwrap(), None);
}

#[test]
fn test_next_cursor_bad_shape() {
    assert!(matches!(next_cursor(&json!({"pagination": null})), Err(ForgeError::Parse { .. })));
    assert!(matches!(next_cursor(&json!({"pagination": {"next": 2}})), Err(ForgeError::Parse { .. })));
}
