//! Persistence tests for the mapping store

use std::fs;

use rstest::rstest;
use tag_store::{MappingStore, TagMapping};

fn store_in(dir: &tempfile::TempDir) -> MappingStore {
    MappingStore::open(dir.path().join("rfid_mappings.json"))
}

#[test]
fn test_insert_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store
        .insert(&TagMapping::new("A", "spotify:track:1", "One", "Artist"))
        .unwrap();

    let mapping = store.get("A").unwrap().expect("mapping should exist");
    assert_eq!(mapping.resource_uri, "spotify:track:1");
    assert_eq!(mapping.display_name, "One");
    assert_eq!(mapping.artist, "Artist");
    assert!(mapping.added_at.is_some());
}

#[test]
fn test_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store
        .insert(&TagMapping::new("A", "spotify:track:1", "One", ""))
        .unwrap();
    store
        .insert(&TagMapping::new("A", "spotify:album:2", "Two", ""))
        .unwrap();

    let all = store.list().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].resource_uri, "spotify:album:2");
}

#[test]
fn test_remove() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store
        .insert(&TagMapping::new("A", "spotify:track:1", "", ""))
        .unwrap();
    store
        .insert(&TagMapping::new("B", "spotify:track:2", "", ""))
        .unwrap();

    assert!(store.remove("A").unwrap());
    assert!(!store.remove("A").unwrap());

    let tags: Vec<String> = store.list().unwrap().into_iter().map(|m| m.tag_id).collect();
    assert_eq!(tags, vec!["B".to_string()]);
}

#[test]
fn test_file_layout_is_keyed_by_tag() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store
        .insert(&TagMapping::new("04A1", "spotify:playlist:x", "Mix", "Someone"))
        .unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["04A1"]["uri"], "spotify:playlist:x");
    assert_eq!(doc["04A1"]["name"], "Mix");
    assert_eq!(doc["04A1"]["artist"], "Someone");
    assert!(doc["04A1"]["added"].is_string());
    // Pretty printed with two-space indentation
    assert!(raw.contains("\n  \"04A1\""));
}

#[test]
fn test_external_edits_are_visible() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(store.get("C").unwrap().is_none());

    fs::write(
        store.path(),
        r#"{"C": {"uri": "spotify:track:3", "name": "Three", "artist": "", "added": "2024-01-01T00:00:00"}}"#,
    )
    .unwrap();

    assert_eq!(
        store.get("C").unwrap().map(|m| m.resource_uri),
        Some("spotify:track:3".to_string())
    );
}

#[rstest]
#[case("", "spotify:track:1")]
#[case("A", "")]
#[case("   ", "spotify:track:1")]
fn test_blank_fields_rejected(#[case] tag: &str, #[case] uri: &str) {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(store.insert(&TagMapping::new(tag, uri, "", "")).is_err());
}

#[test]
fn test_bad_record_is_skipped_and_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    fs::write(
        store.path(),
        r#"{
  "GOOD": {"uri": "spotify:album:1", "name": "One"},
  "NO_URI": {"name": "Lost"},
  "BAD_DATE": {"uri": "spotify:track:2", "added": "yesterday"}
}"#,
    )
    .unwrap();

    let tags: Vec<String> = store.list().unwrap().into_iter().map(|m| m.tag_id).collect();
    assert_eq!(tags, vec!["GOOD".to_string()]);
    assert!(store.get("NO_URI").unwrap().is_none());
    assert!(store.get("GOOD").unwrap().is_some());

    // Rewriting the file leaves the broken entries for the user to fix
    store
        .insert(&TagMapping::new("NEW", "spotify:track:9", "", ""))
        .unwrap();
    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(doc["NO_URI"]["name"], "Lost");
    assert_eq!(doc["BAD_DATE"]["added"], "yesterday");
    assert_eq!(store.list().unwrap().len(), 2);
}
