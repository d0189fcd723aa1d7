//! Request/response tests for the Spotify client against a mock server

use std::fs;
use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::json;
use spotify_client::{
    ClientCredentials, CurrentPlayback, ResourceKind, SpotifyClient, SpotifyError, StaticToken,
    TokenCache, TokenProvider,
};

fn client_for(server: &Server) -> SpotifyClient {
    SpotifyClient::with_base_url(server.url(), Arc::new(StaticToken::new("test-token")))
}

#[test]
fn test_devices_preserves_order_and_skips_restricted() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/me/player/devices")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"devices":[
                {"id":"kitchen","is_active":false,"name":"Kitchen","type":"Speaker","volume_percent":40},
                {"id":null,"is_active":false,"name":"Restricted","type":"TV"},
                {"id":"laptop","is_active":true,"name":"Laptop","type":"Computer"}
            ]}"#,
        )
        .create();

    let devices = client_for(&server).devices().unwrap();
    mock.assert();

    let ids: Vec<&str> = devices.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["kitchen", "laptop"]);
    assert_eq!(devices[0].kind, "Speaker");
    assert!(devices[1].is_active);
}

#[test]
fn test_devices_empty_list() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/me/player/devices")
        .with_status(200)
        .with_body(r#"{"devices":[]}"#)
        .create();

    assert!(client_for(&server).devices().unwrap().is_empty());
}

#[test]
fn test_start_playback_track_uses_uris() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/v1/me/player/play")
        .match_query(Matcher::UrlEncoded("device_id".into(), "kitchen".into()))
        .match_body(Matcher::Json(json!({ "uris": ["spotify:track:1"] })))
        .with_status(204)
        .create();

    client_for(&server)
        .start_playback("kitchen", "spotify:track:1", false)
        .unwrap();
    mock.assert();
}

#[test]
fn test_start_playback_album_uses_context() {
    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/v1/me/player/play")
        .match_query(Matcher::UrlEncoded("device_id".into(), "kitchen".into()))
        .match_body(Matcher::Json(json!({ "context_uri": "spotify:album:9" })))
        .with_status(204)
        .create();

    client_for(&server)
        .start_playback("kitchen", "spotify:album:9", true)
        .unwrap();
    mock.assert();
}

#[test]
fn test_pause_error_carries_api_message() {
    let mut server = Server::new();
    server
        .mock("PUT", "/v1/me/player/pause")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"status":404,"message":"Player command failed: No active device found","reason":"NO_ACTIVE_DEVICE"}}"#)
        .create();

    let error = client_for(&server).pause_playback().unwrap_err();
    match error {
        SpotifyError::Api { status, ref message } => {
            assert_eq!(status, 404);
            assert!(message.contains("No active device"));
        }
        other => panic!("Expected SpotifyError::Api, got {:?}", other),
    }
    assert!(error.is_no_active_device());
}

#[test]
fn test_unauthorised_without_body() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/me/player/devices")
        .with_status(401)
        .create();

    match client_for(&server).devices() {
        Err(SpotifyError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "HTTP 401");
        }
        other => panic!("Expected SpotifyError::Api, got {:?}", other),
    }
}

#[test]
fn test_expired_token_is_refreshed_and_persisted() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/api/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "refresh-me".into()),
            Matcher::UrlEncoded("client_id".into(), "id".into()),
            Matcher::UrlEncoded("client_secret".into(), "secret".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"fresh","token_type":"Bearer","expires_in":3600,"scope":"user-modify-playback-state"}"#)
        .create();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".spotifycache");
    fs::write(
        &path,
        r#"{"access_token":"stale","token_type":"Bearer","refresh_token":"refresh-me","expires_at":0}"#,
    )
    .unwrap();

    let cache = TokenCache::new(
        &path,
        Some(ClientCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }),
    )
    .with_token_url(format!("{}/api/token", server.url()));

    assert_eq!(cache.access_token().unwrap(), "fresh");
    // Second call is served from memory.
    assert_eq!(cache.access_token().unwrap(), "fresh");
    mock.assert();

    let persisted: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(persisted["access_token"], "fresh");
    assert_eq!(persisted["refresh_token"], "refresh-me");
    assert_eq!(persisted["token_type"], "Bearer");
    assert!(persisted["expires_at"].as_i64().unwrap() > 0);
}

#[test]
fn test_rejected_refresh_is_reported() {
    let mut server = Server::new();
    server
        .mock("POST", "/api/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#)
        .create();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".spotifycache");
    fs::write(&path, r#"{"access_token":"stale","refresh_token":"gone","expires_at":0}"#).unwrap();

    let cache = TokenCache::new(
        &path,
        Some(ClientCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }),
    )
    .with_token_url(format!("{}/api/token", server.url()));

    match cache.access_token() {
        Err(SpotifyError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid_grant: Refresh token revoked");
        }
        other => panic!("Expected SpotifyError::Api, got {:?}", other),
    }
}

#[test]
fn test_search_queries_all_kinds() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/v1/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "blue train".into()),
            Matcher::UrlEncoded("type".into(), "track,album,playlist".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "tracks": {"items": [{"name": "Blue Train", "uri": "spotify:track:t1",
                    "artists": [{"name": "John Coltrane"}]}]},
                "albums": {"items": [{"name": "Blue Train", "uri": "spotify:album:a1",
                    "artists": [{"name": "John Coltrane"}, {"name": "Lee Morgan"}]}]},
                "playlists": {"items": [null, {"name": "Jazz", "uri": "spotify:playlist:p1",
                    "owner": {"display_name": "spotify"}}]}
            }"#,
        )
        .create();

    let items = client_for(&server).search("  blue train ").unwrap();
    mock.assert();

    let summary: Vec<(&str, &str, ResourceKind)> = items
        .iter()
        .map(|i| (i.uri.as_str(), i.artist.as_str(), i.kind))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("spotify:track:t1", "John Coltrane", ResourceKind::Track),
            ("spotify:album:a1", "John Coltrane, Lee Morgan", ResourceKind::Album),
            ("spotify:playlist:p1", "Playlist by spotify", ResourceKind::Playlist),
        ]
    );
}

#[test]
fn test_short_search_sends_nothing() {
    let mut server = Server::new();
    let mock = server.mock("GET", "/v1/search").expect(0).create();

    let client = client_for(&server);
    assert!(client.search("").unwrap().is_empty());
    assert!(client.search(" x ").unwrap().is_empty());
    mock.assert();
}

#[test]
fn test_current_playback() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/me/player")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"is_playing":true,"progress_ms":61000,"device":{"id":"kitchen"},
                "item":{"name":"Moment's Notice","uri":"spotify:track:t2","duration_ms":550000,
                "artists":[{"name":"John Coltrane"}],"album":{"name":"Blue Train"}}}"#,
        )
        .create();

    assert_eq!(
        client_for(&server).current_playback().unwrap(),
        Some(CurrentPlayback {
            is_playing: true,
            track_name: "Moment's Notice".to_string(),
            artist: "John Coltrane".to_string(),
            album: "Blue Train".to_string(),
            progress_ms: 61_000,
            duration_ms: 550_000,
        })
    );
}

#[test]
fn test_current_playback_no_content_is_none() {
    let mut server = Server::new();
    server.mock("GET", "/v1/me/player").with_status(204).create();

    assert_eq!(client_for(&server).current_playback().unwrap(), None);
}

#[test]
fn test_current_playback_without_item_is_none() {
    let mut server = Server::new();
    server
        .mock("GET", "/v1/me/player")
        .with_status(200)
        .with_body(r#"{"is_playing":false,"item":null}"#)
        .create();

    assert_eq!(client_for(&server).current_playback().unwrap(), None);
}
