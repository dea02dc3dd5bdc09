#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use strava_cli::api::Config;
use strava_cli::auth::storage::JsonTokenStorage;
use tempfile::TempDir;
use wiremock::MockServer;

pub const API_PREFIX: &str = "/api/v3";

pub fn config_for(server: &MockServer) -> Config {
    Config {
        api_url: format!("{}{}", server.uri(), API_PREFIX),
        oauth_url: format!("{}/oauth/token", server.uri()),
        client_id: Some("12345".to_string()),
        client_secret: Some("client-secret".to_string()),
    }
}

/// Writes a token file into a fresh temp dir. `expires_in` is relative to
/// now and may be negative for an already expired token.
pub fn token_file(access: &str, refresh: &str, expires_in: Duration) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("strava-token.json");
    let body = json!({
        "token_type": "Bearer",
        "access_token": access,
        "refresh_token": refresh,
        "expires_at": (Utc::now() + expires_in).timestamp(),
    });
    std::fs::write(&path, serde_json::to_string_pretty(&body).unwrap()).expect("write token");
    (dir, path)
}

pub fn fresh_storage() -> (TempDir, JsonTokenStorage) {
    let (dir, path) = token_file("fresh-access", "fresh-refresh", Duration::hours(3));
    (dir, JsonTokenStorage::new(path))
}

pub fn activity_json(id: u64, name: &str, start_date: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": "Run",
        "sport_type": "Run",
        "distance": 10012.3,
        "moving_time": 2950,
        "elapsed_time": 3011,
        "total_elevation_gain": 54.0,
        "start_date": start_date,
        "start_date_local": start_date,
        "average_speed": 3.39,
        "max_speed": 4.8,
        "average_heartrate": 152.1,
        "max_heartrate": 171.0,
        "description": null,
        "gear_id": "g123",
        "trainer": false,
        "commute": false,
        "private": false
    })
}
