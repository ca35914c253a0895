use dayjot::config::RemoteConfig;
use dayjot::store::SqliteStore;
use dayjot::supabase::SupabaseClient;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub const TEST_ANON_KEY: &str = "test-anon-key";

/// Client pointed at a mock server
#[allow(dead_code)]
pub fn client_for(uri: &str) -> SupabaseClient {
    SupabaseClient::new(&RemoteConfig {
        url: uri.to_string(),
        anon_key: TEST_ANON_KEY.to_string(),
        timeout_seconds: 5,
    })
    .expect("failed to create client")
}

#[allow(dead_code)]
pub fn create_temp_store() -> (SqliteStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SqliteStore::new_with_path(tmp.path().join("journal.db"))
        .expect("failed to create sqlite store with path");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Session row as PostgREST returns it
#[allow(dead_code)]
pub fn session_row(id: &str, started_at: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "user_id": "user-1",
        "started_at": started_at,
        "ended_at": started_at,
        "status": "completed",
        "mode": "text",
        "title": title
    })
}
