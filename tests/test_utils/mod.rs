//! Test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{Router, body::Body};
use tempfile::TempDir;

use waitlist::api::{AppState, app};
use waitlist::core::AppConfig;
use waitlist::google::SheetStore;
use waitlist::intake::EmailIntake;

pub const INDEX_HTML: &str = "<!DOCTYPE html><html><body><button>Connect</button></body></html>";

/// Spreadsheet kept in memory so API tests don't need the network.
#[derive(Default)]
pub struct MemorySheets {
    pub rows: Mutex<Vec<Vec<String>>>,
    pub creates: AtomicUsize,
    pub appends: AtomicUsize,
    pub fail: AtomicBool,
}

impl MemorySheets {
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetStore for MemorySheets {
    async fn create_spreadsheet(
        &self,
        _title: &str,
        _sheet_title: &str,
        header: &[&str],
    ) -> Result<String> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .push(header.iter().map(|h| h.to_string()).collect());
        Ok("memory-sheet".to_string())
    }

    async fn get_values(&self, _id: &str, _range: &str) -> Result<Vec<Vec<String>>> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("401 Unauthorized: secret-access-token rejected");
        }
        Ok(self.rows())
    }

    async fn append_values(&self, _id: &str, _range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().extend(rows);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub sheets: Arc<MemorySheets>,
    // Holds the static directory open for the life of the test
    pub static_dir: TempDir,
}

/// Config pointing every outbound call at `api_url`.
pub fn test_config(static_dir: &Path, api_url: &str) -> AppConfig {
    AppConfig {
        connectors_url: api_url.to_string(),
        repl_identity: Some("test-identity".to_string()),
        web_repl_renewal: None,
        spreadsheet_id: None,
        spreadsheet_title: String::from("Email List"),
        sheets_api_url: api_url.to_string(),
        static_dir: static_dir.display().to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

fn static_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create static directory");
    fs::write(dir.path().join("index.html"), INDEX_HTML).expect("Failed to write index.html");
    fs::write(dir.path().join("style.css"), "body { margin: 0; }")
        .expect("Failed to write style.css");
    dir
}

/// Creates a test application router backed by [`MemorySheets`].
pub fn test_app() -> TestApp {
    let static_dir = static_dir();
    let sheets = Arc::new(MemorySheets::default());
    let config = test_config(static_dir.path(), "http://127.0.0.1:9");
    let intake = EmailIntake::new(
        Arc::clone(&sheets) as Arc<dyn SheetStore>,
        config.spreadsheet_id.clone(),
        &config.spreadsheet_title,
    );
    let router = app(Arc::new(AppState::new(intake, config)));

    TestApp {
        router,
        sheets,
        static_dir,
    }
}

/// Creates a test application that talks to real HTTP endpoints at
/// `api_url`, e.g. a mockito server standing in for both the connector
/// and the Sheets API.
pub fn http_test_app(api_url: &str, spreadsheet_id: Option<&str>) -> (Router, TempDir) {
    let static_dir = static_dir();
    let mut config = test_config(static_dir.path(), api_url);
    config.spreadsheet_id = spreadsheet_id.map(str::to_string);
    let intake = EmailIntake::from_config(&config).expect("Failed to build intake");
    let router = app(Arc::new(AppState::new(intake, config)));
    (router, static_dir)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub fn json_request(email: &str) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .uri("/submit-email")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "email": email }).to_string()))
        .unwrap()
}
