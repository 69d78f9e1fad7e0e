//! Test helpers: build the router on in-memory stores and blob storage.
//!
//! No external services are required: `cargo test -p extgate-api`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use extgate_api::constants::API_PREFIX;
use extgate_api::setup::{routes, services, stores::Stores};
use extgate_api::AppState;
use extgate_core::{Config, GatekeeperConfig};
use extgate_storage::MemoryStorage;
use std::collections::HashMap;
use std::sync::Arc;

/// API path prefix for tests (e.g. `/api/v0/files`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: Arc<MemoryStorage>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("STORE_BACKEND", "memory"),
        ("STORAGE_BACKEND", "memory"),
        ("MAX_FILE_SIZE_MB", "1"),
        ("FIXED_EXTENSIONS", "bat,cmd,com,cpl,exe,scr,js"),
        ("FIXED_EXTENSIONS_BLOCKED", "exe"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }

    let config = GatekeeperConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("test config should parse");
    config.validate().expect("test config should be valid");
    Config(Box::new(config))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let config = test_config(overrides);
    let storage = Arc::new(MemoryStorage::new());

    let state = services::initialize_services(&config, Stores::memory(), storage.clone(), None)
        .await
        .expect("services should initialize");
    let router = routes::setup_routes(&config, state.clone()).expect("routes should build");

    TestApp {
        server: TestServer::new(router).expect("test server should start"),
        state,
        storage,
    }
}

/// Multipart body with a single `file` part.
pub fn file_form(filename: &str, data: impl Into<Vec<u8>>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data.into())
            .file_name(filename)
            .mime_type("application/octet-stream"),
    )
}
