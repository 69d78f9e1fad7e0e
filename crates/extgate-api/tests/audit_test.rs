//! Audit trail and health API tests.

mod helpers;

use helpers::{api_path, file_form, setup_test_app};
use serde_json::Value;

#[tokio::test]
async fn test_uploads_are_audited() {
    let app = setup_test_app().await;
    let client = app.client();

    client
        .post(&api_path("/upload/file"))
        .add_header("x-forwarded-for", "198.51.100.4")
        .add_header("user-agent", "extgate-tests")
        .multipart(file_form("ok.txt", b"fine".to_vec()))
        .await;
    client
        .post(&api_path("/upload/file"))
        .multipart(file_form("bad.exe", b"MZ".to_vec()))
        .await;
    client
        .post(&api_path("/upload/check"))
        .multipart(file_form("probe.js.exe", b"MZ".to_vec()))
        .await;

    let all: Value = client.get(&api_path("/audit")).await.json();
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0]["filename"], "probe.js.exe");
    assert_eq!(all[2]["filename"], "ok.txt");
    assert_eq!(all[2]["blocked"], false);
    assert_eq!(all[2]["client_ip"], "198.51.100.4");
    assert_eq!(all[2]["user_agent"], "extgate-tests");

    let blocked: Value = client.get(&api_path("/audit/blocked")).await.json();
    let blocked = blocked.as_array().unwrap();
    assert_eq!(blocked.len(), 2);
    assert!(blocked.iter().all(|e| e["blocked"] == true));
    assert_eq!(blocked[1]["block_reason"], "Blocked extension: exe");
    assert_eq!(blocked[1]["block_reason_kind"], "BLOCKED_EXTENSION");
    assert_eq!(blocked[1]["blocked_extension"], "exe");
}

#[tokio::test]
async fn test_structural_failures_are_not_audited() {
    let app = setup_test_app().await;
    app.client()
        .post(&api_path("/upload/file"))
        .multipart(file_form("empty.txt", Vec::new()))
        .await;

    let all: Value = app.client().get(&api_path("/audit")).await.json();
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_audit_paging() {
    let app = setup_test_app().await;
    for i in 0..3 {
        app.client()
            .post(&api_path("/upload/file"))
            .multipart(file_form(&format!("f{}.txt", i), b"x".to_vec()))
            .await;
    }

    let page: Value = app
        .client()
        .get(&api_path("/audit"))
        .add_query_param("limit", 2)
        .add_query_param("offset", 1)
        .await
        .json();
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["filename"], "f1.txt");
    assert_eq!(page[1]["filename"], "f0.txt");
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;
    let response = app.client().get(&api_path("/health")).await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store_backend"], "memory");
    assert_eq!(body["storage_backend"], "memory");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["paths"]["/api/v0/upload/file"].is_object());
}
