//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::constants::{API_BASE, API_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use extgate_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let body_limit = config
        .max_file_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(extension_routes())
        .merge(upload_routes(body_limit))
        .merge(file_routes())
        .merge(audit_routes());

    let app = Router::new()
        .nest(API_PREFIX, api_routes)
        .route(
            &format!("{}/openapi.json", API_BASE),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new(format!("{}/openapi.json", API_BASE)).path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit,
        "Routes configured"
    );

    Ok(app)
}

fn extension_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/extensions/fixed",
            get(handlers::extensions::list_fixed_extensions),
        )
        .route(
            "/extensions/fixed/{extension}",
            put(handlers::extensions::update_fixed_extension),
        )
        .route(
            "/extensions/custom",
            get(handlers::extensions::list_custom_extensions)
                .post(handlers::extensions::add_custom_extension),
        )
        .route(
            "/extensions/custom/{id}",
            axum::routing::delete(handlers::extensions::delete_custom_extension),
        )
        .route(
            "/extensions/blocked",
            get(handlers::extensions::list_blocked_extensions),
        )
        .route(
            "/extensions/check",
            get(handlers::extensions::check_extension),
        )
}

/// Upload routes get a body limit of the file ceiling plus multipart overhead.
fn upload_routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload/file", post(handlers::upload::upload_file))
        .route("/upload/check", post(handlers::upload::check_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
}

fn file_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/files", get(handlers::files::list_files))
        .route("/files/{id}", get(handlers::files::get_file))
        .route("/files/{id}/download", get(handlers::files::download_file))
        .route(
            "/files/{id}/protection",
            put(handlers::files::update_file_protection),
        )
        .route(
            "/files/extension/{extension}",
            get(handlers::files::list_files_by_extension),
        )
}

fn audit_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/audit", get(handlers::audit::list_audit_entries))
        .route("/audit/blocked", get(handlers::audit::list_blocked_audit_entries))
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
