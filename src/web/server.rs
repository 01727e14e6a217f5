use axum::http::header;
use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::cli::{load_config, ServeArgs};
use crate::consolidation::Consolidator;
use crate::parsing::manifest::parse_manifest;
use crate::utils::validation::MAX_MANIFEST_SIZE;

/// Requests handled at once before callers queue
pub const MAX_CONCURRENT_REQUESTS: usize = 100;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
pub struct AppState {
    pub consolidator: Consolidator,
}

/// Error body returned for rejected requests
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Xml,
    Json,
}

#[derive(Deserialize)]
pub struct ConsolidateParams {
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the configuration or format tree cannot be loaded, the
/// tokio runtime cannot be created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Create the application router with all routes and middleware configured.
pub fn create_router(consolidator: Consolidator) -> Router {
    let state = Arc::new(AppState { consolidator });

    Router::new()
        .route("/api/consolidate", post(consolidate_handler))
        .route("/api/format-tree", get(format_tree_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
                .layer(DefaultBodyLimit::max(MAX_MANIFEST_SIZE)),
        )
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let consolidator = Consolidator::from_config(&config)?;
    let app = create_router(consolidator);

    let addr = format!("{}:{}", args.address, args.port);
    info!("Starting fileid-reconcile web server at http://{addr}");
    println!("Starting fileid-reconcile web server at http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn consolidate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConsolidateParams>,
    body: String,
) -> Response {
    // Inline documents only; file references are refused
    let results = match parse_manifest(&body, None) {
        Ok(results) => results,
        Err(e) => {
            let response = create_safe_error_response("invalid_manifest", &e.to_string(), None);
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    let output = state.consolidator.consolidate(results);

    match params.format {
        ResponseFormat::Json => Json(output).into_response(),
        ResponseFormat::Xml => match output.to_xml() {
            Ok(xml) => (
                [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
                xml,
            )
                .into_response(),
            Err(e) => {
                let response = create_safe_error_response(
                    "serialization_error",
                    "Failed to render consolidated output",
                    Some(&e.to_string()),
                );
                (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
            }
        },
    }
}

async fn format_tree_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let tree = state.consolidator.tree();
    Json(serde_json::json!({
        "count": tree.format_count(),
        "nodes": tree.len(),
        "formats": tree.to_nodes(),
    }))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
