//! Route configuration and setup

use crate::api_doc::get_openapi_spec;
use crate::constants::{HTTP_CONCURRENCY_LIMIT, MAX_BODY_BYTES, OPENAPI_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use qrgen_core::Config;
use qrgen_infra::request_id_middleware;
use std::path::Path;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let openapi = get_openapi_spec();

    let mut app = Router::new()
        .route("/generate", post(handlers::generate::generate))
        .route("/health", get(handlers::health::health_check))
        .route(
            OPENAPI_PATH,
            get(move || {
                let spec = openapi.clone();
                async move { Json(spec) }
            }),
        )
        .with_state(state);

    let public_dir = config.public_dir();
    if Path::new(public_dir).is_dir() {
        tracing::info!(public_dir = %public_dir, "Serving static files");
        app = app.fallback_service(ServeDir::new(public_dir));
    } else {
        tracing::warn!(public_dir = %public_dir, "Public directory not found; static files disabled");
    }

    Ok(app
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware)))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
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
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
