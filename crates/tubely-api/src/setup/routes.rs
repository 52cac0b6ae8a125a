//! Route configuration and setup

use crate::constants::{API_PREFIX, ASSETS_ROUTE, HTTP_CONCURRENCY_LIMIT, MEDIA_ROUTE};
use crate::handlers;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Request},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend};
use tubely_infra::{
    get_request_id, request_id_middleware, security_headers_middleware, SecurityHeadersConfig,
};

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_routes = Router::new()
        .route(
            "/thumbnail_upload/{video_id}",
            post(handlers::thumbnail_upload::upload_thumbnail)
                .layer(DefaultBodyLimit::max(config.thumbnail_max_bytes())),
        )
        .route(
            "/video_upload/{video_id}",
            post(handlers::video_upload::upload_video)
                .layer(DefaultBodyLimit::max(config.video_max_bytes())),
        )
        .route(
            "/videos",
            post(handlers::videos::create_video).get(handlers::videos::list_videos),
        )
        .route("/videos/{video_id}", get(handlers::videos::get_video))
        .route(
            "/thumbnails/{video_id}",
            get(handlers::thumbnail_get::get_thumbnail),
        );

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest(API_PREFIX, api_routes)
        .nest_service(ASSETS_ROUTE, ServeDir::new(config.assets_root()));

    if config.storage_backend() == StorageBackend::Local {
        app = app.nest_service(MEDIA_ROUTE, ServeDir::new(config.local_storage_path()));
    }

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = get_request_id(request).unwrap_or_default();
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id
        )
    });

    let security_headers_config = SecurityHeadersConfig {
        hsts: config.is_production(),
    };

    tracing::info!(
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        "HTTP concurrency limit layer enabled"
    );

    let app = app
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(
            config.video_max_bytes().max(config.thumbnail_max_bytes()),
        ))
        .layer(cors)
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
