//! Folio Articles API
//!
//! Article listing service with registration, bearer-token auth and
//! ownership-scoped writes.
//!
//! ## REST Endpoints
//!
//! - `POST /auth/register` - Register a principal
//! - `POST /auth/login` - Exchange credentials for a bearer token
//! - `GET /articles` - List articles (`page`, `limit`, `authorId`, `publishedAfter`)
//! - `GET /articles/{id}` - Get one article
//! - `POST /articles` - Create an article (bearer)
//! - `PATCH /articles/{id}` - Update an owned article (bearer)
//! - `DELETE /articles/{id}` - Delete an owned article (bearer)
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness
//! - `GET /ready` - Readiness, with database and listing cache state
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{health, ready};
use crate::state::AppState;

/// Build the HTTP router over `state`
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let api = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route(
            "/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route(
            "/articles/{id}",
            get(handlers::get_article)
                .patch(handlers::update_article)
                .delete(handlers::delete_article),
        );

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // A timed-out write still finishes and clears the cache in the background
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(api)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}
