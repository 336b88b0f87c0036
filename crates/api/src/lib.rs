//! HTTP API server with observability for the rental ledger.
//!
//! Provides REST endpoints for properties, transaction categories and
//! transactions, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::LedgerStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Config, LogFormat};
pub use error::ApiError;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: LedgerStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    use routes::{categories, properties, transactions};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/properties",
            get(properties::list::<S>).post(properties::create::<S>),
        )
        .route(
            "/properties/{id}",
            get(properties::get::<S>)
                .patch(properties::update::<S>)
                .delete(properties::delete::<S>),
        )
        .route(
            "/transaction-categories",
            get(categories::list::<S>).post(categories::create::<S>),
        )
        .route(
            "/transaction-categories/{id}",
            get(categories::get::<S>)
                .patch(categories::update::<S>)
                .delete(categories::delete::<S>),
        )
        .route(
            "/transactions",
            get(transactions::list::<S>).post(transactions::create::<S>),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get::<S>)
                .put(transactions::replace::<S>)
                .patch(transactions::update::<S>)
                .delete(transactions::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
