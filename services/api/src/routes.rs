use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use hipop::listings::{listing_router, ListingService};
use hipop::store::DocumentStore;
use hipop::workflows::vendor_application::{application_router, VendorApplicationService};
use serde_json::json;
use std::sync::Arc;

/// Full HTTP surface: directory reads, application intake, and the operational probes.
pub(crate) fn with_service_routes<S>(store: Arc<S>) -> Router
where
    S: DocumentStore + ?Sized + 'static,
{
    let listings = Arc::new(ListingService::new(store.clone()));
    let applications = Arc::new(VendorApplicationService::new(store));

    listing_router(listings)
        .merge(application_router(applications))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
