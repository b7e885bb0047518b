use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Market, Vendor};
use super::service::ListingService;
use crate::store::DocumentStore;

pub const DEFAULT_FEATURED_LIMIT: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub struct MarketsParams {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeaturedParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Router builder exposing the read-only directory endpoints.
pub fn listing_router<S>(service: Arc<ListingService<S>>) -> Router
where
    S: DocumentStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/markets", get(markets_handler::<S>))
        .route("/api/v1/markets/:market_id", get(market_handler::<S>))
        .route(
            "/api/v1/markets/:market_id/vendors",
            get(market_vendors_handler::<S>),
        )
        .route("/api/v1/featured-markets", get(featured_handler::<S>))
        .route("/api/v1/cities", get(cities_handler::<S>))
        .route("/api/v1/vendors", get(vendors_handler::<S>))
        .with_state(service)
}

pub(crate) async fn markets_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Query(params): Query<MarketsParams>,
) -> Json<Vec<Market>>
where
    S: DocumentStore + ?Sized + 'static,
{
    let markets = match params.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => service.get_markets_by_city(city).await,
        _ => service.get_public_markets().await,
    };
    Json(markets)
}

pub(crate) async fn featured_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Query(params): Query<FeaturedParams>,
) -> Json<Vec<Market>>
where
    S: DocumentStore + ?Sized + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_FEATURED_LIMIT);
    Json(service.get_featured_markets(limit).await)
}

pub(crate) async fn market_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Path(market_id): Path<String>,
) -> Response
where
    S: DocumentStore + ?Sized + 'static,
{
    match service.get_market_by_id(&market_id).await {
        Some(market) => (StatusCode::OK, Json(market)).into_response(),
        None => {
            let payload = json!({
                "error": "market not found",
                "market_id": market_id,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn market_vendors_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
    Path(market_id): Path<String>,
) -> Json<Vec<Vendor>>
where
    S: DocumentStore + ?Sized + 'static,
{
    Json(service.get_market_vendors(&market_id).await)
}

pub(crate) async fn cities_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
) -> Json<Vec<String>>
where
    S: DocumentStore + ?Sized + 'static,
{
    Json(service.get_cities_with_markets().await)
}

pub(crate) async fn vendors_handler<S>(
    State(service): State<Arc<ListingService<S>>>,
) -> Json<Vec<Vendor>>
where
    S: DocumentStore + ?Sized + 'static,
{
    Json(service.get_public_vendors().await)
}
