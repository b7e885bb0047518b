use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{error, warn};

use super::domain::{distinct_cities, Market, Vendor, MARKETS_COLLECTION, VENDORS_COLLECTION};
use crate::store::{Document, DocumentStore, FieldValue, Query};

/// Read-only listing queries over the market and vendor collections.
///
/// Every query degrades to an empty result (or `None`) when the store fails; the failure is
/// logged here and never returned, so directory pages always have something to render.
pub struct ListingService<S: ?Sized> {
    store: Arc<S>,
}

impl<S> ListingService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Active markets ordered by name.
    pub async fn get_public_markets(&self) -> Vec<Market> {
        let query = active_markets().order_by("name");
        self.fetch_or_empty("public markets", &query).await
    }

    /// Active markets in `city`, ordered by name.
    pub async fn get_markets_by_city(&self, city: &str) -> Vec<Market> {
        let query = active_markets().where_eq("city", city).order_by("name");
        self.fetch_or_empty("markets by city", &query).await
    }

    /// The first `limit` active markets in name order.
    pub async fn get_featured_markets(&self, limit: usize) -> Vec<Market> {
        let query = active_markets().order_by("name").limit(limit);
        self.fetch_or_empty("featured markets", &query).await
    }

    /// Sorted, de-duplicated, non-empty cities across all active markets.
    pub async fn get_cities_with_markets(&self) -> Vec<String> {
        let documents = self.fetch_documents("cities", &active_markets()).await;
        distinct_cities(
            documents
                .iter()
                .filter_map(|document| document.field("city").and_then(FieldValue::as_str)),
        )
    }

    /// Active vendors ordered by business name.
    pub async fn get_public_vendors(&self) -> Vec<Vendor> {
        let query = Query::collection(VENDORS_COLLECTION)
            .where_eq("isActive", true)
            .order_by("businessName");
        self.fetch_or_empty("public vendors", &query).await
    }

    /// Active vendors attached to a market.
    pub async fn get_market_vendors(&self, market_id: &str) -> Vec<Vendor> {
        let query = Query::collection(VENDORS_COLLECTION)
            .where_eq("marketId", market_id)
            .where_eq("isActive", true);
        self.fetch_or_empty("market vendors", &query).await
    }

    /// A single market, `None` when missing, inactive, or unreadable.
    pub async fn get_market_by_id(&self, market_id: &str) -> Option<Market> {
        let document = match self.store.get(MARKETS_COLLECTION, market_id).await {
            Ok(document) => document?,
            Err(err) => {
                error!(%market_id, error = %err, "error fetching market");
                return None;
            }
        };

        decode_or_skip::<Market>("market detail", &document).filter(|market| market.is_active)
    }

    async fn fetch_or_empty<T>(&self, operation: &'static str, query: &Query) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        self.fetch_documents(operation, query)
            .await
            .iter()
            .filter_map(|document| decode_or_skip(operation, document))
            .collect()
    }

    async fn fetch_documents(&self, operation: &'static str, query: &Query) -> Vec<Document> {
        match self.store.run_query(query).await {
            Ok(documents) => documents,
            Err(err) => {
                error!(
                    operation,
                    collection = %query.collection,
                    error = %err,
                    "listing query failed; returning empty result"
                );
                Vec::new()
            }
        }
    }
}

fn active_markets() -> Query {
    Query::collection(MARKETS_COLLECTION).where_eq("isActive", true)
}

fn decode_or_skip<T>(operation: &'static str, document: &Document) -> Option<T>
where
    T: DeserializeOwned,
{
    match document.decode() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(operation, error = %err, "skipping malformed listing document");
            None
        }
    }
}
