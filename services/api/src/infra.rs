use hipop::config::StoreConfig;
use hipop::error::AppError;
use hipop::store::{DocumentStore, FirestoreStore, InMemoryStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

/// Seed collections bundled with the binary for demos and local runs.
pub(crate) const DEMO_SEED: &str = include_str!("../fixtures/seed.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Construct the configured document store behind a trait object.
pub(crate) fn build_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    match config {
        StoreConfig::Memory {
            seed_path: Some(path),
        } => {
            let store = InMemoryStore::from_seed_file(path)?;
            info!(seed = %path.display(), "using in-memory document store");
            Ok(Arc::new(store))
        }
        StoreConfig::Memory { seed_path: None } => {
            warn!("no STORE_SEED_PATH configured; in-memory store starts with the demo seed");
            Ok(Arc::new(demo_store()?))
        }
        StoreConfig::Firestore(settings) => {
            info!(project_id = %settings.project_id, "using firestore document store");
            Ok(Arc::new(FirestoreStore::new(settings.clone())))
        }
    }
}

pub(crate) fn demo_store() -> Result<InMemoryStore, AppError> {
    let seed = serde_json::from_str(DEMO_SEED).map_err(|err| {
        AppError::Store(hipop::store::StoreError::InvalidSeed(format!(
            "bundled seed is not valid JSON: {err}"
        )))
    })?;
    Ok(InMemoryStore::from_seed_json(seed)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hipop::listings::{MARKETS_COLLECTION, VENDORS_COLLECTION};

    #[test]
    fn demo_store_loads_bundled_collections() {
        let store = demo_store().expect("seed parses");
        assert_eq!(store.documents(MARKETS_COLLECTION).len(), 5);
        assert_eq!(store.documents(VENDORS_COLLECTION).len(), 4);
    }

    #[test]
    fn missing_seed_file_is_reported() {
        let config = StoreConfig::Memory {
            seed_path: Some("/nonexistent/hipop-seed.json".into()),
        };
        let err = build_store(&config).err().expect("missing file fails");
        assert!(matches!(err, AppError::Store(_)));
    }
}
