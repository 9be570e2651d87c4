//! Persistent geocode cache with single-flight resolution.
//!
//! Every distinct address is sent to the provider at most once, ever. The
//! answer (including "no match") lands in the `location` table and is served
//! from there forever after; an in-process moka layer in front coalesces
//! concurrent lookups for the same address and keeps hot addresses out of
//! the database.
//!
//! A pending row is claimed with `INSERT .. ON CONFLICT DO NOTHING` before
//! the provider is called, so two server processes racing on a new address
//! still produce exactly one provider call between them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::Coordinates;
use super::geocoder::{GeocoderClient, GeocoderError};
use crate::db::RepositoryError;
use crate::models::Location;

/// In-process cache capacity (addresses).
const MEMORY_CAPACITY: u64 = 10_000;

/// How long a location may be served from process memory before the
/// database is consulted again.
const MEMORY_TTL: Duration = Duration::from_secs(3600);

/// Errors that can leave [`GeocodeCache::resolve`].
///
/// Clonable because coalesced callers all receive the same failure.
#[derive(Debug, Clone, Error)]
pub enum GeocodeError {
    /// The provider could not be asked or gave an unusable answer.
    #[error("geocoding provider failure: {0}")]
    Provider(Arc<GeocoderError>),

    /// The location store failed.
    #[error("location store failure: {0}")]
    Store(Arc<RepositoryError>),
}

impl From<GeocoderError> for GeocodeError {
    fn from(e: GeocoderError) -> Self {
        Self::Provider(Arc::new(e))
    }
}

impl From<RepositoryError> for GeocodeError {
    fn from(e: RepositoryError) -> Self {
        Self::Store(Arc::new(e))
    }
}

/// Persistence contract the cache needs from the `location` table.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Fetch the record for an address, settled or pending.
    async fn find(&self, address: &str) -> Result<Option<Location>, RepositoryError>;

    /// Claim an address by inserting a pending record unless one exists.
    ///
    /// Returns the inserted record, or `None` when another writer already
    /// holds the address (in which case the provider must not be called).
    async fn insert_pending(
        &self,
        address: &str,
        checked_at: DateTime<Utc>,
    ) -> Result<Option<Location>, RepositoryError>;

    /// Record provider coordinates for an address.
    async fn save_coordinates(
        &self,
        address: &str,
        coordinates: Coordinates,
        checked_at: DateTime<Utc>,
    ) -> Result<Location, RepositoryError>;
}

/// Address resolution front door for the whole server.
#[derive(Clone)]
pub struct GeocodeCache {
    store: Arc<dyn LocationStore>,
    geocoder: GeocoderClient,
    memory: Cache<String, Location>,
}

impl GeocodeCache {
    /// Create a cache over a location store and a provider client.
    #[must_use]
    pub fn new(store: Arc<dyn LocationStore>, geocoder: GeocoderClient) -> Self {
        Self {
            store,
            geocoder,
            memory: Cache::builder()
                .max_capacity(MEMORY_CAPACITY)
                .time_to_live(MEMORY_TTL)
                .build(),
        }
    }

    /// Resolve an address to its location record.
    ///
    /// The returned location may have no coordinates; that is a settled
    /// answer ("the provider does not know this address"), not a failure.
    /// Concurrent calls for the same address share one lookup.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Provider`] if this call had to consult the
    /// provider and the provider failed. The address stays claimed, so
    /// subsequent calls return its pending record instead of retrying.
    #[instrument(skip(self))]
    pub async fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
        self.memory
            .try_get_with(address.to_owned(), self.load(address))
            .await
            .map_err(|e: Arc<GeocodeError>| (*e).clone())
    }

    async fn load(&self, address: &str) -> Result<Location, GeocodeError> {
        if let Some(existing) = self.store.find(address).await? {
            return Ok(existing);
        }

        let Some(pending) = self.store.insert_pending(address, Utc::now()).await? else {
            // Lost the claim: another writer owns the provider call.
            // Their record is authoritative, whatever state it is in.
            return match self.store.find(address).await? {
                Some(existing) => Ok(existing),
                None => Err(RepositoryError::NotFound.into()),
            };
        };

        match self.geocoder.fetch_coordinates(address).await {
            Ok(Some(coordinates)) => {
                let resolved = self
                    .store
                    .save_coordinates(address, coordinates, Utc::now())
                    .await?;
                info!(
                    address,
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "address geocoded"
                );
                Ok(resolved)
            }
            Ok(None) => {
                info!(address, "provider has no match; recorded as settled");
                Ok(pending)
            }
            Err(e) => {
                warn!(address, error = %e, "provider lookup failed; address left pending");
                Err(e.into())
            }
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use secrecy::SecretString;

    use super::testing::InMemoryLocationStore;
    use super::*;
    use crate::config::GeocoderConfig;

    const MOSCOW_BODY: &str = r#"{
        "response": {
            "GeoObjectCollection": {
                "featureMember": [
                    {"GeoObject": {"Point": {"pos": "37.617698 55.755864"}}}
                ]
            }
        }
    }"#;

    /// Serve `body` with `status`, counting hits, on an ephemeral port.
    async fn spawn_provider(
        status: StatusCode,
        body: serde_json::Value,
        delay: Duration,
    ) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler_hits = hits.clone();
        let app = Router::new().route(
            "/",
            get(move || {
                let hits = handler_hits.clone();
                let body = body.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/"), hits)
    }

    fn cache_over(store: Arc<InMemoryLocationStore>, base_url: &str) -> GeocodeCache {
        let geocoder = GeocoderClient::new(&GeocoderConfig {
            base_url: base_url.to_owned(),
            api_key: SecretString::from("k-test"),
            timeout_secs: 2,
        })
        .unwrap();
        GeocodeCache::new(store, geocoder)
    }

    #[tokio::test]
    async fn test_resolves_and_persists() {
        let body: serde_json::Value = serde_json::from_str(MOSCOW_BODY).unwrap();
        let (url, hits) = spawn_provider(StatusCode::OK, body, Duration::ZERO).await;
        let store = Arc::new(InMemoryLocationStore::new());
        let cache = cache_over(store.clone(), &url);

        let location = cache.resolve("Moscow, Red Square 1").await.unwrap();
        let coords = location.coordinates().unwrap();
        assert!((coords.latitude - 55.755_864).abs() < f64::EPSILON);
        assert!((coords.longitude - 37.617_698).abs() < f64::EPSILON);

        let stored = store.get("Moscow, Red Square 1").await.unwrap();
        assert_eq!(stored.coordinates(), Some(coords));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeat_resolves_skip_provider() {
        let body: serde_json::Value = serde_json::from_str(MOSCOW_BODY).unwrap();
        let (url, hits) = spawn_provider(StatusCode::OK, body, Duration::ZERO).await;
        let store = Arc::new(InMemoryLocationStore::new());
        let cache = cache_over(store.clone(), &url);

        let first = cache.resolve("Moscow, Red Square 1").await.unwrap();
        let second = cache.resolve("Moscow, Red Square 1").await.unwrap();
        assert_eq!(first, second);

        // A fresh process (new memory layer, same table) must not ask again.
        let other_process = cache_over(store.clone(), &url);
        let third = other_process.resolve("Moscow, Red Square 1").await.unwrap();
        assert_eq!(first, third);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_match_is_settled_not_retried() {
        let body = serde_json::json!({
            "response": {"GeoObjectCollection": {"featureMember": []}}
        });
        let (url, hits) = spawn_provider(StatusCode::OK, body, Duration::ZERO).await;
        let store = Arc::new(InMemoryLocationStore::new());
        let cache = cache_over(store.clone(), &url);

        let location = cache.resolve("Atlantis, Main St 1").await.unwrap();
        assert_eq!(location.coordinates(), None);

        let other_process = cache_over(store.clone(), &url);
        let again = other_process.resolve("Atlantis, Main St 1").await.unwrap();
        assert_eq!(again.coordinates(), None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_coalesce() {
        let body: serde_json::Value = serde_json::from_str(MOSCOW_BODY).unwrap();
        let (url, hits) = spawn_provider(StatusCode::OK, body, Duration::from_millis(50)).await;
        let store = Arc::new(InMemoryLocationStore::new());
        let cache = cache_over(store, &url);

        let (a, b, c, d) = tokio::join!(
            cache.resolve("Moscow, Red Square 1"),
            cache.resolve("Moscow, Red Square 1"),
            cache.resolve("Moscow, Red Square 1"),
            cache.resolve("Moscow, Red Square 1"),
        );
        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a, c.unwrap());
        assert_eq!(a, d.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_poisons_address() {
        let (url, hits) = spawn_provider(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({"error": "boom"}),
            Duration::ZERO,
        )
        .await;
        let store = Arc::new(InMemoryLocationStore::new());
        let cache = cache_over(store.clone(), &url);

        let err = cache.resolve("Moscow, Tverskaya 7").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Provider(_)));

        // The claim stays behind with no coordinates...
        let claimed = store.get("Moscow, Tverskaya 7").await.unwrap();
        assert_eq!(claimed.coordinates(), None);

        // ...so the next resolve serves it without retrying the provider.
        let other_process = cache_over(store.clone(), &url);
        let location = other_process.resolve("Moscow, Tverskaya 7").await.unwrap();
        assert_eq!(location.coordinates(), None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lost_claim_uses_other_writers_record() {
        /// A store where every claim loses to a writer that resolved the
        /// address in the gap between the miss and the insert.
        struct LostClaimStore {
            inner: InMemoryLocationStore,
        }

        #[async_trait]
        impl LocationStore for LostClaimStore {
            async fn find(&self, address: &str) -> Result<Option<Location>, RepositoryError> {
                self.inner.find(address).await
            }

            async fn insert_pending(
                &self,
                address: &str,
                checked_at: DateTime<Utc>,
            ) -> Result<Option<Location>, RepositoryError> {
                let coordinates = Coordinates {
                    latitude: 55.755_864,
                    longitude: 37.617_698,
                };
                self.inner
                    .seed(Location::resolved(address, coordinates, checked_at))
                    .await;
                Ok(None)
            }

            async fn save_coordinates(
                &self,
                address: &str,
                coordinates: Coordinates,
                checked_at: DateTime<Utc>,
            ) -> Result<Location, RepositoryError> {
                self.inner
                    .save_coordinates(address, coordinates, checked_at)
                    .await
            }
        }

        // Provider that must never be called.
        let (url, hits) = spawn_provider(
            StatusCode::OK,
            serde_json::json!({"response": {"GeoObjectCollection": {"featureMember": []}}}),
            Duration::ZERO,
        )
        .await;
        let store = Arc::new(LostClaimStore {
            inner: InMemoryLocationStore::new(),
        });
        let geocoder = GeocoderClient::new(&GeocoderConfig {
            base_url: url,
            api_key: SecretString::from("k-test"),
            timeout_secs: 2,
        })
        .unwrap();
        let cache = GeocodeCache::new(store, geocoder);

        let location = cache.resolve("Moscow, Red Square 1").await.unwrap();
        assert!(location.coordinates().is_some());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
