//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::PgLocationStore;
use crate::geo::{GeocodeCache, GeocoderClient, GeocoderError};
use crate::services::OrderRankingService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    geocode: GeocodeCache,
    ranking: OrderRankingService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the geocoder client configuration is invalid.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, GeocoderError> {
        let geocoder = GeocoderClient::new(&config.geocoder)?;
        let store = Arc::new(PgLocationStore::new(pool.clone()));
        let geocode = GeocodeCache::new(store, geocoder);
        let ranking = OrderRankingService::new(geocode.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                geocode,
                ranking,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the geocode cache.
    #[must_use]
    pub fn geocode(&self) -> &GeocodeCache {
        &self.inner.geocode
    }

    /// Get a reference to the order ranking service.
    #[must_use]
    pub fn ranking(&self) -> &OrderRankingService {
        &self.inner.ranking
    }
}
