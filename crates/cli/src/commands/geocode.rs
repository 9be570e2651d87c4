//! Geocode cache management commands.
//!
//! # Usage
//!
//! ```bash
//! # Print every cached record
//! foodcart-cli geocode list
//!
//! # Resolve one address through the cache (asks the provider on a miss)
//! foodcart-cli geocode resolve "Moscow, Tverskaya St 7"
//!
//! # Delete a record, e.g. to retry an address stuck without coordinates
//! foodcart-cli geocode forget "Moscow, Tverskaya St 7"
//! ```
//!
//! # Environment Variables
//!
//! - `FOODCART_DATABASE_URL` - `PostgreSQL` connection string
//!   (`DATABASE_URL` is honoured as a fallback)
//! - `GEOCODER_API_KEY` - provider API key (only for `resolve`)
//! - `GEOCODER_BASE_URL`, `GEOCODER_TIMEOUT_SECS` - optional provider tuning

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use foodcart_server::config::{DEFAULT_GEOCODER_BASE_URL, GeocoderConfig};
use foodcart_server::db::{PgLocationStore, RepositoryError};
use foodcart_server::geo::{GeocodeCache, GeocodeError, GeocoderClient, GeocoderError};

/// Errors that can occur in geocode cache commands.
#[derive(Debug, Error)]
pub enum GeocodeCommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Environment variable could not be parsed.
    #[error("Invalid environment variable {0}")]
    InvalidEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Location store error.
    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    /// Geocoder client could not be built.
    #[error("Geocoder error: {0}")]
    Geocoder(#[from] GeocoderError),

    /// Resolution through the cache failed.
    #[error("Resolution failed: {0}")]
    Resolve(#[from] GeocodeError),
}

/// Print every cached geocode record.
///
/// # Errors
///
/// Returns `GeocodeCommandError` if the database cannot be reached.
pub async fn list() -> Result<(), GeocodeCommandError> {
    let store = connect_store().await?;
    let records = store.list().await?;

    #[allow(clippy::print_stdout)]
    {
        if records.is_empty() {
            println!("No cached geocode records.");
        }
        for record in records {
            match record.coordinates() {
                Some(coords) => println!(
                    "{}\n    latitude {:.6}, longitude {:.6}, checked {}",
                    record.address, coords.latitude, coords.longitude, record.last_checked
                ),
                None => println!(
                    "{}\n    no coordinates, checked {}",
                    record.address, record.last_checked
                ),
            }
        }
    }
    Ok(())
}

/// Resolve one address through the cache, populating it on a miss.
///
/// # Errors
///
/// Returns `GeocodeCommandError` if configuration is incomplete, the
/// database cannot be reached, or the provider fails hard.
pub async fn resolve(address: &str) -> Result<(), GeocodeCommandError> {
    let store = connect_store().await?;
    let geocoder = GeocoderClient::new(&geocoder_config()?)?;
    let cache = GeocodeCache::new(Arc::new(store), geocoder);

    info!(address, "Resolving through the cache");
    let location = cache.resolve(address).await?;

    #[allow(clippy::print_stdout)]
    {
        match location.coordinates() {
            Some(coords) => println!(
                "{}: latitude {:.6}, longitude {:.6}",
                location.address, coords.latitude, coords.longitude
            ),
            None => println!(
                "{}: the provider has no coordinates for this address",
                location.address
            ),
        }
    }
    Ok(())
}

/// Delete a cached record.
///
/// After this the next resolution of the address goes back to the
/// provider, which is the way out for an address left without coordinates
/// by a provider outage.
///
/// # Errors
///
/// Returns `GeocodeCommandError` if the database cannot be reached.
pub async fn forget(address: &str) -> Result<(), GeocodeCommandError> {
    let store = connect_store().await?;
    let deleted = store.delete(address).await?;

    #[allow(clippy::print_stdout)]
    {
        if deleted {
            println!("Forgot {address}");
        } else {
            println!("No cached record for {address}");
        }
    }
    Ok(())
}

async fn connect_store() -> Result<PgLocationStore, GeocodeCommandError> {
    dotenvy::dotenv().ok();

    let database_url =
        super::database_url().ok_or(GeocodeCommandError::MissingEnvVar("FOODCART_DATABASE_URL"))?;

    let pool = PgPool::connect(&database_url).await?;
    Ok(PgLocationStore::new(pool))
}

fn geocoder_config() -> Result<GeocoderConfig, GeocodeCommandError> {
    let api_key = std::env::var("GEOCODER_API_KEY")
        .map(SecretString::from)
        .map_err(|_| GeocodeCommandError::MissingEnvVar("GEOCODER_API_KEY"))?;
    let base_url = std::env::var("GEOCODER_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_GEOCODER_BASE_URL.to_owned());
    let timeout_secs = match std::env::var("GEOCODER_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|_| GeocodeCommandError::InvalidEnvVar("GEOCODER_TIMEOUT_SECS"))?,
        Err(_) => 5,
    };

    Ok(GeocoderConfig {
        base_url,
        api_key,
        timeout_secs,
    })
}
