//! Geocoding and distance subsystem.
//!
//! Three layers, outermost first:
//!
//! - [`cache::GeocodeCache`] - the only entry point the rest of the server
//!   uses; resolves an address to a [`models::Location`](crate::models::Location)
//!   while guaranteeing the provider is asked at most once per address
//! - [`geocoder::GeocoderClient`] - thin HTTP client for the provider
//! - [`distance`] - pure great-circle math over [`Coordinates`]

pub mod cache;
pub mod distance;
pub mod geocoder;

use serde::{Deserialize, Serialize};

pub use cache::{GeocodeCache, GeocodeError, LocationStore};
pub use distance::Distance;
pub use geocoder::{GeocoderClient, GeocoderError};

/// A point on the globe.
///
/// Field names keep latitude and longitude from swapping on the way from
/// the provider (which speaks "lon lat") to the distance math (which wants
/// latitude first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}
