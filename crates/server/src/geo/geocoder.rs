//! HTTP client for the geocoding provider.
//!
//! Speaks the Yandex geocoder wire format: a GET with `geocode`, `apikey`
//! and `format=json` query parameters, answered by a deeply nested JSON
//! document whose useful part is a single `pos` string of the form
//! `"longitude latitude"` (longitude first).

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use super::Coordinates;
use crate::config::GeocoderConfig;

/// Errors that can occur when talking to the geocoding provider.
#[derive(Debug, Error)]
pub enum GeocoderError {
    /// HTTP request failed (network, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Provider answered 200 with a body we cannot make sense of.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured endpoint is not a valid URL.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Geocoding provider client.
#[derive(Clone)]
pub struct GeocoderClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: secrecy::SecretString,
}

impl GeocoderClient {
    /// Create a new provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// fails to build.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocoderError> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Ask the provider for the coordinates of an address.
    ///
    /// Returns `Ok(None)` when the provider answers successfully but has no
    /// match for the address; that outcome is final and cacheable. Transport
    /// failures, non-success statuses and malformed bodies are errors.
    ///
    /// # Errors
    ///
    /// Returns [`GeocoderError`] if the request fails or the response
    /// cannot be parsed.
    #[instrument(skip(self))]
    pub async fn fetch_coordinates(
        &self,
        address: &str,
    ) -> Result<Option<Coordinates>, GeocoderError> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("geocode", address),
                ("apikey", self.api_key.expose_secret()),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeocoderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocoderError::Parse(e.to_string()))?;

        let Some(member) = payload.response.collection.members.into_iter().next() else {
            debug!(address, "provider has no match for address");
            return Ok(None);
        };

        parse_position(&member.geo_object.point.pos).map(Some)
    }
}

/// Parse a provider `pos` string (`"longitude latitude"`).
fn parse_position(pos: &str) -> Result<Coordinates, GeocoderError> {
    let mut parts = pos.split_whitespace();
    let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GeocoderError::Parse(format!(
            "expected \"lon lat\" position, got {pos:?}"
        )));
    };

    let longitude = lon
        .parse::<f64>()
        .map_err(|e| GeocoderError::Parse(format!("bad longitude {lon:?}: {e}")))?;
    let latitude = lat
        .parse::<f64>()
        .map_err(|e| GeocoderError::Parse(format!("bad latitude {lat:?}: {e}")))?;

    Ok(Coordinates {
        latitude,
        longitude,
    })
}

// Provider response shape. Only the path down to `pos` is decoded.

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    response: ProviderPayload,
}

#[derive(Debug, Deserialize)]
struct ProviderPayload {
    #[serde(rename = "GeoObjectCollection")]
    collection: GeoObjectCollection,
}

#[derive(Debug, Deserialize)]
struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    members: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    #[serde(rename = "Point")]
    point: Point,
}

#[derive(Debug, Deserialize)]
struct Point {
    pos: String,
}
