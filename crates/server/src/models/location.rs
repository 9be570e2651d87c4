//! Cached geocoding result for one address.

use chrono::{DateTime, Utc};

use crate::geo::Coordinates;

/// One row of the persistent geocode cache.
///
/// The address string itself is the key. A location with `None` coordinates
/// is still a valid, settled record: it means the provider was asked and
/// had no answer for this address, and it will not be asked again.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Address exactly as customers and restaurants spell it.
    pub address: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// When the provider was last consulted for this address.
    pub last_checked: DateTime<Utc>,
}

impl Location {
    /// A record for an address whose coordinates are not (yet) known.
    #[must_use]
    pub fn pending(address: impl Into<String>, last_checked: DateTime<Utc>) -> Self {
        Self {
            address: address.into(),
            longitude: None,
            latitude: None,
            last_checked,
        }
    }

    /// A record with coordinates from the provider.
    #[must_use]
    pub fn resolved(
        address: impl Into<String>,
        coordinates: Coordinates,
        last_checked: DateTime<Utc>,
    ) -> Self {
        Self {
            address: address.into(),
            longitude: Some(coordinates.longitude),
            latitude: Some(coordinates.latitude),
            last_checked,
        }
    }

    /// Coordinates of this address, if the provider knew them.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_require_both_components() {
        let mut location = Location::pending("Moscow, Arbat 1", Utc::now());
        assert_eq!(location.coordinates(), None);

        location.latitude = Some(55.75);
        assert_eq!(location.coordinates(), None);

        location.longitude = Some(37.61);
        let coords = location.coordinates().expect("both components set");
        assert!((coords.latitude - 55.75).abs() < f64::EPSILON);
        assert!((coords.longitude - 37.61).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolved_roundtrip() {
        let coords = Coordinates {
            latitude: 55.75,
            longitude: 37.61,
        };
        let location = Location::resolved("Moscow, Arbat 1", coords, Utc::now());
        assert_eq!(location.coordinates(), Some(coords));
    }
}
