//! Great-circle distance between two points.

use std::cmp::Ordering;

use serde::{Serialize, Serializer};

use super::Coordinates;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// What the staff panel shows when a distance cannot be computed.
pub const UNDETERMINED_LABEL: &str = "coordinates could not be determined";

/// Distance between a restaurant and a delivery address.
///
/// `Undetermined` is a first-class outcome, not an error: it means at least
/// one of the two addresses has no known coordinates. Callers that sort by
/// distance get `Undetermined` entries last; callers that print get the
/// [`UNDETERMINED_LABEL`] marker instead of a number.
#[derive(Debug, Clone, Copy)]
pub enum Distance {
    /// Distance in kilometers, rounded to two decimal places.
    Known(f64),
    /// At least one endpoint has no coordinates.
    Undetermined,
}

impl Distance {
    /// Distance between two optional points.
    ///
    /// Symmetric: `between(a, b)` equals `between(b, a)`. Returns
    /// `Undetermined` unless both points are known.
    #[must_use]
    pub fn between(a: Option<Coordinates>, b: Option<Coordinates>) -> Self {
        match (a, b) {
            (Some(from), Some(to)) => Self::Known(round_to_hundredths(haversine_km(from, to))),
            _ => Self::Undetermined,
        }
    }

    /// The distance in kilometers, if known.
    #[must_use]
    pub const fn known_km(self) -> Option<f64> {
        match self {
            Self::Known(km) => Some(km),
            Self::Undetermined => None,
        }
    }
}

/// Haversine great-circle distance in kilometers.
fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let half_dlat = (to.latitude - from.latitude).to_radians() / 2.0;
    let half_dlon = (to.longitude - from.longitude).to_radians() / 2.0;

    let a = half_dlat.sin().powi(2) + lat_from.cos() * lat_to.cos() * half_dlon.sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
}

fn round_to_hundredths(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Distance {}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Known(a), Self::Known(b)) => a.total_cmp(b),
            (Self::Known(_), Self::Undetermined) => Ordering::Less,
            (Self::Undetermined, Self::Known(_)) => Ordering::Greater,
            (Self::Undetermined, Self::Undetermined) => Ordering::Equal,
        }
    }
}

impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(km) => serializer.serialize_f64(*km),
            Self::Undetermined => serializer.serialize_str(UNDETERMINED_LABEL),
        }
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(km) => write!(f, "{km:.2} km"),
            Self::Undetermined => write!(f, "{UNDETERMINED_LABEL}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TVERSKAYA: Coordinates = Coordinates {
        latitude: 55.75,
        longitude: 37.61,
    };
    const PETROVKA: Coordinates = Coordinates {
        latitude: 55.76,
        longitude: 37.62,
    };

    #[test]
    fn test_known_distance_rounded_to_hundredths() {
        let distance = Distance::between(Some(TVERSKAYA), Some(PETROVKA));
        assert_eq!(distance.known_km(), Some(1.28));
    }

    #[test]
    fn test_distance_is_symmetric() {
        assert_eq!(
            Distance::between(Some(TVERSKAYA), Some(PETROVKA)),
            Distance::between(Some(PETROVKA), Some(TVERSKAYA))
        );
    }

    #[test]
    fn test_same_point_is_zero() {
        let distance = Distance::between(Some(TVERSKAYA), Some(TVERSKAYA));
        assert_eq!(distance.known_km(), Some(0.0));
    }

    #[test]
    fn test_missing_point_is_undetermined() {
        assert_eq!(
            Distance::between(None, Some(PETROVKA)),
            Distance::Undetermined
        );
        assert_eq!(
            Distance::between(Some(TVERSKAYA), None),
            Distance::Undetermined
        );
        assert_eq!(Distance::between(None, None), Distance::Undetermined);
    }

    #[test]
    fn test_undetermined_sorts_last() {
        let mut distances = vec![
            Distance::Undetermined,
            Distance::Known(5.2),
            Distance::Known(1.1),
            Distance::Known(3.0),
        ];
        distances.sort();
        assert_eq!(
            distances,
            vec![
                Distance::Known(1.1),
                Distance::Known(3.0),
                Distance::Known(5.2),
                Distance::Undetermined,
            ]
        );
    }

    #[test]
    fn test_serializes_as_number_or_label() {
        let known = serde_json::to_value(Distance::Known(1.28)).unwrap();
        assert_eq!(known, serde_json::json!(1.28));

        let undetermined = serde_json::to_value(Distance::Undetermined).unwrap();
        assert_eq!(undetermined, serde_json::json!(UNDETERMINED_LABEL));
    }

    #[test]
    fn test_display() {
        assert_eq!(Distance::Known(1.28).to_string(), "1.28 km");
        assert_eq!(Distance::Undetermined.to_string(), UNDETERMINED_LABEL);
    }
}
