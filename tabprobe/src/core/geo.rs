//! Geo-point values.

use serde::{Deserialize, Serialize};

use super::value::{format_number, Value};

/// The host's "no coordinate" marker.
///
/// Hosts write this out-of-range magnitude instead of a missing coordinate.
/// It never leaves [`GeoPoint::from_value`]; inside the library an absent
/// coordinate is `None`.
pub const GEO_NAN: f64 = f64::MAX;

/// A decoded geographic point. Each coordinate may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl GeoPoint {
    pub fn new(latitude: Option<f64>, longitude: Option<f64>, elevation: Option<f64>) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Returns true when the value has the shape of a host geo point: an
    /// object carrying `latitude`, `longitude` and `elevation` members.
    pub fn matches(value: &Value) -> bool {
        value.as_object().is_some_and(|obj| {
            ["latitude", "longitude", "elevation"]
                .iter()
                .all(|key| obj.contains_key(*key))
        })
    }

    /// Decodes a raw host value; `None` when the shape does not match.
    ///
    /// Null members, the [`GEO_NAN`] sentinel, NaN and non-numeric members
    /// all become absent coordinates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json::json;
    /// use tabprobe::core::geo::{GeoPoint, GEO_NAN};
    ///
    /// let raw = json!({"latitude": 51.5, "longitude": -0.12, "elevation": GEO_NAN});
    /// let point = GeoPoint::from_value(&raw).unwrap();
    /// assert_eq!(point.elevation, None);
    /// ```
    pub fn from_value(value: &Value) -> Option<Self> {
        if !Self::matches(value) {
            return None;
        }
        let coordinate = |key: &str| value.get(key).and_then(Value::as_f64).and_then(present);
        Some(Self {
            latitude: coordinate("latitude"),
            longitude: coordinate("longitude"),
            elevation: coordinate("elevation"),
        })
    }

    /// Returns true when every coordinate is absent.
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none() && self.elevation.is_none()
    }
}

fn present(coordinate: f64) -> Option<f64> {
    if coordinate.is_nan() || coordinate == GEO_NAN {
        None
    } else {
        Some(coordinate)
    }
}

/// Renders a point as `{lat; lon; elev}` using the default number format.
pub fn geo_to_string(point: &GeoPoint) -> String {
    geo_to_string_with(point, format_number)
}

/// Renders a point as `{lat; lon; elev}`, formatting each present coordinate
/// with `formatter`.
///
/// Absent coordinates are left out without disturbing the order of the rest;
/// a point with no coordinates renders as the empty string.
///
/// # Examples
///
/// ```rust
/// use tabprobe::core::geo::{geo_to_string_with, GeoPoint};
///
/// let point = GeoPoint::new(Some(1.23456), None, Some(10.0));
/// assert_eq!(geo_to_string_with(&point, |v| format!("{v:.2}")), "{1.23; 10.00}");
/// ```
pub fn geo_to_string_with<F>(point: &GeoPoint, formatter: F) -> String
where
    F: Fn(f64) -> String,
{
    if point.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = [point.latitude, point.longitude, point.elevation]
        .into_iter()
        .flatten()
        .map(formatter)
        .collect();
    format!("{{{}}}", parts.join("; "))
}
