//! Geo values used by spatial predicates and function arguments.

use crate::conversion::format_f64;
use serde::{Deserialize, Serialize};
use std::fmt;

const KILOMETERS_PER_MILE: f64 = 1.609344;

/// A point given as `x,y` (latitude, longitude for `LatLonType` fields).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", format_f64(self.x), format_f64(self.y))
    }
}

/// Unit of a [`Distance`]. Solr expects kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Kilometers,
    Miles,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub value: f64,
    #[serde(default)]
    pub metric: Metric,
}

impl Distance {
    pub const fn new(value: f64, metric: Metric) -> Self {
        Self { value, metric }
    }

    pub const fn kilometers(value: f64) -> Self {
        Self::new(value, Metric::Kilometers)
    }

    pub const fn miles(value: f64) -> Self {
        Self::new(value, Metric::Miles)
    }

    /// Magnitude in kilometers.
    pub fn normalized_value(&self) -> f64 {
        match self.metric {
            Metric::Miles => self.value * KILOMETERS_PER_MILE,
            Metric::Kilometers | Metric::Neutral => self.value,
        }
    }
}

/// Renders the normalized magnitude only, never a unit suffix.
impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_f64(self.normalized_value()))
    }
}

/// Bounding box spanned by two corner points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub first: Point,
    pub second: Point,
}

impl GeoBox {
    pub const fn new(first: Point, second: Point) -> Self {
        Self { first, second }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_fixed_notation() {
        assert_eq!(
            Point::new(37.767624, -122.48526).to_string(),
            "37.767624,-122.48526"
        );
        assert_eq!(Point::new(45.0, -93.0).to_string(), "45.0,-93.0");
    }

    #[test]
    fn test_distance_magnitude_only() {
        assert_eq!(Distance::kilometers(5.0).to_string(), "5.0");
        assert_eq!(Distance::new(2.5, Metric::Neutral).to_string(), "2.5");
    }

    #[test]
    fn test_miles_normalized_to_kilometers() {
        let d = Distance::miles(5.0);
        assert!((d.normalized_value() - 8.04672).abs() < 1e-9);
    }
}
