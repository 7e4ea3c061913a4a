use crate::errors::{MapRenderError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn new(
        min_latitude: f64,
        min_longitude: f64,
        max_latitude: f64,
        max_longitude: f64,
    ) -> Result<Self> {
        for &latitude in &[min_latitude, max_latitude] {
            if !(LatLongUtils::LATITUDE_MIN..=LatLongUtils::LATITUDE_MAX).contains(&latitude) {
                return Err(MapRenderError::malformed(format!(
                    "invalid latitude: {}",
                    latitude
                )));
            }
        }
        for &longitude in &[min_longitude, max_longitude] {
            if !(LatLongUtils::LONGITUDE_MIN..=LatLongUtils::LONGITUDE_MAX).contains(&longitude) {
                return Err(MapRenderError::malformed(format!(
                    "invalid longitude: {}",
                    longitude
                )));
            }
        }
        if min_latitude > max_latitude || min_longitude > max_longitude {
            return Err(MapRenderError::malformed(
                "invalid bounding box coordinates",
            ));
        }
        Ok(Self {
            min_latitude,
            min_longitude,
            max_latitude,
            max_longitude,
        })
    }

    pub fn get_center_point(&self) -> LatLong {
        LatLong {
            latitude: (self.min_latitude + self.max_latitude) / 2.0,
            longitude: (self.min_longitude + self.max_longitude) / 2.0,
        }
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_latitude
            && latitude <= self.max_latitude
            && longitude >= self.min_longitude
            && longitude <= self.max_longitude
    }

    pub fn extend_meters(&self, meters: i32) -> BoundingBox {
        // Rough approximation: one degree is 111 km at the equator.
        let degree_delta = (meters as f64) / 111_000.0;
        BoundingBox {
            min_latitude: (self.min_latitude - degree_delta).max(LatLongUtils::LATITUDE_MIN),
            min_longitude: (self.min_longitude - degree_delta).max(LatLongUtils::LONGITUDE_MIN),
            max_latitude: (self.max_latitude + degree_delta).min(LatLongUtils::LATITUDE_MAX),
            max_longitude: (self.max_longitude + degree_delta).min(LatLongUtils::LONGITUDE_MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatLong {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLong {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Splits a `key=value` entry from one of the header tag tables.
    pub fn from_string(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        match tag.split_once('=') {
            Some((key, value)) => Self::new(key, value),
            None => Self::new(tag, ""),
        }
    }
}

pub struct LatLongUtils;

impl LatLongUtils {
    pub const LATITUDE_MAX: f64 = 90.0;
    pub const LATITUDE_MIN: f64 = -90.0;
    pub const LONGITUDE_MAX: f64 = 180.0;
    pub const LONGITUDE_MIN: f64 = -180.0;
    const CONVERSION_FACTOR: f64 = 1_000_000.0;

    pub fn microdegrees_to_degrees(microdegrees: i32) -> f64 {
        microdegrees as f64 / Self::CONVERSION_FACTOR
    }

    pub fn degrees_to_microdegrees(degrees: f64) -> i32 {
        (degrees * Self::CONVERSION_FACTOR).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_rejects_out_of_range() {
        assert!(BoundingBox::new(-91.0, 0.0, 0.0, 0.0).is_err());
        assert!(BoundingBox::new(0.0, 0.0, 0.0, 181.0).is_err());
        assert!(BoundingBox::new(1.0, 0.0, 0.0, 0.0).is_err());
        assert!(BoundingBox::new(-1.0, -1.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn tag_table_entries_split_on_first_equals() {
        let tag = Tag::from_string("addr:housenumber=42");
        assert_eq!(tag.key, "addr:housenumber");
        assert_eq!(tag.value, "42");
    }
}
