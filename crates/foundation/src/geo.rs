use serde::{Deserialize, Serialize};

/// Geographic position in degrees, with an optional altitude in meters.
///
/// Callers normalize longitude to [-180, 180] and latitude to [-90, 90]
/// before construction; no normalization happens here.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

impl GeoCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }

    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: Some(altitude),
        }
    }

    /// Altitude in meters, 0 when absent.
    #[inline]
    pub fn altitude_or_zero(&self) -> f64 {
        self.altitude.unwrap_or(0.0)
    }

    pub fn latitude_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn longitude_rad(&self) -> f64 {
        self.longitude.to_radians()
    }

    /// Wraps longitude into [-180, 180) and clamps latitude into [-90, 90].
    pub fn normalized(self) -> Self {
        let longitude = (self.longitude + 180.0).rem_euclid(360.0) - 180.0;
        Self {
            latitude: self.latitude.clamp(-90.0, 90.0),
            longitude,
            altitude: self.altitude,
        }
    }
}

/// Geographic bounding box, with an altitude range.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
    #[serde(default)]
    pub min_altitude: f64,
    #[serde(default)]
    pub max_altitude: f64,
}

impl GeoBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        debug_assert!(south <= north, "GeoBox south {south} > north {north}");
        Self {
            south,
            west,
            north,
            east,
            min_altitude: 0.0,
            max_altitude: 0.0,
        }
    }

    /// Box spanning two corners; altitudes come from the corners when set.
    pub fn from_coordinates(south_west: GeoCoordinates, north_east: GeoCoordinates) -> Self {
        let mut b = Self::new(
            south_west.latitude,
            south_west.longitude,
            north_east.latitude,
            north_east.longitude,
        );
        b.min_altitude = south_west.altitude_or_zero();
        b.max_altitude = north_east.altitude_or_zero();
        b
    }

    pub fn with_altitude_range(mut self, min_altitude: f64, max_altitude: f64) -> Self {
        self.min_altitude = min_altitude;
        self.max_altitude = max_altitude;
        self
    }

    /// South-west corner at the minimum altitude.
    pub fn south_west(&self) -> GeoCoordinates {
        GeoCoordinates::with_altitude(self.south, self.west, self.min_altitude)
    }

    /// North-east corner at the maximum altitude.
    pub fn north_east(&self) -> GeoCoordinates {
        GeoCoordinates::with_altitude(self.north, self.east, self.max_altitude)
    }

    pub fn latitude_span(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude span; boxes crossing the antimeridian have `east < west`.
    pub fn longitude_span(&self) -> f64 {
        let span = self.east - self.west;
        if span < 0.0 { span + 360.0 } else { span }
    }

    pub fn center(&self) -> GeoCoordinates {
        let mut lon = self.west + self.longitude_span() * 0.5;
        if lon > 180.0 {
            lon -= 360.0;
        }
        GeoCoordinates::with_altitude(
            (self.south + self.north) * 0.5,
            lon,
            (self.min_altitude + self.max_altitude) * 0.5,
        )
    }

    pub fn contains(&self, geo: &GeoCoordinates) -> bool {
        if geo.latitude < self.south || geo.latitude > self.north {
            return false;
        }
        if self.east >= self.west {
            geo.longitude >= self.west && geo.longitude <= self.east
        } else {
            geo.longitude >= self.west || geo.longitude <= self.east
        }
    }
}
