//! Mappings between geographic coordinates and world space.
//!
//! Every projection is a pure, total function set: no operation fails and no
//! state is shared between calls, so one projection instance can be used from
//! any number of decode threads at once.

mod identity;
mod mercator;
mod sphere;

pub use identity::IdentityProjection;
pub use mercator::MercatorProjection;
pub use sphere::SphereProjection;

use std::sync::Arc;

use super::{EQUATORIAL_RADIUS, Ray, Vec3};
use crate::bounds::{Aabb3, OrientedBox3};
use crate::geo::{GeoBox, GeoCoordinates};

/// Lower bound for oriented-box half-extents so flat boxes stay usable in
/// intersection tests.
pub const MIN_BOX_EXTENT: f64 = f64::EPSILON;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    /// Flat map, world units are radians (altitude in meters).
    Identity,
    /// Flat web-mercator square, world units are meters at the equator.
    Mercator,
    /// Globe, earth-centered cartesian meters.
    Sphere,
}

impl ProjectionKind {
    pub fn is_spherical(self) -> bool {
        matches!(self, ProjectionKind::Sphere)
    }

    pub fn create(self) -> Arc<dyn Projection> {
        match self {
            ProjectionKind::Identity => Arc::new(IdentityProjection),
            ProjectionKind::Mercator => Arc::new(MercatorProjection),
            ProjectionKind::Sphere => Arc::new(SphereProjection),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectionKind::Identity => "identity",
            ProjectionKind::Mercator => "mercator",
            ProjectionKind::Sphere => "sphere",
        }
    }
}

impl std::str::FromStr for ProjectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" | "planar" => Ok(ProjectionKind::Identity),
            "mercator" => Ok(ProjectionKind::Mercator),
            "sphere" | "globe" => Ok(ProjectionKind::Sphere),
            other => Err(format!("unknown projection: {other}")),
        }
    }
}

/// Local surface frame at a geographic position.
///
/// `east` and `north` are world-space displacements per meter travelled along
/// the surface; `up` is the unit surface normal (altitude is meters in every
/// projection).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TangentFrame {
    pub origin: Vec3,
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

impl TangentFrame {
    /// Maps a local east/north/up offset (meters) to a world-space offset.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.east * local.x + self.north * local.y + self.up * local.z
    }
}

pub trait Projection: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> ProjectionKind;

    /// Bounds of the whole projected world between the two altitudes.
    fn world_extent(&self, min_altitude: f64, max_altitude: f64) -> Aabb3;

    fn project_point(&self, geo: &GeoCoordinates) -> Vec3;

    fn unproject_point(&self, world: Vec3) -> GeoCoordinates;

    /// Altitude of `world` above the reference surface (meters).
    fn unproject_altitude(&self, world: Vec3) -> f64;

    /// Axis-aligned world bounds of `geo_box`.
    fn project_box(&self, geo_box: &GeoBox) -> Aabb3;

    /// Oriented world bounds of `geo_box`. The z half-extent is never 0.
    fn project_oriented_box(&self, geo_box: &GeoBox) -> OrientedBox3;

    /// Height of `world` above the ground surface.
    fn ground_distance(&self, world: Vec3) -> f64;

    /// Moves `world` onto the ground surface in place and returns it.
    fn scale_point_to_surface(&self, world: &mut Vec3) -> Vec3;

    fn surface_normal(&self, world: Vec3) -> Vec3;

    /// Position dependent scale distortion of the projection.
    fn scale_factor(&self, world: Vec3) -> f64;

    /// First intersection of `ray` with the ground surface.
    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3>;

    /// Converts `world`, expressed in `source`'s world space, into this one.
    fn reproject_point(&self, source: &dyn Projection, world: Vec3) -> Vec3 {
        if source.kind() == self.kind() {
            return world;
        }
        self.project_point(&source.unproject_point(world))
    }

    /// Local frame at `geo` (altitude ignored), derived from the projection
    /// itself by finite differences.
    fn tangent_frame(&self, geo: &GeoCoordinates) -> TangentFrame {
        const STEP_DEG: f64 = 1e-6;

        let base = GeoCoordinates::new(geo.latitude, geo.longitude);
        let origin = self.project_point(&base);

        let east_p = self.project_point(&GeoCoordinates::new(base.latitude, base.longitude + STEP_DEG));
        // Step away from the pole so the difference stays on the map.
        let (north_lat, north_sign) = if base.latitude + STEP_DEG <= 90.0 {
            (base.latitude + STEP_DEG, 1.0)
        } else {
            (base.latitude - STEP_DEG, -1.0)
        };
        let north_p = self.project_point(&GeoCoordinates::new(north_lat, base.longitude));

        let step_m = STEP_DEG.to_radians() * EQUATORIAL_RADIUS;
        let cos_lat = base.latitude_rad().cos().max(1e-9);

        TangentFrame {
            origin,
            east: (east_p - origin) * (1.0 / (step_m * cos_lat)),
            north: (north_p - origin) * (north_sign / step_m),
            up: self.surface_normal(origin),
        }
    }
}
