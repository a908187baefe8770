use super::{MIN_BOX_EXTENT, Projection, ProjectionKind};
use crate::bounds::{Aabb3, OrientedBox3};
use crate::geo::{GeoBox, GeoCoordinates};
use crate::math::{EQUATORIAL_RADIUS, Ray, Vec3};

/// Globe projection onto a sphere of the equatorial radius.
///
/// Earth-centered axes: +x through (0°, 0°), +y through (0°, 90°E), +z
/// through the north pole. Units are meters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SphereProjection;

impl SphereProjection {
    /// Latitude and longitude samples at which the cartesian coordinates of
    /// points inside `geo_box` reach their extremes.
    fn extreme_samples(geo_box: &GeoBox) -> (Vec<f64>, Vec<f64>) {
        let mut lats = vec![geo_box.south, geo_box.north];
        if geo_box.south < 0.0 && geo_box.north > 0.0 {
            lats.push(0.0);
        }

        let west = geo_box.west;
        let east = west + geo_box.longitude_span();
        let mut lons = vec![west, east];
        // Quarter meridians are where cos/sin of longitude peak.
        for k in -2..=4 {
            let lon = f64::from(k) * 90.0;
            if lon > west && lon < east {
                lons.push(lon);
            }
        }
        (lats, lons)
    }
}

impl Projection for SphereProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Sphere
    }

    fn world_extent(&self, _min_altitude: f64, max_altitude: f64) -> Aabb3 {
        let r = EQUATORIAL_RADIUS + max_altitude;
        Aabb3::new(Vec3::new(-r, -r, -r), Vec3::new(r, r, r))
    }

    fn project_point(&self, geo: &GeoCoordinates) -> Vec3 {
        let r = EQUATORIAL_RADIUS + geo.altitude_or_zero();
        let (sin_lat, cos_lat) = geo.latitude_rad().sin_cos();
        let (sin_lon, cos_lon) = geo.longitude_rad().sin_cos();
        Vec3::new(r * cos_lat * cos_lon, r * cos_lat * sin_lon, r * sin_lat)
    }

    fn unproject_point(&self, world: Vec3) -> GeoCoordinates {
        let p = world.x.hypot(world.y);
        GeoCoordinates::with_altitude(
            world.z.atan2(p).to_degrees(),
            world.y.atan2(world.x).to_degrees(),
            world.length() - EQUATORIAL_RADIUS,
        )
    }

    fn unproject_altitude(&self, world: Vec3) -> f64 {
        world.length() - EQUATORIAL_RADIUS
    }

    /// Exact bounds: each cartesian axis factors into per-coordinate terms, so
    /// the extremes lie on the product of per-coordinate extreme samples.
    fn project_box(&self, geo_box: &GeoBox) -> Aabb3 {
        let (lats, lons) = Self::extreme_samples(geo_box);
        let mut b = Aabb3::empty();
        for alt in [geo_box.min_altitude, geo_box.max_altitude] {
            for &lat in &lats {
                for &lon in &lons {
                    b.extend(self.project_point(&GeoCoordinates::with_altitude(lat, lon, alt)));
                }
            }
        }
        b
    }

    /// Box in the local east/north/up frame at the box center, fitted to a
    /// sample grid over the box surface.
    fn project_oriented_box(&self, geo_box: &GeoBox) -> OrientedBox3 {
        const GRID: usize = 8;

        let center = geo_box.center();
        let (sin_lat, cos_lat) = center.latitude_rad().sin_cos();
        let (sin_lon, cos_lon) = center.longitude_rad().sin_cos();
        let up = Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);
        let east = Vec3::new(-sin_lon, cos_lon, 0.0);
        let north = up.cross(east);
        let axes = [east, north, up];

        let (mut lats, mut lons) = Self::extreme_samples(geo_box);
        let lon_span = geo_box.longitude_span();
        for i in 0..=GRID {
            let f = i as f64 / GRID as f64;
            lats.push(geo_box.south + geo_box.latitude_span() * f);
            lons.push(geo_box.west + lon_span * f);
        }

        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        for alt in [geo_box.min_altitude, geo_box.max_altitude] {
            for &lat in &lats {
                for &lon in &lons {
                    let p = self.project_point(&GeoCoordinates::with_altitude(lat, lon, alt));
                    for (i, axis) in axes.iter().enumerate() {
                        let d = p.dot(*axis);
                        lo[i] = lo[i].min(d);
                        hi[i] = hi[i].max(d);
                    }
                }
            }
        }

        let mid = |i: usize| (lo[i] + hi[i]) * 0.5;
        let half = |i: usize| ((hi[i] - lo[i]) * 0.5).max(MIN_BOX_EXTENT);
        OrientedBox3 {
            position: east * mid(0) + north * mid(1) + up * mid(2),
            x_axis: east,
            y_axis: north,
            z_axis: up,
            extents: Vec3::new(half(0), half(1), half(2)),
        }
    }

    fn ground_distance(&self, world: Vec3) -> f64 {
        world.length() - EQUATORIAL_RADIUS
    }

    fn scale_point_to_surface(&self, world: &mut Vec3) -> Vec3 {
        if let Some(n) = world.try_normalize() {
            *world = n * EQUATORIAL_RADIUS;
        }
        *world
    }

    fn surface_normal(&self, world: Vec3) -> Vec3 {
        world.normalize()
    }

    fn scale_factor(&self, _world: Vec3) -> f64 {
        1.0
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        ray.intersect_sphere(EQUATORIAL_RADIUS).map(|t| ray.at(t))
    }
}
