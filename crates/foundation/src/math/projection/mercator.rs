use std::f64::consts::PI;

use super::{MIN_BOX_EXTENT, Projection, ProjectionKind};
use crate::bounds::{Aabb3, OrientedBox3};
use crate::geo::{GeoBox, GeoCoordinates};
use crate::math::{
    EQUATORIAL_CIRCUMFERENCE, Ray, Vec3, latitude_to_row_fraction, longitude_to_column_fraction,
    row_fraction_to_latitude,
};

/// Web-mercator square scaled to the equatorial circumference.
///
/// `x` grows east from the antimeridian, `y` grows south from the northern
/// cut-off latitude (tile-row direction), `z` is the altitude in meters. This
/// is the world space tile geometry is decoded into.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MercatorProjection;

impl Projection for MercatorProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Mercator
    }

    fn world_extent(&self, min_altitude: f64, max_altitude: f64) -> Aabb3 {
        Aabb3::new(
            Vec3::new(0.0, 0.0, min_altitude),
            Vec3::new(EQUATORIAL_CIRCUMFERENCE, EQUATORIAL_CIRCUMFERENCE, max_altitude),
        )
    }

    fn project_point(&self, geo: &GeoCoordinates) -> Vec3 {
        Vec3::new(
            longitude_to_column_fraction(geo.longitude) * EQUATORIAL_CIRCUMFERENCE,
            latitude_to_row_fraction(geo.latitude) * EQUATORIAL_CIRCUMFERENCE,
            geo.altitude_or_zero(),
        )
    }

    fn unproject_point(&self, world: Vec3) -> GeoCoordinates {
        GeoCoordinates::with_altitude(
            row_fraction_to_latitude(world.y / EQUATORIAL_CIRCUMFERENCE),
            world.x / EQUATORIAL_CIRCUMFERENCE * 360.0 - 180.0,
            world.z,
        )
    }

    fn unproject_altitude(&self, world: Vec3) -> f64 {
        world.z
    }

    fn project_box(&self, geo_box: &GeoBox) -> Aabb3 {
        let a = self.project_point(&geo_box.south_west());
        let b = self.project_point(&geo_box.north_east());
        // North maps to the smaller y.
        Aabb3::new(
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, a.y, b.z),
        )
    }

    fn project_oriented_box(&self, geo_box: &GeoBox) -> OrientedBox3 {
        let b = self.project_box(geo_box);
        let half = b.half_extents();
        OrientedBox3::axis_aligned(
            b.center(),
            Vec3::new(half.x, half.y, half.z.max(MIN_BOX_EXTENT)),
        )
    }

    fn ground_distance(&self, world: Vec3) -> f64 {
        world.z
    }

    fn scale_point_to_surface(&self, world: &mut Vec3) -> Vec3 {
        world.z = 0.0;
        *world
    }

    fn surface_normal(&self, _world: Vec3) -> Vec3 {
        Vec3::UNIT_Z
    }

    /// `1 / cos(latitude)`, computed from the world row without trigonometry
    /// on the latitude itself.
    fn scale_factor(&self, world: Vec3) -> f64 {
        (PI * (1.0 - 2.0 * world.y / EQUATORIAL_CIRCUMFERENCE)).cosh()
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        ray.intersect_plane_z(0.0).map(|t| {
            let mut hit = ray.at(t);
            hit.z = 0.0;
            hit
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MercatorProjection;
    use crate::geo::{GeoBox, GeoCoordinates};
    use crate::math::{EQUATORIAL_CIRCUMFERENCE, MIN_BOX_EXTENT, Projection, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_maps_to_square_center() {
        let p = MercatorProjection.project_point(&GeoCoordinates::new(0.0, 0.0));
        assert_close(p.x, EQUATORIAL_CIRCUMFERENCE / 2.0, 1e-6);
        assert_close(p.y, EQUATORIAL_CIRCUMFERENCE / 2.0, 1e-6);
    }

    #[test]
    fn round_trip() {
        for (lat, lon, alt) in [(52.52, 13.405, 34.0), (-33.9, 151.2, 0.0), (0.0, -179.0, -10.0)] {
            let geo = GeoCoordinates::with_altitude(lat, lon, alt);
            let back = MercatorProjection.unproject_point(MercatorProjection.project_point(&geo));
            assert_close(back.latitude, lat, 1e-9);
            assert_close(back.longitude, lon, 1e-9);
            assert_eq!(back.altitude, Some(alt));
        }
    }

    #[test]
    fn box_orders_north_first() {
        let geo_box = GeoBox::new(10.0, 20.0, 30.0, 40.0);
        let b = MercatorProjection.project_box(&geo_box);
        assert!(b.min.x < b.max.x);
        assert!(b.min.y < b.max.y);
        let north = MercatorProjection.project_point(&GeoCoordinates::new(30.0, 20.0));
        assert_eq!(b.min.y, north.y);

        let obb = MercatorProjection.project_oriented_box(&geo_box);
        assert_eq!(obb.extents.z, MIN_BOX_EXTENT);
    }

    #[test]
    fn scale_factor_is_secant_of_latitude() {
        for lat in [0.0f64, 30.0, 60.0, -75.0] {
            let p = MercatorProjection.project_point(&GeoCoordinates::new(lat, 5.0));
            assert_close(MercatorProjection.scale_factor(p), 1.0 / lat.to_radians().cos(), 1e-9);
        }
        assert_eq!(MercatorProjection.surface_normal(Vec3::new(1.0, 2.0, 3.0)), Vec3::UNIT_Z);
    }
}
