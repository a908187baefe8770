use std::f64::consts::{FRAC_PI_2, PI};

use super::{MIN_BOX_EXTENT, Projection, ProjectionKind};
use crate::bounds::{Aabb3, OrientedBox3};
use crate::geo::{GeoBox, GeoCoordinates};
use crate::math::{Ray, Vec3};

/// Planar projection: longitude/latitude in radians on x/y, altitude on z.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct IdentityProjection;

impl Projection for IdentityProjection {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Identity
    }

    fn world_extent(&self, min_altitude: f64, max_altitude: f64) -> Aabb3 {
        Aabb3::new(
            Vec3::new(-PI, -FRAC_PI_2, min_altitude),
            Vec3::new(PI, FRAC_PI_2, max_altitude),
        )
    }

    fn project_point(&self, geo: &GeoCoordinates) -> Vec3 {
        Vec3::new(
            geo.longitude.to_radians(),
            geo.latitude.to_radians(),
            geo.altitude_or_zero(),
        )
    }

    fn unproject_point(&self, world: Vec3) -> GeoCoordinates {
        GeoCoordinates::with_altitude(world.y.to_degrees(), world.x.to_degrees(), world.z)
    }

    fn unproject_altitude(&self, world: Vec3) -> f64 {
        world.z
    }

    fn project_box(&self, geo_box: &GeoBox) -> Aabb3 {
        Aabb3::new(
            self.project_point(&geo_box.south_west()),
            self.project_point(&geo_box.north_east()),
        )
    }

    fn project_oriented_box(&self, geo_box: &GeoBox) -> OrientedBox3 {
        let min = self.project_point(&geo_box.south_west());
        let max = self.project_point(&geo_box.north_east());
        let half = (max - min) * 0.5;
        OrientedBox3::axis_aligned(
            (min + max) * 0.5,
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

    fn scale_factor(&self, _world: Vec3) -> f64 {
        1.0
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        ray.intersect_plane_z(0.0).map(|t| {
            let mut hit = ray.at(t);
            hit.z = 0.0;
            hit
        })
    }
}
