//! Map camera described by a look-at target, zoom level, heading and pitch.

use foundation::GeoCoordinates;
use foundation::math::{
    EQUATORIAL_CIRCUMFERENCE, MAX_MERCATOR_LATITUDE_DEG, Projection, Ray, Vec2, Vec3,
};
use serde::{Deserialize, Serialize};

/// Size of one tile in screen pixels at an integer zoom level.
pub const TILE_SIZE_PX: f64 = 256.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapCamera {
    pub target: GeoCoordinates,
    pub zoom_level: f64,
    /// Clockwise from north, degrees.
    pub heading_deg: f64,
    /// 0 looks straight down.
    pub pitch_deg: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub fov_y_deg: f64,
}

impl Default for MapCamera {
    fn default() -> Self {
        Self {
            target: GeoCoordinates::new(0.0, 0.0),
            zoom_level: 2.0,
            heading_deg: 0.0,
            pitch_deg: 0.0,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            fov_y_deg: 45.0,
        }
    }
}

/// Camera placement resolved against one projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl MapCamera {
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
    }

    /// World units covered by one screen pixel at the target.
    pub fn world_units_per_pixel(&self, projection: &dyn Projection) -> f64 {
        world_width(projection) / (TILE_SIZE_PX * self.zoom_level.exp2())
    }

    /// Eye to target distance in world units.
    pub fn distance(&self, projection: &dyn Projection) -> f64 {
        let half_fov = (self.fov_y_deg * 0.5).to_radians();
        (self.viewport_height * 0.5) / half_fov.tan() * self.world_units_per_pixel(projection)
    }

    pub fn pose(&self, projection: &dyn Projection) -> CameraPose {
        let frame = projection.tangent_frame(&self.target);
        let east = frame.east.normalize();
        let north = frame.north.normalize();
        let up = frame.up.normalize();
        let to_world = |v: Vec3| east * v.x + north * v.y + up * v.z;

        let (sin_h, cos_h) = self.heading_deg.to_radians().sin_cos();
        let (sin_p, cos_p) = self.pitch_deg.to_radians().sin_cos();
        let forward = Vec3::new(sin_p * sin_h, sin_p * cos_h, -cos_p);
        let right = Vec3::new(cos_h, -sin_h, 0.0);
        let cam_up = right.cross(forward);

        let forward = to_world(forward);
        CameraPose {
            eye: frame.origin - forward * self.distance(projection),
            forward,
            right: to_world(right),
            up: to_world(cam_up),
        }
    }

    /// Ray from the eye through the screen position (pixels, y down).
    pub fn screen_ray(&self, projection: &dyn Projection, pos_px: Vec2) -> Ray {
        let pose = self.pose(projection);
        let tan_half = (self.fov_y_deg * 0.5).to_radians().tan();
        let aspect = self.viewport_width / self.viewport_height.max(1.0);
        let nx = 2.0 * pos_px.x / self.viewport_width.max(1.0) - 1.0;
        let ny = 1.0 - 2.0 * pos_px.y / self.viewport_height.max(1.0);
        let dir = pose.forward + pose.right * (nx * tan_half * aspect) + pose.up * (ny * tan_half);
        Ray::new(pose.eye, dir.normalize())
    }

    /// Ground point under the screen position, if the ray hits the ground.
    pub fn pick_world(&self, projection: &dyn Projection, pos_px: Vec2) -> Option<Vec3> {
        projection.intersect_ray(&self.screen_ray(projection, pos_px))
    }

    pub fn pick(&self, projection: &dyn Projection, pos_px: Vec2) -> Option<GeoCoordinates> {
        let world = self.pick_world(projection, pos_px)?;
        let geo = projection.unproject_point(world);
        Some(GeoCoordinates::new(geo.latitude, geo.longitude))
    }

    /// Moves the target by a world-space offset, keeping it on the map.
    pub fn translate_target(&mut self, projection: &dyn Projection, delta: Vec3) {
        let world = projection.project_point(&self.target) + delta;
        let geo = projection.unproject_point(world);
        self.target = clamp_target(projection, geo.latitude, geo.longitude);
    }
}

fn world_width(projection: &dyn Projection) -> f64 {
    if projection.kind().is_spherical() {
        EQUATORIAL_CIRCUMFERENCE
    } else {
        let extent = projection.world_extent(0.0, 0.0);
        extent.max.x - extent.min.x
    }
}

fn clamp_target(projection: &dyn Projection, latitude: f64, longitude: f64) -> GeoCoordinates {
    let max_lat = if projection.kind().is_spherical() {
        90.0
    } else {
        MAX_MERCATOR_LATITUDE_DEG
    };
    GeoCoordinates::new(latitude.clamp(-max_lat, max_lat), longitude).normalized()
}
