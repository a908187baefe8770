use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Axis-aligned bounding box in world space.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Aabb3 { min, max }
    }

    /// Inverted box that any `extend` call will overwrite.
    pub fn empty() -> Self {
        Aabb3 {
            min: Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.extend(p);
        }
        b
    }

    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Oriented bounding box: a center, three orthonormal axes and the
/// half-extent along each axis.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox3 {
    pub position: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub extents: Vec3,
}

impl OrientedBox3 {
    /// Box aligned with the world axes.
    pub fn axis_aligned(position: Vec3, extents: Vec3) -> Self {
        Self {
            position,
            x_axis: Vec3::UNIT_X,
            y_axis: Vec3::UNIT_Y,
            z_axis: Vec3::UNIT_Z,
            extents,
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        let d = p - self.position;
        d.dot(self.x_axis).abs() <= self.extents.x
            && d.dot(self.y_axis).abs() <= self.extents.y
            && d.dot(self.z_axis).abs() <= self.extents.z
    }
}

#[cfg(test)]
mod tests {
    use super::{Aabb3, OrientedBox3};
    use crate::math::Vec3;

    #[test]
    fn aabb_from_points() {
        let b = Aabb3::from_points([Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 4.0, 2.0)]);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 4.0, 2.0));
        assert_eq!(b.center(), Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(b.half_extents(), Vec3::new(1.0, 3.0, 1.0));
        assert!(b.contains(Vec3::new(0.5, 0.0, 1.0)));
        assert!(Aabb3::empty().is_empty());
    }

    #[test]
    fn oriented_box_contains() {
        let b = OrientedBox3::axis_aligned(Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.5));
        assert!(b.contains(Vec3::new(1.5, 0.2, 0.25)));
        assert!(!b.contains(Vec3::new(1.5, 0.2, 0.75)));
    }
}
