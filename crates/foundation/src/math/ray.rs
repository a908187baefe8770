use super::Vec3;

/// A half-line in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Smallest non-negative `t` where the ray meets the plane `z = height`.
    pub fn intersect_plane_z(&self, height: f64) -> Option<f64> {
        if self.dir.z.abs() < 1e-15 {
            return None;
        }
        let t = (height - self.origin.z) / self.dir.z;
        (t >= 0.0).then_some(t)
    }

    /// Smallest non-negative `t` where the ray meets the origin-centered
    /// sphere of `radius`. A ray starting inside hits the far side.
    pub fn intersect_sphere(&self, radius: f64) -> Option<f64> {
        let a = self.dir.length_squared();
        if a <= 0.0 {
            return None;
        }
        let b = 2.0 * self.origin.dot(self.dir);
        let c = self.origin.length_squared() - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t0 = (-b - sq) / (2.0 * a);
        let t1 = (-b + sq) / (2.0 * a);
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }
}
