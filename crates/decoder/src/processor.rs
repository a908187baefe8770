use foundation::math::Vec3;

use crate::environment::Environment;

/// Closed polygon boundary in world space.
///
/// `outlines[i]` belongs to the edge from `positions[i]` to
/// `positions[(i + 1) % len]`: `true` when the edge is drawn, `false` when it
/// lies on the tile border and the neighbouring tile draws the seam.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ring {
    pub positions: Vec<Vec3>,
    pub outlines: Vec<bool>,
}

impl Ring {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            positions: Vec::with_capacity(n),
            outlines: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Rings of one polygon; the first is the outer boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

/// Sink for decoded world-space geometry (implemented by the tiling and
/// rendering side).
pub trait GeometryProcessor {
    fn process_point_feature(
        &mut self,
        layer: &str,
        positions: &[Vec3],
        environment: &Environment,
        level: u32,
    );

    fn process_line_feature(
        &mut self,
        layer: &str,
        lines: &[Vec<Vec3>],
        environment: &Environment,
        level: u32,
    );

    fn process_polygon_feature(
        &mut self,
        layer: &str,
        polygons: &[Polygon],
        environment: &Environment,
        level: u32,
    );
}

impl<P: GeometryProcessor + ?Sized> GeometryProcessor for &mut P {
    fn process_point_feature(
        &mut self,
        layer: &str,
        positions: &[Vec3],
        environment: &Environment,
        level: u32,
    ) {
        (**self).process_point_feature(layer, positions, environment, level);
    }

    fn process_line_feature(
        &mut self,
        layer: &str,
        lines: &[Vec<Vec3>],
        environment: &Environment,
        level: u32,
    ) {
        (**self).process_line_feature(layer, lines, environment, level);
    }

    fn process_polygon_feature(
        &mut self,
        layer: &str,
        polygons: &[Polygon],
        environment: &Environment,
        level: u32,
    ) {
        (**self).process_polygon_feature(layer, polygons, environment, level);
    }
}
