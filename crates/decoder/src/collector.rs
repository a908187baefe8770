use std::sync::Arc;

use earcutr::earcut;
use foundation::math::{Projection, Vec3};
use tracing::warn;

use crate::environment::Environment;
use crate::processor::{GeometryProcessor, Polygon, Ring};

#[derive(Debug, Clone, PartialEq)]
pub enum CollectedGeometry {
    Points(Vec<Vec3>),
    Lines(Vec<Vec<Vec3>>),
    Polygons(Vec<Polygon>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectedFeature {
    pub layer: String,
    pub level: u32,
    pub environment: Environment,
    pub geometry: CollectedGeometry,
}

/// Processor that keeps every call it receives, in order.
///
/// Used by the CLI and by tests; a renderer would implement
/// [`GeometryProcessor`] directly.
#[derive(Debug, Clone)]
pub struct GeometryCollector {
    projection: Arc<dyn Projection>,
    features: Vec<CollectedFeature>,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CollectorStats {
    pub point_calls: usize,
    pub line_calls: usize,
    pub polygon_calls: usize,
    pub vertices: usize,
}

impl GeometryCollector {
    /// `projection` must be the one the decoder emits positions in; it
    /// supplies the surface normal for triangulation.
    pub fn new(projection: Arc<dyn Projection>) -> Self {
        Self {
            projection,
            features: Vec::new(),
        }
    }

    pub fn features(&self) -> &[CollectedFeature] {
        &self.features
    }

    pub fn into_features(self) -> Vec<CollectedFeature> {
        self.features
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }

    pub fn stats(&self) -> CollectorStats {
        let mut stats = CollectorStats::default();
        for f in &self.features {
            match &f.geometry {
                CollectedGeometry::Points(p) => {
                    stats.point_calls += 1;
                    stats.vertices += p.len();
                }
                CollectedGeometry::Lines(lines) => {
                    stats.line_calls += 1;
                    stats.vertices += lines.iter().map(Vec::len).sum::<usize>();
                }
                CollectedGeometry::Polygons(polygons) => {
                    stats.polygon_calls += 1;
                    stats.vertices += polygons
                        .iter()
                        .flat_map(|p| p.rings.iter())
                        .map(Ring::len)
                        .sum::<usize>();
                }
            }
        }
        stats
    }

    /// Flat triangle list (3 vertices per triangle) of every collected
    /// polygon.
    pub fn area_triangles(&self) -> Vec<Vec3> {
        let mut out = Vec::new();
        for f in &self.features {
            if let CollectedGeometry::Polygons(polygons) = &f.geometry {
                for polygon in polygons {
                    out.extend(triangulate_polygon(self.projection.as_ref(), polygon));
                }
            }
        }
        out
    }

    fn push(&mut self, layer: &str, environment: &Environment, level: u32, geometry: CollectedGeometry) {
        self.features.push(CollectedFeature {
            layer: layer.to_string(),
            level,
            environment: environment.clone(),
            geometry,
        });
    }
}

impl GeometryProcessor for GeometryCollector {
    fn process_point_feature(
        &mut self,
        layer: &str,
        positions: &[Vec3],
        environment: &Environment,
        level: u32,
    ) {
        self.push(layer, environment, level, CollectedGeometry::Points(positions.to_vec()));
    }

    fn process_line_feature(
        &mut self,
        layer: &str,
        lines: &[Vec<Vec3>],
        environment: &Environment,
        level: u32,
    ) {
        self.push(layer, environment, level, CollectedGeometry::Lines(lines.to_vec()));
    }

    fn process_polygon_feature(
        &mut self,
        layer: &str,
        polygons: &[Polygon],
        environment: &Environment,
        level: u32,
    ) {
        self.push(layer, environment, level, CollectedGeometry::Polygons(polygons.to_vec()));
    }
}

/// Triangulates `polygon` in the tangent plane at the centroid of its outer
/// ring. Returns a flat triangle list; empty when the outer ring is
/// degenerate.
pub fn triangulate_polygon(projection: &dyn Projection, polygon: &Polygon) -> Vec<Vec3> {
    let Some(outer) = polygon.rings.first() else {
        return Vec::new();
    };
    if outer.len() < 3 {
        return Vec::new();
    }

    let origin = centroid(&outer.positions);
    let n = projection.surface_normal(origin);
    let reference = if n.z.abs() < 0.99 { Vec3::UNIT_Z } else { Vec3::UNIT_Y };
    let east = reference.cross(n).normalize();
    let north = n.cross(east);

    let mut vertices: Vec<Vec3> = Vec::new();
    let mut coords: Vec<f64> = Vec::new();
    let mut holes: Vec<usize> = Vec::new();

    for (i, ring) in polygon.rings.iter().enumerate() {
        if ring.len() < 3 {
            continue;
        }
        if i > 0 {
            holes.push(vertices.len());
        }
        for &p in &ring.positions {
            let v = p - origin;
            coords.push(v.dot(east));
            coords.push(v.dot(north));
            vertices.push(p);
        }
    }

    match earcut(&coords, &holes, 2) {
        Ok(indices) => indices
            .into_iter()
            .filter_map(|i| vertices.get(i).copied())
            .collect(),
        Err(err) => {
            warn!(?err, rings = polygon.rings.len(), "polygon triangulation failed");
            Vec::new()
        }
    }
}

fn centroid(vertices: &[Vec3]) -> Vec3 {
    let sum = vertices.iter().fold(Vec3::ZERO, |acc, &v| acc + v);
    sum * (1.0 / vertices.len() as f64)
}
