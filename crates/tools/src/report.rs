use std::collections::BTreeMap;
use std::sync::Arc;

use decoder::{CollectedGeometry, GeometryCollector, TileGeometryDecoder};
use foundation::TileKey;
use foundation::math::Projection;
use formats::{FormatError, GeoJsonVtAdapter, MvtAdapter, TileAdapter, TileData, decode_with};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LayerReport {
    pub layer: String,
    pub extent: u32,
    pub features: usize,
    pub point_calls: usize,
    pub line_calls: usize,
    pub polygon_calls: usize,
    pub vertices: usize,
    pub triangles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileReport {
    pub tile: String,
    pub projection: &'static str,
    pub layers: Vec<LayerReport>,
    /// World-space bounds of every emitted vertex, `[min, max]`.
    pub bounds: Option<[[f64; 3]; 2]>,
}

/// Decodes `data` and summarizes what the geometry decoder emits for it.
pub fn decode_tile_report(
    data: &TileData<'_>,
    key: TileKey,
    decoder: &TileGeometryDecoder,
) -> Result<TileReport, FormatError> {
    let json = GeoJsonVtAdapter::default();
    let mvt = MvtAdapter;
    let adapters: [&dyn TileAdapter; 2] = [&json, &mvt];
    let tiles = decode_with(&adapters, data)?;

    let projection: Arc<dyn Projection> = Arc::clone(decoder.projection());
    let geo_box = key.geo_box();
    let mut layers = Vec::with_capacity(tiles.len());
    let mut bounds = foundation::Aabb3::empty();

    for tile in &tiles {
        let mut collector = GeometryCollector::new(Arc::clone(&projection));
        decoder.process(tile, key, &geo_box, &mut collector);
        let stats = collector.stats();

        for f in collector.features() {
            let mut extend = |v: &foundation::math::Vec3| bounds.extend(*v);
            match &f.geometry {
                CollectedGeometry::Points(points) => points.iter().for_each(&mut extend),
                CollectedGeometry::Lines(lines) => lines.iter().flatten().for_each(&mut extend),
                CollectedGeometry::Polygons(polygons) => polygons
                    .iter()
                    .flat_map(|p| p.rings.iter())
                    .flat_map(|r| r.positions.iter())
                    .for_each(&mut extend),
            }
        }

        info!(layer = %tile.layer, features = tile.features.len(), "decoded layer");
        layers.push(LayerReport {
            layer: tile.layer.clone(),
            extent: tile.extent,
            features: tile.features.len(),
            point_calls: stats.point_calls,
            line_calls: stats.line_calls,
            polygon_calls: stats.polygon_calls,
            vertices: stats.vertices,
            triangles: collector.area_triangles().len() / 3,
        });
    }

    Ok(TileReport {
        tile: key.to_string(),
        projection: projection.kind().as_str(),
        layers,
        bounds: (!bounds.is_empty()).then(|| [bounds.min.as_array(), bounds.max.as_array()]),
    })
}

/// Per geometry type totals across layers, keyed by type name.
pub fn totals(report: &TileReport) -> BTreeMap<&'static str, usize> {
    let mut out = BTreeMap::new();
    for l in &report.layers {
        *out.entry("point").or_insert(0) += l.point_calls;
        *out.entry("line").or_insert(0) += l.line_calls;
        *out.entry("polygon").or_insert(0) += l.polygon_calls;
    }
    out
}
