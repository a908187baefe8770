//! World-space geometry from decoded tile features.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use foundation::math::{MercatorProjection, Projection, Vec3};
use foundation::{GeoBox, TileKey};
use formats::{Feature, FeatureGeometry, Tile, TilePoint};
use tracing::{debug, trace};

use crate::environment::Environment;
use crate::filter::FeatureFilter;
use crate::processor::{GeometryProcessor, Polygon, Ring};
use crate::transform::TileTransform;

/// Shared flag checked by [`TileGeometryDecoder::process_cancellable`]
/// between features.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecodeStatus {
    Completed,
    Cancelled,
}

/// World-space geometry of one emitted primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Point(Vec3),
    Line(Vec<Vec3>),
    /// Every polygon of one feature; more than one for multipolygons.
    Polygons(Vec<Polygon>),
}

/// A primitive together with the context it is emitted with.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPrimitive<'a> {
    pub layer: &'a str,
    pub environment: Arc<Environment>,
    pub level: u32,
    pub primitive: Primitive,
}

impl DecodedPrimitive<'_> {
    /// Hands the primitive to the matching processor callback.
    pub fn dispatch<P: GeometryProcessor + ?Sized>(&self, processor: &mut P) {
        let env = self.environment.as_ref();
        match &self.primitive {
            Primitive::Point(p) => {
                processor.process_point_feature(self.layer, std::slice::from_ref(p), env, self.level)
            }
            Primitive::Line(line) => processor.process_line_feature(
                self.layer,
                std::slice::from_ref(line),
                env,
                self.level,
            ),
            Primitive::Polygons(polygons) => processor.process_polygon_feature(
                self.layer,
                polygons,
                env,
                self.level,
            ),
        }
    }
}

/// Converts tile features into world-space points, lines and polygons.
///
/// The decoder is stateless between calls: all per-tile state lives in the
/// [`Primitives`] iterator, so one decoder can serve many threads.
#[derive(Debug, Clone)]
pub struct TileGeometryDecoder {
    filter: Option<Arc<dyn FeatureFilter>>,
    projection: Arc<dyn Projection>,
}

impl Default for TileGeometryDecoder {
    fn default() -> Self {
        Self {
            filter: None,
            projection: Arc::new(MercatorProjection),
        }
    }
}

impl TileGeometryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder emitting positions in `projection`'s world space.
    pub fn with_projection(projection: Arc<dyn Projection>) -> Self {
        Self {
            filter: None,
            projection,
        }
    }

    pub fn projection(&self) -> &Arc<dyn Projection> {
        &self.projection
    }

    pub fn filter(&self) -> Option<&Arc<dyn FeatureFilter>> {
        self.filter.as_ref()
    }

    pub fn set_filter(&mut self, filter: Option<Arc<dyn FeatureFilter>>) {
        self.filter = filter;
    }

    /// Lazily decodes `tile`, one feature at a time, in input order.
    pub fn primitives<'a>(&'a self, tile: &'a Tile, key: TileKey, geo_box: &GeoBox) -> Primitives<'a> {
        let level = key.level;
        let skip_layer = self
            .filter
            .as_ref()
            .is_some_and(|f| !f.wants_layer(&tile.layer, level));
        if skip_layer {
            debug!(layer = %tile.layer, %key, "layer filtered out");
        }
        let features: &'a [Feature] = if skip_layer { &[] } else { &tile.features };

        Primitives {
            decoder: self,
            tile,
            level,
            transform: TileTransform::new(tile.extent, level, geo_box),
            features: features.iter().enumerate(),
            pending: VecDeque::new(),
        }
    }

    /// Decodes `tile` and calls `processor` once per emitted primitive.
    pub fn process<P: GeometryProcessor + ?Sized>(
        &self,
        tile: &Tile,
        key: TileKey,
        geo_box: &GeoBox,
        processor: &mut P,
    ) {
        for decoded in self.primitives(tile, key, geo_box) {
            decoded.dispatch(processor);
        }
    }

    /// Like [`process`](Self::process), checking `cancel` before each
    /// feature. Primitives of features decoded before cancellation have
    /// already been delivered.
    pub fn process_cancellable<P: GeometryProcessor + ?Sized>(
        &self,
        tile: &Tile,
        key: TileKey,
        geo_box: &GeoBox,
        processor: &mut P,
        cancel: &CancellationToken,
    ) -> DecodeStatus {
        let mut primitives = self.primitives(tile, key, geo_box);
        loop {
            if cancel.is_cancelled() {
                debug!(layer = %tile.layer, %key, "decode cancelled");
                return DecodeStatus::Cancelled;
            }
            if !primitives.advance_feature() {
                return DecodeStatus::Completed;
            }
            while let Some(decoded) = primitives.pending.pop_front() {
                decoded.dispatch(processor);
            }
        }
    }

    #[inline]
    fn world_position(&self, transform: &TileTransform, p: TilePoint) -> Vec3 {
        self.projection
            .reproject_point(&MercatorProjection, transform.to_world(p))
    }
}

/// Lazy, single-pass sequence of the primitives of one tile.
#[derive(Debug)]
pub struct Primitives<'a> {
    decoder: &'a TileGeometryDecoder,
    tile: &'a Tile,
    level: u32,
    transform: TileTransform,
    features: std::iter::Enumerate<std::slice::Iter<'a, Feature>>,
    pending: VecDeque<DecodedPrimitive<'a>>,
}

impl<'a> Primitives<'a> {
    /// Decodes the next feature into the pending queue. Returns `false` once
    /// every feature has been consumed.
    fn advance_feature(&mut self) -> bool {
        let Some((index, feature)) = self.features.next() else {
            return false;
        };
        let tile: &'a Tile = self.tile;
        let layer: &'a str = tile.layer.as_str();

        if let Some(filter) = &self.decoder.filter {
            if !filter.wants_feature(layer, feature, self.level) {
                trace!(layer, feature = index, "feature filtered out");
                return true;
            }
        }

        let environment = Arc::new(Environment::for_feature(feature, layer, self.level));
        let mut emit = |primitive: Primitive| {
            self.pending.push_back(DecodedPrimitive {
                layer,
                environment: Arc::clone(&environment),
                level: self.level,
                primitive,
            });
        };

        let decoder = self.decoder;
        let transform = &self.transform;
        match &feature.geometry {
            FeatureGeometry::Points(points) => {
                for p in points {
                    emit(Primitive::Point(decoder.world_position(transform, *p)));
                }
            }
            FeatureGeometry::Lines(lines) => {
                for line in lines {
                    if line.len() < 2 {
                        trace!(layer, feature = index, "skipping degenerate line");
                        continue;
                    }
                    emit(Primitive::Line(
                        line.iter()
                            .map(|p| decoder.world_position(transform, *p))
                            .collect(),
                    ));
                }
            }
            FeatureGeometry::Polygon(rings) => {
                match decode_polygons(std::slice::from_ref(rings), tile.extent, |p| {
                    decoder.world_position(transform, p)
                }) {
                    Some(polygons) => emit(Primitive::Polygons(polygons)),
                    None => debug!(layer, feature = index, "polygon discarded"),
                }
            }
            FeatureGeometry::MultiPolygon(parts) => {
                match decode_polygons(parts, tile.extent, |p| decoder.world_position(transform, p)) {
                    Some(polygons) => emit(Primitive::Polygons(polygons)),
                    None => debug!(layer, feature = index, parts = parts.len(), "multipolygon discarded"),
                }
            }
            FeatureGeometry::Unknown => {}
        }
        true
    }
}

impl<'a> Iterator for Primitives<'a> {
    type Item = DecodedPrimitive<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(decoded) = self.pending.pop_front() {
                return Some(decoded);
            }
            if !self.advance_feature() {
                return None;
            }
        }
    }
}

/// `true` when the edge `a -> b` runs along one of the four tile borders.
#[inline]
fn on_tile_border(a: TilePoint, b: TilePoint, extent: i32) -> bool {
    (a.x == 0 && b.x == 0)
        || (a.x == extent && b.x == extent)
        || (a.y == 0 && b.y == 0)
        || (a.y == extent && b.y == extent)
}

/// Builds the world-space polygons of one feature, one per entry of `parts`.
///
/// Returns `None` when the feature must not be emitted:
/// - a ring after the first one of any part spans exactly the whole tile (a
///   generalization artifact). The first ring of a part is never checked, so
///   a lone full-tile outer ring is emitted.
/// - no part keeps a ring with at least three vertices.
fn decode_polygons(
    parts: &[Vec<Vec<TilePoint>>],
    extent: u32,
    mut to_world: impl FnMut(TilePoint) -> Vec3,
) -> Option<Vec<Polygon>> {
    let extent = i32::try_from(extent).unwrap_or(i32::MAX);
    let mut polygons = Vec::with_capacity(parts.len());

    for rings in parts {
        let mut polygon = Polygon {
            rings: Vec::with_capacity(rings.len()),
        };
        for (ring_index, outline) in rings.iter().enumerate() {
            let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
            let (mut max_x, mut max_y) = (0, 0);
            let track_bounds = ring_index > 0;

            let n = outline.len();
            let mut ring = Ring::with_capacity(n);
            for (i, &curr) in outline.iter().enumerate() {
                let next = outline[(i + 1) % n];
                if track_bounds {
                    min_x = min_x.min(curr.x);
                    min_y = min_y.min(curr.y);
                    max_x = max_x.max(curr.x);
                    max_y = max_y.max(curr.y);
                }
                ring.positions.push(to_world(curr));
                ring.outlines.push(!on_tile_border(curr, next, extent));
            }

            if min_x == 0 && min_y == 0 && max_x == extent && max_y == extent {
                return None;
            }
            if ring.len() < 3 {
                continue;
            }
            polygon.rings.push(ring);
        }
        if !polygon.rings.is_empty() {
            polygons.push(polygon);
        }
    }

    (!polygons.is_empty()).then_some(polygons)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use foundation::math::{
        EQUATORIAL_RADIUS, MercatorProjection, Projection, SphereProjection, Vec3,
    };
    use foundation::{GeoBox, TileKey};
    use formats::{Feature, FeatureGeometry, GeometryType, Tile, TilePoint};
    use pretty_assertions::assert_eq;

    use super::{CancellationToken, DecodeStatus, Primitive, TileGeometryDecoder};
    use crate::environment::Environment;
    use crate::filter::{FilterDescription, GenericFeatureFilter, LayerRule};
    use crate::processor::{GeometryProcessor, Polygon};

    const E: i32 = 4096;

    #[derive(Debug, Default)]
    struct Recorder {
        points: Vec<(String, Vec<Vec3>, Environment, u32)>,
        lines: Vec<Vec<Vec<Vec3>>>,
        polygons: Vec<Vec<Polygon>>,
    }

    impl Recorder {
        fn calls(&self) -> usize {
            self.points.len() + self.lines.len() + self.polygons.len()
        }
    }

    impl GeometryProcessor for Recorder {
        fn process_point_feature(
            &mut self,
            layer: &str,
            positions: &[Vec3],
            environment: &Environment,
            level: u32,
        ) {
            self.points
                .push((layer.to_string(), positions.to_vec(), environment.clone(), level));
        }

        fn process_line_feature(&mut self, _: &str, lines: &[Vec<Vec3>], _: &Environment, _: u32) {
            self.lines.push(lines.to_vec());
        }

        fn process_polygon_feature(&mut self, _: &str, polygons: &[Polygon], _: &Environment, _: u32) {
            self.polygons.push(polygons.to_vec());
        }
    }

    fn pts(coords: &[(i32, i32)]) -> Vec<TilePoint> {
        coords.iter().map(|&(x, y)| TilePoint::new(x, y)).collect()
    }

    fn full_square() -> Vec<TilePoint> {
        pts(&[(0, 0), (E, 0), (E, E), (0, E)])
    }

    fn tile_with(features: Vec<Feature>) -> Tile {
        let mut tile = Tile::new("test", E as u32);
        tile.features = features;
        tile
    }

    fn decode(tile: &Tile) -> Recorder {
        let key = TileKey::from_slippy(2, 1, 2);
        let mut rec = Recorder::default();
        TileGeometryDecoder::new().process(tile, key, &key.geo_box(), &mut rec);
        rec
    }

    #[test]
    fn each_point_is_its_own_call() {
        let tile = tile_with(vec![
            Feature::new(FeatureGeometry::Points(pts(&[(1, 1), (2, 2), (3, 3)])))
                .with_tag("name", "x"),
        ]);
        let rec = decode(&tile);
        assert_eq!(rec.points.len(), 3);
        for (layer, positions, env, level) in &rec.points {
            assert_eq!(layer, "test");
            assert_eq!(positions.len(), 1);
            assert_eq!(*level, 2);
            assert_eq!(env.geometry_type(), Some(GeometryType::Point));
            assert_eq!(env.get("name"), Some(&serde_json::json!("x")));
        }
        assert!(rec.points[0].1[0].x < rec.points[1].1[0].x);
    }

    #[test]
    fn one_call_per_line_sub_path() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Lines(vec![
            pts(&[(0, 0), (10, 10), (20, 0)]),
            pts(&[(5, 5), (6, 6)]),
            pts(&[(7, 7)]),
        ]))]);
        let rec = decode(&tile);
        assert_eq!(rec.lines.len(), 2);
        assert_eq!(rec.lines[0][0].len(), 3);
        assert_eq!(rec.lines[1][0].len(), 2);
    }

    #[test]
    fn unknown_geometry_is_skipped() {
        let rec = decode(&tile_with(vec![Feature::new(FeatureGeometry::Unknown)]));
        assert_eq!(rec.calls(), 0);
    }

    #[test]
    fn border_edges_are_not_outlined() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Polygon(vec![full_square()]))]);
        let rec = decode(&tile);
        // A lone full-tile outer ring is still emitted.
        assert_eq!(rec.polygons.len(), 1);
        let ring = &rec.polygons[0][0].rings[0];
        assert_eq!(ring.positions.len(), 4);
        assert_eq!(ring.outlines, vec![false; 4]);
    }

    #[test]
    fn interior_edges_are_outlined() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Polygon(vec![pts(&[
            (0, 0),
            (100, 0),
            (100, 100),
            (0, 100),
        ])]))]);
        let rec = decode(&tile);
        let ring = &rec.polygons[0][0].rings[0];
        // Top edge (y == 0) and left edge (x == 0) sit on the border.
        assert_eq!(ring.outlines, vec![false, true, true, false]);
    }

    #[test]
    fn full_tile_hole_discards_polygon() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Polygon(vec![
            pts(&[(10, 10), (20, 10), (20, 20)]),
            full_square(),
        ]))]);
        assert_eq!(decode(&tile).calls(), 0);
    }

    #[test]
    fn partial_hole_is_kept() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Polygon(vec![
            full_square(),
            pts(&[(0, 0), (E, 0), (E, E - 1), (0, E - 1)]),
        ]))]);
        let rec = decode(&tile);
        assert_eq!(rec.polygons.len(), 1);
        assert_eq!(rec.polygons[0][0].rings.len(), 2);
    }

    #[test]
    fn degenerate_rings_are_dropped() {
        let tile = tile_with(vec![
            Feature::new(FeatureGeometry::Polygon(vec![
                pts(&[(1, 1), (2, 2), (3, 1)]),
                pts(&[(5, 5), (6, 6)]),
                vec![],
            ])),
            Feature::new(FeatureGeometry::Polygon(vec![pts(&[(1, 1)])])),
        ]);
        let rec = decode(&tile);
        assert_eq!(rec.polygons.len(), 1);
        assert_eq!(rec.polygons[0][0].rings.len(), 1);
    }

    #[test]
    fn dropped_outer_ring_still_guards_full_tile_hole() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Polygon(vec![
            pts(&[(1, 1), (2, 2)]),
            full_square(),
        ]))]);
        assert_eq!(decode(&tile).calls(), 0);
    }

    #[test]
    fn multipolygon_is_one_call_with_every_part() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::MultiPolygon(vec![
            vec![pts(&[(0, 0), (10, 0), (10, 10), (0, 10)])],
            vec![
                pts(&[(20, 20), (40, 20), (40, 40), (20, 40)]),
                pts(&[(25, 25), (25, 30), (30, 30), (30, 25)]),
            ],
            vec![pts(&[(50, 50), (51, 51)])],
        ]))]);
        let rec = decode(&tile);
        assert_eq!(rec.polygons.len(), 1);
        let rings: Vec<usize> = rec.polygons[0].iter().map(|p| p.rings.len()).collect();
        assert_eq!(rings, vec![1, 2]);
    }

    #[test]
    fn full_tile_hole_in_any_part_discards_multipolygon() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::MultiPolygon(vec![
            vec![pts(&[(0, 0), (10, 0), (10, 10), (0, 10)])],
            vec![full_square()],
            vec![pts(&[(10, 10), (20, 10), (20, 20)]), full_square()],
        ]))]);
        assert_eq!(decode(&tile).calls(), 0);
    }

    #[test]
    fn iterator_preserves_feature_order() {
        let tile = tile_with(vec![
            Feature::new(FeatureGeometry::Lines(vec![pts(&[(0, 0), (1, 1)])])),
            Feature::new(FeatureGeometry::Points(pts(&[(4, 4), (5, 5)]))),
            Feature::new(FeatureGeometry::Polygon(vec![pts(&[(1, 1), (9, 1), (9, 9)])])),
        ]);
        let key = TileKey::from_slippy(0, 0, 1);
        let decoder = TileGeometryDecoder::new();
        let kinds: Vec<&str> = decoder
            .primitives(&tile, key, &key.geo_box())
            .map(|d| match d.primitive {
                Primitive::Point(_) => "point",
                Primitive::Line(_) => "line",
                Primitive::Polygons(_) => "polygon",
            })
            .collect();
        assert_eq!(kinds, vec!["line", "point", "point", "polygon"]);
    }

    #[test]
    fn positions_follow_tile_transform() {
        let key = TileKey::from_slippy(1, 1, 1);
        let geo_box = key.geo_box();
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Points(pts(&[(0, 0)])))]);
        let mut rec = Recorder::default();
        TileGeometryDecoder::new().process(&tile, key, &geo_box, &mut rec);

        let p = rec.points[0].1[0];
        let expected = MercatorProjection.project_point(&foundation::GeoCoordinates::new(
            geo_box.north,
            geo_box.west,
        ));
        assert!((p.x - expected.x).abs() < 1e-6);
        assert!((p.y - expected.y).abs() < 1e-6);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn reprojects_into_target_projection() {
        let key = TileKey::from_slippy(0, 0, 0);
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Points(pts(&[(E / 2, E / 2)])))]);
        let decoder = TileGeometryDecoder::with_projection(Arc::new(SphereProjection));
        let mut rec = Recorder::default();
        decoder.process(&tile, key, &GeoBox::new(-85.0511287798066, -180.0, 85.0511287798066, 180.0), &mut rec);
        let p = rec.points[0].1[0];
        // Tile center is (0°, 0°), on the +x axis of the globe.
        assert!((p.length() - EQUATORIAL_RADIUS).abs() < 1e-3);
        assert!((p.x - EQUATORIAL_RADIUS).abs() < 1.0);
    }

    #[test]
    fn filter_skips_layers_and_types() {
        let tile = tile_with(vec![
            Feature::new(FeatureGeometry::Points(pts(&[(1, 1)]))),
            Feature::new(FeatureGeometry::Lines(vec![pts(&[(0, 0), (1, 1)])])),
        ]);
        let key = TileKey::from_slippy(0, 0, 3);
        let mut decoder = TileGeometryDecoder::new();

        decoder.set_filter(Some(Arc::new(GenericFeatureFilter::new(FilterDescription {
            geometry_types: Some(vec![GeometryType::LineString]),
            ..Default::default()
        }))));
        let mut rec = Recorder::default();
        decoder.process(&tile, key, &key.geo_box(), &mut rec);
        assert_eq!((rec.points.len(), rec.lines.len()), (0, 1));

        decoder.set_filter(Some(Arc::new(GenericFeatureFilter::new(FilterDescription {
            ignore_layers: vec![LayerRule::new("test")],
            ..Default::default()
        }))));
        let mut rec = Recorder::default();
        decoder.process(&tile, key, &key.geo_box(), &mut rec);
        assert_eq!(rec.calls(), 0);
        assert!(decoder.filter().is_some());
    }

    #[test]
    fn cancellation_stops_between_features() {
        let tile = tile_with(vec![Feature::new(FeatureGeometry::Points(pts(&[(1, 1)])))]);
        let key = TileKey::from_slippy(0, 0, 0);
        let decoder = TileGeometryDecoder::new();

        let token = CancellationToken::new();
        let mut rec = Recorder::default();
        let status = decoder.process_cancellable(&tile, key, &key.geo_box(), &mut rec, &token);
        assert_eq!(status, DecodeStatus::Completed);
        assert_eq!(rec.points.len(), 1);

        token.cancel();
        let mut rec = Recorder::default();
        let status = decoder.process_cancellable(&tile, key, &key.geo_box(), &mut rec, &token);
        assert_eq!(status, DecodeStatus::Cancelled);
        assert_eq!(rec.calls(), 0);
    }

    #[test]
    fn decodes_on_worker_threads() {
        let decoder = Arc::new(TileGeometryDecoder::new());
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let decoder = Arc::clone(&decoder);
                std::thread::spawn(move || {
                    let tile = tile_with(vec![Feature::new(FeatureGeometry::Points(pts(&[
                        (1, 1),
                        (2, 2),
                    ])))]);
                    let key = TileKey::from_slippy(i, 0, 2);
                    let mut rec = Recorder::default();
                    decoder.process(&tile, key, &key.geo_box(), &mut rec);
                    rec.points.len()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().expect("worker"), 2);
        }
    }
}
