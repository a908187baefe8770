use foundation::TileKey;
use serde_json::{Map, Value};

use crate::tile::{
    DEFAULT_EXTENT, Feature, FeatureGeometry, FormatError, Tile, TileAdapter, TileData, TilePoint,
};

/// Layer name used when a tile object does not name its layer.
pub const DEFAULT_LAYER_NAME: &str = "geojson";

/// Fields a geojson-vt tile object must expose to be accepted.
const REQUIRED_FIELDS: [&str; 5] = ["features", "source", "x", "y", "z"];

/// Adapter for tile objects produced by a geojson-vt style tiler.
///
/// Feature `type` is 1 (point), 2 (line) or 3 (polygon); geometry is already
/// transformed into tile-local integer coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GeoJsonVtAdapter {
    pub extent: u32,
}

impl Default for GeoJsonVtAdapter {
    fn default() -> Self {
        Self {
            extent: DEFAULT_EXTENT,
        }
    }
}

impl GeoJsonVtAdapter {
    pub fn new(extent: u32) -> Self {
        Self { extent }
    }

    /// Address of the tile object, when it carries one.
    pub fn tile_key(value: &Value) -> Option<TileKey> {
        let obj = value.as_object()?;
        let coord = |k: &str| obj.get(k).and_then(Value::as_u64).and_then(|v| u32::try_from(v).ok());
        Some(TileKey::from_slippy(coord("x")?, coord("y")?, coord("z")?))
    }

    fn decode_value(&self, value: &Value) -> Result<Tile, FormatError> {
        let obj = value.as_object().ok_or(FormatError::UnsupportedInput)?;
        let features_val = obj
            .get("features")
            .and_then(Value::as_array)
            .ok_or(FormatError::MissingField { field: "features" })?;

        let layer = obj
            .get("layer")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LAYER_NAME);
        let mut tile = Tile::new(layer, self.extent);
        tile.features.reserve(features_val.len());

        for (index, feat_val) in features_val.iter().enumerate() {
            tile.features.push(parse_feature(feat_val).map_err(|reason| {
                FormatError::InvalidFeature { index, reason }
            })?);
        }
        Ok(tile)
    }
}

impl TileAdapter for GeoJsonVtAdapter {
    fn can_process(&self, data: &TileData<'_>) -> bool {
        match data {
            TileData::Binary(_) => false,
            TileData::Json(value) => value
                .as_object()
                .is_some_and(|obj| REQUIRED_FIELDS.iter().all(|f| obj.contains_key(*f))),
        }
    }

    fn decode(&self, data: &TileData<'_>) -> Result<Vec<Tile>, FormatError> {
        match data {
            TileData::Binary(_) => Err(FormatError::UnsupportedInput),
            TileData::Json(value) => Ok(vec![self.decode_value(value)?]),
        }
    }
}

fn parse_feature(value: &Value) -> Result<Feature, String> {
    let obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let tags: Map<String, Value> = obj
        .get("tags")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let ty = obj.get("type").and_then(Value::as_u64).unwrap_or(0);
    let geometry = match ty {
        1 | 2 | 3 => {
            let geom = obj
                .get("geometry")
                .ok_or("feature missing geometry".to_string())?;
            match ty {
                1 => FeatureGeometry::Points(parse_points(geom)?),
                2 => FeatureGeometry::Lines(parse_paths(geom)?),
                _ => FeatureGeometry::Polygon(parse_paths(geom)?),
            }
        }
        _ => FeatureGeometry::Unknown,
    };

    Ok(Feature { id, tags, geometry })
}

fn parse_point(value: &Value) -> Result<TilePoint, String> {
    let arr = value
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [x, y]".to_string());
    }
    Ok(TilePoint::new(parse_coord(&arr[0])?, parse_coord(&arr[1])?))
}

fn parse_coord(value: &Value) -> Result<i32, String> {
    if let Some(i) = value.as_i64() {
        return i32::try_from(i).map_err(|_| format!("coordinate out of range: {i}"));
    }
    let f = value
        .as_f64()
        .ok_or("coordinate must be a number".to_string())?;
    Ok(f.round() as i32)
}

fn parse_points(value: &Value) -> Result<Vec<TilePoint>, String> {
    let arr = value
        .as_array()
        .ok_or("geometry must be an array".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_paths(value: &Value) -> Result<Vec<Vec<TilePoint>>, String> {
    let arr = value
        .as_array()
        .ok_or("geometry must be an array of paths".to_string())?;
    arr.iter().map(parse_points).collect()
}
