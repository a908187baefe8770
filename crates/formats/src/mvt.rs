//! Mapbox vector tile (protobuf) adapter.
//!
//! See <https://github.com/mapbox/vector-tile-spec/tree/master/2.1>.

use std::io::Read;

use flate2::read::GzDecoder;
use prost::{Enumeration, Message};
use serde_json::{Map, Value};
use tracing::warn;

use crate::tile::{
    DEFAULT_EXTENT, Feature, FeatureGeometry, FormatError, Tile, TileAdapter, TileData, TilePoint,
};

const CMD_MOVE_TO: u32 = 1;
const CMD_LINE_TO: u32 = 2;
const CMD_CLOSE_PATH: u32 = 7;

/// Wire messages of the vector tile schema.
pub mod proto {
    use super::{DEFAULT_EXTENT, Enumeration, Message};

    #[derive(Clone, PartialEq, Message)]
    pub struct Tile {
        #[prost(message, repeated, tag = "3")]
        pub layers: Vec<Layer>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Layer {
        #[prost(uint32, required, tag = "15", default = "1")]
        pub version: u32,
        #[prost(string, required, tag = "1")]
        pub name: String,
        #[prost(message, repeated, tag = "2")]
        pub features: Vec<Feature>,
        /// Keys referenced by [`Feature::tags`].
        #[prost(string, repeated, tag = "3")]
        pub keys: Vec<String>,
        /// Values referenced by [`Feature::tags`].
        #[prost(message, repeated, tag = "4")]
        pub values: Vec<Value>,
        #[prost(uint32, optional, tag = "5", default = "4096")]
        pub extent: Option<u32>,
    }

    impl Layer {
        pub fn extent_or_default(&self) -> u32 {
            self.extent.unwrap_or(DEFAULT_EXTENT)
        }
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Feature {
        #[prost(uint64, optional, tag = "1", default = "0")]
        pub id: Option<u64>,
        /// Consecutive key/value index pairs into the layer tables.
        #[prost(uint32, repeated, tag = "2")]
        pub tags: Vec<u32>,
        #[prost(enumeration = "GeomType", optional, tag = "3", default = "Unknown")]
        pub r#type: Option<i32>,
        /// Command stream, see [`super::decode_commands`].
        #[prost(uint32, repeated, tag = "4")]
        pub geometry: Vec<u32>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
    #[repr(i32)]
    pub enum GeomType {
        Unknown = 0,
        Point = 1,
        Linestring = 2,
        Polygon = 3,
    }

    /// Exactly one field is set in a valid message.
    #[derive(Clone, PartialEq, Message)]
    pub struct Value {
        #[prost(string, optional, tag = "1")]
        pub string_value: Option<String>,
        #[prost(float, optional, tag = "2")]
        pub float_value: Option<f32>,
        #[prost(double, optional, tag = "3")]
        pub double_value: Option<f64>,
        #[prost(int64, optional, tag = "4")]
        pub int_value: Option<i64>,
        #[prost(uint64, optional, tag = "5")]
        pub uint_value: Option<u64>,
        #[prost(sint64, optional, tag = "6")]
        pub sint_value: Option<i64>,
        #[prost(bool, optional, tag = "7")]
        pub bool_value: Option<bool>,
    }
}

/// Adapter for binary (optionally gzip-compressed) vector tiles.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MvtAdapter;

impl TileAdapter for MvtAdapter {
    fn can_process(&self, data: &TileData<'_>) -> bool {
        matches!(data, TileData::Binary(bytes) if !bytes.is_empty())
    }

    fn decode(&self, data: &TileData<'_>) -> Result<Vec<Tile>, FormatError> {
        let TileData::Binary(bytes) = data else {
            return Err(FormatError::UnsupportedInput);
        };
        let raw = decompress_gzip(bytes)?;
        let msg = proto::Tile::decode(raw.as_slice()).map_err(|e| FormatError::Protobuf {
            reason: e.to_string(),
        })?;
        msg.layers.iter().map(convert_layer).collect()
    }
}

fn is_gzipped(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1F && data[1] == 0x8B
}

fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>, FormatError> {
    if !is_gzipped(data) {
        return Ok(data.to_vec());
    }
    let mut out = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| FormatError::Decompress {
            reason: e.to_string(),
        })?;
    Ok(out)
}

fn convert_layer(layer: &proto::Layer) -> Result<Tile, FormatError> {
    let mut tile = Tile::new(layer.name.clone(), layer.extent_or_default());
    tile.features.reserve(layer.features.len());

    for (index, feature) in layer.features.iter().enumerate() {
        let geom_type = feature
            .r#type
            .and_then(|t| proto::GeomType::try_from(t).ok())
            .unwrap_or(proto::GeomType::Unknown);

        let paths = decode_commands(&feature.geometry)
            .map_err(|reason| FormatError::InvalidFeature { index, reason })?;
        let geometry = match geom_type {
            proto::GeomType::Point => FeatureGeometry::Points(paths.into_iter().flatten().collect()),
            proto::GeomType::Linestring => FeatureGeometry::Lines(paths),
            proto::GeomType::Polygon => {
                let mut polygons = classify_rings(paths);
                if polygons.len() == 1 {
                    FeatureGeometry::Polygon(polygons.remove(0))
                } else {
                    FeatureGeometry::MultiPolygon(polygons)
                }
            }
            proto::GeomType::Unknown => FeatureGeometry::Unknown,
        };

        tile.features.push(Feature {
            id: feature.id.map(|id| id.to_string()),
            tags: resolve_tags(layer, feature),
            geometry,
        });
    }
    Ok(tile)
}

fn resolve_tags(layer: &proto::Layer, feature: &proto::Feature) -> Map<String, Value> {
    let mut tags = Map::new();
    for pair in feature.tags.chunks(2) {
        let [k, v] = pair else {
            warn!(layer = %layer.name, "odd tag count, dropping trailing key");
            break;
        };
        let (Some(key), Some(value)) = (
            layer.keys.get(*k as usize),
            layer.values.get(*v as usize),
        ) else {
            warn!(layer = %layer.name, key = k, value = v, "tag index out of range");
            continue;
        };
        tags.insert(key.clone(), convert_value(value));
    }
    tags
}

fn convert_value(value: &proto::Value) -> Value {
    if let Some(s) = &value.string_value {
        Value::String(s.clone())
    } else if let Some(f) = value.float_value {
        Value::from(f64::from(f))
    } else if let Some(d) = value.double_value {
        Value::from(d)
    } else if let Some(i) = value.int_value.or(value.sint_value) {
        Value::from(i)
    } else if let Some(u) = value.uint_value {
        Value::from(u)
    } else if let Some(b) = value.bool_value {
        Value::Bool(b)
    } else {
        Value::Null
    }
}

/// Decode a zigzag-encoded parameter back to signed.
#[inline]
pub fn zigzag_decode(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Unpack a command integer into `(command_id, count)`.
#[inline]
pub fn command_decode(command: u32) -> (u32, u32) {
    (command & 0x7, command >> 3)
}

/// Expands a geometry command stream into paths of absolute tile positions.
///
/// Every MoveTo starts a new path; ClosePath ends the current one without
/// repeating its first vertex.
pub fn decode_commands(commands: &[u32]) -> Result<Vec<Vec<TilePoint>>, String> {
    let mut paths: Vec<Vec<TilePoint>> = Vec::new();
    let mut current: Vec<TilePoint> = Vec::new();
    let (mut x, mut y) = (0i32, 0i32);
    let mut i = 0;

    while i < commands.len() {
        let (id, count) = command_decode(commands[i]);
        i += 1;
        match id {
            CMD_MOVE_TO | CMD_LINE_TO => {
                let needed = count as usize * 2;
                if commands.len() - i < needed {
                    return Err(format!("command at {} needs {needed} parameters", i - 1));
                }
                for _ in 0..count {
                    x = x.wrapping_add(zigzag_decode(commands[i]));
                    y = y.wrapping_add(zigzag_decode(commands[i + 1]));
                    i += 2;
                    if id == CMD_MOVE_TO {
                        if !current.is_empty() {
                            paths.push(std::mem::take(&mut current));
                        }
                    } else if current.is_empty() {
                        return Err("LineTo without a preceding MoveTo".to_string());
                    }
                    current.push(TilePoint::new(x, y));
                }
            }
            CMD_CLOSE_PATH => {
                if !current.is_empty() {
                    paths.push(std::mem::take(&mut current));
                }
            }
            other => return Err(format!("unknown command id {other}")),
        }
    }

    if !current.is_empty() {
        paths.push(current);
    }
    Ok(paths)
}

/// Twice the signed area of a ring; positive for exterior rings in the
/// y-down tile grid.
pub fn signed_area(ring: &[TilePoint]) -> i64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
        })
        .sum()
}

/// Groups the rings of a polygon feature into polygons.
///
/// A ring wound like the first non-degenerate ring starts a new polygon;
/// oppositely wound rings are holes of the polygon before them. Taking the
/// winding from the first ring keeps version 1 tiles with flipped winding
/// readable. Zero-area rings are dropped.
pub fn classify_rings(rings: Vec<Vec<TilePoint>>) -> Vec<Vec<Vec<TilePoint>>> {
    let mut polygons: Vec<Vec<Vec<TilePoint>>> = Vec::new();
    let mut exterior_positive: Option<bool> = None;

    for ring in rings {
        let area = signed_area(&ring);
        if area == 0 {
            continue;
        }
        let positive = area > 0;
        let exterior = *exterior_positive.get_or_insert(positive);
        match polygons.last_mut() {
            Some(polygon) if positive != exterior => polygon.push(ring),
            _ => polygons.push(vec![ring]),
        }
    }
    polygons
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use prost::Message;
    use serde_json::json;

    use super::{MvtAdapter, classify_rings, decode_commands, proto, signed_area, zigzag_decode};
    use crate::tile::{FeatureGeometry, TileAdapter, TileData, TilePoint};

    fn zz(n: i32) -> u32 {
        ((n << 1) ^ (n >> 31)) as u32
    }

    fn cmd(id: u32, count: u32) -> u32 {
        (id & 0x7) | (count << 3)
    }

    fn sample_layer() -> proto::Layer {
        proto::Layer {
            version: 2,
            name: "water".to_string(),
            features: vec![
                proto::Feature {
                    id: Some(42),
                    tags: vec![0, 0, 1, 1],
                    r#type: Some(proto::GeomType::Polygon as i32),
                    // Square 0,0 -> 10,0 -> 10,10 -> 0,10, closed.
                    geometry: vec![
                        cmd(1, 1),
                        zz(0),
                        zz(0),
                        cmd(2, 3),
                        zz(10),
                        zz(0),
                        zz(0),
                        zz(10),
                        zz(-10),
                        zz(0),
                        cmd(7, 1),
                    ],
                },
                proto::Feature {
                    id: None,
                    tags: vec![],
                    r#type: Some(proto::GeomType::Point as i32),
                    geometry: vec![cmd(1, 2), zz(5), zz(5), zz(1), zz(-2)],
                },
            ],
            keys: vec!["class".to_string(), "depth".to_string()],
            values: vec![
                proto::Value {
                    string_value: Some("lake".to_string()),
                    ..Default::default()
                },
                proto::Value {
                    int_value: Some(12),
                    ..Default::default()
                },
            ],
            extent: Some(4096),
        }
    }

    #[test]
    fn zigzag_values() {
        assert_eq!(zigzag_decode(0), 0);
        assert_eq!(zigzag_decode(1), -1);
        assert_eq!(zigzag_decode(2), 1);
        assert_eq!(zigzag_decode(3), -2);
    }

    #[test]
    fn decodes_line_paths() {
        let commands = [
            cmd(1, 1),
            zz(2),
            zz(2),
            cmd(2, 2),
            zz(0),
            zz(8),
            zz(8),
            zz(0),
            cmd(1, 1),
            zz(-5),
            zz(-5),
            cmd(2, 1),
            zz(1),
            zz(1),
        ];
        let paths = decode_commands(&commands).expect("decode");
        assert_eq!(
            paths,
            vec![
                vec![TilePoint::new(2, 2), TilePoint::new(2, 10), TilePoint::new(10, 10)],
                vec![TilePoint::new(5, 5), TilePoint::new(6, 6)],
            ]
        );
    }

    #[test]
    fn rejects_truncated_and_unknown_commands() {
        assert!(decode_commands(&[cmd(1, 1), zz(3)]).is_err());
        assert!(decode_commands(&[cmd(2, 1), zz(1), zz(1)]).is_err());
        assert!(decode_commands(&[cmd(5, 1)]).is_err());
    }

    #[test]
    fn decodes_binary_tile() {
        let msg = proto::Tile {
            layers: vec![sample_layer()],
        };
        let bytes = msg.encode_to_vec();
        let adapter = MvtAdapter;
        assert!(adapter.can_process(&TileData::Binary(&bytes)));
        assert!(!adapter.can_process(&TileData::Binary(&[])));
        assert!(!adapter.can_process(&TileData::Json(&json!({}))));

        let tiles = adapter.decode(&TileData::Binary(&bytes)).expect("decode");
        assert_eq!(tiles.len(), 1);
        let tile = &tiles[0];
        assert_eq!(tile.layer, "water");
        assert_eq!(tile.extent, 4096);

        let poly = &tile.features[0];
        assert_eq!(poly.id.as_deref(), Some("42"));
        assert_eq!(poly.tags["class"], "lake");
        assert_eq!(poly.tags["depth"], 12);
        assert_eq!(
            poly.geometry,
            FeatureGeometry::Polygon(vec![vec![
                TilePoint::new(0, 0),
                TilePoint::new(10, 0),
                TilePoint::new(10, 10),
                TilePoint::new(0, 10),
            ]])
        );

        assert_eq!(
            tile.features[1].geometry,
            FeatureGeometry::Points(vec![TilePoint::new(5, 5), TilePoint::new(6, 3)])
        );
    }

    #[test]
    fn decodes_gzipped_tile() {
        let bytes = proto::Tile {
            layers: vec![sample_layer()],
        }
        .encode_to_vec();
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&bytes).expect("gzip write");
        let gz = enc.finish().expect("gzip finish");

        let tiles = MvtAdapter.decode(&TileData::Binary(&gz)).expect("decode");
        assert_eq!(tiles[0].features.len(), 2);
    }

    fn square_commands(x: i32, y: i32, size: i32) -> Vec<u32> {
        vec![
            cmd(1, 1),
            zz(x),
            zz(y),
            cmd(2, 3),
            zz(size),
            zz(0),
            zz(0),
            zz(size),
            zz(-size),
            zz(0),
            cmd(7, 1),
        ]
    }

    fn square(x: i32, y: i32, size: i32) -> Vec<TilePoint> {
        vec![
            TilePoint::new(x, y),
            TilePoint::new(x + size, y),
            TilePoint::new(x + size, y + size),
            TilePoint::new(x, y + size),
        ]
    }

    #[test]
    fn ring_winding_in_tile_space() {
        assert_eq!(signed_area(&square(0, 0, 10)), 200);
        let mut ccw = square(0, 0, 10);
        ccw.reverse();
        assert_eq!(signed_area(&ccw), -200);
        assert_eq!(signed_area(&[TilePoint::new(1, 1), TilePoint::new(2, 2)]), 0);
    }

    #[test]
    fn holes_attach_to_preceding_exterior() {
        let mut hole = square(2, 2, 2);
        hole.reverse();
        let polygons = classify_rings(vec![
            square(0, 0, 10),
            hole.clone(),
            vec![TilePoint::new(1, 1), TilePoint::new(3, 3)],
            square(20, 20, 5),
        ]);
        assert_eq!(
            polygons,
            vec![vec![square(0, 0, 10), hole], vec![square(20, 20, 5)]]
        );
    }

    #[test]
    fn flipped_winding_follows_first_ring() {
        let mut outer = square(0, 0, 10);
        outer.reverse();
        let polygons = classify_rings(vec![outer, square(2, 2, 2)]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].len(), 2);
    }

    #[test]
    fn disjoint_exteriors_decode_as_multipolygon() {
        let mut geometry = square_commands(0, 0, 10);
        // Cursor sits at (0, 10) after the first ring.
        geometry.extend(square_commands(20, 10, 10));
        let layer = proto::Layer {
            version: 2,
            name: "islands".to_string(),
            features: vec![proto::Feature {
                id: Some(7),
                tags: vec![],
                r#type: Some(proto::GeomType::Polygon as i32),
                geometry,
            }],
            keys: vec![],
            values: vec![],
            extent: Some(4096),
        };
        let bytes = proto::Tile { layers: vec![layer] }.encode_to_vec();
        let tiles = MvtAdapter.decode(&TileData::Binary(&bytes)).expect("decode");
        assert_eq!(
            tiles[0].features[0].geometry,
            FeatureGeometry::MultiPolygon(vec![vec![square(0, 0, 10)], vec![square(20, 20, 10)]])
        );
    }
}
