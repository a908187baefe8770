//! Decoded tile model shared by every tile format.
//!
//! Coordinates are tile-local integers in `0..=extent` (buffered geometry may
//! step slightly outside). A `Tile` is transient: it is produced by an
//! adapter, handed to one decode call and dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default tile-local coordinate range shared by both tile encodings.
pub const DEFAULT_EXTENT: u32 = 4096;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

impl TilePoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryType {
    #[serde(rename = "point")]
    Point,
    #[serde(rename = "line")]
    LineString,
    #[serde(rename = "polygon")]
    Polygon,
    #[serde(rename = "unknown")]
    Unknown,
}

impl GeometryType {
    /// Name used for the `$geometryType` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryType::Point => "point",
            GeometryType::LineString => "line",
            GeometryType::Polygon => "polygon",
            GeometryType::Unknown => "unknown",
        }
    }
}

/// Geometry of one feature in tile-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Points(Vec<TilePoint>),
    /// One entry per sub-path.
    Lines(Vec<Vec<TilePoint>>),
    /// Rings in input order; the first is the outer boundary. Rings are
    /// closed implicitly (no repeated first vertex required).
    Polygon(Vec<Vec<TilePoint>>),
    /// Several polygons, each laid out like [`FeatureGeometry::Polygon`].
    MultiPolygon(Vec<Vec<Vec<TilePoint>>>),
    Unknown,
}

impl FeatureGeometry {
    pub fn geometry_type(&self) -> GeometryType {
        match self {
            FeatureGeometry::Points(_) => GeometryType::Point,
            FeatureGeometry::Lines(_) => GeometryType::LineString,
            FeatureGeometry::Polygon(_) | FeatureGeometry::MultiPolygon(_) => GeometryType::Polygon,
            FeatureGeometry::Unknown => GeometryType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub tags: Map<String, Value>,
    pub geometry: FeatureGeometry,
}

impl Feature {
    pub fn new(geometry: FeatureGeometry) -> Self {
        Self {
            id: None,
            tags: Map::new(),
            geometry,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry.geometry_type()
    }
}

/// One layer of decoded tile features.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub layer: String,
    pub extent: u32,
    pub features: Vec<Feature>,
}

impl Tile {
    pub fn new(layer: impl Into<String>, extent: u32) -> Self {
        Self {
            layer: layer.into(),
            extent,
            features: Vec::new(),
        }
    }
}

/// Raw tile payload as handed to format detection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TileData<'a> {
    Binary(&'a [u8]),
    Json(&'a Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The adapter does not handle this kind of payload.
    UnsupportedInput,
    MissingField { field: &'static str },
    InvalidFeature { index: usize, reason: String },
    Protobuf { reason: String },
    Decompress { reason: String },
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::UnsupportedInput => write!(f, "unsupported tile payload"),
            FormatError::MissingField { field } => write!(f, "tile missing field: {field}"),
            FormatError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
            FormatError::Protobuf { reason } => write!(f, "protobuf decode error: {reason}"),
            FormatError::Decompress { reason } => write!(f, "decompression error: {reason}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Format detection and decoding for one tile encoding.
///
/// `can_process` is a pure predicate; callers try adapters in turn and use
/// the first that accepts the payload.
pub trait TileAdapter {
    fn can_process(&self, data: &TileData<'_>) -> bool;

    /// Decodes the payload into one `Tile` per layer.
    fn decode(&self, data: &TileData<'_>) -> Result<Vec<Tile>, FormatError>;
}

/// Decodes `data` with the first adapter that accepts it.
pub fn decode_with(
    adapters: &[&dyn TileAdapter],
    data: &TileData<'_>,
) -> Result<Vec<Tile>, FormatError> {
    adapters
        .iter()
        .find(|a| a.can_process(data))
        .ok_or(FormatError::UnsupportedInput)?
        .decode(data)
}
