use formats::{Feature, GeometryType};
use serde_json::{Map, Value};

pub const LAYER_KEY: &str = "$layer";
pub const GEOMETRY_TYPE_KEY: &str = "$geometryType";
pub const LEVEL_KEY: &str = "$level";
pub const ID_KEY: &str = "$id";

/// Attribute map a feature is styled with: its tags plus the synthesized
/// `$layer`, `$geometryType`, `$level` (and `$id` when the feature has one).
///
/// Synthesized keys win over tags of the same name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    entries: Map<String, Value>,
}

impl Environment {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    pub fn for_feature(feature: &Feature, layer: &str, level: u32) -> Self {
        let mut entries = feature.tags.clone();
        entries.insert(LAYER_KEY.to_string(), Value::from(layer));
        entries.insert(
            GEOMETRY_TYPE_KEY.to_string(),
            Value::from(feature.geometry_type().as_str()),
        );
        entries.insert(LEVEL_KEY.to_string(), Value::from(level));
        if let Some(id) = &feature.id {
            entries.insert(ID_KEY.to_string(), Value::from(id.as_str()));
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn layer(&self) -> Option<&str> {
        self.get(LAYER_KEY).and_then(Value::as_str)
    }

    pub fn geometry_type(&self) -> Option<GeometryType> {
        match self.get(GEOMETRY_TYPE_KEY).and_then(Value::as_str)? {
            "point" => Some(GeometryType::Point),
            "line" => Some(GeometryType::LineString),
            "polygon" => Some(GeometryType::Polygon),
            "unknown" => Some(GeometryType::Unknown),
            _ => None,
        }
    }

    pub fn level(&self) -> Option<u32> {
        self.get(LEVEL_KEY)
            .and_then(Value::as_u64)
            .and_then(|l| u32::try_from(l).ok())
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
