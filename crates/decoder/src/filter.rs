use formats::{Feature, GeometryType};
use serde::{Deserialize, Serialize};

/// Predicate consulted by the decoder before a layer or feature is decoded.
pub trait FeatureFilter: std::fmt::Debug + Send + Sync {
    fn wants_layer(&self, layer: &str, level: u32) -> bool;

    fn wants_feature(&self, layer: &str, feature: &Feature, level: u32) -> bool;
}

/// Layer name pattern with an inclusive level range.
///
/// A trailing `*` in `name` matches any suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRule {
    pub name: String,
    #[serde(default)]
    pub min_level: u32,
    #[serde(default = "LayerRule::default_max_level")]
    pub max_level: u32,
}

impl LayerRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: 0,
            max_level: Self::default_max_level(),
        }
    }

    pub fn with_levels(mut self, min_level: u32, max_level: u32) -> Self {
        self.min_level = min_level;
        self.max_level = max_level;
        self
    }

    fn default_max_level() -> u32 {
        u32::MAX
    }

    pub fn matches(&self, layer: &str, level: u32) -> bool {
        if level < self.min_level || level > self.max_level {
            return false;
        }
        match self.name.strip_suffix('*') {
            Some(prefix) => layer.starts_with(prefix),
            None => layer == self.name,
        }
    }
}

/// Declarative filter configuration, usually loaded from JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterDescription {
    /// Layers to decode; empty means every layer.
    #[serde(default)]
    pub process_layers: Vec<LayerRule>,
    /// Layers to skip; checked before `process_layers`.
    #[serde(default)]
    pub ignore_layers: Vec<LayerRule>,
    /// Geometry types to decode; `None` means every type.
    #[serde(default)]
    pub geometry_types: Option<Vec<GeometryType>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericFeatureFilter {
    description: FilterDescription,
}

impl GenericFeatureFilter {
    pub fn new(description: FilterDescription) -> Self {
        Self { description }
    }

    pub fn description(&self) -> &FilterDescription {
        &self.description
    }
}

impl FeatureFilter for GenericFeatureFilter {
    fn wants_layer(&self, layer: &str, level: u32) -> bool {
        let d = &self.description;
        if d.ignore_layers.iter().any(|r| r.matches(layer, level)) {
            return false;
        }
        d.process_layers.is_empty() || d.process_layers.iter().any(|r| r.matches(layer, level))
    }

    fn wants_feature(&self, _layer: &str, feature: &Feature, _level: u32) -> bool {
        match &self.description.geometry_types {
            Some(types) => types.contains(&feature.geometry_type()),
            None => true,
        }
    }
}
