use std::path::Path;

use foundation::TileKey;
use formats::{GeoJsonVtAdapter, TileData};
use serde_json::Value;

/// Raw tile payload read from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum TileInput {
    Binary(Vec<u8>),
    Json(Value),
}

impl TileInput {
    /// Reads `path`; payloads that parse as JSON are treated as tile objects,
    /// everything else as binary.
    pub fn read(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|e| format!("read {path:?}: {e}"))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) if value.is_object() => TileInput::Json(value),
            _ => TileInput::Binary(bytes),
        }
    }

    pub fn as_data(&self) -> TileData<'_> {
        match self {
            TileInput::Binary(bytes) => TileData::Binary(bytes),
            TileInput::Json(value) => TileData::Json(value),
        }
    }

    /// Tile address embedded in the payload (JSON tiles only). Addresses
    /// outside their level are rejected like `--tile` values are.
    pub fn embedded_key(&self) -> Result<Option<TileKey>, String> {
        let key = match self {
            TileInput::Json(value) => GeoJsonVtAdapter::tile_key(value),
            TileInput::Binary(_) => None,
        };
        match key {
            Some(key) if !key.is_valid() => Err(format!("embedded tile {key} is outside its level")),
            key => Ok(key),
        }
    }
}

/// Parses `z/x/y`.
pub fn parse_tile_key(s: &str) -> Result<TileKey, String> {
    let parts: Vec<&str> = s.split('/').collect();
    let [z, x, y] = parts.as_slice() else {
        return Err(format!("tile key must be z/x/y, got {s:?}"));
    };
    let num = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid tile coordinate {v:?}: {e}"))
    };
    let key = TileKey::from_slippy(num(x)?, num(y)?, num(z)?);
    if !key.is_valid() {
        return Err(format!("tile {s} is outside its level"));
    }
    Ok(key)
}
