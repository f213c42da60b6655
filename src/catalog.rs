//! Layer Catalog
//!
//! The immutable pool of candidate map layers. Layers are loaded once from a
//! JSON array file and never mutated afterwards; the generator only reads them.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A single attribute value on a layer.
///
/// Catalog files carry strings (gamemode, map_size, team names), booleans
/// (helicopters, night) and the occasional number, so the value type mirrors
/// the JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

/// One selectable map layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    /// Full layer name, unique within the catalog (e.g. "Al Basrah AAS v1").
    #[serde(rename = "layer")]
    pub name: String,

    /// Underlying map name shared by all variants of the same map.
    pub map: String,

    /// Bugged layers are never eligible for selection.
    #[serde(default)]
    pub bugged: bool,

    /// Remaining descriptive attributes (gamemode, map_size, helicopters, ...).
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Layer {
    /// Resolve a filterable attribute by key.
    ///
    /// `layer` and `map` resolve to the layer name and base map; everything
    /// else resolves against the attribute mapping. Returns `None` for keys
    /// the layer does not define.
    pub fn attr(&self, key: &str) -> Option<AttrValue> {
        match key {
            "layer" => Some(AttrValue::Text(self.name.clone())),
            "map" => Some(AttrValue::Text(self.map.clone())),
            _ => self.attributes.get(key).cloned(),
        }
    }
}

/// Immutable collection of candidate layers.
#[derive(Debug, Clone)]
pub struct Catalog {
    layers: Vec<Layer>,
}

impl Catalog {
    /// Build a catalog from already-parsed layers.
    ///
    /// Rejects an empty layer list and duplicate layer names; the generator's
    /// without-replacement sampling keys on the name being unique.
    pub fn new(layers: Vec<Layer>) -> Result<Self, CatalogError> {
        if layers.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for layer in &layers {
            if !seen.insert(layer.name.as_str()) {
                return Err(CatalogError::DuplicateLayer(layer.name.clone()));
            }
        }
        Ok(Self { layers })
    }

    /// Load a catalog from a JSON array file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let layers: Vec<Layer> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), layers = layers.len(), "catalog parsed");
        Self::new(layers)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// All attribute keys defined by at least one layer, including the
    /// built-in `layer` and `map` keys and `team` when any layer carries
    /// team attributes.
    pub fn attribute_keys(&self) -> BTreeSet<String> {
        let mut keys: BTreeSet<String> = self
            .layers
            .iter()
            .flat_map(|layer| layer.attributes.keys().cloned())
            .collect();
        keys.insert("layer".to_string());
        keys.insert("map".to_string());
        if keys.contains("team1") || keys.contains("team2") {
            keys.insert("team".to_string());
        }
        keys
    }

    /// Whether any layer defines the given filterable attribute.
    pub fn defines_attribute(&self, key: &str) -> bool {
        match key {
            "layer" | "map" => true,
            "team" => self
                .layers
                .iter()
                .any(|l| l.attributes.contains_key("team1") || l.attributes.contains_key("team2")),
            _ => self.layers.iter().any(|l| l.attributes.contains_key(key)),
        }
    }
}
