//! [Layers](LayerDescriptor) are the overlay datasets of a map selection together with their
//! presentation metadata and load state.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use geojson::{Feature, FeatureCollection, JsonObject, Value};
use serde::{Deserialize, Serialize};

use crate::Color;

pub mod data_provider;

/// Identifier of a layer. Unique within one map selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

impl Display for LayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Load lifecycle of a layer's dataset.
///
/// A descriptor starts as `Pending` and moves to `Loaded` or `Failed` exactly once per load
/// batch. The state never reverts; a new batch produces new descriptors.
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    /// The dataset has not been fetched yet.
    #[default]
    Pending,
    /// The dataset was fetched and decoded.
    Loaded(Arc<LayerData>),
    /// Fetching or decoding failed. The layer is shown as unavailable.
    Failed,
}

impl LoadState {
    /// Returns true if the load finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }
}

/// One overlay dataset of a map selection.
#[derive(Debug, Clone)]
pub struct LayerDescriptor {
    /// Stable identity of the layer, used for toggling and as a render key.
    pub id: LayerId,
    /// Display label.
    pub name: String,
    /// Whether the user wants the layer drawn.
    pub visible: bool,
    /// Stroke color and fallback fill color of the layer's features.
    pub color: Color,
    source: String,
    state: LoadState,
}

impl LayerDescriptor {
    /// Creates a descriptor with no data attached.
    pub fn new(
        id: LayerId,
        name: impl Into<String>,
        visible: bool,
        color: Color,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            visible,
            color,
            source: source.into(),
            state: LoadState::Pending,
        }
    }

    /// Location of the dataset (URL or path).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Load state of the dataset.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Loaded dataset, if the load succeeded.
    pub fn data(&self) -> Option<&Arc<LayerData>> {
        match &self.state {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Returns true if the layer's data is available for rendering.
    pub fn is_available(&self) -> bool {
        self.data().is_some()
    }

    /// Returns a copy of the descriptor with the given load state. The original is not modified.
    pub fn with_state(&self, state: LoadState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Flips the visibility flag. The data is not touched.
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

/// Parsed feature collection of one layer.
///
/// Every feature is tagged with the id of the layer it was loaded for, so the owner of a feature
/// is known without searching the layer list.
#[derive(Debug)]
pub struct LayerData {
    revision: u64,
    features: Vec<TaggedFeature>,
}

impl LayerData {
    /// Tags every feature of the collection with the given layer id.
    pub fn new(layer: LayerId, collection: FeatureCollection) -> Self {
        static REVISION: AtomicU64 = AtomicU64::new(1);

        let features = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| TaggedFeature {
                layer,
                index,
                feature,
            })
            .collect();

        Self {
            revision: REVISION.fetch_add(1, Ordering::Relaxed),
            features,
        }
    }

    /// Number that is different for every loaded collection. Used to tell the map widget an
    /// overlay must be rebuilt.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Features of the layer in document order.
    pub fn features(&self) -> &[TaggedFeature] {
        &self.features
    }

    /// Returns true if the collection has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of features in the collection.
    pub fn len(&self) -> usize {
        self.features.len()
    }
}

/// A GeoJSON feature together with the id of the layer that owns it.
#[derive(Debug, Clone)]
pub struct TaggedFeature {
    layer: LayerId,
    index: usize,
    feature: Feature,
}

impl TaggedFeature {
    /// Creates a tagged feature.
    pub fn new(layer: LayerId, index: usize, feature: Feature) -> Self {
        Self {
            layer,
            index,
            feature,
        }
    }

    /// Id of the owning layer.
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Position of the feature in its collection.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The underlying GeoJSON feature.
    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Attribute properties of the feature.
    pub fn properties(&self) -> Option<&JsonObject> {
        self.feature.properties.as_ref()
    }

    /// Kind of the feature's geometry.
    pub fn geometry_kind(&self) -> GeometryKind {
        self.feature
            .geometry
            .as_ref()
            .map(|geometry| GeometryKind::of(&geometry.value))
            .unwrap_or(GeometryKind::Empty)
    }
}

/// Geometry kind of a feature. Only used to choose the feature's style.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// `Point`
    Point,
    /// `MultiPoint`
    MultiPoint,
    /// `LineString`
    LineString,
    /// `MultiLineString`
    MultiLineString,
    /// `Polygon`
    Polygon,
    /// `MultiPolygon`
    MultiPolygon,
    /// `GeometryCollection`
    GeometryCollection,
    /// The feature has no geometry.
    Empty,
}

impl GeometryKind {
    /// Kind of the given GeoJSON geometry value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Point(_) => Self::Point,
            Value::MultiPoint(_) => Self::MultiPoint,
            Value::LineString(_) => Self::LineString,
            Value::MultiLineString(_) => Self::MultiLineString,
            Value::Polygon(_) => Self::Polygon,
            Value::MultiPolygon(_) => Self::MultiPolygon,
            Value::GeometryCollection(_) => Self::GeometryCollection,
        }
    }

    /// Returns true for `LineString` and `MultiLineString`.
    pub fn is_line(&self) -> bool {
        matches!(self, Self::LineString | Self::MultiLineString)
    }
}
