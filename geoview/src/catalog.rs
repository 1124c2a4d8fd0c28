//! Static table of map selections and the layers each of them shows.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, LatLon};
use crate::error::GeoviewError;
use crate::layer::{LayerDescriptor, LayerId};
use crate::Color;

/// Identifier of a map selection.
pub type SelectionId = u32;

/// Configuration of one overlay layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    /// Layer id, unique within the selection.
    pub id: LayerId,
    /// Display label.
    pub name: String,
    /// Color of the layer's features.
    pub color: Color,
    /// Visibility of the layer right after the selection is activated.
    #[serde(default = "default_visible")]
    pub default_visible: bool,
    /// Location of the GeoJSON dataset.
    pub source_location: String,
}

fn default_visible() -> bool {
    true
}

impl LayerConfig {
    fn descriptor(&self) -> LayerDescriptor {
        LayerDescriptor::new(
            self.id,
            self.name.clone(),
            self.default_visible,
            self.color,
            self.source_location.clone(),
        )
    }
}

/// Configuration of one map selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionConfig {
    /// Short label used in the map picker.
    pub name: String,
    /// Longer title used in the breadcrumb. Defaults to the name.
    #[serde(default)]
    pub title: Option<String>,
    /// Camera center applied when the selection is activated.
    pub default_center: LatLon,
    /// Zoom level applied when the selection is activated.
    pub default_zoom: u8,
    /// Layers of the selection in legend order.
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
}

impl SelectionConfig {
    /// Title of the selection, falling back to its name.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Camera applied when the selection is activated.
    pub fn default_camera(&self) -> Camera {
        Camera::new(self.default_center, self.default_zoom)
    }
}

/// Closed set of map selections.
///
/// The catalog is plain data. It can be built in code, parsed from JSON with the shape
///
/// ```json
/// { "1": { "name": "Ambiental", "defaultCenter": [4.61, -74.05], "defaultZoom": 13,
///          "layers": [{ "id": 201, "name": "Hidrología", "color": "#3b82f6",
///                       "defaultVisible": true, "sourceLocation": "/maps/Map2/layer2.json" }] } }
/// ```
///
/// or taken from [`Catalog::default`], which contains the four built-in views. Layer colors are
/// hex strings or basic CSS color names (see [`Color::parse`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    selections: BTreeMap<SelectionId, SelectionConfig>,
}

impl Catalog {
    /// Creates a catalog from the given selections.
    pub fn new(selections: impl IntoIterator<Item = (SelectionId, SelectionConfig)>) -> Self {
        Self {
            selections: selections.into_iter().collect(),
        }
    }

    /// Parses a catalog from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, GeoviewError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a catalog from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GeoviewError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Returns the configuration of the selection.
    pub fn get(&self, id: SelectionId) -> Option<&SelectionConfig> {
        self.selections.get(&id)
    }

    /// Iterates over the selections in id order.
    pub fn selections(&self) -> impl Iterator<Item = (SelectionId, &SelectionConfig)> {
        self.selections.iter().map(|(id, config)| (*id, config))
    }

    /// Produces the layer descriptors of the selection, in catalog order, with default visibility
    /// and no data. Unknown selections have no layers.
    pub fn resolve(&self, id: SelectionId) -> Vec<LayerDescriptor> {
        match self.selections.get(&id) {
            Some(selection) => selection.layers.iter().map(LayerConfig::descriptor).collect(),
            None => {
                log::debug!("Selection {id} is not in the catalog");
                vec![]
            }
        }
    }

    /// Default camera of the selection, if the selection exists.
    pub fn default_camera(&self, id: SelectionId) -> Option<Camera> {
        self.selections.get(&id).map(SelectionConfig::default_camera)
    }
}

const CAJAMARCA: LatLon = LatLon::new(-7.165, -78.508);
const BOGOTA: LatLon = LatLon::new(4.61, -74.05);

fn layer(id: u32, name: &str, color: &'static str, visible: bool, source: &str) -> LayerConfig {
    LayerConfig {
        id: LayerId(id),
        name: name.into(),
        color: Color::from_hex(color),
        default_visible: visible,
        source_location: source.into(),
    }
}

fn selection(
    name: &str,
    title: &str,
    center: LatLon,
    zoom: u8,
    layers: Vec<LayerConfig>,
) -> SelectionConfig {
    SelectionConfig {
        name: name.into(),
        title: Some(title.into()),
        default_center: center,
        default_zoom: zoom,
        layers,
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new([
            (
                1,
                selection(
                    "Infraestructura",
                    "Infraestructura Urbana",
                    CAJAMARCA,
                    16,
                    vec![
                        layer(101, "Parques", "#10b981", true, "/maps/Map1/prueba_wgs84.json"),
                        layer(
                            102,
                            "Calles de Cajamarca",
                            "#000000",
                            true,
                            "/maps/Map1/calles_wgs84.json",
                        ),
                        layer(
                            103,
                            "Límites Administrativos",
                            "#3b82f6",
                            false,
                            "/maps/Map1/layer1.json",
                        ),
                    ],
                ),
            ),
            (
                2,
                selection(
                    "Ambiental",
                    "Ambiental",
                    BOGOTA,
                    13,
                    vec![
                        layer(201, "Parques y Recreación", "#10b981", true, "/maps/Map2/layer1.json"),
                        layer(202, "Hidrología", "#3b82f6", true, "/maps/Map2/layer2.json"),
                    ],
                ),
            ),
            (
                3,
                selection(
                    "Servicios",
                    "Servicios Públicos",
                    BOGOTA,
                    13,
                    vec![layer(301, "Red de Servicios", "#f59e0b", true, "/maps/Map3/layer1.json")],
                ),
            ),
            (
                4,
                selection(
                    "Sociocultural",
                    "Mapa Social",
                    BOGOTA,
                    13,
                    vec![layer(401, "Demografía", "#8b5cf6", true, "/maps/Map4/layer1.json")],
                ),
            ),
        ])
    }
}
