//! Boundary to the external map widget that draws tiles and overlays on screen.

use serde::{Deserialize, Serialize};

use crate::camera::LatLon;
use crate::layer::{LayerData, LayerDescriptor, LayerId, TaggedFeature};
use crate::popup::{PopupContent, PopupPalette, PopupPolicy};
use crate::style::{FeatureStyle, StylePolicy, Theme};

/// Map widget driven by the [`MapRenderer`](crate::MapRenderer).
///
/// The widget owns panning, zooming, tile fetching and popup display. The renderer only tells it
/// what to show.
pub trait MapWidget {
    /// Replaces the tiled base layer.
    fn set_base_layer(&mut self, base: &BaseLayer);
    /// Replaces the set of overlays, drawn in the given order. Overlays whose
    /// [`key`](Overlay::key) did not change may be kept as they are.
    fn set_overlays(&mut self, overlays: &[Overlay<'_>]);
    /// Moves the viewport.
    fn set_view(&mut self, center: LatLon, zoom: u8);
}

/// Credit line of a tile source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    text: String,
    url: Option<String>,
}

impl Attribution {
    /// Creates a new `Attribution` with the given text and optional URL.
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url,
        }
    }

    /// Attribution text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Link of the attribution, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Tiled base layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLayer {
    /// Tile url template with `{s}`, `{z}`, `{x}`, `{y}` and `{r}` placeholders.
    pub url_template: String,
    /// Credit line of the tile source.
    pub attribution: Attribution,
}

/// Base layers to use for each theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseMapConfig {
    /// Base layer of the dark theme.
    pub dark: BaseLayer,
    /// Base layer of the light theme.
    pub light: BaseLayer,
}

impl BaseMapConfig {
    /// Base layer for the theme.
    pub fn for_theme(&self, theme: Theme) -> &BaseLayer {
        match theme {
            Theme::Dark => &self.dark,
            Theme::Light => &self.light,
        }
    }
}

impl Default for BaseMapConfig {
    fn default() -> Self {
        let attribution = Attribution::new(
            "© OpenStreetMap contributors",
            Some("https://www.openstreetmap.org/copyright".into()),
        );

        Self {
            dark: BaseLayer {
                url_template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png"
                    .into(),
                attribution: attribution.clone(),
            },
            light: BaseLayer {
                url_template:
                    "https://{s}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png"
                        .into(),
                attribution,
            },
        }
    }
}

/// Identity of a rendered overlay. Changes whenever the overlay must be rebuilt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OverlayKey {
    /// Layer of the overlay.
    pub layer: LayerId,
    /// Revision of the layer's data.
    pub revision: u64,
}

/// A visible layer with loaded data, ready to be drawn by the widget.
///
/// The widget asks the overlay for the style and popup of each feature.
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    layer: &'a LayerDescriptor,
    data: &'a LayerData,
    theme: Theme,
    style_policy: &'a StylePolicy,
    popup_policy: &'a PopupPolicy,
}

impl<'a> Overlay<'a> {
    pub(crate) fn new(
        layer: &'a LayerDescriptor,
        data: &'a LayerData,
        theme: Theme,
        style_policy: &'a StylePolicy,
        popup_policy: &'a PopupPolicy,
    ) -> Self {
        Self {
            layer,
            data,
            theme,
            style_policy,
            popup_policy,
        }
    }

    /// Identity of the overlay.
    pub fn key(&self) -> OverlayKey {
        OverlayKey {
            layer: self.layer.id,
            revision: self.data.revision(),
        }
    }

    /// Layer the overlay draws.
    pub fn layer(&self) -> &'a LayerDescriptor {
        self.layer
    }

    /// Features to draw.
    pub fn features(&self) -> &'a [TaggedFeature] {
        self.data.features()
    }

    /// Style of one of the overlay's features.
    pub fn style(&self, feature: &TaggedFeature) -> FeatureStyle {
        self.style_policy
            .style_feature(self.layer, feature, self.theme)
    }

    /// Popup shown when the feature is clicked.
    pub fn popup(&self, feature: &TaggedFeature) -> Option<PopupContent> {
        self.popup_policy.popup(feature)
    }

    /// Colors of the overlay's popups.
    pub fn popup_palette(&self) -> PopupPalette {
        PopupPalette::for_theme(self.theme)
    }
}
