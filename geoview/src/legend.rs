//! Legend and layer panel entries derived from the layer list.

use crate::layer::{LayerDescriptor, LayerId, LoadState};
use crate::Color;

/// Availability of a layer's data as shown to the user.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerStatus {
    /// The dataset is still loading.
    Loading,
    /// The dataset is loaded and can be drawn.
    Ready,
    /// The dataset could not be loaded.
    Unavailable,
}

impl From<&LoadState> for LayerStatus {
    fn from(state: &LoadState) -> Self {
        match state {
            LoadState::Pending => LayerStatus::Loading,
            LoadState::Loaded(_) => LayerStatus::Ready,
            LoadState::Failed => LayerStatus::Unavailable,
        }
    }
}

/// One line of the map legend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Layer the entry describes.
    pub layer_id: LayerId,
    /// Layer name.
    pub name: String,
    /// Layer color.
    pub color: Color,
    /// Whether the user has the layer switched on.
    pub visible: bool,
    /// Data availability.
    pub status: LayerStatus,
}

impl LegendEntry {
    /// Hidden and unavailable layers are still listed, but drawn de-emphasized.
    pub fn is_dimmed(&self) -> bool {
        !self.visible || self.status != LayerStatus::Ready
    }
}

/// Legend entries of all layers, visible or not, in catalog order.
pub fn legend(layers: &[LayerDescriptor]) -> Vec<LegendEntry> {
    layers
        .iter()
        .map(|layer| LegendEntry {
            layer_id: layer.id,
            name: layer.name.clone(),
            color: layer.color,
            visible: layer.visible,
            status: layer.state().into(),
        })
        .collect()
}

/// Contents of the sidebar layer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerPanel {
    /// The active selection has no layers.
    Empty,
    /// Checkbox entries, in catalog order. `visible` is the checkbox state.
    Layers(Vec<LegendEntry>),
}

/// Builds the sidebar layer list.
pub fn layer_panel(layers: &[LayerDescriptor]) -> LayerPanel {
    if layers.is_empty() {
        LayerPanel::Empty
    } else {
        LayerPanel::Layers(legend(layers))
    }
}
