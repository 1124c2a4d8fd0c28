//! Translation of the viewer state into commands for the map widget.

use crate::camera::{Camera, CameraSync};
use crate::config::GeoviewConfig;
use crate::layer::{LayerData, LayerDescriptor};
use crate::popup::PopupPolicy;
use crate::style::{StylePolicy, Theme};
use crate::viewer::Viewer;
use crate::widget::{BaseMapConfig, MapWidget, Overlay, OverlayKey};

/// Layers that are drawn: visible and with loaded data, in catalog order.
pub fn active_layers(layers: &[LayerDescriptor]) -> Vec<(&LayerDescriptor, &LayerData)> {
    layers
        .iter()
        .filter(|layer| layer.visible)
        .filter_map(|layer| layer.data().map(|data| (layer, data.as_ref())))
        .collect()
}

/// Drives a [`MapWidget`] from the viewer state.
///
/// The renderer remembers what it last sent to the widget and only issues a command when the
/// corresponding part of the state changed. Calling [`MapRenderer::render`] after every redraw
/// request is therefore cheap, and the widget keeps its own panning and zooming between calls.
#[derive(Debug, Default)]
pub struct MapRenderer {
    style_policy: StylePolicy,
    popup_policy: PopupPolicy,
    base_map: BaseMapConfig,
    camera_sync: CameraSync,
    applied_theme: Option<Theme>,
    applied_overlays: Option<(Theme, Vec<OverlayKey>)>,
}

impl MapRenderer {
    /// Creates a renderer with the given policies.
    pub fn new(
        style_policy: StylePolicy,
        popup_policy: PopupPolicy,
        base_map: BaseMapConfig,
    ) -> Self {
        Self {
            style_policy,
            popup_policy,
            base_map,
            camera_sync: CameraSync::new(),
            applied_theme: None,
            applied_overlays: None,
        }
    }

    /// Creates a renderer with the policies of the configuration.
    pub fn from_config(config: &GeoviewConfig) -> Self {
        Self::new(
            config.style.clone(),
            config.popup.clone(),
            config.base_map.clone(),
        )
    }

    /// Style policy used for overlays.
    pub fn style_policy(&self) -> &StylePolicy {
        &self.style_policy
    }

    /// Popup policy used for overlays.
    pub fn popup_policy(&self) -> &PopupPolicy {
        &self.popup_policy
    }

    /// Brings the widget in line with the viewer.
    pub fn render(&mut self, viewer: &Viewer, widget: &mut dyn MapWidget) {
        self.render_state(viewer.layers(), viewer.camera(), viewer.theme(), widget);
    }

    /// Brings the widget in line with the given layers, camera and theme.
    pub fn render_state(
        &mut self,
        layers: &[LayerDescriptor],
        camera: Camera,
        theme: Theme,
        widget: &mut dyn MapWidget,
    ) {
        if self.applied_theme != Some(theme) {
            log::debug!("Switching base layer to {theme:?} theme");
            widget.set_base_layer(self.base_map.for_theme(theme));
            self.applied_theme = Some(theme);
        }

        let active = active_layers(layers);
        let keys: Vec<OverlayKey> = active
            .iter()
            .map(|(layer, data)| OverlayKey {
                layer: layer.id,
                revision: data.revision(),
            })
            .collect();

        let changed = match &self.applied_overlays {
            Some((applied_theme, applied_keys)) => {
                *applied_theme != theme || *applied_keys != keys
            }
            None => true,
        };

        if changed {
            let overlays: Vec<Overlay<'_>> = active
                .iter()
                .map(|(layer, data)| {
                    Overlay::new(layer, data, theme, &self.style_policy, &self.popup_policy)
                })
                .collect();

            log::debug!("Updating overlays: {} layers", overlays.len());
            widget.set_overlays(&overlays);
            self.applied_overlays = Some((theme, keys));
        }

        self.camera_sync.sync(camera, widget);
    }

    /// Records a camera the widget moved to on its own, so it is not sent back.
    pub fn observe_camera(&mut self, camera: Camera) {
        self.camera_sync.observe(camera);
    }

    /// Forgets everything sent to the widget. The next render issues all commands again.
    pub fn reset(&mut self) {
        self.camera_sync.reset();
        self.applied_theme = None;
        self.applied_overlays = None;
    }
}
