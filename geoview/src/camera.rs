//! Camera state and its synchronization with the map widget.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::widget::MapWidget;

/// Geographic position in WGS84 degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLon {
    lat: f64,
    lon: f64,
}

impl LatLon {
    /// Creates a new position.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl From<[f64; 2]> for LatLon {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLon> for [f64; 2] {
    fn from(value: LatLon) -> Self {
        [value.lat, value.lon]
    }
}

/// Center and zoom level of the map viewport.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Center of the viewport.
    pub center: LatLon,
    /// Zoom level of the viewport.
    pub zoom: u8,
}

impl Camera {
    /// Creates a new camera.
    pub const fn new(center: LatLon, zoom: u8) -> Self {
        Self { center, zoom }
    }

    /// Readout of the camera position for a status bar.
    pub fn status(&self) -> CameraStatus {
        CameraStatus(*self)
    }
}

/// Status bar readout of a [`Camera`]: `LAT: -7.16500  LON: -78.50800  EPSG: 4326 (WGS84)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraStatus(Camera);

impl CameraStatus {
    /// Latitude with five decimals.
    pub fn lat(&self) -> String {
        format!("LAT: {:.5}", self.0.center.lat)
    }

    /// Longitude with five decimals.
    pub fn lon(&self) -> String {
        format!("LON: {:.5}", self.0.center.lon)
    }

    /// Coordinate reference of displayed coordinates.
    pub fn crs(&self) -> &'static str {
        "EPSG: 4326 (WGS84)"
    }
}

impl Display for CameraStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  {}  {}", self.lat(), self.lon(), self.crs())
    }
}

/// Remembers the last camera applied to the widget so that `set_view` is only issued when the
/// camera actually changes.
#[derive(Debug, Default, Clone)]
pub struct CameraSync {
    applied: Option<Camera>,
}

impl CameraSync {
    /// Creates a new instance that has not applied any camera yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last camera known to be shown by the widget.
    pub fn applied(&self) -> Option<Camera> {
        self.applied
    }

    /// Issues `set_view` to the widget if `camera` differs from the last applied one. Returns
    /// true if the command was issued.
    pub fn sync(&mut self, camera: Camera, widget: &mut dyn MapWidget) -> bool {
        if self.applied == Some(camera) {
            return false;
        }

        log::trace!(
            "Setting view to {:?} at zoom {}",
            camera.center,
            camera.zoom
        );
        widget.set_view(camera.center, camera.zoom);
        self.applied = Some(camera);

        true
    }

    /// Records a camera the widget moved to by itself (user panning or zooming), so it is not
    /// sent back to the widget.
    pub fn observe(&mut self, camera: Camera) {
        self.applied = Some(camera);
    }

    /// Forgets the applied camera, so the next [`CameraSync::sync`] always issues `set_view`.
    /// Used when the widget is recreated.
    pub fn reset(&mut self) {
        self.applied = None;
    }
}
