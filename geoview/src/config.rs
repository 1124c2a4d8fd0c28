//! Viewer configuration document.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, SelectionId};
use crate::error::GeoviewError;
use crate::popup::PopupPolicy;
use crate::style::{StylePolicy, Theme};
use crate::widget::BaseMapConfig;

/// Everything configurable about the viewer. Missing fields take their default values, so an
/// empty JSON object is a valid configuration equal to [`GeoviewConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeoviewConfig {
    /// Map selections and their layers.
    pub catalog: Catalog,
    /// Base tile layers per theme.
    pub base_map: BaseMapConfig,
    /// Feature styling parameters.
    pub style: StylePolicy,
    /// Popup content rules.
    pub popup: PopupPolicy,
    /// Selection active after start.
    pub initial_selection: SelectionId,
    /// Theme active after start.
    pub theme: Theme,
    /// Time limit of a single dataset fetch in milliseconds. No limit if absent.
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for GeoviewConfig {
    fn default() -> Self {
        Self {
            catalog: Catalog::default(),
            base_map: BaseMapConfig::default(),
            style: StylePolicy::default(),
            popup: PopupPolicy::default(),
            initial_selection: 1,
            theme: Theme::Dark,
            fetch_timeout_ms: None,
        }
    }
}

impl GeoviewConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, GeoviewError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GeoviewError> {
        let path = path.as_ref();
        log::info!("Reading configuration from {}", path.display());
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Time limit of a single dataset fetch.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}
