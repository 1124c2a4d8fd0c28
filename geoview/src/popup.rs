//! Popup summaries of feature attributes.

use geojson::JsonObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::layer::TaggedFeature;
use crate::style::Theme;
use crate::Color;

/// Structured popup of a feature: a title followed by key/value lines in property order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    /// Heading of the popup.
    pub title: String,
    /// Attribute lines.
    pub entries: Vec<PopupEntry>,
}

/// One attribute line of a popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupEntry {
    /// Property name.
    pub key: String,
    /// Property value as displayed text.
    pub value: String,
}

/// Rules deciding which properties a popup shows.
///
/// Which keys are bookkeeping depends on the datasets, so all of it is configurable. The defaults
/// hide the shapefile feature id (`FID`), the `color` attribute, and every property that is null
/// or numeric zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PopupPolicy {
    /// Properties used as the title, first non-empty one wins.
    pub title_keys: Vec<String>,
    /// Title used when none of `title_keys` has a value.
    pub fallback_title: String,
    /// Properties that are never listed.
    pub excluded_keys: Vec<String>,
    /// Skip properties whose value is numeric zero.
    pub hide_zero: bool,
    /// Skip properties whose value is null.
    pub hide_null: bool,
}

impl Default for PopupPolicy {
    fn default() -> Self {
        Self {
            title_keys: vec!["Nombre".into(), "name".into()],
            fallback_title: "Detalles".into(),
            excluded_keys: vec!["FID".into(), "color".into()],
            hide_zero: true,
            hide_null: true,
        }
    }
}

impl PopupPolicy {
    /// Builds the popup of a feature. Features without a properties object have no popup.
    pub fn popup(&self, feature: &TaggedFeature) -> Option<PopupContent> {
        feature
            .properties()
            .map(|properties| self.popup_for_properties(properties))
    }

    /// Builds a popup from a properties object.
    pub fn popup_for_properties(&self, properties: &JsonObject) -> PopupContent {
        let title = self.title_keys.iter().find_map(|key| {
            properties
                .get(key)
                .filter(|value| is_truthy(value))
                .map(|value| (key.as_str(), display_value(value)))
        });

        let (title_key, title) = match title {
            Some((key, title)) => (Some(key), title),
            None => (None, self.fallback_title.clone()),
        };

        let entries = properties
            .iter()
            .filter(|(key, _)| Some(key.as_str()) != title_key)
            .filter(|(key, value)| self.is_listed(key, value))
            .map(|(key, value)| PopupEntry {
                key: key.clone(),
                value: display_value(value),
            })
            .collect();

        PopupContent { title, entries }
    }

    fn is_listed(&self, key: &str, value: &Value) -> bool {
        if self.excluded_keys.iter().any(|excluded| excluded == key) {
            return false;
        }

        match value {
            Value::Null => !self.hide_null,
            Value::Number(n) if n.as_f64() == Some(0.0) => !self.hide_zero,
            _ => true,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Colors of a popup under a theme.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PopupPalette {
    /// Popup background.
    pub background: Color,
    /// Attribute text.
    pub text: Color,
    /// Title text.
    pub title: Color,
    /// Line under the title.
    pub divider: Color,
}

impl PopupPalette {
    /// Palette matching the theme.
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::from_hex("#1E293B"),
                text: Color::from_hex("#E2E8F0"),
                title: Color::from_hex("#60A5FA"),
                divider: Color::from_hex("#334155"),
            },
            Theme::Light => Self {
                background: Color::WHITE,
                text: Color::from_hex("#1E293B"),
                title: Color::from_hex("#3B82F6"),
                divider: Color::from_hex("#E2E8F0"),
            },
        }
    }
}
