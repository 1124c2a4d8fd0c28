//! Per-feature styling of overlay layers.

use serde::{Deserialize, Serialize};

use crate::layer::{GeometryKind, LayerDescriptor, TaggedFeature};
use crate::Color;

/// Color scheme of the application.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark base map, light strokes.
    #[default]
    Dark,
    /// Light base map, dark strokes.
    Light,
}

impl Theme {
    /// The other theme.
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Accent color of the shell for this theme.
    pub fn accent_color(&self) -> Color {
        match self {
            Theme::Dark => Color::from_hex("#60A5FA"),
            Theme::Light => Color::from_hex("#2563EB"),
        }
    }
}

/// How the outline of a feature is drawn.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StrokePattern {
    /// Continuous line.
    Solid,
    /// Dashes and gaps of the given length in pixels.
    Dashed(f64),
}

/// Visual style of a single feature, as handed to the map widget.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FeatureStyle {
    /// Outline color.
    pub stroke_color: Color,
    /// Outline width in pixels.
    pub stroke_weight: f64,
    /// Outline opacity in `0.0..=1.0`.
    pub stroke_opacity: f64,
    /// Outline pattern.
    pub stroke_pattern: StrokePattern,
    /// Interior color.
    pub fill_color: Color,
    /// Interior opacity in `0.0..=1.0`.
    pub fill_opacity: f64,
}

/// Parameters of feature styling.
///
/// Lines get a solid stroke of `line_weight` and no fill. Other geometries get a dashed stroke of
/// `area_weight` and are filled with the layer color at `area_fill_opacity`.
///
/// The stroke color is remapped by theme: a nearly black layer color is drawn with
/// `dark_theme_stroke` on the dark theme and a nearly white one with `light_theme_stroke` on the
/// light theme. Fill color is never remapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StylePolicy {
    /// Stroke width of line geometries.
    pub line_weight: f64,
    /// Stroke width of non-line geometries.
    pub area_weight: f64,
    /// Dash length of non-line geometries.
    pub area_dash: f64,
    /// Fill opacity of non-line geometries.
    pub area_fill_opacity: f64,
    /// Stroke opacity of all geometries.
    pub stroke_opacity: f64,
    /// Colors with luminance at or below this value count as black.
    pub near_black_luminance: f64,
    /// Colors with luminance at or above this value count as white.
    pub near_white_luminance: f64,
    /// Stroke used instead of black on the dark theme.
    pub dark_theme_stroke: Color,
    /// Stroke used instead of white on the light theme.
    pub light_theme_stroke: Color,
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self {
            line_weight: 3.0,
            area_weight: 2.0,
            area_dash: 3.0,
            area_fill_opacity: 0.6,
            stroke_opacity: 1.0,
            near_black_luminance: 0.02,
            near_white_luminance: 0.85,
            dark_theme_stroke: Color::from_hex("#F1F5F9"),
            light_theme_stroke: Color::from_hex("#1E293B"),
        }
    }
}

impl StylePolicy {
    /// Stroke color for a layer color under the theme.
    pub fn stroke_color(&self, layer_color: Color, theme: Theme) -> Color {
        let luminance = layer_color.luminance();
        match theme {
            Theme::Dark if luminance <= self.near_black_luminance => self.dark_theme_stroke,
            Theme::Light if luminance >= self.near_white_luminance => self.light_theme_stroke,
            _ => layer_color,
        }
    }

    /// Style of a geometry of the given kind in a layer of the given color.
    pub fn style(&self, layer_color: Color, kind: GeometryKind, theme: Theme) -> FeatureStyle {
        let stroke_color = self.stroke_color(layer_color, theme);

        if kind.is_line() {
            FeatureStyle {
                stroke_color,
                stroke_weight: self.line_weight,
                stroke_opacity: self.stroke_opacity,
                stroke_pattern: StrokePattern::Solid,
                fill_color: layer_color,
                fill_opacity: 0.0,
            }
        } else {
            FeatureStyle {
                stroke_color,
                stroke_weight: self.area_weight,
                stroke_opacity: self.stroke_opacity,
                stroke_pattern: StrokePattern::Dashed(self.area_dash),
                fill_color: layer_color,
                fill_opacity: self.area_fill_opacity,
            }
        }
    }

    /// Style of a feature of the given layer.
    pub fn style_feature(
        &self,
        layer: &LayerDescriptor,
        feature: &TaggedFeature,
        theme: Theme,
    ) -> FeatureStyle {
        debug_assert_eq!(layer.id, feature.layer(), "feature styled with a foreign layer");
        self.style(layer.color, feature.geometry_kind(), theme)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::layer::tests::{feature, line, polygon};
    use crate::layer::LayerId;

    #[test]
    fn lines_are_not_filled() {
        let policy = StylePolicy::default();
        let color = Color::from_hex("#10B981");

        for kind in [GeometryKind::LineString, GeometryKind::MultiLineString] {
            let style = policy.style(color, kind, Theme::Dark);
            assert_relative_eq!(style.fill_opacity, 0.0);
            assert_relative_eq!(style.stroke_weight, 3.0);
            assert_eq!(style.stroke_pattern, StrokePattern::Solid);
        }
    }

    #[test]
    fn other_geometries_are_filled_and_dashed() {
        let policy = StylePolicy::default();
        let color = Color::from_hex("#10B981");

        for kind in [
            GeometryKind::Point,
            GeometryKind::MultiPoint,
            GeometryKind::Polygon,
            GeometryKind::MultiPolygon,
            GeometryKind::GeometryCollection,
            GeometryKind::Empty,
        ] {
            let style = policy.style(color, kind, Theme::Light);
            assert!(style.fill_opacity > 0.0);
            assert_eq!(style.fill_color, color);
            assert_relative_eq!(style.stroke_weight, 2.0);
            assert_eq!(style.stroke_pattern, StrokePattern::Dashed(3.0));
        }
    }

    #[test]
    fn black_stroke_is_remapped_on_dark_theme() {
        let policy = StylePolicy::default();

        let dark = policy.style(Color::BLACK, GeometryKind::LineString, Theme::Dark);
        assert_ne!(dark.stroke_color, Color::BLACK);
        assert!(dark.stroke_color.luminance() > 0.5);

        let light = policy.style(Color::BLACK, GeometryKind::LineString, Theme::Light);
        assert_eq!(light.stroke_color, Color::BLACK);
    }

    #[test]
    fn white_stroke_is_remapped_on_light_theme() {
        let policy = StylePolicy::default();

        let light = policy.style(Color::WHITE, GeometryKind::Polygon, Theme::Light);
        assert_ne!(light.stroke_color, Color::WHITE);
        assert_eq!(light.fill_color, Color::WHITE);

        let dark = policy.style(Color::WHITE, GeometryKind::Polygon, Theme::Dark);
        assert_eq!(dark.stroke_color, Color::WHITE);
    }

    #[test]
    fn fill_is_never_remapped() {
        let policy = StylePolicy::default();
        let style = policy.style(Color::BLACK, GeometryKind::Polygon, Theme::Dark);
        assert_eq!(style.fill_color, Color::BLACK);
    }

    #[test]
    fn colored_layers_keep_their_stroke() {
        let policy = StylePolicy::default();
        let color = Color::from_hex("#3B82F6");
        assert_eq!(policy.stroke_color(color, Theme::Dark), color);
        assert_eq!(policy.stroke_color(color, Theme::Light), color);
    }

    #[test]
    fn style_uses_owner_color() {
        let policy = StylePolicy::default();
        let layer =
            LayerDescriptor::new(LayerId(101), "Parques", true, Color::from_hex("#10B981"), "p");
        let street = TaggedFeature::new(LayerId(101), 0, feature(line(), serde_json::json!({})));
        let park = TaggedFeature::new(LayerId(101), 1, feature(polygon(), serde_json::json!({})));

        let street_style = policy.style_feature(&layer, &street, Theme::Dark);
        assert_eq!(street_style.stroke_color, layer.color);
        assert_relative_eq!(street_style.fill_opacity, 0.0);

        let park_style = policy.style_feature(&layer, &park, Theme::Dark);
        assert_relative_eq!(park_style.fill_opacity, 0.6);
    }

    #[test]
    fn theme_toggles() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::default(), Theme::Dark);
    }
}
