//! Styles of vector features.
//!
//! A [`VectorLayer`](crate::layer::VectorLayer) is drawn with a [`FeatureStyle`]: either a fixed
//! list of [`Style`]s, or a function that builds the styles for every feature at the current
//! resolution.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::layer::Feature;
use crate::Color;

mod db_config;
mod function;

pub use db_config::{
    create_style_func_by_db_config, DbConditionType, DbFill, DbStroke, DbStyleCondition,
    DbStyleConfig, DbStyleRule,
};
pub use function::{create_style_func, StyleOptions};

/// Fill of a polygon or a circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Fill color.
    pub color: Color,
}

impl Fill {
    /// Creates a fill.
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

/// Outline of a geometry, a circle or text letters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub width: f64,
}

impl Stroke {
    /// Creates a stroke.
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

/// Symbol of a point feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageStyle {
    /// A circle.
    Circle {
        /// Radius in pixels.
        radius: f64,
        /// Fill of the circle.
        fill: Option<Fill>,
        /// Outline of the circle.
        stroke: Option<Stroke>,
    },
    /// An image loaded from an url.
    Icon {
        /// Url of the image.
        src: String,
        /// Height the image is scaled to, in pixels.
        size: Option<f64>,
        /// Point of the image placed at the feature, as a fraction of the image size.
        anchor: [f64; 2],
        /// Opacity of the image, `0..=1`.
        opacity: f64,
    },
}

impl ImageStyle {
    /// Circle with the given radius, fill and stroke.
    pub fn circle(radius: f64, fill: Option<Fill>, stroke: Option<Stroke>) -> Self {
        Self::Circle {
            radius,
            fill,
            stroke,
        }
    }

    /// Icon anchored at its top-left corner.
    pub fn icon(src: impl Into<String>, size: Option<f64>) -> Self {
        Self::Icon {
            src: src.into(),
            size,
            anchor: [0.0, 0.0],
            opacity: 1.0,
        }
    }
}

/// Text label of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// The text. Empty text is not drawn.
    pub text: String,
    /// Font in CSS notation, e.g. `12px Calibri,sans-serif`.
    pub font: String,
    /// Color of the letters.
    pub fill: Option<Fill>,
    /// Outline of the letters.
    pub stroke: Option<Stroke>,
    /// Horizontal offset in pixels.
    pub offset_x: f64,
    /// Vertical offset in pixels.
    pub offset_y: f64,
}

/// Complete style of a feature. Parts that are not set are not drawn.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Fill of polygons.
    pub fill: Option<Fill>,
    /// Stroke of lines and polygon outlines.
    pub stroke: Option<Stroke>,
    /// Symbol of points.
    pub image: Option<ImageStyle>,
    /// Label.
    pub text: Option<TextStyle>,
}

impl Style {
    /// Style with fill, stroke and a circle for points in the given colors.
    pub fn simple(fill: Color, stroke: Color, stroke_width: f64, circle: ImageStyle) -> Self {
        Self {
            fill: Some(Fill::new(fill)),
            stroke: Some(Stroke::new(stroke, stroke_width)),
            image: Some(circle),
            text: None,
        }
    }
}

/// Function that builds the styles of a feature at the given resolution.
pub type StyleFunction = Arc<dyn Fn(&Feature, f64) -> Vec<Style> + Send + Sync>;

/// Style of a vector layer.
#[derive(Clone)]
pub enum FeatureStyle {
    /// The same styles for all features.
    Styles(Vec<Style>),
    /// Styles computed for every feature.
    Function(StyleFunction),
}

impl FeatureStyle {
    /// Creates a style from a function.
    pub fn function(f: impl Fn(&Feature, f64) -> Vec<Style> + Send + Sync + 'static) -> Self {
        Self::Function(Arc::new(f))
    }

    /// Styles to draw the feature with at the given resolution.
    pub fn resolve(&self, feature: &Feature, resolution: f64) -> Vec<Style> {
        match self {
            FeatureStyle::Styles(styles) => styles.clone(),
            FeatureStyle::Function(f) => f(feature, resolution),
        }
    }
}

impl Debug for FeatureStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureStyle::Styles(styles) => f.debug_tuple("Styles").field(styles).finish(),
            FeatureStyle::Function(_) => f.write_str("Function"),
        }
    }
}

impl From<Style> for FeatureStyle {
    fn from(value: Style) -> Self {
        Self::Styles(vec![value])
    }
}

impl From<Vec<Style>> for FeatureStyle {
    fn from(value: Vec<Style>) -> Self {
        Self::Styles(value)
    }
}

impl From<StyleFunction> for FeatureStyle {
    fn from(value: StyleFunction) -> Self {
        Self::Function(value)
    }
}

/// Stock styles of a map instance.
#[derive(Debug, Clone)]
pub struct StylePresets {
    /// Style of the features being drawn or measured.
    pub draw_style: Style,
    /// Style of layers added without an explicit style.
    pub default_style: Style,
    /// Options used by [`create_style_func`] for the values that are not set.
    pub default_options: StyleOptions,
}

impl Default for StylePresets {
    fn default() -> Self {
        let draw_color = Color::rgb(0x29, 0x80, 0xb9);
        let default_fill = Color::with_opacity(255, 255, 255, 0.6);
        let default_stroke = Color::rgb(0x31, 0x9f, 0xd3);

        Self {
            draw_style: Style::simple(
                Color::with_opacity(255, 255, 255, 0.2),
                draw_color,
                2.0,
                ImageStyle::circle(7.0, Some(Fill::new(draw_color)), None),
            ),
            default_style: Style::simple(
                default_fill,
                default_stroke,
                1.0,
                ImageStyle::circle(
                    5.0,
                    Some(Fill::new(default_fill)),
                    Some(Stroke::new(default_stroke, 2.0)),
                ),
            ),
            default_options: StyleOptions::default(),
        }
    }
}

impl StylePresets {
    /// Style function built from `options`, see [`create_style_func`].
    pub fn create_style_func(&self, options: &StyleOptions) -> FeatureStyle {
        create_style_func(options, &self.default_options)
    }

    /// Style function built from a stored style configuration, see
    /// [`create_style_func_by_db_config`].
    pub fn create_style_func_by_db_config(
        &self,
        config: &str,
    ) -> Result<FeatureStyle, crate::VmapError> {
        create_style_func_by_db_config(config, &self.default_options)
    }
}

#[cfg(test)]
mod tests {
    use vmap_types::cartesian::Point2d;

    use super::*;

    #[test]
    fn stock_presets() {
        let presets = StylePresets::default();
        assert_eq!(
            presets.draw_style.stroke,
            Some(Stroke::new(Color::try_from_hex("#2980b9").unwrap(), 2.0))
        );
        assert_eq!(
            presets.default_style.fill.map(|f| f.color.to_css()),
            Some("rgba(255,255,255,0.6)".to_string())
        );
        assert!(matches!(
            presets.draw_style.image,
            Some(ImageStyle::Circle { radius, .. }) if radius == 7.0
        ));
    }

    #[test]
    fn fixed_and_function_styles() {
        let feature = Feature::new(Point2d::new(0.0, 0.0)).with_id("a");

        let fixed = FeatureStyle::from(Style::default());
        assert_eq!(fixed.resolve(&feature, 1.0), vec![Style::default()]);

        let function = FeatureStyle::function(|feature, resolution| {
            if resolution > 10.0 || feature.id().is_none() {
                vec![]
            } else {
                vec![Style::default(), Style::default()]
            }
        });
        assert_eq!(function.resolve(&feature, 1.0).len(), 2);
        assert!(function.resolve(&feature, 20.0).is_empty());
        assert_eq!(format!("{function:?}"), "Function");
    }
}
