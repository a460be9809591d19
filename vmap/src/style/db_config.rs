use serde::{Deserialize, Serialize};
use serde_json::Value;
use vmap_types::geometry::GeometryType;

use crate::error::VmapError;
use crate::layer::{value_to_text, Feature};
use crate::style::{
    create_style_func, FeatureStyle, Fill, ImageStyle, Stroke, Style, StyleOptions, TextStyle,
};
use crate::Color;

const LABEL_PROPERTY: &str = "label";
const LABEL_OFFSET: (f64, f64) = (15.0, -15.0);
const LABEL_STROKE_WIDTH: f64 = 2.0;

/// Layer style as it is stored in the layer configuration database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStyleConfig {
    /// Polygon fill.
    pub fill: DbFill,
    /// Line and polygon outline.
    pub stroke: DbStroke,
    /// Icon of point features.
    #[serde(rename = "icon_url", default)]
    pub icon_url: Option<String>,
    /// Height of the icon in pixels.
    #[serde(rename = "icon_size", default)]
    pub icon_size: Option<f64>,
    /// Font size of labels in pixels, as a number or a string.
    pub layer_font_size: Value,
    /// Font family of labels.
    pub layer_font_type: String,
    /// Color of label letters.
    pub layer_font_color: Color,
    /// Rules that change the style of features with specific property values.
    #[serde(default)]
    pub conditions: Vec<DbStyleRule>,
}

/// Fill of a stored style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbFill {
    /// Color in hex notation, without opacity.
    pub color: String,
    /// Opacity in percent.
    pub opacity: f64,
}

/// Stroke of a stored style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbStroke {
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub width: f64,
}

/// Set of conditions checked against one feature property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStyleRule {
    /// Name of the property to check.
    pub geom_field_name: String,
    /// Conditions, applied in order. Later matches win.
    #[serde(default)]
    pub conditions: Vec<DbStyleCondition>,
}

/// Kind of a stored style condition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbConditionType {
    /// Changes the outline and the icon of point features.
    Point,
    /// Changes the outline of polygons.
    Area,
    /// Unknown condition, never applied.
    #[serde(other)]
    Other,
}

/// Condition of a stored style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbStyleCondition {
    /// Kind of the condition.
    #[serde(rename = "type")]
    pub condition_type: DbConditionType,
    /// Property value the condition applies to.
    #[serde(default)]
    pub valuex: Option<Value>,
    /// Outline color of the matching features.
    #[serde(default)]
    pub bordercolor: Option<Color>,
    /// Icon of the matching point features.
    #[serde(default)]
    pub pointicon: Option<String>,
    /// Icon size of the matching point features.
    #[serde(default)]
    pub pointsize: Option<f64>,
}

impl DbStyleCondition {
    fn matches(&self, feature: &Feature, field: &str) -> bool {
        let value = feature.get(field);
        match (&self.valuex, value) {
            (None, None) => true,
            (Some(expected), Some(actual)) => strict_eq(expected, actual),
            _ => false,
        }
    }
}

/// Numbers are compared by value, everything else structurally.
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => a == b,
    }
}

impl DbStyleConfig {
    /// Parses the stored configuration.
    pub fn from_json(text: &str) -> Result<Self, VmapError> {
        Ok(serde_json::from_str(text)?)
    }

    fn fill_color(&self) -> Result<Color, VmapError> {
        let color = Color::try_from_hex(&self.fill.color).ok_or_else(|| {
            VmapError::InvalidStyle(format!("invalid fill color: {}", self.fill.color))
        })?;

        Ok(Color::with_opacity(
            color.r(),
            color.g(),
            color.b(),
            self.fill.opacity / 100.0,
        ))
    }

    fn font(&self) -> String {
        format!(
            "{}px {}",
            value_to_text(&self.layer_font_size),
            self.layer_font_type.replacen(';', "", 1)
        )
    }

    fn styles(&self, fill: Fill, font: &str, feature: &Feature) -> Vec<Style> {
        let mut stroke_color = self.stroke.color;
        let mut icon_url = self.icon_url.clone();
        let mut icon_size = self.icon_size;

        for rule in &self.conditions {
            for condition in &rule.conditions {
                if !condition.matches(feature, &rule.geom_field_name) {
                    continue;
                }

                match condition.condition_type {
                    DbConditionType::Point
                        if condition.pointicon.as_deref().is_some_and(|s| !s.is_empty()) =>
                    {
                        if let Some(color) = condition.bordercolor {
                            stroke_color = color;
                        }
                        icon_url = condition.pointicon.clone();
                        icon_size = condition.pointsize;
                    }
                    DbConditionType::Area => {
                        if let Some(color) = condition.bordercolor {
                            stroke_color = color;
                        }
                    }
                    _ => {}
                }
            }
        }

        let polygon = Style {
            fill: Some(fill),
            stroke: Some(Stroke::new(stroke_color, self.stroke.width)),
            image: None,
            text: Some(TextStyle {
                text: feature.label(LABEL_PROPERTY).unwrap_or_default(),
                font: font.to_string(),
                fill: Some(Fill::new(self.layer_font_color)),
                stroke: Some(Stroke::new(Color::rgb(0x44, 0x44, 0x44), LABEL_STROKE_WIDTH)),
                offset_x: LABEL_OFFSET.0,
                offset_y: LABEL_OFFSET.1,
            }),
        };

        match feature.geometry().geometry_type() {
            GeometryType::Polygon => vec![polygon],
            GeometryType::Point | GeometryType::MultiPolygon => {
                let mut styles = vec![polygon];
                if let Some(src) = icon_url {
                    styles.push(Style {
                        image: Some(ImageStyle::icon(src, icon_size)),
                        ..Default::default()
                    });
                }
                styles
            }
            _ => vec![],
        }
    }
}

/// Creates a style function from a layer style stored in the configuration database.
///
/// Empty configuration or `null` gives the style of [`create_style_func`] with the default
/// options. Otherwise polygons get fill, outline and a label from the `label` property (or the
/// feature id). Points and multipolygons get the same style plus the configured icon. Other
/// geometries are not drawn.
pub fn create_style_func_by_db_config(
    config: &str,
    defaults: &StyleOptions,
) -> Result<FeatureStyle, VmapError> {
    let config = config.trim();
    if config.is_empty() || config == "null" {
        return Ok(create_style_func(defaults, defaults));
    }

    let config = DbStyleConfig::from_json(config)?;
    let fill = Fill::new(config.fill_color()?);
    let font = config.font();

    Ok(FeatureStyle::function(move |feature, _resolution| {
        config.styles(fill, &font, feature)
    }))
}
