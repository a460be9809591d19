use serde::{Deserialize, Serialize};

use crate::style::{FeatureStyle, Fill, ImageStyle, Stroke, Style, TextStyle};
use crate::Color;

const LABEL_FONT: &str = "12px Calibri,sans-serif";
const LABEL_OFFSET_Y: f64 = -15.0;

/// Options of a style built by [`create_style_func`]. Values that are not set are taken from
/// the default options of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    /// Fill color of polygons.
    pub fill_color: Option<Color>,
    /// Color of lines and polygon outlines.
    pub stroke_color: Option<Color>,
    /// Width of lines and polygon outlines.
    pub stroke_width: Option<f64>,
    /// Color of label letters.
    pub text_fill_color: Option<Color>,
    /// Color of label outlines.
    pub text_stroke_color: Option<Color>,
    /// Width of label outlines.
    pub text_stroke_width: Option<f64>,
    /// Property used as the label of a feature.
    pub feature_property_key: Option<String>,
    /// Labels are shown only at resolutions lower than this.
    pub text_max_resolution: Option<f64>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            fill_color: Some(Color::with_opacity(255, 255, 255, 0.6)),
            stroke_color: Some(Color::rgb(0x31, 0x9f, 0xd3)),
            stroke_width: Some(1.0),
            text_fill_color: Some(Color::BLACK),
            text_stroke_color: Some(Color::WHITE),
            text_stroke_width: Some(3.0),
            feature_property_key: Some("name".to_string()),
            text_max_resolution: Some(100.0),
        }
    }
}

impl StyleOptions {
    /// Options with no values set.
    pub fn empty() -> Self {
        Self {
            fill_color: None,
            stroke_color: None,
            stroke_width: None,
            text_fill_color: None,
            text_stroke_color: None,
            text_stroke_width: None,
            feature_property_key: None,
            text_max_resolution: None,
        }
    }

    /// Options where every value that is not set here is taken from `defaults`, and then from
    /// the stock options.
    pub fn merged_with(&self, defaults: &StyleOptions) -> StyleOptions {
        let stock = StyleOptions::default();
        let number = |a: Option<f64>, b: Option<f64>, c: Option<f64>| {
            [a, b, c].into_iter().flatten().find(|v| *v != 0.0)
        };

        let feature_property_key = [
            &self.feature_property_key,
            &defaults.feature_property_key,
            &stock.feature_property_key,
        ]
        .into_iter()
        .flatten()
        .find(|key| !key.is_empty())
        .cloned();

        StyleOptions {
            fill_color: self.fill_color.or(defaults.fill_color).or(stock.fill_color),
            stroke_color: self
                .stroke_color
                .or(defaults.stroke_color)
                .or(stock.stroke_color),
            stroke_width: number(self.stroke_width, defaults.stroke_width, stock.stroke_width),
            text_fill_color: self
                .text_fill_color
                .or(defaults.text_fill_color)
                .or(stock.text_fill_color),
            text_stroke_color: self
                .text_stroke_color
                .or(defaults.text_stroke_color)
                .or(stock.text_stroke_color),
            text_stroke_width: number(
                self.text_stroke_width,
                defaults.text_stroke_width,
                stock.text_stroke_width,
            ),
            feature_property_key,
            text_max_resolution: number(
                self.text_max_resolution,
                defaults.text_max_resolution,
                stock.text_max_resolution,
            ),
        }
    }
}

/// Creates a style function that draws features with the colors from `options` and labels them
/// with the value of the feature property `feature_property_key` (or the feature id if the
/// property is not set).
///
/// Labels are only shown while the resolution is lower than `text_max_resolution`.
pub fn create_style_func(options: &StyleOptions, defaults: &StyleOptions) -> FeatureStyle {
    let options = options.merged_with(defaults);

    let fill = options.fill_color.map(Fill::new);
    let stroke = options
        .stroke_color
        .map(|color| Stroke::new(color, options.stroke_width.unwrap_or(1.0)));
    let text_fill = options.text_fill_color.map(Fill::new);
    let text_stroke = options
        .text_stroke_color
        .map(|color| Stroke::new(color, options.text_stroke_width.unwrap_or(3.0)));
    let key = options.feature_property_key.unwrap_or_default();
    let max_resolution = options.text_max_resolution.unwrap_or(100.0);

    let point_fill = Fill::new(Color::with_opacity(255, 255, 255, 0.6));
    let point_stroke = Stroke::new(Color::rgb(0x31, 0x9f, 0xd3), 2.0);

    FeatureStyle::function(move |feature, resolution| {
        let text = if resolution < max_resolution {
            feature.label(&key).unwrap_or_default()
        } else {
            String::new()
        };

        vec![Style {
            fill,
            stroke,
            image: Some(ImageStyle::circle(5.0, Some(point_fill), Some(point_stroke))),
            text: Some(TextStyle {
                text,
                font: LABEL_FONT.to_string(),
                fill: text_fill,
                stroke: text_stroke,
                offset_x: 0.0,
                offset_y: LABEL_OFFSET_Y,
            }),
        }]
    })
}

#[cfg(test)]
mod tests {
    use vmap_types::cartesian::Point2d;

    use super::*;
    use crate::layer::Feature;

    fn text(style: &FeatureStyle, feature: &Feature, resolution: f64) -> String {
        style.resolve(feature, resolution)[0]
            .text
            .as_ref()
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn label_depends_on_resolution() {
        let style = create_style_func(&StyleOptions::empty(), &StyleOptions::default());
        let feature = Feature::new(Point2d::new(0.0, 0.0))
            .with_id("f-1")
            .with_property("name", "Mainz");

        assert_eq!(text(&style, &feature, 50.0), "Mainz");
        assert_eq!(text(&style, &feature, 100.0), "");

        let unnamed = Feature::new(Point2d::new(0.0, 0.0)).with_id("f-2");
        assert_eq!(text(&style, &unnamed, 1.0), "f-2");
    }

    #[test]
    fn empty_property_key_falls_back() {
        let options = StyleOptions {
            feature_property_key: Some(String::new()),
            ..StyleOptions::empty()
        };
        let defaults = StyleOptions {
            feature_property_key: Some("title".into()),
            ..StyleOptions::empty()
        };

        assert_eq!(
            options.merged_with(&defaults).feature_property_key.as_deref(),
            Some("title")
        );
        assert_eq!(
            options
                .merged_with(&StyleOptions::empty())
                .feature_property_key
                .as_deref(),
            Some("name")
        );
    }

    #[test]
    fn options_override_defaults() {
        let options = StyleOptions {
            stroke_color: Some(Color::rgb(255, 0, 0)),
            stroke_width: Some(0.0),
            feature_property_key: Some("title".into()),
            text_max_resolution: Some(10.0),
            ..StyleOptions::empty()
        };
        let style = create_style_func(&options, &StyleOptions::default());
        let feature = Feature::new(Point2d::new(0.0, 0.0))
            .with_property("name", "by name")
            .with_property("title", "by title");

        let resolved = &style.resolve(&feature, 5.0)[0];
        assert_eq!(resolved.stroke, Some(Stroke::new(Color::rgb(255, 0, 0), 1.0)));
        assert_eq!(
            resolved.fill,
            Some(Fill::new(Color::with_opacity(255, 255, 255, 0.6)))
        );

        let text = resolved.text.as_ref().expect("text style");
        assert_eq!(text.text, "by title");
        assert_eq!(text.offset_y, -15.0);
        assert_eq!(text.font, "12px Calibri,sans-serif");
        assert!(style.resolve(&feature, 20.0)[0]
            .text
            .as_ref()
            .is_some_and(|t| t.text.is_empty()));
    }

    #[test]
    fn options_from_json() {
        let options: StyleOptions =
            serde_json::from_str(r##"{"strokeColor": "#ff0000", "textMaxResolution": 20}"##)
                .expect("valid options");

        assert_eq!(options.stroke_color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(options.text_max_resolution, Some(20.0));
        assert_eq!(options.fill_color, Some(Color::with_opacity(255, 255, 255, 0.6)));
    }
}
