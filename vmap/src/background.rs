//! Preset background layers.

use std::collections::BTreeMap;

use crate::layer::{Layer, LayerGroup, TileLayer, TileSource};

/// Id given to the background layer in the map layer collection.
pub const BACKGROUND_LAYER_ID: &str = "background";

/// Layer that can be shown as the map background.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundLayer {
    /// A single tile layer.
    Tile(TileLayer),
    /// Several tile layers shown on top of each other, the first one at the bottom.
    Group(Vec<TileLayer>),
}

impl BackgroundLayer {
    /// Creates the map layer for this background with [`BACKGROUND_LAYER_ID`] as the id.
    pub fn to_layer(&self) -> Box<dyn Layer> {
        match self {
            BackgroundLayer::Tile(layer) => {
                Box::new(layer.clone().with_id(BACKGROUND_LAYER_ID))
            }
            BackgroundLayer::Group(layers) => Box::new(
                LayerGroup::new(
                    layers
                        .iter()
                        .map(|layer| Box::new(layer.clone()) as Box<dyn Layer>)
                        .collect(),
                )
                .with_id(BACKGROUND_LAYER_ID),
            ),
        }
    }
}

impl From<TileLayer> for BackgroundLayer {
    fn from(value: TileLayer) -> Self {
        Self::Tile(value)
    }
}

/// Backgrounds from one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundSet {
    /// Name of the provider shown to the user.
    pub default_text: String,
    /// Background used when the provider is chosen. Some providers have none.
    pub default: Option<BackgroundLayer>,
    /// Other backgrounds of the provider by name.
    pub variants: BTreeMap<String, BackgroundLayer>,
}

impl BackgroundSet {
    /// Creates a set with the default background only.
    pub fn new(default_text: impl Into<String>, default: Option<BackgroundLayer>) -> Self {
        Self {
            default_text: default_text.into(),
            default,
            variants: BTreeMap::new(),
        }
    }

    /// Adds a named variant.
    pub fn with_variant(mut self, name: impl Into<String>, layer: BackgroundLayer) -> Self {
        self.variants.insert(name.into(), layer);
        self
    }

    /// Background with the given name. `default` names the default background.
    pub fn get(&self, name: &str) -> Option<&BackgroundLayer> {
        match name {
            "default" => self.default.as_ref(),
            _ => self.variants.get(name),
        }
    }
}

/// Background presets of a map instance, and the background that is currently shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Backgrounds {
    /// Background that is set when the map is created, and then the one that is shown.
    pub active: BackgroundLayer,
    /// OpenStreetMap.
    pub osm: BackgroundSet,
    /// Bing Maps aerial imagery.
    pub bing: BackgroundSet,
    /// PTV xServer WMS.
    pub ptv: BackgroundSet,
    /// Google Maps. There are no layers, only the name.
    pub gmaps: BackgroundSet,
    /// Stamen watercolor and terrain.
    pub stamen: BackgroundSet,
    /// MapQuest road, aerial and hybrid.
    pub mapquest: BackgroundSet,
}

const OSM_URL: &str = "http://{a-c}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const BING_KEY: &str = "Ak-dzM4wZjSqTlzveKz5u0d4IQ4bRzVI309GxmkgSVr1ewS6iPSrOvOKhA-CJlm3";
const PTV_WMS_URL: &str = "http://ptvxserver01.haiberg.net:50050/WMS/WMS";

fn osm() -> BackgroundLayer {
    TileLayer::new(TileSource::osm(OSM_URL)).into()
}

fn mapquest(layer: &str) -> TileLayer {
    TileLayer::new(TileSource::MapQuest {
        layer: layer.to_string(),
    })
}

impl Default for Backgrounds {
    fn default() -> Self {
        Self {
            active: osm(),
            osm: BackgroundSet::new("OpenStreetMap", Some(osm())),
            bing: BackgroundSet::new(
                "Bing Maps",
                Some(
                    TileLayer::new(TileSource::BingMaps {
                        key: BING_KEY.to_string(),
                        imagery_set: "Aerial".to_string(),
                    })
                    .into(),
                ),
            ),
            ptv: BackgroundSet::new(
                "Grundansicht",
                Some(
                    TileLayer::new(TileSource::wms(
                        PTV_WMS_URL,
                        [("LAYERS", "xmap-default"), ("VERSION", "1.1.1")],
                    ))
                    .with_title("Global Imagery")
                    .into(),
                ),
            ),
            gmaps: BackgroundSet::new("Google Maps", None),
            stamen: BackgroundSet::new(
                "Stamen",
                Some(
                    TileLayer::new(TileSource::Stamen {
                        layer: "watercolor".to_string(),
                    })
                    .into(),
                ),
            )
            .with_variant(
                "terrain",
                TileLayer::new(TileSource::Stamen {
                    layer: "terrain-labels".to_string(),
                })
                .into(),
            ),
            mapquest: BackgroundSet::new(
                "MapQuest",
                Some(BackgroundLayer::Group(vec![
                    mapquest("sat"),
                    mapquest("hyb"),
                ])),
            )
            .with_variant("road", mapquest("osm").with_visible(false).into())
            .with_variant("aerial", mapquest("sat").with_visible(false).into()),
        }
    }
}

impl Backgrounds {
    /// Preset of the provider with the given name: `osm`, `bing`, `ptv`, `gmaps`, `stamen` or
    /// `mapquest`.
    pub fn provider(&self, name: &str) -> Option<&BackgroundSet> {
        match name {
            "osm" => Some(&self.osm),
            "bing" => Some(&self.bing),
            "ptv" => Some(&self.ptv),
            "gmaps" => Some(&self.gmaps),
            "stamen" => Some(&self.stamen),
            "mapquest" => Some(&self.mapquest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn stock_presets() {
        let backgrounds = Backgrounds::default();
        assert_eq!(backgrounds.active, backgrounds.osm.default.clone().expect("osm"));
        assert_eq!(backgrounds.ptv.default_text, "Grundansicht");
        assert!(backgrounds.gmaps.default.is_none());

        assert_matches!(
            backgrounds.provider("mapquest").and_then(|p| p.get("default")),
            Some(BackgroundLayer::Group(layers)) if layers.len() == 2
        );
        assert_matches!(
            backgrounds.mapquest.get("road"),
            Some(BackgroundLayer::Tile(layer)) if !layer.is_visible()
        );
        assert_matches!(
            backgrounds.ptv.default.as_ref(),
            Some(BackgroundLayer::Tile(layer)) if layer.title() == Some("Global Imagery")
        );
        assert!(backgrounds.provider("here").is_none());
    }

    #[test]
    fn layers_get_background_id() {
        let backgrounds = Backgrounds::default();

        let tile = backgrounds.active.to_layer();
        assert_eq!(tile.id(), Some(BACKGROUND_LAYER_ID));

        let group = backgrounds.mapquest.get("default").expect("group").to_layer();
        assert_eq!(group.id(), Some(BACKGROUND_LAYER_ID));
        let group = group.as_any().downcast_ref::<LayerGroup>().expect("group");
        assert_eq!(group.layers().len(), 2);
    }
}
