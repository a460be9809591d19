use std::any::Any;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vmap_types::cartesian::Rect;

use crate::layer::Layer;

const WEB_MERCATOR_HALF_EXTENT: f64 = 20037508.342789244;
const TILE_SIZE: u32 = 256;

/// Index of a tile in the standard XYZ web tile grid. `y` grows from the top.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TileIndex {
    /// Z-level.
    pub z: u32,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TileIndex {
    /// Creates a new index.
    pub fn new(z: u32, x: i32, y: i32) -> Self {
        Self { z, x, y }
    }

    /// Extent of the tile in `EPSG:3857`.
    pub fn bbox(&self) -> Rect {
        let size = 2.0 * WEB_MERCATOR_HALF_EXTENT / 2f64.powi(self.z as i32);
        let x_min = -WEB_MERCATOR_HALF_EXTENT + self.x as f64 * size;
        let y_max = WEB_MERCATOR_HALF_EXTENT - self.y as f64 * size;
        Rect::new(x_min, y_max - size, x_min + size, y_max)
    }

    /// Bing Maps quad key of the tile.
    pub fn quadkey(&self) -> String {
        (1..=self.z)
            .rev()
            .map(|level| {
                let mask = 1 << (level - 1);
                let mut digit = 0;
                if self.x & mask != 0 {
                    digit += 1;
                }
                if self.y & mask != 0 {
                    digit += 2;
                }
                char::from(b'0' + digit)
            })
            .collect()
    }
}

/// Service the tiles of a [`TileLayer`] are requested from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TileSource {
    /// OpenStreetMap style XYZ service. The url template supports `{z}`, `{x}`, `{y}` and a
    /// subdomain range like `{a-c}`.
    Osm {
        /// Url template.
        url: String,
    },
    /// Bing Maps imagery.
    BingMaps {
        /// Api key.
        key: String,
        /// Imagery set, e.g. `Aerial` or `Road`.
        imagery_set: String,
    },
    /// Tiled WMS `GetMap` requests.
    Wms {
        /// Service endpoint.
        url: String,
        /// Additional request parameters, e.g. `LAYERS` and `VERSION`.
        params: BTreeMap<String, String>,
    },
    /// Stamen map tiles.
    Stamen {
        /// Stamen layer name, e.g. `watercolor`.
        layer: String,
    },
    /// MapQuest open tiles.
    MapQuest {
        /// MapQuest layer name: `osm`, `sat` or `hyb`.
        layer: String,
    },
}

impl TileSource {
    /// OpenStreetMap source with the given url template.
    pub fn osm(url: impl Into<String>) -> Self {
        Self::Osm { url: url.into() }
    }

    /// WMS source with the given parameters.
    pub fn wms<'a>(
        url: impl Into<String>,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self::Wms {
            url: url.into(),
            params: params
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Url of the tile image.
    ///
    /// Returns `None` for Bing Maps, as tile urls of Bing are only known after the imagery
    /// metadata (see [`TileSource::metadata_url`]) is loaded.
    pub fn tile_url(&self, index: TileIndex) -> Option<String> {
        match self {
            TileSource::Osm { url } => Some(expand_xyz(url, index)),
            TileSource::BingMaps { .. } => None,
            TileSource::Wms { url, params } => Some(wms_url(url, params, index)),
            TileSource::Stamen { layer } => {
                let extension = match layer.as_str() {
                    "watercolor" | "terrain-background" => "jpg",
                    _ => "png",
                };
                let template = format!(
                    "https://stamen-tiles-{{a-d}}.a.ssl.fastly.net/{layer}/{{z}}/{{x}}/{{y}}.{extension}"
                );
                Some(expand_xyz(&template, index))
            }
            TileSource::MapQuest { layer } => {
                let extension = if layer == "hyb" { "png" } else { "jpg" };
                let template = format!(
                    "https://otile{{1-4}}-s.mqcdn.com/tiles/1.0.0/{layer}/{{z}}/{{x}}/{{y}}.{extension}"
                );
                Some(expand_xyz(&template, index))
            }
        }
    }

    /// Url of the imagery metadata for Bing Maps sources.
    pub fn metadata_url(&self) -> Option<String> {
        match self {
            TileSource::BingMaps { key, imagery_set } => Some(format!(
                "https://dev.virtualearth.net/REST/v1/Imagery/Metadata/{imagery_set}?uriScheme=https&include=ImageryProviders&key={key}"
            )),
            _ => None,
        }
    }
}

fn expand_xyz(template: &str, index: TileIndex) -> String {
    let url = template
        .replace("{z}", &index.z.to_string())
        .replace("{x}", &index.x.to_string())
        .replace("{y}", &index.y.to_string());

    expand_subdomain(&url, index)
}

/// Replaces the first `{a-c}` or `{1-4}` range with a single value picked by the tile index.
fn expand_subdomain(url: &str, index: TileIndex) -> String {
    let Some(start) = url.find('{') else {
        return url.to_string();
    };
    let Some(end) = url[start..].find('}').map(|e| e + start) else {
        return url.to_string();
    };

    let range: Vec<char> = url[start + 1..end].chars().collect();
    let [from, '-', to] = range.as_slice() else {
        return url.to_string();
    };

    let values: Vec<char> = (*from..=*to).collect();
    if values.is_empty() {
        return url.to_string();
    }

    let n = (index.x + index.y).rem_euclid(values.len() as i32) as usize;
    format!("{}{}{}", &url[..start], values[n], &url[end + 1..])
}

fn wms_url(url: &str, params: &BTreeMap<String, String>, index: TileIndex) -> String {
    let bbox = index.bbox();
    let mut query: BTreeMap<&str, String> = BTreeMap::from([
        ("SERVICE", "WMS".to_string()),
        ("REQUEST", "GetMap".to_string()),
        ("FORMAT", "image/png".to_string()),
        ("TRANSPARENT", "true".to_string()),
        ("SRS", "EPSG:3857".to_string()),
        ("WIDTH", TILE_SIZE.to_string()),
        ("HEIGHT", TILE_SIZE.to_string()),
        (
            "BBOX",
            format!(
                "{},{},{},{}",
                bbox.x_min(),
                bbox.y_min(),
                bbox.x_max(),
                bbox.y_max()
            ),
        ),
    ]);
    for (key, value) in params {
        query.insert(key.as_str(), value.clone());
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    let query = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{url}{separator}{query}")
}

/// Layer of prerendered image tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    id: Option<String>,
    title: Option<String>,
    source: TileSource,
    visible: bool,
}

impl TileLayer {
    /// Creates a visible layer with the given source.
    pub fn new(source: TileSource) -> Self {
        Self {
            id: None,
            title: None,
            source,
            visible: true,
        }
    }

    /// Sets the id of the layer.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the human-readable title of the layer.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the initial visibility of the layer.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Title of the layer.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Tile source.
    pub fn source(&self) -> &TileSource {
        &self.source
    }
}

impl Layer for TileLayer {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn osm_url() {
        let source = TileSource::osm("http://{a-c}.tile.openstreetmap.org/{z}/{x}/{y}.png");
        assert_eq!(
            source.tile_url(TileIndex::new(3, 1, 2)).as_deref(),
            Some("http://a.tile.openstreetmap.org/3/1/2.png")
        );
        assert_eq!(
            source.tile_url(TileIndex::new(3, 2, 2)).as_deref(),
            Some("http://b.tile.openstreetmap.org/3/2/2.png")
        );
    }

    #[test]
    fn mapquest_url() {
        let source = TileSource::MapQuest {
            layer: "sat".into(),
        };
        assert_eq!(
            source.tile_url(TileIndex::new(1, 0, 0)).as_deref(),
            Some("https://otile1-s.mqcdn.com/tiles/1.0.0/sat/1/0/0.jpg")
        );
    }

    #[test]
    fn wms_url_contains_params_and_bbox() {
        let source = TileSource::wms(
            "http://example.com/WMS/WMS",
            [("LAYERS", "xmap-default"), ("VERSION", "1.1.1")],
        );
        let url = source.tile_url(TileIndex::new(0, 0, 0)).expect("wms url");

        assert!(url.starts_with("http://example.com/WMS/WMS?"));
        assert!(url.contains("LAYERS=xmap-default"));
        assert!(url.contains("VERSION=1.1.1"));
        assert!(url.contains(&format!(
            "BBOX={},{},",
            -WEB_MERCATOR_HALF_EXTENT, -WEB_MERCATOR_HALF_EXTENT
        )));
    }

    #[test]
    fn bing_needs_metadata() {
        let source = TileSource::BingMaps {
            key: "KEY".into(),
            imagery_set: "Aerial".into(),
        };
        assert_eq!(source.tile_url(TileIndex::new(1, 0, 0)), None);
        assert!(source
            .metadata_url()
            .is_some_and(|url| url.contains("Metadata/Aerial") && url.ends_with("key=KEY")));
    }

    #[test]
    fn tile_bbox_and_quadkey() {
        let bbox = TileIndex::new(1, 1, 0).bbox();
        assert_abs_diff_eq!(bbox.x_min(), 0.0);
        assert_abs_diff_eq!(bbox.y_min(), 0.0);
        assert_abs_diff_eq!(bbox.x_max(), WEB_MERCATOR_HALF_EXTENT);

        assert_eq!(TileIndex::new(3, 3, 5).quadkey(), "213");
    }
}
