use std::any::Any;
use std::sync::Arc;

use vmap_types::cartesian::{Point2d, Rect};
use vmap_types::geo::Crs;

use crate::error::VmapError;
use crate::layer::{geojson, Feature, Layer};
use crate::style::{FeatureStyle, Style};

/// Function that builds the url to load the features of the given extent (in `EPSG:3857`) at the
/// given resolution.
pub type UrlFunction = Arc<dyn Fn(&Rect, f64) -> Result<String, VmapError> + Send + Sync>;

/// Strategy that decides which data a [`VectorSource`] requests.
#[derive(Clone)]
pub enum LoadingStrategy {
    /// The whole data set is loaded once from a fixed url.
    All(String),
    /// Data is loaded for every visible extent that was not loaded before.
    BBox(UrlFunction),
}

impl std::fmt::Debug for LoadingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadingStrategy::All(url) => f.debug_tuple("All").field(url).finish(),
            LoadingStrategy::BBox(_) => f.write_str("BBox"),
        }
    }
}

/// Set of features of a [`VectorLayer`] with an optional remote origin.
///
/// The source does not do any network requests itself. The application asks it for the urls
/// to load with [`VectorSource::request_url`], and gives the loaded documents back with
/// [`VectorSource::add_geojson`].
#[derive(Debug, Default)]
pub struct VectorSource {
    features: Vec<Feature>,
    strategy: Option<LoadingStrategy>,
    loaded_extents: Vec<Rect>,
    all_requested: bool,
}

impl VectorSource {
    /// Creates an empty source without remote origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source with the given features.
    pub fn with_features(features: Vec<Feature>) -> Self {
        Self {
            features,
            ..Default::default()
        }
    }

    /// Creates a source loading the whole data set from the url.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            strategy: Some(LoadingStrategy::All(url.into())),
            ..Default::default()
        }
    }

    /// Creates a source loading data by the visible extent.
    pub fn from_url_function(
        url_function: impl Fn(&Rect, f64) -> Result<String, VmapError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            strategy: Some(LoadingStrategy::BBox(Arc::new(url_function))),
            ..Default::default()
        }
    }

    /// Loading strategy of the source, `None` for local sources.
    pub fn strategy(&self) -> Option<&LoadingStrategy> {
        self.strategy.as_ref()
    }

    /// Features of the source.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Mutable features of the source.
    pub fn features_mut(&mut self) -> &mut Vec<Feature> {
        &mut self.features
    }

    /// Adds a feature.
    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Removes all the features.
    pub fn clear(&mut self) {
        self.features.clear();
    }

    /// Parses the GeoJSON document and adds its features, converting them from `data_crs` into
    /// the map projection. Returns the number of added features.
    pub fn add_geojson(&mut self, text: &str, data_crs: &Crs) -> Result<usize, VmapError> {
        let features = geojson::read_features(text, data_crs)?;
        let count = features.len();
        self.features.extend(features);

        log::debug!("Added {count} features from GeoJSON");
        Ok(count)
    }

    /// Bounding rectangle of all the features.
    pub fn extent(&self) -> Option<Rect> {
        self.features
            .iter()
            .filter_map(|f| f.geometry().bounding_rect())
            .reduce(|a, b| a.merge(b))
    }

    /// Url that must be loaded to show the given extent, if any. The extent is considered loaded
    /// after this call.
    pub fn request_url(
        &mut self,
        extent: &Rect,
        resolution: f64,
    ) -> Option<Result<String, VmapError>> {
        match self.strategy.as_ref()? {
            LoadingStrategy::All(url) => {
                if self.all_requested {
                    return None;
                }

                self.all_requested = true;
                Some(Ok(url.clone()))
            }
            LoadingStrategy::BBox(url_function) => {
                if self
                    .loaded_extents
                    .iter()
                    .any(|loaded| contains_rect(loaded, extent))
                {
                    return None;
                }

                let url = url_function(extent, resolution);
                if url.is_ok() {
                    self.loaded_extents.push(*extent);
                }
                Some(url)
            }
        }
    }
}

fn contains_rect(outer: &Rect, inner: &Rect) -> bool {
    outer.x_min() <= inner.x_min()
        && outer.y_min() <= inner.y_min()
        && outer.x_max() >= inner.x_max()
        && outer.y_max() >= inner.y_max()
}

/// Layer showing a set of features with a style.
#[derive(Debug)]
pub struct VectorLayer {
    id: Option<String>,
    source: VectorSource,
    style: FeatureStyle,
}

impl VectorLayer {
    /// Creates a new layer.
    pub fn new(source: VectorSource, style: impl Into<FeatureStyle>) -> Self {
        Self {
            id: None,
            source,
            style: style.into(),
        }
    }

    /// Sets the id of the layer.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Source of the features.
    pub fn source(&self) -> &VectorSource {
        &self.source
    }

    /// Mutable source of the features.
    pub fn source_mut(&mut self) -> &mut VectorSource {
        &mut self.source
    }

    /// Style of the layer.
    pub fn style(&self) -> &FeatureStyle {
        &self.style
    }

    /// Replaces the style of the layer.
    pub fn set_style(&mut self, style: impl Into<FeatureStyle>) {
        self.style = style.into();
    }

    /// Styles to draw the feature with at the given resolution.
    pub fn feature_styles(&self, feature: &Feature, resolution: f64) -> Vec<Style> {
        self.style.resolve(feature, resolution)
    }

    /// Index of the top-most feature whose geometry is within `tolerance` (in map units) from
    /// the point.
    pub fn feature_at(&self, point: &Point2d, tolerance: f64) -> Option<usize> {
        self.source
            .features()
            .iter()
            .rposition(|f| f.geometry().contains_point(point, tolerance))
    }
}

impl Layer for VectorLayer {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
