//! Import of GeoJSON documents into map features.

use geojson::{GeoJson, LineStringType, PolygonType, Position, Value};
use vmap_types::cartesian::Point2d;
use vmap_types::geo::{Crs, ProjectionRegistry};
use vmap_types::geometry::{Contour, Geom, Polygon};
use vmap_types::VmapTypesError;

use crate::error::VmapError;
use crate::layer::Feature;

/// Parses a GeoJSON document (a feature collection, a single feature or a bare geometry) and
/// converts the geometries from `data_crs` into `EPSG:3857`.
///
/// Features without geometry and geometry collections are skipped.
pub fn read_features(text: &str, data_crs: &Crs) -> Result<Vec<Feature>, VmapError> {
    let geojson: GeoJson = text.parse()?;
    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![geojson::Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let registry = ProjectionRegistry::global().read();
    let mut result = Vec::with_capacity(features.len());
    for feature in features {
        let Some(geometry) = &feature.geometry else {
            log::warn!("Skipping GeoJSON feature without geometry");
            continue;
        };
        let Some(geom) = convert_value(&geometry.value)? else {
            log::warn!("Skipping unsupported GeoJSON geometry collection");
            continue;
        };

        let projected = geom.try_map(|p| registry.transform(p, data_crs, &Crs::EPSG3857))?;
        let mut converted = Feature::new(projected);
        if let Some(properties) = feature.properties {
            converted = converted.with_properties(properties);
        }
        converted.set_id(feature.id.map(|id| match id {
            geojson::feature::Id::String(s) => s,
            geojson::feature::Id::Number(n) => n.to_string(),
        }));

        result.push(converted);
    }

    Ok(result)
}

fn convert_value(value: &Value) -> Result<Option<Geom>, VmapError> {
    Ok(Some(match value {
        Value::Point(p) => Geom::Point(convert_point(p)?),
        Value::MultiPoint(points) => Geom::MultiPoint(
            points
                .iter()
                .map(convert_point)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::LineString(points) => Geom::LineString(convert_contour(points)?),
        Value::MultiLineString(lines) => Geom::MultiLineString(
            lines
                .iter()
                .map(convert_contour)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Polygon(polygon) => Geom::Polygon(convert_polygon(polygon)?),
        Value::MultiPolygon(mp) => Geom::MultiPolygon(
            mp.iter()
                .map(convert_polygon)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::GeometryCollection(_) => return Ok(None),
    }))
}

fn convert_point(position: &Position) -> Result<Point2d, VmapError> {
    match position.as_slice() {
        [x, y, ..] => Ok(Point2d::new(*x, *y)),
        _ => Err(VmapTypesError::Conversion(
            "point must contain at least 2 dimensions".to_string(),
        )
        .into()),
    }
}

fn convert_contour(line_string: &LineStringType) -> Result<Contour, VmapError> {
    Ok(Contour::open(
        line_string
            .iter()
            .map(convert_point)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

fn convert_ring(ring: &LineStringType) -> Result<Contour, VmapError> {
    Ok(Contour::closed(
        ring.iter()
            .map(convert_point)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}

fn convert_polygon(polygon: &PolygonType) -> Result<Polygon, VmapError> {
    let Some((outer, inner)) = polygon.split_first() else {
        return Err(VmapError::GeoJson("polygon without rings".to_string()));
    };

    Ok(Polygon::new(
        convert_ring(outer)?,
        inner
            .iter()
            .map(convert_ring)
            .collect::<Result<Vec<_>, _>>()?,
    ))
}
