//! Boundary Geometry
//! Region polygons keyed by state name, parsed from a GeoJSON FeatureCollection.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Malformed GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Feature {index} has invalid coordinates")]
    Coordinates { index: usize },
}

/// A closed ring of `[longitude, latitude]` positions.
pub type Ring = Vec<[f64; 2]>;

/// One polygon: the outer ring followed by any holes.
pub type PolygonRings = Vec<Ring>;

/// Boundary of one state, possibly made of several polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBoundary {
    pub name: String,
    pub polygons: Vec<PolygonRings>,
}

#[derive(Deserialize)]
struct FeatureCollectionDoc {
    #[serde(default)]
    features: Vec<FeatureDoc>,
}

#[derive(Deserialize)]
struct FeatureDoc {
    #[serde(default)]
    properties: Option<PropertiesDoc>,
    #[serde(default)]
    geometry: Option<Value>,
}

#[derive(Deserialize)]
struct PropertiesDoc {
    #[serde(default)]
    name: Option<String>,
}

/// All region boundaries, in feature order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    pub regions: Vec<StateBoundary>,
}

impl BoundaryCollection {
    pub fn from_geojson_slice(bytes: &[u8]) -> Result<Self, GeometryError> {
        let doc: FeatureCollectionDoc = serde_json::from_slice(bytes)?;
        let mut regions = Vec::with_capacity(doc.features.len());

        for (index, feature) in doc.features.into_iter().enumerate() {
            let Some(name) = feature.properties.and_then(|p| p.name) else {
                debug!(index, "Skipping feature without a name");
                continue;
            };
            let Some(geometry) = feature.geometry else {
                continue;
            };

            let kind = geometry.get("type").and_then(Value::as_str).unwrap_or("");
            let coordinates = geometry.get("coordinates");
            let polygons = match (kind, coordinates) {
                ("Polygon", Some(coords)) => {
                    vec![parse_polygon(coords).ok_or(GeometryError::Coordinates { index })?]
                }
                ("MultiPolygon", Some(Value::Array(polys))) => polys
                    .iter()
                    .map(parse_polygon)
                    .collect::<Option<Vec<_>>>()
                    .ok_or(GeometryError::Coordinates { index })?,
                _ => {
                    debug!(index, %name, kind, "Ignoring non-polygon geometry");
                    continue;
                }
            };

            regions.push(StateBoundary { name, polygons });
        }

        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn parse_polygon(value: &Value) -> Option<PolygonRings> {
    value.as_array()?.iter().map(parse_ring).collect()
}

fn parse_ring(value: &Value) -> Option<Ring> {
    value
        .as_array()?
        .iter()
        .map(|position| {
            let pos = position.as_array()?;
            let lon = pos.first()?.as_f64()?;
            let lat = pos.get(1)?.as_f64()?;
            Some([lon, lat])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"name": "Colorado"},
             "geometry": {"type": "Polygon", "coordinates": [[[-109.05, 41.0], [-102.05, 41.0], [-102.05, 37.0], [-109.05, 37.0], [-109.05, 41.0]]]}},
            {"type": "Feature", "properties": {"name": "Hawaii"},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                 [[[-155.0, 19.0], [-154.8, 19.5], [-155.5, 20.2], [-155.0, 19.0]]],
                 [[[-156.0, 20.6], [-156.4, 20.9], [-156.7, 20.8], [-156.0, 20.6, 12.0]]]
             ]}},
            {"type": "Feature", "properties": {"name": "Marker"},
             "geometry": {"type": "Point", "coordinates": [-100.0, 40.0]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}}
        ]
    }"#;

    fn region<'a>(boundaries: &'a BoundaryCollection, name: &str) -> &'a StateBoundary {
        boundaries.regions.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn parses_polygon_and_multipolygon_features() {
        let boundaries = BoundaryCollection::from_geojson_slice(GEOJSON.as_bytes()).unwrap();

        assert_eq!(boundaries.len(), 2);
        let colorado = region(&boundaries, "Colorado");
        assert_eq!(colorado.polygons.len(), 1);
        assert_eq!(colorado.polygons[0][0].len(), 5);

        let hawaii = region(&boundaries, "Hawaii");
        assert_eq!(hawaii.polygons.len(), 2);
        assert_eq!(hawaii.polygons[1][0][3], [-156.0, 20.6]);
    }

    #[test]
    fn collection_without_polygons_is_empty() {
        let doc = r#"{"type": "FeatureCollection", "features": [
            {"properties": {"name": "Marker"}, "geometry": {"type": "Point", "coordinates": [0, 0]}}
        ]}"#;
        let boundaries = BoundaryCollection::from_geojson_slice(doc.as_bytes()).unwrap();
        assert!(boundaries.is_empty());
        assert_eq!(boundaries.len(), 0);
    }

    #[test]
    fn bad_coordinates_are_an_error() {
        let doc = r#"{"features": [{"properties": {"name": "X"},
            "geometry": {"type": "Polygon", "coordinates": [[["a", 1]]]}}]}"#;
        let err = BoundaryCollection::from_geojson_slice(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, GeometryError::Coordinates { index: 0 }));
    }
}
