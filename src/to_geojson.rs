// Copyright 2018 The GeoRust Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry as GeoJsonGeometry, Value as GeoJsonValue};

use crate::json::JsonValue;
use crate::{Arc, Error, Geometry, Position, Topology, TransformParams, Value};

/// Resolves arc references against the arcs of one topology.
struct Arcs<'a> {
    arcs: &'a [Arc],
    transform: Option<&'a TransformParams>,
}

impl Arcs<'_> {
    fn point(&self, position: &Position) -> Position {
        let mut point = position.clone();
        if let Some(tr) = self.transform {
            let (x, y) = tr.apply(position[0], position[1]);
            point[0] = x;
            point[1] = y;
        }
        point
    }

    /// Absolute positions of one arc, reversed for a negative index.
    fn arc(&self, index: i32) -> Result<Vec<Position>, Error> {
        let (ix, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let arc = usize::try_from(ix)
            .ok()
            .and_then(|ix| self.arcs.get(ix))
            .ok_or(Error::ArcIndexOutOfRange(index))?;

        let mut points = match self.transform {
            None => arc.clone(),
            Some(tr) => {
                let (mut x, mut y) = (0., 0.);
                arc.iter()
                    .map(|p| {
                        x += p[0];
                        y += p[1];
                        let (px, py) = tr.apply(x, y);
                        vec![px, py]
                    })
                    .collect()
            }
        };
        if reversed {
            points.reverse();
        }
        Ok(points)
    }

    /// Stitch consecutive arcs into one line; each arc after the first starts
    /// where the previous one ended.
    fn line(&self, indexes: &[i32]) -> Result<Vec<Position>, Error> {
        let mut line: Vec<Position> = Vec::new();
        for &index in indexes {
            let points = self.arc(index)?;
            let skip = if line.is_empty() { 0 } else { 1 };
            line.extend(points.into_iter().skip(skip));
        }
        Ok(line)
    }

    fn lines(&self, indexes: &[Vec<i32>]) -> Result<Vec<Vec<Position>>, Error> {
        indexes.iter().map(|ixs| self.line(ixs)).collect()
    }

    fn value(&self, value: &Value) -> Result<GeoJsonValue, Error> {
        Ok(match value {
            Value::Point(p) => GeoJsonValue::Point(self.point(p)),
            Value::MultiPoint(points) => {
                GeoJsonValue::MultiPoint(points.iter().map(|p| self.point(p)).collect())
            }
            Value::LineString(ixs) => GeoJsonValue::LineString(self.line(ixs)?),
            Value::MultiLineString(ixs) => GeoJsonValue::MultiLineString(self.lines(ixs)?),
            Value::Polygon(ixs) => GeoJsonValue::Polygon(self.lines(ixs)?),
            Value::MultiPolygon(polygons) => GeoJsonValue::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| self.lines(rings))
                    .collect::<Result<_, _>>()?,
            ),
            Value::GeometryCollection(geometries) => GeoJsonValue::GeometryCollection(
                geometries
                    .iter()
                    .map(|g| self.value(&g.value).map(GeoJsonGeometry::new))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn feature(&self, geometry: &Geometry) -> Result<Feature, Error> {
        Ok(Feature {
            bbox: geometry.bbox.clone(),
            geometry: Some(GeoJsonGeometry::new(self.value(&geometry.value)?)),
            id: geometry.id.as_ref().and_then(feature_id),
            properties: geometry.properties.clone(),
            foreign_members: geometry.foreign_members.clone(),
        })
    }
}

fn feature_id(id: &JsonValue) -> Option<Id> {
    match id {
        JsonValue::String(s) => Some(Id::String(s.clone())),
        JsonValue::Number(n) => Some(Id::Number(n.clone())),
        other => {
            log::warn!("dropping feature id {} that is neither a string nor a number", other);
            None
        }
    }
}

/// Convert a TopoJSON Topology object to a GeoJSON Feature collection.
///
/// (in a similar way than [topojson.feature](https://github.com/topojson/topojson-client#feature) function
/// or [topo2geo](https://github.com/topojson/topojson-client#topo2geo) CLI tool)
///
/// A GeometryCollection object yields one feature per member geometry, any
/// other object a single feature.
pub fn to_geojson(topo: &Topology, key: &str) -> Result<FeatureCollection, Error> {
    let object = topo
        .object(key)
        .ok_or_else(|| Error::TopoToGeoUnknownKey(key.to_owned()))?;
    let arcs = Arcs {
        arcs: &topo.arcs,
        transform: topo.transform.as_ref(),
    };
    let features = match &object.value {
        Value::GeometryCollection(geometries) => geometries
            .iter()
            .map(|g| arcs.feature(g))
            .collect::<Result<Vec<_>, _>>()?,
        _ => vec![arcs.feature(object)?],
    };

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use geojson::{GeoJson, Value as GeoJsonValue};

    use crate::{to_geojson, Error, TopoJson, Topology, TopologyOptions};

    fn decode(json_string: &str) -> Topology {
        match json_string.parse::<TopoJson>().unwrap() {
            TopoJson::Topology(t) => t,
            _ => unreachable!(),
        }
    }

    #[test]
    fn convert_fails_unknown_key() {
        let topo = decode("{\"arcs\":[[[2.2,2.2],[3.3,3.3]]],\"objects\":{\"example\":{\"arcs\":[0],\"type\":\"LineString\"}},\"type\":\"Topology\"}");
        assert_matches!(
            to_geojson(&topo, "foo"),
            Err(Error::TopoToGeoUnknownKey(ref key)) if key == "foo"
        );
    }

    #[test]
    fn convert_fails_out_of_range_arc() {
        let topo = decode("{\"arcs\":[[[2.2,2.2],[3.3,3.3]]],\"objects\":{\"example\":{\"arcs\":[[0,-3]],\"type\":\"MultiLineString\"}},\"type\":\"Topology\"}");
        assert_matches!(to_geojson(&topo, "example"), Err(Error::ArcIndexOutOfRange(-3)));
    }

    #[test]
    fn convert_quantized_topology_example() {
        // This is the quantized example from https://github.com/topojson/topojson-specification#11-examples
        let topo_json_str = "{\"arcs\":[[[4000,0],[1999,9999],[2000,-9999],[2000,9999]],[[0,0],[0,9999],[2000,0],[0,-9999],[-2000,0]]],\"objects\":{\"example\":{\"geometries\":[{\"coordinates\":[4000,5000],\"properties\":{\"prop0\":\"value0\"},\"type\":\"Point\"},{\"arcs\":[0],\"properties\":{\"prop0\":\"value0\",\"prop1\":0},\"type\":\"LineString\"},{\"arcs\":[[1]],\"properties\":{\"prop0\":\"value0\",\"prop1\":{\"this\":\"that\"}},\"type\":\"Polygon\"}],\"type\":\"GeometryCollection\"}},\"type\":\"Topology\",\"transform\":{\"scale\":[0.0005000500050005,0.00010001000100010001],\"translate\":[100,0]}}";

        let geojson_obj =
            to_geojson(&decode(topo_json_str), "example").expect("Unable to convert to GeoJson");
        let geojson_string = GeoJson::FeatureCollection(geojson_obj).to_string();

        // The expected result was obtained using [topo2geo CLI tool](https://github.com/topojson/topojson-client#command-line-reference)
        // (then parsed with rust to obtain the same rounding issues)
        let expected_geojson_string = "{\"features\":[{\"geometry\":{\"coordinates\":[102.000200020002,0.5000500050005],\"type\":\"Point\"},\"properties\":{\"prop0\":\"value0\"},\"type\":\"Feature\"},{\"geometry\":{\"coordinates\":[[102.000200020002,0.0],[102.999799979998,0.9999999999999999],[103.999899989999,0.0],[105.0,0.9999999999999999]],\"type\":\"LineString\"},\"properties\":{\"prop0\":\"value0\",\"prop1\":0},\"type\":\"Feature\"},{\"geometry\":{\"coordinates\":[[[100.0,0.0],[100.0,0.9999999999999999],[101.000100010001,0.9999999999999999],[101.000100010001,0.0],[100.0,0.0]]],\"type\":\"Polygon\"},\"properties\":{\"prop0\":\"value0\",\"prop1\":{\"this\":\"that\"}},\"type\":\"Feature\"}],\"type\":\"FeatureCollection\"}";

        // Compared as parsed values: member order differs between geojson releases.
        let actual: serde_json::Value = serde_json::from_str(&geojson_string).unwrap();
        let expected: serde_json::Value = serde_json::from_str(expected_geojson_string).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn stitched_rings_do_not_repeat_junctions() {
        let topo = decode("{\"type\":\"Topology\",\"objects\":{\"square\":{\"type\":\"Polygon\",\"arcs\":[[0,-2]]}},\"arcs\":[[[0,0],[1,0],[1,1]],[[0,0],[0,1],[1,1]]]}");
        let fc = to_geojson(&topo, "square").unwrap();
        assert_eq!(fc.features.len(), 1);
        let value = &fc.features[0].geometry.as_ref().unwrap().value;
        assert_eq!(
            *value,
            GeoJsonValue::Polygon(vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 1.0],
                vec![0.0, 0.0],
            ]])
        );
    }

    #[test]
    fn nested_collections_keep_their_members() {
        let topo = decode("{\"type\":\"Topology\",\"objects\":{\"data\":{\"type\":\"GeometryCollection\",\"geometries\":[{\"type\":\"GeometryCollection\",\"id\":\"pair\",\"geometries\":[{\"type\":\"Point\",\"coordinates\":[1,2]},{\"type\":\"LineString\",\"arcs\":[-1]}]}]}},\"arcs\":[[[0,0],[3,4]]]}");
        let fc = to_geojson(&topo, "data").unwrap();
        assert_eq!(fc.features.len(), 1);
        assert_eq!(
            fc.features[0].id,
            Some(geojson::feature::Id::String("pair".to_owned()))
        );
        match &fc.features[0].geometry.as_ref().unwrap().value {
            GeoJsonValue::GeometryCollection(members) => {
                assert_eq!(members.len(), 2);
                assert_eq!(
                    members[1].value,
                    GeoJsonValue::LineString(vec![vec![3.0, 4.0], vec![0.0, 0.0]])
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn encoded_features_read_back() {
        let source = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "A"}, "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
            {"type": "Feature", "properties": {"name": "B"}, "geometry": {"type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]]}}
        ]}"#;
        let topology = Topology::from_geojson(
            &source.parse::<GeoJson>().unwrap(),
            &TopologyOptions::default(),
        )
        .unwrap();
        let fc = to_geojson(&topology, "data").unwrap();
        assert_eq!(fc.features.len(), 2);
        for feature in &fc.features {
            match &feature.geometry.as_ref().unwrap().value {
                GeoJsonValue::Polygon(rings) => {
                    assert_eq!(rings[0].len(), 5);
                    assert_eq!(rings[0].first(), rings[0].last());
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(
            fc.features[1].properties.as_ref().unwrap()["name"],
            serde_json::json!("B")
        );
    }
}
