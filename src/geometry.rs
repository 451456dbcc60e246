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

use serde::ser::SerializeMap;

use crate::json::{Deserialize, Deserializer, JsonObject, JsonValue, Serialize, Serializer};
use crate::topojson::Type;
use crate::{util, ArcIndexes, Bbox, Error, Position};

/// The underlying Geometry value (which may contain Position or Arc indexes)
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Point
    ///
    /// [TopoJSON Format Specification § 2.2.1](https://github.com/topojson/topojson-specification#221-point)
    Point(Position),

    /// MultiPoint
    ///
    /// [TopoJSON Format Specification § 2.2.2](https://github.com/topojson/topojson-specification#222-multipoint)
    MultiPoint(Vec<Position>),

    /// LineString
    ///
    /// [TopoJSON Format Specification § 2.2.3](https://github.com/topojson/topojson-specification#223-linestring)
    LineString(ArcIndexes),

    /// MultiLineString
    ///
    /// [TopoJSON Format Specification § 2.2.4](https://github.com/topojson/topojson-specification#224-multilinestring)
    MultiLineString(Vec<ArcIndexes>),

    /// Polygon
    ///
    /// [TopoJSON Format Specification § 2.2.5](https://github.com/topojson/topojson-specification#225-polygon)
    Polygon(Vec<ArcIndexes>),

    /// MultiPolygon
    ///
    /// [TopoJSON Format Specification § 2.2.6](https://github.com/topojson/topojson-specification#226-multipolygon)
    MultiPolygon(Vec<Vec<ArcIndexes>>),

    /// GeometryCollection
    ///
    /// [TopoJSON Format Specification § 2.2.7](https://github.com/topojson/topojson-specification#227-geometry-collection)
    GeometryCollection(Vec<Geometry>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match *self {
            Value::Point(..) => "Point",
            Value::MultiPoint(..) => "MultiPoint",
            Value::LineString(..) => "LineString",
            Value::MultiLineString(..) => "MultiLineString",
            Value::Polygon(..) => "Polygon",
            Value::MultiPolygon(..) => "MultiPolygon",
            Value::GeometryCollection(..) => "GeometryCollection",
        }
    }

    fn serialize_member<M>(&self, map: &mut M, quantized: bool) -> Result<(), M::Error>
    where
        M: SerializeMap,
    {
        match *self {
            Value::Point(ref x) if quantized => {
                map.serialize_entry("coordinates", &IntegerPosition(x))
            }
            Value::MultiPoint(ref x) if quantized => {
                map.serialize_entry("coordinates", &IntegerPositions(x))
            }
            Value::GeometryCollection(ref x) if quantized => {
                map.serialize_entry("geometries", &QuantizedGeometries(x))
            }
            Value::Point(ref x) => map.serialize_entry("coordinates", x),
            Value::MultiPoint(ref x) => map.serialize_entry("coordinates", x),
            Value::LineString(ref x) => map.serialize_entry("arcs", x),
            Value::MultiLineString(ref x) => map.serialize_entry("arcs", x),
            Value::Polygon(ref x) => map.serialize_entry("arcs", x),
            Value::MultiPolygon(ref x) => map.serialize_entry("arcs", x),
            Value::GeometryCollection(ref x) => map.serialize_entry("geometries", x),
        }
    }
}

/// Geometry Objects
///
/// [TopoJSON Format Specification § 2.2](https://github.com/topojson/topojson-specification#22-geometry-objects)
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub bbox: Option<Bbox>,
    pub value: Value,
    pub properties: Option<JsonObject>,
    pub id: Option<JsonValue>,
    /// Foreign Members
    ///
    /// [TopoJSON Format Specification](https://github.com/topojson/topojson-specification#22-geometry-objects)
    pub foreign_members: Option<JsonObject>,
}

impl Geometry {
    /// Returns a new `Geometry` with the specified `value`. Every other member
    /// is set to `None`.
    pub fn new(value: Value) -> Self {
        Geometry {
            bbox: None,
            id: None,
            value,
            properties: None,
            foreign_members: None,
        }
    }

    pub fn from_json_object(mut object: JsonObject) -> Result<Self, Error> {
        let type_ = util::expect_type(&mut object)?;
        let value = match Type::from_str(&type_).ok_or(Error::TopoJsonUnknownType)? {
            Type::Point => Value::Point(util::get_coords_one_pos(&mut object)?),
            Type::MultiPoint => Value::MultiPoint(util::get_coords_1d_pos(&mut object)?),
            Type::LineString => Value::LineString(util::get_arc_ix(&mut object)?),
            Type::MultiLineString => Value::MultiLineString(util::get_arc_ix_1d(&mut object)?),
            Type::Polygon => Value::Polygon(util::get_arc_ix_1d(&mut object)?),
            Type::MultiPolygon => Value::MultiPolygon(util::get_arc_ix_2d(&mut object)?),
            Type::GeometryCollection => {
                Value::GeometryCollection(util::get_geometries(&mut object)?)
            }
            Type::Topology => return Err(Error::GeometryUnknownType),
        };
        Ok(Geometry {
            value,
            bbox: util::get_bbox(&mut object)?,
            id: util::get_id(&mut object),
            properties: util::get_properties(&mut object)?,
            foreign_members: util::get_foreign_members(object),
        })
    }
}

impl Geometry {
    fn serialize_with<S>(&self, serializer: S, quantized: bool) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.value.type_name())?;
        if let Some(ref bbox) = self.bbox {
            map.serialize_entry("bbox", bbox)?;
        }
        self.value.serialize_member(&mut map, quantized)?;
        if let Some(ref id) = self.id {
            map.serialize_entry("id", id)?;
        }
        if let Some(ref properties) = self.properties {
            map.serialize_entry("properties", properties)?;
        }
        if let Some(ref foreign_members) = self.foreign_members {
            for (key, value) in foreign_members {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl Serialize for Geometry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.serialize_with(serializer, false)
    }
}

/// A position written with integer members, as stored in a quantized topology.
pub(crate) struct IntegerPosition<'a>(pub(crate) &'a [f64]);

impl Serialize for IntegerPosition<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(|v| v.round() as i64))
    }
}

pub(crate) struct IntegerPositions<'a>(pub(crate) &'a [Position]);

impl Serialize for IntegerPositions<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(|p| IntegerPosition(p)))
    }
}

/// A geometry whose positions are written as integers.
pub(crate) struct QuantizedGeometry<'a>(pub(crate) &'a Geometry);

impl Serialize for QuantizedGeometry<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize_with(serializer, true)
    }
}

struct QuantizedGeometries<'a>(&'a [Geometry]);

impl Serialize for QuantizedGeometries<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(QuantizedGeometry))
    }
}

impl<'de> Deserialize<'de> for Geometry {
    fn deserialize<D>(deserializer: D) -> Result<Geometry, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as SerdeError;

        let val = JsonObject::deserialize(deserializer)?;

        Geometry::from_json_object(val).map_err(D::Error::custom)
    }
}

/// One member of the 'objects' member of a Topology
///
/// [TopoJSON Format Specification § 2.1.5](https://github.com/topojson/topojson-specification#215-objects)
#[derive(Clone, Debug, PartialEq)]
pub struct NamedGeometry {
    pub name: String,
    pub geometry: Geometry,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use crate::json::JsonObject;
    use crate::{Error, Geometry, TopoJson, Value};

    fn encode(geometry: &Geometry) -> String {
        serde_json::to_string(&geometry).unwrap()
    }

    fn decode(json_string: &str) -> Geometry {
        match json_string.parse::<TopoJson>().unwrap() {
            TopoJson::Geometry(g) => g,
            _ => unreachable!(),
        }
    }

    #[test]
    fn decode_linestring_without_arcs() {
        let result = "{\"coordinates\":[0],\"type\":\"LineString\"}".parse::<TopoJson>();
        assert_matches!(result, Err(Error::ExpectedProperty(ref p)) if p == "arcs");
    }

    #[test]
    fn decode_point_with_short_position() {
        let result = "{\"coordinates\":[1.0],\"type\":\"Point\"}".parse::<TopoJson>();
        assert_matches!(result, Err(Error::PositionTooShort));
    }

    #[test]
    fn polygon_referencing_reversed_arc() {
        let geometry = Geometry::new(Value::Polygon(vec![vec![0, -2]]));
        let json_string = encode(&geometry);
        assert_eq!(json_string, "{\"type\":\"Polygon\",\"arcs\":[[0,-2]]}");
        assert_eq!(decode(&json_string), geometry);
    }

    #[test]
    fn feature_members_survive() {
        let mut properties = JsonObject::new();
        properties.insert("name".to_owned(), json!("Nairobi"));
        let mut foreign_members = JsonObject::new();
        foreign_members.insert("source".to_owned(), json!("survey"));
        let geometry = Geometry {
            bbox: Some(vec![36.6, -1.45, 37.1, -1.15]),
            value: Value::MultiPolygon(vec![vec![vec![0, 1]], vec![vec![!1]]]),
            properties: Some(properties),
            id: Some(json!(47)),
            foreign_members: Some(foreign_members),
        };

        let json_string = encode(&geometry);
        assert_eq!(
            json_string,
            "{\"type\":\"MultiPolygon\",\"bbox\":[36.6,-1.45,37.1,-1.15],\
             \"arcs\":[[[0,1]],[[-2]]],\"id\":47,\"properties\":{\"name\":\"Nairobi\"},\
             \"source\":\"survey\"}"
        );
        assert_eq!(decode(&json_string), geometry);
    }

    #[test]
    fn nested_collection() {
        let geometry = Geometry::new(Value::GeometryCollection(vec![
            Geometry::new(Value::Point(vec![100.0, 0.0])),
            Geometry::new(Value::LineString(vec![0])),
        ]));
        let json_string = encode(&geometry);
        assert_eq!(
            json_string,
            "{\"type\":\"GeometryCollection\",\"geometries\":[\
             {\"type\":\"Point\",\"coordinates\":[100.0,0.0]},\
             {\"type\":\"LineString\",\"arcs\":[0]}]}"
        );
        assert_eq!(decode(&json_string), geometry);
    }

    #[test]
    fn null_properties_are_absent() {
        let geometry = decode("{\"type\":\"Point\",\"coordinates\":[1,2],\"properties\":null}");
        assert_eq!(geometry.properties, None);
        let result =
            "{\"type\":\"Point\",\"coordinates\":[1,2],\"properties\":3}".parse::<TopoJson>();
        assert_matches!(result, Err(Error::PropertiesExpectedObjectOrNull));
    }
}
