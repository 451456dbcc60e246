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

use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::json::{self, Deserialize, Deserializer, JsonObject, Serialize, Serializer};
use crate::{Error, Geometry, Topology};

/// TopoJSON Objects (either Topology or Geometry)
///
/// [TopoJSON Format Specification § 2](https://github.com/topojson/topojson-specification#2-topojson-objects)
#[derive(Clone, Debug, PartialEq)]
pub enum TopoJson {
    /// [TopoJSON Format Specification § 2.2](https://github.com/topojson/topojson-specification#22-geometry-objects)
    Geometry(Geometry),
    /// [TopoJSON Format Specification § 2.1](https://github.com/topojson/topojson-specification#21-topology-objects)
    Topology(Topology),
}

impl From<Geometry> for TopoJson {
    fn from(geometry: Geometry) -> Self {
        TopoJson::Geometry(geometry)
    }
}

impl From<Topology> for TopoJson {
    fn from(topo: Topology) -> Self {
        TopoJson::Topology(topo)
    }
}

impl TryFrom<TopoJson> for Topology {
    type Error = Error;

    fn try_from(topo: TopoJson) -> Result<Self, Self::Error> {
        match topo {
            TopoJson::Topology(t) => Ok(t),
            TopoJson::Geometry(g) => Err(Error::ExpectedType {
                expected: "Topology".to_owned(),
                actual: g.value.type_name().to_owned(),
            }),
        }
    }
}

impl TopoJson {
    pub fn from_json_object(object: JsonObject) -> Result<Self, Error> {
        let type_ = match object.get("type") {
            Some(json::JsonValue::String(t)) => Type::from_str(t),
            _ => return Err(Error::ExpectedProperty("type".to_owned())),
        };
        match type_.ok_or(Error::TopoJsonUnknownType)? {
            Type::Topology => Topology::from_json_object(object).map(TopoJson::Topology),
            _ => Geometry::from_json_object(object).map(TopoJson::Geometry),
        }
    }
}

#[derive(PartialEq, Clone, Copy)]
pub(crate) enum Type {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    Topology,
}

impl Type {
    pub(crate) fn from_str(s: &str) -> Option<Self> {
        match s {
            "Point" => Some(Type::Point),
            "MultiPoint" => Some(Type::MultiPoint),
            "LineString" => Some(Type::LineString),
            "MultiLineString" => Some(Type::MultiLineString),
            "Polygon" => Some(Type::Polygon),
            "MultiPolygon" => Some(Type::MultiPolygon),
            "GeometryCollection" => Some(Type::GeometryCollection),
            "Topology" => Some(Type::Topology),
            _ => None,
        }
    }
}

impl Serialize for TopoJson {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            TopoJson::Geometry(ref geometry) => geometry.serialize(serializer),
            TopoJson::Topology(ref topo) => topo.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TopoJson {
    fn deserialize<D>(deserializer: D) -> Result<TopoJson, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as SerdeError;

        let val = JsonObject::deserialize(deserializer)?;

        TopoJson::from_json_object(val).map_err(D::Error::custom)
    }
}

impl FromStr for TopoJson {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match serde_json::from_str(s).map_err(|e| Error::MalformedJson(e.to_string()))? {
            json::JsonValue::Object(object) => TopoJson::from_json_object(object),
            _ => Err(Error::ExpectedObjectValue),
        }
    }
}

impl fmt::Display for TopoJson {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        serde_json::to_string(self)
            .map_err(|_| fmt::Error)
            .and_then(|s| f.write_str(&s))
    }
}
