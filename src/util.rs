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

use crate::json::{JsonObject, JsonValue};
use crate::{Arc, ArcIndexes, Bbox, Error, Geometry, NamedGeometry, Position, TransformParams};

pub fn expect_type(value: &mut JsonObject) -> Result<String, Error> {
    match expect_property(value, "type")? {
        JsonValue::String(s) => Ok(s),
        _ => Err(Error::ExpectedStringValue),
    }
}

fn expect_f64(value: &JsonValue) -> Result<f64, Error> {
    value.as_f64().ok_or(Error::ExpectedF64Value)
}

fn expect_i32(value: &JsonValue) -> Result<i32, Error> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(Error::ExpectedIntegerValue)
}

fn expect_array(value: &JsonValue) -> Result<&Vec<JsonValue>, Error> {
    value.as_array().ok_or(Error::ExpectedArrayValue)
}

fn expect_property(obj: &mut JsonObject, name: &'static str) -> Result<JsonValue, Error> {
    obj.remove(name)
        .ok_or_else(|| Error::ExpectedProperty(name.to_string()))
}

fn expect_owned_array(value: JsonValue) -> Result<Vec<JsonValue>, Error> {
    match value {
        JsonValue::Array(v) => Ok(v),
        _ => Err(Error::ExpectedArrayValue),
    }
}

fn expect_owned_object(value: JsonValue) -> Result<JsonObject, Error> {
    match value {
        JsonValue::Object(o) => Ok(o),
        _ => Err(Error::ExpectedObjectValue),
    }
}

/// Whatever is left in `object` once the known members have been removed.
pub fn get_foreign_members(object: JsonObject) -> Option<JsonObject> {
    if object.is_empty() {
        None
    } else {
        Some(object)
    }
}

/// Retrieve the 'arcs' member of a Topology.
pub fn get_arcs_position(object: &mut JsonObject) -> Result<Vec<Arc>, Error> {
    match object.remove("arcs") {
        Some(a) => json_to_arc_positions(&a),
        None => Err(Error::TopologyExpectedArcs),
    }
}

/// Retrieve a single Position from the value of the "coordinates" key.
///
/// Used by Value::Point
pub fn get_coords_one_pos(object: &mut JsonObject) -> Result<Position, Error> {
    let coords_json = expect_property(object, "coordinates")?;
    json_to_position(&coords_json)
}

/// Used by Value::MultiPoint
pub fn get_coords_1d_pos(object: &mut JsonObject) -> Result<Vec<Position>, Error> {
    let coords_json = expect_property(object, "coordinates")?;
    json_to_1d_positions(&coords_json)
}

/// Used by Value::LineString
pub fn get_arc_ix(object: &mut JsonObject) -> Result<ArcIndexes, Error> {
    let arc_indexes_json = expect_property(object, "arcs")?;
    json_to_arc_indexes(&arc_indexes_json)
}

/// Used by Value::MultiLineString and Value::Polygon
pub fn get_arc_ix_1d(object: &mut JsonObject) -> Result<Vec<ArcIndexes>, Error> {
    let arc_indexes_json = expect_property(object, "arcs")?;
    expect_array(&arc_indexes_json)?
        .iter()
        .map(json_to_arc_indexes)
        .collect()
}

/// Used by Value::MultiPolygon
pub fn get_arc_ix_2d(object: &mut JsonObject) -> Result<Vec<Vec<ArcIndexes>>, Error> {
    let arc_indexes_json = expect_property(object, "arcs")?;
    let mut polygons = Vec::new();
    for polygon in expect_array(&arc_indexes_json)? {
        polygons.push(
            expect_array(polygon)?
                .iter()
                .map(json_to_arc_indexes)
                .collect::<Result<Vec<_>, _>>()?,
        );
    }
    Ok(polygons)
}

/// Retrieve the geometries contained in the 'geometries' member of a GeometryCollection.
pub fn get_geometries(object: &mut JsonObject) -> Result<Vec<Geometry>, Error> {
    let geometries_json = expect_property(object, "geometries")?;
    expect_owned_array(geometries_json)?
        .into_iter()
        .map(|json| -> Result<Geometry, Error> {
            Geometry::from_json_object(expect_owned_object(json)?)
        })
        .collect()
}

pub fn get_id(object: &mut JsonObject) -> Option<JsonValue> {
    object.remove("id")
}

/// Used by Topology and Geometry
pub fn get_bbox(object: &mut JsonObject) -> Result<Option<Bbox>, Error> {
    let bbox_json = match object.remove("bbox") {
        Some(b) => b,
        None => return Ok(None),
    };
    let bbox_array = match bbox_json {
        JsonValue::Array(a) => a,
        _ => return Err(Error::BboxExpectedArray),
    };
    let bbox = bbox_array
        .into_iter()
        .map(|i| i.as_f64().ok_or(Error::BboxExpectedNumericValues))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(bbox))
}

fn numeric_pair(value: &JsonValue) -> Option<[f64; 2]> {
    match value.as_array()?.as_slice() {
        [a, b] => Some([a.as_f64()?, b.as_f64()?]),
        _ => None,
    }
}

/// Retrieve the quantization transform of a Topology, if any.
pub fn get_scale_translate(object: &mut JsonObject) -> Result<Option<TransformParams>, Error> {
    let transform = match object.remove("transform") {
        Some(t) => expect_owned_object(t)?,
        None => return Ok(None),
    };
    let scale = transform
        .get("scale")
        .ok_or(Error::TransformExpectedScale)
        .map(numeric_pair)?
        .ok_or(Error::ScaleExpectedNumericPair)?;
    let translate = transform
        .get("translate")
        .ok_or(Error::TransformExpectedTranslate)
        .map(numeric_pair)?
        .ok_or(Error::TranslateExpectedNumericPair)?;
    Ok(Some(TransformParams { scale, translate }))
}

/// Retrieve the 'properties' member of a Geometry if any.
pub fn get_properties(object: &mut JsonObject) -> Result<Option<JsonObject>, Error> {
    match object.remove("properties") {
        Some(JsonValue::Object(properties)) => Ok(Some(properties)),
        // null counts as absent
        Some(JsonValue::Null) | None => Ok(None),
        _ => Err(Error::PropertiesExpectedObjectOrNull),
    }
}

/// Retrieve the 'objects' member of a Topology.
pub fn get_objects(object: &mut JsonObject) -> Result<Vec<NamedGeometry>, Error> {
    match object.remove("objects") {
        Some(JsonValue::Object(objects)) => objects
            .into_iter()
            .map(|(name, json)| -> Result<NamedGeometry, Error> {
                Ok(NamedGeometry {
                    name,
                    geometry: Geometry::from_json_object(expect_owned_object(json)?)?,
                })
            })
            .collect(),
        Some(_) | None => Err(Error::TopologyExpectedObjects),
    }
}

fn json_to_position(json: &JsonValue) -> Result<Position, Error> {
    let coords = expect_array(json)?
        .iter()
        .map(expect_f64)
        .collect::<Result<Position, _>>()?;
    if coords.len() < 2 {
        return Err(Error::PositionTooShort);
    }
    Ok(coords)
}

fn json_to_1d_positions(json: &JsonValue) -> Result<Vec<Position>, Error> {
    expect_array(json)?.iter().map(json_to_position).collect()
}

fn json_to_arc_indexes(json: &JsonValue) -> Result<ArcIndexes, Error> {
    expect_array(json)?.iter().map(expect_i32).collect()
}

fn json_to_arc_positions(json: &JsonValue) -> Result<Vec<Arc>, Error> {
    expect_array(json)?.iter().map(json_to_1d_positions).collect()
}
