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

use std::io::{Read, Seek};

use crate::json::JsonValue;
use crate::{Error, Upload};

/// Content types accepted for a GeoJSON upload
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] =
    ["application/geo+json", "application/json", "text/json"];

/// Top-level GeoJSON object types
///
/// [GeoJSON Format Specification § 1.4](https://tools.ietf.org/html/rfc7946#section-1.4)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeoJsonType {
    FeatureCollection,
    Feature,
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeoJsonType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "FeatureCollection" => Some(GeoJsonType::FeatureCollection),
            "Feature" => Some(GeoJsonType::Feature),
            "Point" => Some(GeoJsonType::Point),
            "LineString" => Some(GeoJsonType::LineString),
            "Polygon" => Some(GeoJsonType::Polygon),
            "MultiPoint" => Some(GeoJsonType::MultiPoint),
            "MultiLineString" => Some(GeoJsonType::MultiLineString),
            "MultiPolygon" => Some(GeoJsonType::MultiPolygon),
            "GeometryCollection" => Some(GeoJsonType::GeometryCollection),
            _ => None,
        }
    }
}

fn is_accepted_content_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    ACCEPTED_CONTENT_TYPES
        .iter()
        .any(|accepted| accepted.eq_ignore_ascii_case(essence))
}

/// Check that an upload is structurally GeoJSON.
///
/// Nothing is written anywhere; the stream is left rewound to its start so the
/// converter can read it again.
pub fn validate_geojson<R: Read + Seek>(upload: &mut Upload<R>) -> Result<GeoJsonType, Error> {
    if !is_accepted_content_type(upload.content_type()) {
        return Err(Error::UnsupportedContentType(upload.content_type().to_owned()));
    }
    let contents = upload.read_contents()?;
    check_document(&contents)
}

fn check_document(contents: &[u8]) -> Result<GeoJsonType, Error> {
    let text = std::str::from_utf8(contents).map_err(|_| Error::InvalidEncoding)?;
    let document: JsonValue = serde_json::from_str(text).map_err(|_| Error::InvalidFileFormat)?;
    match document.get("type") {
        Some(JsonValue::String(t)) => {
            GeoJsonType::from_str(t).ok_or_else(|| Error::InvalidGeoJsonType(t.to_owned()))
        }
        Some(other) => Err(Error::InvalidGeoJsonType(other.to_string())),
        None => Err(Error::MissingType),
    }
}
