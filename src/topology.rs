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

use crate::json::{Deserialize, Deserializer, JsonObject, Serialize, Serializer};
use crate::geometry::{IntegerPositions, QuantizedGeometry};
use crate::{util, Arc, Bbox, Error, Geometry, NamedGeometry};

/// Quantization transform
///
/// [TopoJSON Format Specification § 2.1.2](https://github.com/topojson/topojson-specification#212-transforms)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformParams {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl TransformParams {
    /// Map a quantized position back to coordinates.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        )
    }
}

/// Topology Object
///
/// [TopoJSON Format Specification § 2.1](https://github.com/topojson/topojson-specification#21-topology-objects)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
    pub bbox: Option<Bbox>,
    pub objects: Vec<NamedGeometry>,
    pub transform: Option<TransformParams>,
    pub arcs: Vec<Arc>,
    /// Foreign Members
    pub foreign_members: Option<JsonObject>,
}

impl Topology {
    pub fn from_json_object(mut object: JsonObject) -> Result<Self, Error> {
        let type_ = util::expect_type(&mut object)?;
        if type_ != "Topology" {
            return Err(Error::ExpectedType {
                expected: "Topology".to_owned(),
                actual: type_,
            });
        }
        Ok(Topology {
            arcs: util::get_arcs_position(&mut object)?,
            objects: util::get_objects(&mut object)?,
            transform: util::get_scale_translate(&mut object)?,
            bbox: util::get_bbox(&mut object)?,
            foreign_members: util::get_foreign_members(object),
        })
    }

    /// Look up a named member of 'objects'.
    pub fn object(&self, name: &str) -> Option<&Geometry> {
        self.objects
            .iter()
            .find(|ng| ng.name == name)
            .map(|ng| &ng.geometry)
    }

    /// Names of the members of 'objects'.
    pub fn list_names(&self) -> Vec<&str> {
        self.objects.iter().map(|ng| ng.name.as_str()).collect()
    }
}

struct Objects<'a> {
    objects: &'a [NamedGeometry],
    quantized: bool,
}

impl Serialize for Objects<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.objects.len()))?;
        for named in self.objects {
            if self.quantized {
                map.serialize_entry(&named.name, &QuantizedGeometry(&named.geometry))?;
            } else {
                map.serialize_entry(&named.name, &named.geometry)?;
            }
        }
        map.end()
    }
}

/// Quantized arcs hold integer deltas.
struct IntegerArcs<'a>(&'a [Arc]);

impl Serialize for IntegerArcs<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(|arc| IntegerPositions(arc)))
    }
}

impl Serialize for Topology {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", "Topology")?;
        if let Some(ref bbox) = self.bbox {
            map.serialize_entry("bbox", bbox)?;
        }
        if let Some(ref transform) = self.transform {
            map.serialize_entry("transform", transform)?;
        }
        let quantized = self.transform.is_some();
        let objects = Objects {
            objects: &self.objects,
            quantized,
        };
        map.serialize_entry("objects", &objects)?;
        if quantized {
            map.serialize_entry("arcs", &IntegerArcs(&self.arcs))?;
        } else {
            map.serialize_entry("arcs", &self.arcs)?;
        }
        if let Some(ref foreign_members) = self.foreign_members {
            for (key, value) in foreign_members {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Topology {
    fn deserialize<D>(deserializer: D) -> Result<Topology, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as SerdeError;

        let val = JsonObject::deserialize(deserializer)?;

        Topology::from_json_object(val).map_err(D::Error::custom)
    }
}
