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

//! Encoding GeoJSON features as a TopoJSON topology.
//!
//! Works the way [topojson-server](https://github.com/topojson/topojson-server)
//! does: every line and ring is extracted, junctions are found where shared
//! boundaries meet or diverge, lines and rings are cut at those junctions and
//! the resulting arcs are deduplicated so that a boundary shared by two
//! features is stored once.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use geojson::feature::Id;
use geojson::{Feature, GeoJson, Value as GeoJsonValue};

use crate::json::{JsonObject, JsonValue};
use crate::{
    Arc, ArcIndexes, Error, Geometry, NamedGeometry, Position, Topology, TransformParams, Value,
};

const DEFAULT_OBJECT_NAME: &str = "data";

/// How [`Topology::from_geojson`] lays out its output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyOptions {
    /// Name of the GeometryCollection under 'objects'
    pub object_name: String,
    /// Quantize onto a `q` by `q` grid (q >= 2) and delta-encode the arcs.
    pub quantization: Option<u32>,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        TopologyOptions {
            object_name: DEFAULT_OBJECT_NAME.to_owned(),
            quantization: None,
        }
    }
}

/// Exact identity of a position; `-0.0` and `0.0` share a key.
type PointKey = (u64, u64);

fn point_key(p: &[f64]) -> PointKey {
    ((p[0] + 0.0).to_bits(), (p[1] + 0.0).to_bits())
}

fn compare_positions(a: &Position, b: &Position) -> Ordering {
    a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1]))
}

/// A line or a closed ring, before it is cut into arcs.
struct Part {
    coords: Vec<Position>,
    closed: bool,
}

/// Geometry whose lines and rings are references into `Extraction::parts`.
enum Shape {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(usize),
    MultiLineString(Vec<usize>),
    Polygon(Vec<usize>),
    MultiPolygon(Vec<Vec<usize>>),
    GeometryCollection(Vec<Shape>),
}

struct Item {
    shape: Shape,
    properties: Option<JsonObject>,
    id: Option<JsonValue>,
}

#[derive(Default)]
struct Extraction {
    parts: Vec<Part>,
    items: Vec<Item>,
    extent: Option<[f64; 4]>,
}

impl Extraction {
    fn feature(&mut self, feature: &Feature) -> Result<(), Error> {
        let geometry = match feature.geometry {
            Some(ref g) => g,
            None => {
                log::warn!("skipping feature {:?} without geometry", feature.id);
                return Ok(());
            }
        };
        let shape = self.shape(&geometry.value)?;
        self.items.push(Item {
            shape,
            properties: feature.properties.clone(),
            id: feature.id.as_ref().map(|id| match id {
                Id::String(s) => JsonValue::String(s.clone()),
                Id::Number(n) => JsonValue::Number(n.clone()),
            }),
        });
        Ok(())
    }

    fn shape(&mut self, value: &GeoJsonValue) -> Result<Shape, Error> {
        Ok(match value {
            GeoJsonValue::Point(p) => Shape::Point(self.position(p)?),
            GeoJsonValue::MultiPoint(points) => Shape::MultiPoint(
                points
                    .iter()
                    .map(|p| self.position(p))
                    .collect::<Result<_, _>>()?,
            ),
            GeoJsonValue::LineString(line) => Shape::LineString(self.line(line)?),
            GeoJsonValue::MultiLineString(lines) => Shape::MultiLineString(
                lines
                    .iter()
                    .map(|line| self.line(line))
                    .collect::<Result<_, _>>()?,
            ),
            GeoJsonValue::Polygon(rings) => Shape::Polygon(self.polygon(rings)?),
            GeoJsonValue::MultiPolygon(polygons) => Shape::MultiPolygon(
                polygons
                    .iter()
                    .map(|rings| self.polygon(rings))
                    .collect::<Result<_, _>>()?,
            ),
            GeoJsonValue::GeometryCollection(geometries) => Shape::GeometryCollection(
                geometries
                    .iter()
                    .map(|g| self.shape(&g.value))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    fn position(&mut self, raw: &[f64]) -> Result<Position, Error> {
        match *raw {
            [x, y, ..] => {
                self.extent = Some(match self.extent {
                    None => [x, y, x, y],
                    Some([x0, y0, x1, y1]) => [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
                });
                Ok(vec![x, y])
            }
            _ => Err(Error::Processing(format!(
                "position {:?} must have at least two elements",
                raw
            ))),
        }
    }

    fn positions(&mut self, raw: &[Vec<f64>]) -> Result<Vec<Position>, Error> {
        raw.iter().map(|p| self.position(p)).collect()
    }

    fn line(&mut self, raw: &[Vec<f64>]) -> Result<usize, Error> {
        let coords = self.positions(raw)?;
        if coords.len() < 2 {
            return Err(Error::Processing(format!(
                "a line string requires at least 2 coordinates, got {}",
                coords.len()
            )));
        }
        Ok(self.push_part(coords, false))
    }

    fn ring(&mut self, raw: &[Vec<f64>]) -> Result<usize, Error> {
        let mut coords = self.positions(raw)?;
        if coords.first() != coords.last() {
            if let Some(first) = coords.first().cloned() {
                coords.push(first);
            }
        }
        if coords.len() < 4 {
            return Err(Error::Processing(format!(
                "a linear ring requires at least 4 coordinates, got {}",
                coords.len()
            )));
        }
        Ok(self.push_part(coords, true))
    }

    fn polygon(&mut self, rings: &[Vec<Vec<f64>>]) -> Result<Vec<usize>, Error> {
        rings.iter().map(|ring| self.ring(ring)).collect()
    }

    fn push_part(&mut self, coords: Vec<Position>, closed: bool) -> usize {
        self.parts.push(Part { coords, closed });
        self.parts.len() - 1
    }

    /// Snap every position onto a `q` by `q` integer grid spanning the extent.
    fn quantize(&mut self, q: u32) -> Option<TransformParams> {
        let [x0, y0, x1, y1] = self.extent?;
        let kx = if x1 > x0 { (x1 - x0) / f64::from(q - 1) } else { 1.0 };
        let ky = if y1 > y0 { (y1 - y0) / f64::from(q - 1) } else { 1.0 };
        let snap = |p: &mut Position| {
            p[0] = ((p[0] - x0) / kx).round();
            p[1] = ((p[1] - y0) / ky).round();
        };

        for part in &mut self.parts {
            part.coords.iter_mut().for_each(snap);
            let mut deduped = part.coords.clone();
            deduped.dedup();
            // Keep the repeated positions rather than collapse a ring or line.
            if deduped.len() >= if part.closed { 4 } else { 2 } {
                part.coords = deduped;
            }
        }
        for item in &mut self.items {
            quantize_shape(&mut item.shape, &snap);
        }

        Some(TransformParams {
            scale: [kx, ky],
            translate: [x0, y0],
        })
    }
}

fn quantize_shape(shape: &mut Shape, snap: &impl Fn(&mut Position)) {
    match shape {
        Shape::Point(p) => snap(p),
        Shape::MultiPoint(points) => points.iter_mut().for_each(snap),
        Shape::GeometryCollection(shapes) => {
            for shape in shapes {
                quantize_shape(shape, snap);
            }
        }
        _ => (),
    }
}

/// Positions where arcs must start or end.
///
/// Line end points are always junctions. Any other position becomes one when
/// two of its occurrences disagree on their neighbours, in either direction.
fn find_junctions(parts: &[Part]) -> HashSet<PointKey> {
    let mut junctions = HashSet::new();
    let mut neighbours: HashMap<PointKey, (PointKey, PointKey)> = HashMap::new();
    let mut visit = |junctions: &mut HashSet<PointKey>,
                     point: PointKey,
                     previous: PointKey,
                     next: PointKey| {
        match neighbours.get(&point) {
            None => {
                neighbours.insert(point, (previous, next));
            }
            Some(&(a, b)) => {
                if !((a == previous && b == next) || (a == next && b == previous)) {
                    junctions.insert(point);
                }
            }
        }
    };

    for part in parts {
        let keys: Vec<PointKey> = part.coords.iter().map(|p| point_key(p)).collect();
        if part.closed {
            // the closing position repeats the first one
            let n = keys.len() - 1;
            for i in 0..n {
                visit(&mut junctions, keys[i], keys[(i + n - 1) % n], keys[(i + 1) % n]);
            }
        } else {
            let last = keys.len() - 1;
            junctions.insert(keys[0]);
            junctions.insert(keys[last]);
            for i in 1..last {
                visit(&mut junctions, keys[i], keys[i - 1], keys[i + 1]);
            }
        }
    }
    junctions
}

/// Rotate an open ring (without its closing position) to start at `start`, and close it.
fn rotate_ring(ring: &[Position], start: usize) -> Vec<Position> {
    let mut rotated = Vec::with_capacity(ring.len() + 1);
    rotated.extend_from_slice(&ring[start..]);
    rotated.extend_from_slice(&ring[..start]);
    rotated.push(ring[start].clone());
    rotated
}

/// Split a part into arcs at its interior junctions.
fn cut(part: &Part, junctions: &HashSet<PointKey>) -> Vec<Arc> {
    let coords = if part.closed {
        let ring = &part.coords[..part.coords.len() - 1];
        let start = (0..ring.len())
            .find(|&i| junctions.contains(&point_key(&ring[i])))
            .or_else(|| (0..ring.len()).min_by(|&a, &b| compare_positions(&ring[a], &ring[b])))
            .unwrap_or(0);
        rotate_ring(ring, start)
    } else {
        part.coords.clone()
    };

    let mut arcs = Vec::new();
    let mut start = 0;
    for i in 1..coords.len().saturating_sub(1) {
        if junctions.contains(&point_key(&coords[i])) {
            arcs.push(coords[start..=i].to_vec());
            start = i;
        }
    }
    arcs.push(coords[start..].to_vec());
    arcs
}

/// Deduplicated arc list; an arc seen backwards is referenced as `!index`.
#[derive(Default)]
struct ArcStore {
    arcs: Vec<Arc>,
    index: HashMap<Vec<PointKey>, usize>,
}

impl ArcStore {
    fn intern(&mut self, arc: Arc) -> i32 {
        let forward: Vec<PointKey> = arc.iter().map(|p| point_key(p)).collect();
        if let Some(&i) = self.index.get(&forward) {
            return i as i32;
        }
        let backward: Vec<PointKey> = forward.iter().rev().copied().collect();
        if let Some(&i) = self.index.get(&backward) {
            return !(i as i32);
        }
        let i = self.arcs.len();
        self.index.insert(forward, i);
        self.arcs.push(arc);
        i as i32
    }
}

fn delta_encode(arc: &mut Arc) {
    let (mut px, mut py) = (0.0, 0.0);
    for p in arc.iter_mut() {
        let (x, y) = (p[0], p[1]);
        p[0] = x - px;
        p[1] = y - py;
        px = x;
        py = y;
    }
}

fn shape_to_value(shape: Shape, part_arcs: &[ArcIndexes]) -> Value {
    let arcs = |i: usize| part_arcs[i].clone();
    match shape {
        Shape::Point(p) => Value::Point(p),
        Shape::MultiPoint(points) => Value::MultiPoint(points),
        Shape::LineString(i) => Value::LineString(arcs(i)),
        Shape::MultiLineString(lines) => {
            Value::MultiLineString(lines.into_iter().map(arcs).collect())
        }
        Shape::Polygon(rings) => Value::Polygon(rings.into_iter().map(arcs).collect()),
        Shape::MultiPolygon(polygons) => Value::MultiPolygon(
            polygons
                .into_iter()
                .map(|rings| rings.into_iter().map(arcs).collect())
                .collect(),
        ),
        Shape::GeometryCollection(shapes) => Value::GeometryCollection(
            shapes
                .into_iter()
                .map(|s| Geometry::new(shape_to_value(s, part_arcs)))
                .collect(),
        ),
    }
}

impl Topology {
    /// Encode a GeoJSON document as a topology.
    ///
    /// A FeatureCollection contributes all of its features, a Feature or a bare
    /// Geometry a single one. Without any feature the topology has no objects
    /// and no arcs.
    pub fn from_geojson(geojson: &GeoJson, options: &TopologyOptions) -> Result<Self, Error> {
        match geojson {
            GeoJson::FeatureCollection(fc) => Topology::from_features(&fc.features, options),
            GeoJson::Feature(feature) => {
                Topology::from_features(std::slice::from_ref(feature), options)
            }
            GeoJson::Geometry(geometry) => {
                let feature = Feature {
                    bbox: None,
                    geometry: Some(geometry.clone()),
                    id: None,
                    properties: None,
                    foreign_members: None,
                };
                Topology::from_features(&[feature], options)
            }
        }
    }

    /// Encode a list of features as one GeometryCollection sharing its arcs.
    pub fn from_features(features: &[Feature], options: &TopologyOptions) -> Result<Self, Error> {
        let mut extraction = Extraction::default();
        for feature in features {
            extraction.feature(feature)?;
        }
        let bbox = extraction.extent.map(|e| e.to_vec());
        let transform = match options.quantization {
            Some(q) if q < 2 => {
                return Err(Error::Processing(format!(
                    "quantization must be at least 2, got {}",
                    q
                )))
            }
            Some(q) => extraction.quantize(q),
            None => None,
        };

        let junctions = find_junctions(&extraction.parts);
        let mut store = ArcStore::default();
        let part_arcs: Vec<ArcIndexes> = extraction
            .parts
            .iter()
            .map(|part| {
                cut(part, &junctions)
                    .into_iter()
                    .map(|arc| store.intern(arc))
                    .collect()
            })
            .collect();

        log::debug!(
            "encoded {} features: {} lines and rings, {} junctions, {} arcs",
            extraction.items.len(),
            extraction.parts.len(),
            junctions.len(),
            store.arcs.len()
        );

        let mut arcs = store.arcs;
        if transform.is_some() {
            arcs.iter_mut().for_each(delta_encode);
        }

        let objects = if extraction.items.is_empty() {
            Vec::new()
        } else {
            let geometries = extraction
                .items
                .into_iter()
                .map(|item| Geometry {
                    bbox: None,
                    value: shape_to_value(item.shape, &part_arcs),
                    properties: item.properties,
                    id: item.id,
                    foreign_members: None,
                })
                .collect();
            vec![NamedGeometry {
                name: options.object_name.clone(),
                geometry: Geometry::new(Value::GeometryCollection(geometries)),
            }]
        };

        Ok(Topology {
            bbox,
            objects,
            transform,
            arcs,
            foreign_members: None,
        })
    }
}
