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
use std::fs;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use geojson::GeoJson;

use crate::json::JsonValue;
use crate::persist::write_json_atomically;
use crate::{validate_geojson, Error, Settings, TopoJson, Topology, TopologyOptions, Upload};

/// Validate an uploaded GeoJSON document, encode it as a topology and store
/// it at [`Settings::topology_path`], replacing any previous artifact.
///
/// Nothing is written when validation or encoding fails. Returns the path of
/// the stored artifact.
pub fn ingest_geojson<R: Read + Seek>(
    upload: &mut Upload<R>,
    settings: &Settings,
) -> Result<PathBuf, Error> {
    let kind = validate_geojson(upload)?;
    let contents = upload.read_contents()?;
    let topology = convert_geojson(&contents, &settings.topology_options())?;

    let path = settings.topology_path();
    write_topology(&topology, &path)?;
    log::info!(
        "stored {:?} upload as {} ({} arcs)",
        kind,
        path.display(),
        topology.arcs.len()
    );
    Ok(path)
}

/// Encode raw GeoJSON text as a topology.
///
/// The input is expected to have passed validation already; anything the
/// GeoJSON model rejects from here on is a processing error. A
/// FeatureCollection without a 'features' member has no features.
pub fn convert_geojson(contents: &[u8], options: &TopologyOptions) -> Result<Topology, Error> {
    let mut document: JsonValue =
        serde_json::from_slice(contents).map_err(|e| Error::Processing(e.to_string()))?;
    if let JsonValue::Object(ref mut object) = document {
        let kind = object.get("type").and_then(JsonValue::as_str);
        if kind == Some("FeatureCollection") && !object.contains_key("features") {
            object.insert("features".to_owned(), JsonValue::Array(Vec::new()));
        }
    }
    let geojson =
        GeoJson::from_json_value(document).map_err(|e| Error::Processing(e.to_string()))?;
    Topology::from_geojson(&geojson, options)
}

pub fn write_topology(topology: &Topology, path: &Path) -> Result<(), Error> {
    write_json_atomically(path, topology)
}

/// Read a stored topology artifact.
pub fn load_topology(path: &Path) -> Result<Topology, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Topology::try_from(text.parse::<TopoJson>()?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    use super::*;
    use crate::{to_geojson, BoundingBox, Grid, Mode};

    const EMPTY: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    const TRIANGLES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "id": "a", "properties": {"name": "Upper"},
         "geometry": {"type": "Polygon", "coordinates": [[[33.9, 4.6], [41.9, 4.6], [37.0, 5.0], [33.9, 4.6]]]}},
        {"type": "Feature", "id": "b", "properties": {"name": "Lower"},
         "geometry": {"type": "Polygon", "coordinates": [[[33.9, 4.6], [37.0, -4.7], [41.9, 4.6], [33.9, 4.6]]]}}
    ]}"#;

    fn settings(dir: &TempDir, mode: Mode) -> Settings {
        Settings::new(dir.path().join("source"), mode)
    }

    fn upload(contents: &str) -> Upload<std::io::Cursor<Vec<u8>>> {
        Upload::from_bytes(contents, "application/geo+json")
    }

    #[test]
    fn empty_collection_yields_empty_topology() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir, Mode::Production);
        let path = ingest_geojson(&mut upload(EMPTY), &settings).unwrap();

        assert_eq!(path, dir.path().join("source").join("country.topojson"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n  \"type\": \"Topology\",\n  \"objects\": {},\n  \"arcs\": []\n}\n"
        );
        let topology = load_topology(&path).unwrap();
        assert!(topology.objects.is_empty());
        assert!(topology.arcs.is_empty());
    }

    #[test]
    fn collection_without_features_is_empty() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir, Mode::Production);
        let path =
            ingest_geojson(&mut upload(r#"{"type": "FeatureCollection"}"#), &settings).unwrap();

        let topology = load_topology(&path).unwrap();
        assert!(topology.objects.is_empty());
        assert!(topology.arcs.is_empty());
        assert_eq!(topology.bbox, None);
    }

    #[test]
    fn test_mode_writes_test_artifact_only() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir, Mode::Test);
        let path = ingest_geojson(&mut upload(TRIANGLES), &settings).unwrap();

        assert_eq!(path.file_name().unwrap(), "country-test.topojson");
        assert!(!dir.path().join("source").join("country.topojson").exists());
    }

    #[test]
    fn non_json_upload_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir, Mode::Production);
        let result = ingest_geojson(&mut upload("this is not json"), &settings);

        assert_matches!(result, Err(Error::InvalidFileFormat));
        assert!(!settings.topology_path().exists());
        assert!(!settings.config_path().exists());
    }

    #[test]
    fn invalid_geometry_is_a_processing_error() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir, Mode::Production);
        let document = r#"{"type": "Feature", "properties": null,
            "geometry": {"type": "Polygon", "coordinates": 12}}"#;
        let result = ingest_geojson(&mut upload(document), &settings);

        assert_matches!(result, Err(Error::Processing(_)));
        assert!(!settings.topology_path().exists());
    }

    #[test]
    fn ingestion_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir, Mode::Production);
        let path = ingest_geojson(&mut upload(TRIANGLES), &settings).unwrap();
        let first = fs::read(&path).unwrap();
        ingest_geojson(&mut upload(TRIANGLES), &settings).unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn stored_topology_reads_back() {
        let dir = TempDir::new().unwrap();
        let settings = settings(&dir, Mode::Production).with_quantization(10_000);
        let path = ingest_geojson(&mut upload(TRIANGLES), &settings).unwrap();

        let topology = load_topology(&path).unwrap();
        assert!(topology.transform.is_some());
        assert_eq!(topology.bbox, Some(vec![33.9, -4.7, 41.9, 5.0]));
        let suggested = BoundingBox::from_extent(topology.bbox.as_ref().unwrap()).unwrap();
        assert!(Grid::default().align(&suggested).contains(&suggested));

        let fc = to_geojson(&topology, "data").unwrap();
        assert_eq!(fc.features.len(), 2);
        match &fc.features[1].geometry.as_ref().unwrap().value {
            geojson::Value::Polygon(rings) => {
                assert_eq!(rings[0].len(), 4);
                for (got, want) in rings[0].iter().zip(&[[33.9, 4.6], [37.0, -4.7], [41.9, 4.6]]) {
                    approx::assert_abs_diff_eq!(got[0], want[0], epsilon = 1e-3);
                    approx::assert_abs_diff_eq!(got[1], want[1], epsilon = 1e-3);
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_artifact_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        assert_matches!(
            load_topology(&dir.path().join("country.topojson")),
            Err(Error::Io { .. })
        );
    }
}
