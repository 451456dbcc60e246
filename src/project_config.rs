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

//! The project settings document and the bounding box stored in it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::json::{JsonObject, JsonValue};
use crate::persist::write_json_atomically;
use crate::{BoundingBox, Error, Grid, Settings};

pub const BOUNDS_KEY: &str = "bounds";
pub const REGION_NAME_KEY: &str = "region_name";

/// A project settings document loaded in memory.
///
/// Only `bounds` and `region_name` are interpreted; every other member is
/// carried through [`ProjectConfig::save`] unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectConfig {
    path: PathBuf,
    document: JsonObject,
}

impl ProjectConfig {
    /// Load the settings document for `settings.mode`, seeding it from the
    /// template first when it does not exist yet.
    pub fn ensure_and_load(settings: &Settings) -> Result<Self, Error> {
        let path = settings.config_path();
        if !path.exists() {
            let template = settings.template_path();
            let contents = fs::read(&template).map_err(|e| Error::io(&template, e))?;
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
            }
            fs::write(&path, contents).map_err(|e| Error::io(&path, e))?;
            log::info!("seeded {} from {}", path.display(), template.display());
        }
        ProjectConfig::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let malformed = |reason: String| Error::MalformedConfig {
            path: path.to_owned(),
            reason,
        };
        match serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))? {
            JsonValue::Object(document) => Ok(ProjectConfig {
                path: path.to_owned(),
                document,
            }),
            _ => Err(malformed("expected a JSON object".to_owned())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &JsonObject {
        &self.document
    }

    /// The stored bounding box, if the document has one.
    pub fn bounds(&self) -> Result<Option<BoundingBox>, Error> {
        match self.document.get(BOUNDS_KEY) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                Error::MalformedConfig {
                    path: self.path.clone(),
                    reason: format!("'{}': {}", BOUNDS_KEY, e),
                }
            }),
        }
    }

    pub fn set_bounds(&mut self, bounds: &BoundingBox) {
        self.document.insert(
            BOUNDS_KEY.to_owned(),
            serde_json::json!({
                "n_lat": bounds.n_lat,
                "s_lat": bounds.s_lat,
                "w_lon": bounds.w_lon,
                "e_lon": bounds.e_lon,
            }),
        );
    }

    pub fn region_name(&self) -> Option<&str> {
        self.document.get(REGION_NAME_KEY).and_then(JsonValue::as_str)
    }

    pub fn set_region_name(&mut self, name: &str) {
        self.document
            .insert(REGION_NAME_KEY.to_owned(), JsonValue::String(name.to_owned()));
    }

    /// Write the whole document back to where it was loaded from.
    pub fn save(&self) -> Result<(), Error> {
        write_json_atomically(&self.path, &self.document)?;
        log::info!("saved project settings to {}", self.path.display());
        Ok(())
    }
}

/// Validate `bbox`, align it outward onto the raster grid and store it as the
/// project bounds, together with `region_name` when one is given.
///
/// Returns the aligned box. Invalid input is rejected before any file is
/// touched.
pub fn update_bounding_box(
    settings: &Settings,
    bbox: BoundingBox,
    region_name: Option<&str>,
) -> Result<BoundingBox, Error> {
    bbox.validate()?;
    let aligned = Grid::default().align(&bbox);

    let mut config = ProjectConfig::ensure_and_load(settings)?;
    config.set_bounds(&aligned);
    if let Some(name) = region_name {
        config.set_region_name(name);
    }
    config.save()?;
    Ok(aligned)
}

/// The bounding box currently stored in the project settings.
pub fn current_bounding_box(settings: &Settings) -> Result<Option<BoundingBox>, Error> {
    ProjectConfig::ensure_and_load(settings)?.bounds()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::{BoundsViolation, Mode};

    const TEMPLATE: &str = r#"{
        "bounds": {"n_lat": 0.0, "s_lat": 0.0, "w_lon": 0.0, "e_lon": 0.0},
        "region_name": "Template Region",
        "datasets": ["chirps", "era5"],
        "map": {"zoom": 6}
    }"#;

    fn fixture(mode: Mode) -> (TempDir, Settings) {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path().join("source"), mode);
        fs::create_dir_all(settings.config_dir()).unwrap();
        fs::write(settings.template_path(), TEMPLATE).unwrap();
        (dir, settings)
    }

    fn read_json(path: &Path) -> JsonValue {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn seeds_from_template() {
        let (_dir, settings) = fixture(Mode::Test);
        assert!(!settings.config_path().exists());

        let config = ProjectConfig::ensure_and_load(&settings).unwrap();
        assert_eq!(config.path(), settings.config_path());
        assert_eq!(config.region_name(), Some("Template Region"));
        assert_eq!(config.document()["datasets"], json!(["chirps", "era5"]));
        assert_eq!(
            config.bounds().unwrap(),
            Some(BoundingBox::new(0.0, 0.0, 0.0, 0.0))
        );
        assert!(settings.config_path().exists());
        assert!(!Settings::new(settings.source_dir(), Mode::Production)
            .config_path()
            .exists());
    }

    #[test]
    fn missing_template_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path().join("source"), Mode::Production);
        let err = ProjectConfig::ensure_and_load(&settings).unwrap_err();
        assert_matches!(err, Error::Io { ref path, .. } if *path == settings.template_path());
        assert!(!err.is_client_error());
        assert!(!settings.config_dir().exists());
    }

    #[test]
    fn non_object_document_is_malformed() {
        let (_dir, settings) = fixture(Mode::Production);
        fs::write(settings.config_path(), "[1, 2, 3]").unwrap();
        assert_matches!(
            ProjectConfig::ensure_and_load(&settings),
            Err(Error::MalformedConfig { .. })
        );
    }

    #[test]
    fn update_preserves_unrelated_keys() {
        let (_dir, settings) = fixture(Mode::Test);
        let aligned = update_bounding_box(
            &settings,
            BoundingBox::new(10.03, -10.02, -20.01, 20.04),
            Some("Kenya"),
        )
        .unwrap();
        assert_eq!(aligned, BoundingBox::new(10.075, -10.025, -20.025, 20.075));

        let document = read_json(&settings.config_path());
        assert_eq!(document["region_name"], json!("Kenya"));
        assert_eq!(document["datasets"], json!(["chirps", "era5"]));
        assert_eq!(document["map"], json!({"zoom": 6}));
        assert_eq!(
            document["bounds"],
            json!({"n_lat": 10.075, "s_lat": -10.025, "w_lon": -20.025, "e_lon": 20.075})
        );
    }

    #[test]
    fn region_name_untouched_without_name() {
        let (_dir, settings) = fixture(Mode::Production);
        update_bounding_box(&settings, BoundingBox::new(5.0, -5.0, 30.0, 40.0), None).unwrap();
        let document = read_json(&settings.config_path());
        assert_eq!(document["region_name"], json!("Template Region"));
    }

    #[test]
    fn stored_bounds_read_back() {
        let (_dir, settings) = fixture(Mode::Test);
        let aligned = update_bounding_box(
            &settings,
            BoundingBox::new(4.62, -4.68, 33.91, 41.9),
            None,
        )
        .unwrap();
        let stored = current_bounding_box(&settings).unwrap().unwrap();
        assert_eq!(stored, aligned);
        assert!(stored.contains(&BoundingBox::new(4.62, -4.68, 33.91, 41.9)));
    }

    #[test]
    fn invalid_bounds_leave_the_document_alone() {
        let (_dir, settings) = fixture(Mode::Test);
        ProjectConfig::ensure_and_load(&settings).unwrap();
        let before = fs::read(settings.config_path()).unwrap();

        let err = update_bounding_box(
            &settings,
            BoundingBox::new(-10.0, 10.0, -20.0, 20.0),
            Some("Nowhere"),
        )
        .unwrap_err();
        assert_matches!(
            err,
            Error::InvalidBounds(ref v) if *v == vec![BoundsViolation::NorthNotGreaterThanSouth]
        );
        assert_eq!(
            err.to_string(),
            "North latitude must be greater than south latitude."
        );
        assert_eq!(fs::read(settings.config_path()).unwrap(), before);
    }

    #[test]
    fn document_without_bounds() {
        let (_dir, settings) = fixture(Mode::Production);
        fs::write(settings.config_path(), r#"{"region_name": "Kenya"}"#).unwrap();
        assert_eq!(current_bounding_box(&settings).unwrap(), None);

        fs::write(settings.config_path(), r#"{"bounds": "north"}"#).unwrap();
        assert_matches!(
            current_bounding_box(&settings),
            Err(Error::MalformedConfig { .. })
        );
    }
}
