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

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, TopologyOptions};

const SOURCE_DIR_VAR: &str = "GEOHUB_SOURCE_DIR";
const TEST_ENV_VAR: &str = "GEOHUB_TEST_ENV";
const QUANTIZATION_VAR: &str = "GEOHUB_TOPOLOGY_QUANTIZATION";

const DEFAULT_SOURCE_DIR: &str = "source";
const DEFAULT_OBJECT_NAME: &str = "data";

/// Selects which set of files a call reads and writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Production,
    Test,
}

impl Mode {
    pub fn topology_file_name(self) -> &'static str {
        match self {
            Mode::Production => "country.topojson",
            Mode::Test => "country-test.topojson",
        }
    }

    pub fn config_file_name(self) -> &'static str {
        match self {
            Mode::Production => "cdi_project_settings.json",
            Mode::Test => "cdi_project_settings.test.json",
        }
    }
}

/// Where the setup core keeps its files and how it encodes topologies.
///
/// Passed explicitly to every entry point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub source_dir: PathBuf,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_object_name")]
    pub object_name: String,
    #[serde(default)]
    pub quantization: Option<u32>,
}

fn default_object_name() -> String {
    DEFAULT_OBJECT_NAME.to_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new(DEFAULT_SOURCE_DIR, Mode::Production)
    }
}

impl Settings {
    pub fn new(source_dir: impl Into<PathBuf>, mode: Mode) -> Self {
        Settings {
            source_dir: source_dir.into(),
            mode,
            object_name: default_object_name(),
            quantization: None,
        }
    }

    /// Build settings from `GEOHUB_SOURCE_DIR`, `GEOHUB_TEST_ENV` and
    /// `GEOHUB_TOPOLOGY_QUANTIZATION`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, Error> {
        Settings::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut settings = Settings::default();
        if let Some(dir) = lookup(SOURCE_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            settings.source_dir = PathBuf::from(dir);
        }
        if let Some(flag) = lookup(TEST_ENV_VAR) {
            settings.mode = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => Mode::Test,
                "" | "0" | "false" | "no" => Mode::Production,
                _ => {
                    return Err(Error::InvalidSetting {
                        name: TEST_ENV_VAR,
                        value: flag,
                    })
                }
            };
        }
        if let Some(q) = lookup(QUANTIZATION_VAR) {
            let parsed = q.trim().parse::<u32>().ok().filter(|q| *q >= 2);
            settings.quantization = match parsed {
                Some(q) => Some(q),
                None => {
                    return Err(Error::InvalidSetting {
                        name: QUANTIZATION_VAR,
                        value: q,
                    })
                }
            };
        }
        Ok(settings)
    }

    pub fn with_quantization(mut self, quantization: u32) -> Self {
        self.quantization = Some(quantization);
        self
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Where the country topology is stored for the current mode.
    pub fn topology_path(&self) -> PathBuf {
        self.source_dir.join(self.mode.topology_file_name())
    }

    pub fn config_dir(&self) -> PathBuf {
        self.source_dir.join("config")
    }

    /// Where the project settings document is stored for the current mode.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join(self.mode.config_file_name())
    }

    /// The document copied into place when no settings document exists yet.
    pub fn template_path(&self) -> PathBuf {
        self.config_dir().join("cdi_project_settings.template.json")
    }

    pub fn topology_options(&self) -> TopologyOptions {
        TopologyOptions {
            object_name: self.object_name.clone(),
            quantization: self.quantization,
        }
    }
}
