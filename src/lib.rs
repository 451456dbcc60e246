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

//! Initial setup core of a geospatial data hub.
//!
//! Two independent pieces live here:
//!
//! * the **ingestion pipeline**, which validates an uploaded GeoJSON document,
//!   encodes it as a [TopoJSON](https://github.com/topojson/topojson-specification)
//!   topology with shared arcs and stores it as `country.topojson`;
//! * the **grid alignment engine**, which snaps a bounding box outward onto the
//!   fixed 0.05° raster grid and merges it into the project settings document.
//!
//! ```no_run
//! use geohub_setup::{ingest_geojson, update_bounding_box, BoundingBox, Mode, Settings, Upload};
//!
//! # fn main() -> Result<(), geohub_setup::Error> {
//! let settings = Settings::new("source", Mode::Production);
//!
//! let mut upload = Upload::from_bytes(std::fs::read("country.geojson").unwrap(), "application/geo+json");
//! let path = ingest_geojson(&mut upload, &settings)?;
//! println!("topology written to {}", path.display());
//!
//! let aligned = update_bounding_box(
//!     &settings,
//!     BoundingBox::new(10.03, -10.02, -20.01, 20.04),
//!     Some("Kenya"),
//! )?;
//! assert!(aligned.n_lat >= 10.03);
//! # Ok(())
//! # }
//! ```

/// Position, represented as an array of floats (only the first two are used)
pub type Position = Vec<f64>;

/// Arc, a sequence of positions
pub type Arc = Vec<Position>;

/// References to arcs; a negative index `i` stands for the reversed arc `!i`
pub type ArcIndexes = Vec<i32>;

/// Bounding box, `[min_x, min_y, max_x, max_y]`
pub type Bbox = Vec<f64>;

mod json {
    pub use serde::{Deserialize, Deserializer, Serialize, Serializer};
    pub use serde_json::{Map, Value as JsonValue};
    pub type JsonObject = Map<String, JsonValue>;
}

mod bounds;
mod builder;
mod error;
mod geometry;
mod grid;
mod ingest;
mod persist;
mod project_config;
mod settings;
mod to_geojson;
mod topojson;
mod topology;
mod upload;
mod util;
mod validate;

pub use crate::bounds::{BoundingBox, BoundsViolation};
pub use crate::builder::TopologyOptions;
pub use crate::error::{Error, ErrorKind};
pub use crate::geometry::{Geometry, NamedGeometry, Value};
pub use crate::grid::{Edge, Grid, GRID_STEP, LATITUDE_ORIGIN, LONGITUDE_ORIGIN};
pub use crate::ingest::{convert_geojson, ingest_geojson, load_topology, write_topology};
pub use crate::json::JsonObject;
pub use crate::project_config::{current_bounding_box, update_bounding_box, ProjectConfig};
pub use crate::settings::{Mode, Settings};
pub use crate::to_geojson::to_geojson;
pub use crate::topojson::TopoJson;
pub use crate::topology::{Topology, TransformParams};
pub use crate::upload::Upload;
pub use crate::validate::{validate_geojson, GeoJsonType, ACCEPTED_CONTENT_TYPES};
