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

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;

const MIN_LAT: f64 = -90.0;
const MAX_LAT: f64 = 90.0;
const MIN_LON: f64 = -180.0;
const MAX_LON: f64 = 180.0;

/// Axis-aligned box in EPSG:4326 degrees.
///
/// Field names match the `bounds` member of the project settings document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// North latitude
    pub n_lat: f64,
    /// South latitude
    pub s_lat: f64,
    /// West longitude
    pub w_lon: f64,
    /// East longitude
    pub e_lon: f64,
}

/// A single reason a [`BoundingBox`] is rejected before alignment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundsViolation {
    NorthOutOfRange,
    SouthOutOfRange,
    WestOutOfRange,
    EastOutOfRange,
    NorthNotGreaterThanSouth,
    EastNotGreaterThanWest,
}

impl fmt::Display for BoundsViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            BoundsViolation::NorthOutOfRange => "North latitude must be between -90 and 90.",
            BoundsViolation::SouthOutOfRange => "South latitude must be between -90 and 90.",
            BoundsViolation::WestOutOfRange => "West longitude must be between -180 and 180.",
            BoundsViolation::EastOutOfRange => "East longitude must be between -180 and 180.",
            BoundsViolation::NorthNotGreaterThanSouth => {
                "North latitude must be greater than south latitude."
            }
            BoundsViolation::EastNotGreaterThanWest => {
                "East longitude must be greater than west longitude."
            }
        })
    }
}

impl BoundingBox {
    pub fn new(n_lat: f64, s_lat: f64, w_lon: f64, e_lon: f64) -> Self {
        BoundingBox {
            n_lat,
            s_lat,
            w_lon,
            e_lon,
        }
    }

    /// Build a box from a GeoJSON/TopoJSON style `[min_x, min_y, max_x, max_y]` extent.
    ///
    /// Returns `None` unless the extent holds at least four values.
    pub fn from_extent(extent: &[f64]) -> Option<Self> {
        match extent {
            [min_x, min_y, max_x, max_y, ..] => {
                Some(BoundingBox::new(*max_y, *min_y, *min_x, *max_x))
            }
            _ => None,
        }
    }

    /// Every range and ordering rule this box breaks, in reporting order.
    ///
    /// Non-finite edges fail the range checks.
    pub fn violations(&self) -> Vec<BoundsViolation> {
        let mut found = Vec::new();
        if !(MIN_LAT..=MAX_LAT).contains(&self.n_lat) {
            found.push(BoundsViolation::NorthOutOfRange);
        }
        if !(MIN_LAT..=MAX_LAT).contains(&self.s_lat) {
            found.push(BoundsViolation::SouthOutOfRange);
        }
        if !(MIN_LON..=MAX_LON).contains(&self.w_lon) {
            found.push(BoundsViolation::WestOutOfRange);
        }
        if !(MIN_LON..=MAX_LON).contains(&self.e_lon) {
            found.push(BoundsViolation::EastOutOfRange);
        }
        if !(self.n_lat > self.s_lat) {
            found.push(BoundsViolation::NorthNotGreaterThanSouth);
        }
        if !(self.e_lon > self.w_lon) {
            found.push(BoundsViolation::EastNotGreaterThanWest);
        }
        found
    }

    /// Check the box is usable for alignment.
    pub fn validate(&self) -> Result<(), Error> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidBounds(violations))
        }
    }

    /// Whether `other` lies entirely inside (or on the edges of) this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.n_lat >= other.n_lat
            && self.s_lat <= other.s_lat
            && self.w_lon <= other.w_lon
            && self.e_lon >= other.e_lon
    }
}
