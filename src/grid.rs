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

//! Outward snapping of bounding boxes onto the raster grid.
//!
//! Downstream rasters are clipped on a 0.05° lattice whose cell centres start
//! at longitude -179.975 (growing eastward) and latitude 89.975 (growing
//! southward). An aligned box always contains the box it was computed from.

use crate::BoundingBox;

/// Grid resolution in degrees
pub const GRID_STEP: f64 = 0.05;

/// First grid longitude; grid longitudes are `origin + k * step`
pub const LONGITUDE_ORIGIN: f64 = -179.975;

/// First grid latitude; grid latitudes are `origin - k * step`
pub const LATITUDE_ORIGIN: f64 = 89.975;

/// Decimal places kept on aligned values.
const OUTPUT_DECIMALS: i32 = 3;

/// Decimal places the raw grid quotient is settled to before rounding, so
/// that a value lying exactly between two grid lines is treated as a tie.
const QUOTIENT_DECIMALS: i32 = 9;

/// One side of a bounding box
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    North,
    South,
    West,
    East,
}

impl Edge {
    fn is_latitude(self) -> bool {
        matches!(self, Edge::North | Edge::South)
    }

    /// North and east bound the box from above.
    fn is_upper(self) -> bool {
        matches!(self, Edge::North | Edge::East)
    }
}

/// A regular lattice in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    pub step: f64,
    pub lon_origin: f64,
    pub lat_origin: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            step: GRID_STEP,
            lon_origin: LONGITUDE_ORIGIN,
            lat_origin: LATITUDE_ORIGIN,
        }
    }
}

impl Grid {
    /// Snap one edge to the grid, moving it outward when the nearest grid line
    /// would cut into the box.
    ///
    /// Ties are rounded half away from zero in grid-index space.
    pub fn align_edge(&self, edge: Edge, value: f64) -> f64 {
        let aligned = if edge.is_latitude() {
            let index = settle((self.lat_origin - value) / self.step).round();
            round_to(self.lat_origin - index * self.step, OUTPUT_DECIMALS)
        } else {
            let index = settle((value - self.lon_origin) / self.step).round();
            round_to(self.lon_origin + index * self.step, OUTPUT_DECIMALS)
        };

        if edge.is_upper() && aligned < value {
            round_to(aligned + self.step, OUTPUT_DECIMALS)
        } else if !edge.is_upper() && aligned > value {
            round_to(aligned - self.step, OUTPUT_DECIMALS)
        } else {
            aligned
        }
    }

    /// Smallest grid-aligned box containing `bbox`.
    pub fn align(&self, bbox: &BoundingBox) -> BoundingBox {
        let aligned = BoundingBox {
            n_lat: self.align_edge(Edge::North, bbox.n_lat),
            s_lat: self.align_edge(Edge::South, bbox.s_lat),
            w_lon: self.align_edge(Edge::West, bbox.w_lon),
            e_lon: self.align_edge(Edge::East, bbox.e_lon),
        };
        log::debug!("aligned {:?} to {:?}", bbox, aligned);
        aligned
    }
}

fn settle(quotient: f64) -> f64 {
    round_to(quotient, QUOTIENT_DECIMALS)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
