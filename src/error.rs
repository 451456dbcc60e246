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

use std::path::PathBuf;

use thiserror::Error;

use crate::bounds::BoundsViolation;

/// Broad category of an [`Error`], used by callers to pick a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The uploaded document is not acceptable GeoJSON.
    InputFormat,
    /// The document passed validation but could not be encoded as a topology.
    Processing,
    /// Bounding-box edges are out of range or out of order.
    InvalidBounds,
    /// Reading or writing a file failed; the caller's input was fine.
    Io,
    /// A stored TopoJSON document could not be read back.
    Topology,
}

/// Errors raised while validating, converting, aligning or persisting
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Invalid file format. Please upload a valid GeoJSON file.")]
    UnsupportedContentType(String),
    #[error("Invalid file format. Please upload a valid GeoJSON file.")]
    InvalidFileFormat,
    #[error("Invalid file encoding. Please upload a UTF-8 encoded file.")]
    InvalidEncoding,
    #[error("Invalid GeoJSON format: missing 'type' property")]
    MissingType,
    #[error("Invalid GeoJSON type: {0}")]
    InvalidGeoJsonType(String),

    #[error("Failed to process GeoJSON file: {0}")]
    Processing(String),

    #[error("{}", join_violations(.0))]
    InvalidBounds(Vec<BoundsViolation>),

    #[error("Failed to read uploaded file: {0}")]
    Upload(#[source] std::io::Error),
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed configuration document '{}': {reason}", path.display())]
    MalformedConfig { path: PathBuf, reason: String },
    #[error("Invalid value for setting {name}: '{value}'")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Encountered non-array type for a 'bbox' object.")]
    BboxExpectedArray,
    #[error("Encountered non-numeric value within 'bbox' array.")]
    BboxExpectedNumericValues,
    #[error("Expected member with the name 'objects' in Topology.")]
    TopologyExpectedObjects,
    #[error("Expected member with the name 'arcs' in Topology.")]
    TopologyExpectedArcs,
    #[error("Transform must have a member with the name 'scale'.")]
    TransformExpectedScale,
    #[error("Transform must have a member with the name 'translate'.")]
    TransformExpectedTranslate,
    #[error("Encountered a 'scale' member that is not an array of two numbers.")]
    ScaleExpectedNumericPair,
    #[error("Encountered a 'translate' member that is not an array of two numbers.")]
    TranslateExpectedNumericPair,
    #[error("Encountered unknown TopoJSON object type.")]
    TopoJsonUnknownType,
    #[error("Encountered unknown 'geometry' object type.")]
    GeometryUnknownType,
    #[error("Encountered malformed JSON: {0}")]
    MalformedJson(String),
    #[error("Encountered neither object type nor null type for 'properties' object.")]
    PropertiesExpectedObjectOrNull,
    #[error("Expected TopoJSON type '{expected}', found '{actual}'")]
    ExpectedType { expected: String, actual: String },
    #[error("No object with key '{0}' in the given Topology.")]
    TopoToGeoUnknownKey(String),
    #[error("Arc index {0} is out of range.")]
    ArcIndexOutOfRange(i32),
    #[error("Position must have at least two elements.")]
    PositionTooShort,

    #[error("Expected a string value.")]
    ExpectedStringValue,
    #[error("Expected TopoJSON property '{0}'.")]
    ExpectedProperty(String),
    #[error("Expected an integer value.")]
    ExpectedIntegerValue,
    #[error("Expected a floating-point value.")]
    ExpectedF64Value,
    #[error("Expected an array.")]
    ExpectedArrayValue,
    #[error("Expected an object.")]
    ExpectedObjectValue,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedContentType(..)
            | Error::InvalidFileFormat
            | Error::InvalidEncoding
            | Error::MissingType
            | Error::InvalidGeoJsonType(..) => ErrorKind::InputFormat,
            Error::Processing(..) => ErrorKind::Processing,
            Error::InvalidBounds(..) => ErrorKind::InvalidBounds,
            Error::Upload(..)
            | Error::Io { .. }
            | Error::MalformedConfig { .. }
            | Error::InvalidSetting { .. } => ErrorKind::Io,
            _ => ErrorKind::Topology,
        }
    }

    /// Whether the error was caused by the caller's input rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InputFormat | ErrorKind::Processing | ErrorKind::InvalidBounds
        )
    }
}

fn join_violations(violations: &[BoundsViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            Error::InvalidFileFormat.to_string(),
            "Invalid file format. Please upload a valid GeoJSON file."
        );
        assert_eq!(
            Error::UnsupportedContentType("text/plain".into()).to_string(),
            Error::InvalidFileFormat.to_string()
        );
        assert_eq!(
            Error::InvalidGeoJsonType("Topology".into()).to_string(),
            "Invalid GeoJSON type: Topology"
        );
        assert_eq!(
            Error::Processing("boom".into()).to_string(),
            "Failed to process GeoJSON file: boom"
        );
    }

    #[test]
    fn bounds_violations_are_joined() {
        let err = Error::InvalidBounds(vec![
            BoundsViolation::NorthOutOfRange,
            BoundsViolation::EastNotGreaterThanWest,
        ]);
        assert_eq!(
            err.to_string(),
            "North latitude must be between -90 and 90. \
             East longitude must be greater than west longitude."
        );
    }

    #[test]
    fn kinds_separate_client_and_server_failures() {
        assert_eq!(Error::MissingType.kind(), ErrorKind::InputFormat);
        assert_eq!(Error::Processing(String::new()).kind(), ErrorKind::Processing);
        assert!(Error::InvalidBounds(vec![]).is_client_error());

        let io = Error::io(
            "missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(io.kind(), ErrorKind::Io);
        assert!(!io.is_client_error());
        assert_eq!(Error::TopologyExpectedArcs.kind(), ErrorKind::Topology);
    }
}
