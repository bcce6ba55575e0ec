// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for graph access and archive decoding.

use std::fmt;

/// An error produced by a checked access into a polymorphic graph vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The vertex holds a different payload than the one requested.
    ///
    /// This signals a programmer error at the call site (asking a
    /// render-stage vertex for its render-phase payload), not a recoverable
    /// runtime condition.
    PayloadMismatch {
        /// The payload type the caller asked for.
        expected: &'static str,
        /// The payload type the vertex actually holds.
        found: &'static str,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::PayloadMismatch { expected, found } => {
                write!(f, "vertex payload mismatch: expected {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// An error produced while decoding a binary archive.
///
/// Every variant is a hard failure: decoding stops where it is, with no
/// retry and no cleanup of partially populated destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// The archive ended before the requested number of bytes.
    UnexpectedEof {
        /// Bytes the decoder needed.
        requested: usize,
        /// Bytes that were still available.
        remaining: usize,
    },
    /// A string field did not hold valid UTF-8.
    InvalidUtf8 {
        /// Details from the UTF-8 validation failure.
        details: String,
    },
    /// An integer read back from the archive is not a valid discriminant
    /// for the enum being decoded — a corrupted or version-skewed payload.
    InvalidEnumValue {
        /// Name of the enum type being decoded.
        type_name: &'static str,
        /// The offending raw value.
        value: u32,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::UnexpectedEof { requested, remaining } => {
                write!(
                    f,
                    "archive ended early: needed {requested} bytes, {remaining} remaining"
                )
            }
            ArchiveError::InvalidUtf8 { details } => {
                write!(f, "archive string is not valid UTF-8: {details}")
            }
            ArchiveError::InvalidEnumValue { type_name, value } => {
                write!(f, "invalid value {value} for enum {type_name}")
            }
        }
    }
}

impl std::error::Error for ArchiveError {}
