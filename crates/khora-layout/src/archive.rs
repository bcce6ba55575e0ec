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

//! Byte-stream primitives for the layout archive.
//!
//! The archive protocol is built from exactly two primitives — an unsigned
//! 32-bit integer and a string — written and read in a fixed field order by
//! the [`Persist`](crate::archive::Persist) implementations in
//! [`serialization`](crate::serialization). There is no magic number,
//! version tag, or checksum at this layer; callers needing format evolution
//! wrap the payload in their own versioned envelope.
//!
//! Writes are infallible (the stream is assumed reliable); reads surface
//! truncation and malformed data as [`ArchiveError`].

use crate::error::ArchiveError;

/// Sink side of the archive: the two write primitives.
pub trait OutputArchive {
    /// Writes one unsigned 32-bit integer.
    fn write_u32(&mut self, value: u32);

    /// Writes one string.
    fn write_string(&mut self, value: &str);
}

/// Source side of the archive: the two read primitives.
pub trait InputArchive {
    /// Reads one unsigned 32-bit integer.
    fn read_u32(&mut self) -> Result<u32, ArchiveError>;

    /// Reads one string.
    fn read_string(&mut self) -> Result<String, ArchiveError>;
}

/// A type that serializes symmetrically through an archive.
///
/// `load(save(x))` reconstructs `x` field for field, except for fields
/// documented as skipped (live device handles), which load at their reset
/// default.
pub trait Persist: Sized {
    /// Writes every serialized field of `self`, in declaration order.
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A);

    /// Reads the fields written by [`Persist::save`], in the same order.
    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError>;
}

impl Persist for u32 {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_u32(*self);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        archive.read_u32()
    }
}

impl Persist for String {
    fn save<A: OutputArchive + ?Sized>(&self, archive: &mut A) {
        archive.write_string(self);
    }

    fn load<A: InputArchive + ?Sized>(archive: &mut A) -> Result<Self, ArchiveError> {
        archive.read_string()
    }
}

/// Defines a wire-stable enum: explicit `u32` discriminants, a checked
/// decoder, and a [`Persist`] impl writing the discriminant.
///
/// Exactly one variant must carry `#[default]`.
macro_rules! archive_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Decodes the enum from its wire discriminant.
            pub fn from_u32(value: u32) -> Result<Self, $crate::error::ArchiveError> {
                match value {
                    $( $value => Ok(Self::$variant), )+
                    _ => Err($crate::error::ArchiveError::InvalidEnumValue {
                        type_name: stringify!($name),
                        value,
                    }),
                }
            }
        }

        impl $crate::archive::Persist for $name {
            fn save<A: $crate::archive::OutputArchive + ?Sized>(&self, archive: &mut A) {
                archive.write_u32(*self as u32);
            }

            fn load<A: $crate::archive::InputArchive + ?Sized>(
                archive: &mut A,
            ) -> Result<Self, $crate::error::ArchiveError> {
                Self::from_u32(archive.read_u32()?)
            }
        }
    };
}
pub(crate) use archive_enum;

/// An in-memory [`OutputArchive`]: little-endian `u32`s, strings as a
/// `u32` byte length followed by UTF-8 bytes.
#[derive(Debug, Default)]
pub struct BinaryOutputArchive {
    bytes: Vec<u8>,
}

impl BinaryOutputArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the archive and returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl OutputArchive for BinaryOutputArchive {
    fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn write_string(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.bytes.extend_from_slice(value.as_bytes());
    }
}

/// An in-memory [`InputArchive`] reading the [`BinaryOutputArchive`] format.
#[derive(Debug)]
pub struct BinaryInputArchive<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> BinaryInputArchive<'a> {
    /// Creates an archive reading from `bytes`, starting at the beginning.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], ArchiveError> {
        if self.remaining() < count {
            return Err(ArchiveError::UnexpectedEof {
                requested: count,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.cursor..self.cursor + count];
        self.cursor += count;
        Ok(slice)
    }
}

impl InputArchive for BinaryInputArchive<'_> {
    fn read_u32(&mut self) -> Result<u32, ArchiveError> {
        let bytes = self.take(4)?;
        // take() guarantees exactly four bytes.
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_string(&mut self) -> Result<String, ArchiveError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| ArchiveError::InvalidUtf8 {
            details: e.to_string(),
        })
    }
}
