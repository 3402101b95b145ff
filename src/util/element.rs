//! Element types - the scalar families an array can hold, and the binary
//! layouts used for external datasets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element family of a value array.
///
/// Every array has exactly one kind, fixed when the array is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Boolean,
    Integer,
    Float,
    String,
}

impl ElementKind {
    /// Returns the name of this kind as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
        }
    }

    /// Returns true for integer and float kinds.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single element value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Element kind of this value.
    #[inline]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Boolean(_) => ElementKind::Boolean,
            Self::Integer(_) => ElementKind::Integer,
            Self::Float(_) => ElementKind::Float,
            Self::String(_) => ElementKind::String,
        }
    }

    /// Numeric value as f64, if this is an integer or float.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Integer(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
        }
    }
}

/// Binary element layout of an external dataset.
///
/// The serialized names are the exact type tags of the data-object format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalElementType {
    #[serde(rename = "arrayOfBoolean")]
    Boolean,
    #[serde(rename = "arrayOfInt8")]
    Int8,
    #[serde(rename = "arrayOfUInt8")]
    UInt8,
    #[serde(rename = "arrayOfInt16LE")]
    Int16LE,
    #[serde(rename = "arrayOfUInt16LE")]
    UInt16LE,
    #[serde(rename = "arrayOfInt32LE")]
    Int32LE,
    #[serde(rename = "arrayOfUInt32LE")]
    UInt32LE,
    #[serde(rename = "arrayOfInt64LE")]
    Int64LE,
    #[serde(rename = "arrayOfUInt64LE")]
    UInt64LE,
    #[serde(rename = "arrayOfInt16BE")]
    Int16BE,
    #[serde(rename = "arrayOfUInt16BE")]
    UInt16BE,
    #[serde(rename = "arrayOfInt32BE")]
    Int32BE,
    #[serde(rename = "arrayOfUInt32BE")]
    UInt32BE,
    #[serde(rename = "arrayOfInt64BE")]
    Int64BE,
    #[serde(rename = "arrayOfUInt64BE")]
    UInt64BE,
    #[serde(rename = "arrayOfFloat32LE")]
    Float32LE,
    #[serde(rename = "arrayOfDouble64LE")]
    Double64LE,
    #[serde(rename = "arrayOfFloat32BE")]
    Float32BE,
    #[serde(rename = "arrayOfDouble64BE")]
    Double64BE,
}

impl ExternalElementType {
    /// Every element type, in tag order.
    pub const ALL: [Self; 19] = [
        Self::Boolean,
        Self::Int8,
        Self::UInt8,
        Self::Int16LE,
        Self::UInt16LE,
        Self::Int32LE,
        Self::UInt32LE,
        Self::Int64LE,
        Self::UInt64LE,
        Self::Int16BE,
        Self::UInt16BE,
        Self::Int32BE,
        Self::UInt32BE,
        Self::Int64BE,
        Self::UInt64BE,
        Self::Float32LE,
        Self::Double64LE,
        Self::Float32BE,
        Self::Double64BE,
    ];

    /// Returns the size in bytes of a single element of this type.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Boolean | Self::Int8 | Self::UInt8 => 1,
            Self::Int16LE | Self::UInt16LE | Self::Int16BE | Self::UInt16BE => 2,
            Self::Int32LE | Self::UInt32LE | Self::Int32BE | Self::UInt32BE => 4,
            Self::Float32LE | Self::Float32BE => 4,
            Self::Int64LE | Self::UInt64LE | Self::Int64BE | Self::UInt64BE => 8,
            Self::Double64LE | Self::Double64BE => 8,
        }
    }

    /// Returns the type tag.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "arrayOfBoolean",
            Self::Int8 => "arrayOfInt8",
            Self::UInt8 => "arrayOfUInt8",
            Self::Int16LE => "arrayOfInt16LE",
            Self::UInt16LE => "arrayOfUInt16LE",
            Self::Int32LE => "arrayOfInt32LE",
            Self::UInt32LE => "arrayOfUInt32LE",
            Self::Int64LE => "arrayOfInt64LE",
            Self::UInt64LE => "arrayOfUInt64LE",
            Self::Int16BE => "arrayOfInt16BE",
            Self::UInt16BE => "arrayOfUInt16BE",
            Self::Int32BE => "arrayOfInt32BE",
            Self::UInt32BE => "arrayOfUInt32BE",
            Self::Int64BE => "arrayOfInt64BE",
            Self::UInt64BE => "arrayOfUInt64BE",
            Self::Float32LE => "arrayOfFloat32LE",
            Self::Double64LE => "arrayOfDouble64LE",
            Self::Float32BE => "arrayOfFloat32BE",
            Self::Double64BE => "arrayOfDouble64BE",
        }
    }

    /// Parse an element type from its tag.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Element kind produced when decoding this type.
    #[inline]
    pub const fn kind(self) -> ElementKind {
        match self {
            Self::Boolean => ElementKind::Boolean,
            Self::Float32LE | Self::Double64LE | Self::Float32BE | Self::Double64BE => {
                ElementKind::Float
            }
            _ => ElementKind::Integer,
        }
    }

    /// Returns true for big-endian multi-byte layouts.
    #[inline]
    pub const fn is_big_endian(self) -> bool {
        matches!(
            self,
            Self::Int16BE
                | Self::UInt16BE
                | Self::Int32BE
                | Self::UInt32BE
                | Self::Int64BE
                | Self::UInt64BE
                | Self::Float32BE
                | Self::Double64BE
        )
    }
}

impl fmt::Display for ExternalElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
