//! Decoded value tree.

use ndarray::{ArrayD, IxDyn};
use std::fmt;

/// One decoded base-type element.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `Byte`.
    Byte(u8),
    /// `Int8`, stored from a 4-byte wire integer.
    Int8(i8),
    /// `UInt8`, stored from a 4-byte wire integer.
    UInt8(u8),
    /// `Int16`, stored from a 4-byte wire integer.
    Int16(i16),
    /// `UInt16`, stored from a 4-byte wire integer.
    UInt16(u16),
    /// `Int32` and `Int`.
    Int32(i32),
    /// `UInt32` and `UInt`.
    UInt32(u32),
    /// `Float32`.
    Float32(f32),
    /// `Float64`.
    Float64(f64),
    /// `String` and `Url`.
    Str(String),
}

impl Scalar {
    /// Numeric value widened to `f64`; `None` for strings.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Byte(v) => Some(v as f64),
            Self::Int8(v) => Some(v as f64),
            Self::UInt8(v) => Some(v as f64),
            Self::Int16(v) => Some(v as f64),
            Self::UInt16(v) => Some(v as f64),
            Self::Int32(v) => Some(v as f64),
            Self::UInt32(v) => Some(v as f64),
            Self::Float32(v) => Some(v as f64),
            Self::Float64(v) => Some(v),
            Self::Str(_) => None,
        }
    }

    /// Text content for strings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{}", v),
            Self::Int8(v) => write!(f, "{}", v),
            Self::UInt8(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Float32(v) => write!(f, "{}", v),
            Self::Float64(v) => write!(f, "{}", v),
            Self::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// A decoded value, mirroring the nesting of its schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single element.
    Scalar(Scalar),
    /// Nested row-major array; the outer level is the slowest dimension.
    Array(Vec<Value>),
    /// Fields of a `Structure` or `Dataset`, in declaration order.
    Structure(Vec<(String, Value)>),
    /// Data array followed by each map, in declaration order.
    Grid(Vec<Value>),
    /// Rows of a `Sequence`, each holding its fields in declaration order.
    Sequence(Vec<Vec<Value>>),
}

impl Value {
    /// Reshape a flat element sequence into nested arrays.
    ///
    /// An empty shape yields the first element as a bare scalar.
    pub fn reshape(flat: Vec<Scalar>, shape: &[usize]) -> Self {
        match shape {
            [] => flat
                .into_iter()
                .next()
                .map(Self::Scalar)
                .unwrap_or(Self::Array(Vec::new())),
            [len] => Self::Array(flat.into_iter().take(*len).map(Self::Scalar).collect()),
            [outer, inner @ ..] => {
                let size = if *outer == 0 { 0 } else { flat.len() / outer };
                let mut rest = flat.into_iter();
                let rows = (0..*outer)
                    .map(|_| Self::reshape(rest.by_ref().take(size).collect(), inner))
                    .collect();
                Self::Array(rows)
            },
        }
    }

    /// Flatten nested arrays back into row-major element order.
    pub fn flatten(&self) -> Vec<Scalar> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Scalar>) {
        match self {
            Self::Scalar(s) => out.push(s.clone()),
            Self::Array(items) | Self::Grid(items) => {
                items.iter().for_each(|v| v.flatten_into(out));
            },
            Self::Structure(fields) => fields.iter().for_each(|(_, v)| v.flatten_into(out)),
            Self::Sequence(rows) => rows.iter().flatten().for_each(|v| v.flatten_into(out)),
        }
    }

    /// Extent of each nesting level of an array, outermost first.
    pub fn array_shape(&self) -> Vec<usize> {
        let mut shape = Vec::new();
        let mut current = self;
        while let Self::Array(items) = current {
            shape.push(items.len());
            match items.first() {
                Some(first) => current = first,
                None => break,
            }
        }
        shape
    }

    /// Get a structure field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Structure(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// The element, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a numeric scalar or array into an `f64` ndarray.
    pub fn to_ndarray(&self) -> Option<ArrayD<f64>> {
        match self {
            Self::Scalar(_) | Self::Array(_) => {},
            _ => return None,
        }
        let data = self
            .flatten()
            .iter()
            .map(Scalar::as_f64)
            .collect::<Option<Vec<f64>>>()?;
        ArrayD::from_shape_vec(IxDyn(&self.array_shape()), data).ok()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::Array(items) | Self::Grid(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            },
            Self::Structure(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            },
            Self::Sequence(rows) => {
                f.write_str("[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Self::Array(row.clone()))?;
                }
                f.write_str("]")
            },
        }
    }
}
