//! XDR unpacker for DODS payloads.
//!
//! Walks a schema tree against a byte buffer. All reads are big-endian and
//! every field ends on a 4-byte boundary.

use super::value::{Scalar, Value};
use crate::error::UnpackError;
use crate::schema::{NodeKind, SchemaNode};
use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, trace};

/// Marker closing a sequence.
pub const END_OF_SEQUENCE: u32 = 0xA500_0000;
/// Marker opening each sequence row.
pub const START_OF_SEQUENCE: u32 = 0x5A00_0000;

/// Decode `payload` against `schema`.
pub fn unpack(payload: &[u8], schema: &SchemaNode) -> Result<Value, UnpackError> {
    let mut unpacker = Unpacker::new(payload);
    let value = unpacker.unpack(schema)?;
    debug!(
        "Unpacked {:?}: {} of {} bytes consumed",
        schema.name,
        unpacker.position(),
        payload.len()
    );
    Ok(value)
}

/// Cursor over an XDR byte buffer.
#[derive(Debug, Clone)]
pub struct Unpacker<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Unpacker<'a> {
    /// Create an unpacker at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Decode the value of `node` at the cursor.
    pub fn unpack(&mut self, node: &SchemaNode) -> Result<Value, UnpackError> {
        match node.kind {
            NodeKind::Structure | NodeKind::Dataset => self.structure(node),
            NodeKind::Grid => self.grid(node),
            NodeKind::Sequence => self.sequence(node),
            _ if self.at_start_of_sequence() => self.base_type_sequence(node),
            _ => self.base_type(node),
        }
    }

    fn structure(&mut self, node: &SchemaNode) -> Result<Value, UnpackError> {
        let fields = node
            .children
            .iter()
            .map(|child| Ok((child.name.clone(), self.unpack(child)?)))
            .collect::<Result<Vec<_>, UnpackError>>()?;
        Ok(Value::Structure(fields))
    }

    fn grid(&mut self, node: &SchemaNode) -> Result<Value, UnpackError> {
        let array = node
            .array
            .as_deref()
            .ok_or_else(|| UnpackError::UnsupportedType(format!("Grid {} without array", node.name)))?;
        let mut parts = vec![self.unpack(array)?];
        for map in &node.maps {
            parts.push(self.unpack(map)?);
        }
        Ok(Value::Grid(parts))
    }

    fn sequence(&mut self, node: &SchemaNode) -> Result<Value, UnpackError> {
        let mut rows = Vec::new();
        let mut mark = self.read_u32()?;
        while mark != END_OF_SEQUENCE {
            let row = node
                .children
                .iter()
                .map(|child| self.unpack(child))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
            mark = self.read_u32()?;
        }
        trace!("Sequence {} has {} rows", node.name, rows.len());
        Ok(Value::Sequence(rows))
    }

    /// A single base-type variable requested from inside a sequence.
    fn base_type_sequence(&mut self, node: &SchemaNode) -> Result<Value, UnpackError> {
        let mut values = Vec::new();
        let mut mark = self.read_u32()?;
        while mark != END_OF_SEQUENCE {
            values.push(self.base_type(node)?);
            mark = self.read_u32()?;
        }
        trace!("Base-type sequence {} has {} rows", node.name, values.len());
        Ok(Value::Array(values))
    }

    fn base_type(&mut self, node: &SchemaNode) -> Result<Value, UnpackError> {
        let kind = &node.kind;
        let textual = matches!(kind, NodeKind::String | NodeKind::Url);
        if !textual && !is_numeric(kind) {
            return Err(UnpackError::UnsupportedType(kind.to_string()));
        }

        let mut count = 1;
        if !node.shape.is_empty() {
            count = self.read_u32()? as usize;
            if !textual {
                // Fixed arrays repeat the element count.
                self.read_u32()?;
            }
        }

        let mut flat = Vec::with_capacity(count.min(self.remaining()));
        match kind {
            NodeKind::Byte => {
                let bytes = self.take(count)?;
                flat.extend(bytes.iter().copied().map(Scalar::Byte));
                self.skip_padding(count)?;
            },
            NodeKind::String | NodeKind::Url => {
                for _ in 0..count {
                    flat.push(Scalar::Str(self.read_string()?));
                }
            },
            _ => {
                for _ in 0..count {
                    flat.push(self.read_number(kind)?);
                }
            },
        }

        Ok(Value::reshape(flat, &node.shape))
    }

    /// Read one numeric element. Types narrower than 32 bits travel as a
    /// full 4-byte integer and are truncated on store.
    fn read_number(&mut self, kind: &NodeKind) -> Result<Scalar, UnpackError> {
        let scalar = match kind {
            NodeKind::Float64 => Scalar::Float64(BigEndian::read_f64(self.take(8)?)),
            NodeKind::Float32 => Scalar::Float32(BigEndian::read_f32(self.take(4)?)),
            NodeKind::Int | NodeKind::Int32 => Scalar::Int32(self.read_i32()?),
            NodeKind::UInt | NodeKind::UInt32 => Scalar::UInt32(self.read_u32()?),
            NodeKind::Int16 => Scalar::Int16(self.read_i32()? as i16),
            NodeKind::UInt16 => Scalar::UInt16(self.read_u32()? as u16),
            NodeKind::Int8 => Scalar::Int8(self.read_i32()? as i8),
            NodeKind::UInt8 => Scalar::UInt8(self.read_u32()? as u8),
            other => return Err(UnpackError::UnsupportedType(other.to_string())),
        };
        Ok(scalar)
    }

    /// Length-prefixed string of single-byte characters, padded to 4 bytes.
    fn read_string(&mut self) -> Result<String, UnpackError> {
        let len = self.read_u32()? as usize;
        let text = self.take(len)?.iter().map(|&b| b as char).collect();
        self.skip_padding(len)?;
        Ok(text)
    }

    fn read_u32(&mut self) -> Result<u32, UnpackError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    fn read_i32(&mut self) -> Result<i32, UnpackError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    fn at_start_of_sequence(&self) -> bool {
        self.buf
            .get(self.pos..self.pos + 4)
            .is_some_and(|bytes| BigEndian::read_u32(bytes) == START_OF_SEQUENCE)
    }

    fn skip_padding(&mut self, len: usize) -> Result<(), UnpackError> {
        self.take((4 - len % 4) % 4).map(|_| ())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], UnpackError> {
        if len > self.remaining() {
            return Err(UnpackError::Underrun {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}

fn is_numeric(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Byte
            | NodeKind::Int
            | NodeKind::UInt
            | NodeKind::Int8
            | NodeKind::UInt8
            | NodeKind::Int16
            | NodeKind::UInt16
            | NodeKind::Int32
            | NodeKind::UInt32
            | NodeKind::Float32
            | NodeKind::Float64
    )
}
