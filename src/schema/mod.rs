//! Schema tree representation.
//!
//! A DDS parses into a tree of [`SchemaNode`]s; a DAS then fills in their
//! [`Attributes`].

mod attribute;
mod node;

pub use attribute::{AttrValue, Attributes};
pub use node::{NodeKind, SchemaNode};
