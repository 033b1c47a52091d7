//! dap2 - A client-side decoder for the OPeNDAP DAP2 protocol.
//!
//! dap2 turns the two DAP2 text grammars and the XDR data payload into
//! strongly-typed trees of scientific-dataset values.
//!
//! # Features
//!
//! - DDS parsing into a schema tree of typed nodes
//! - DAS parsing, merged onto the schema, with alias resolution
//! - XDR unpacking of DODS responses into nested value trees
//! - Pluggable document sources for composite loads
//!
//! # Example
//!
//! ```
//! use dap2::parser::parse_dds;
//! use dap2::xdr::{unpack, Scalar};
//!
//! let schema = parse_dds("Dataset { Int32 x[2]; } d;")?;
//! let payload = [0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2];
//! let values = unpack(&payload, &schema)?;
//! assert_eq!(
//!     values.field("x").unwrap().flatten(),
//!     vec![Scalar::Int32(1), Scalar::Int32(2)]
//! );
//! # Ok::<(), dap2::DapError>(())
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod error;
pub mod parser;
pub mod reader;
pub mod schema;
pub mod util;
pub mod xdr;

pub use error::{DapError, ParseError, Result, UnpackError};
pub use reader::{decode_dods, split_dods, DapReader, DodsResponse, FileSource, Source};
pub use schema::{AttrValue, Attributes, NodeKind, SchemaNode};
pub use xdr::{Scalar, Value};
