//! XDR data decoding.
//!
//! Turns the binary part of a DODS response into a [`Value`] tree shaped
//! like the schema that describes it.

mod stats;
mod unpacker;
mod value;

pub use stats::ArrayStats;
pub use unpacker::{unpack, Unpacker, END_OF_SEQUENCE, START_OF_SEQUENCE};
pub use value::{Scalar, Value};
