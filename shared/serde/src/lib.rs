//! # Arbor Serde
//! Byte-oriented wire primitives shared by every arbor crate. All integers
//! are little-endian, strings are UTF-8 with a u16 byte-length prefix and
//! sequences carry a u32 element count.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod error;
mod integer;
mod number;
mod serde;
mod wire_reader;
mod wire_writer;

pub use error::SerdeErr;
pub use number::Vec2;
pub use serde::Serde;
pub use wire_reader::WireReader;
pub use wire_writer::{WireWrite, WireWriter};
