extern crate deflate;

pub mod gzip;
pub mod tag;
pub mod writer;

pub use gzip::GzipOutput;
pub use tag::{Compound, List, NamedCompound, Tag};
pub use writer::{clamp_string, CompoundWriter, Kind, Output, MAX_STRING_LEN};

use std::io;

/// Serializes a tree as big-endian NBT and compresses it with gzip, the envelope used by
/// `.mclevel` and `.schematic` files.
pub fn write_gzip(root: &NamedCompound) -> io::Result<Vec<u8>> {
	CompoundWriter::write_named(root, GzipOutput::new()).finish()
}
