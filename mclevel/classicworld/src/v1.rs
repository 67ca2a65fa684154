use crate::error::DecodeError;
use crate::reader::ByteReader;
use crate::{BlockVolume, ClassicWorld};

/// Decodes the body of a version 1 classic save, following the magic and version byte.
pub fn decode(body: &[u8]) -> Result<ClassicWorld, DecodeError> {
	let mut reader = ByteReader::new(body);

	let name = reader.string()?;
	let author = reader.string()?;

	// The timestamp is stored as a long, but only its two leading bytes have ever been read back.
	let timestamp = reader.take(8)?;
	let time_created = u16::from_be_bytes([timestamp[0], timestamp[1]]) as i64;

	let width = reader.u16()? as usize;
	let length = reader.u16()? as usize;
	let height = reader.u16()? as usize;

	let blocks = BlockVolume::new(reader.rest().into(), width, height, length)?;

	Ok(ClassicWorld {
		name: Some(name),
		author: Some(author),
		time_created: Some(time_created),
		..ClassicWorld::from_blocks(blocks)
	})
}
