use log::{debug, info};

use crate::error::DecodeError;
use crate::reader::ByteReader;
use crate::v2::WorldParser;
use crate::{preclassic, v1, v2, ClassicWorld};

/// Magic number at the start of every classic save.
pub const CLASSIC_MAGIC: i32 = 0x271B_B788;

/// Length of the magic number and version byte that precede the body of a classic save.
const HEADER_LEN: usize = 5;

/// The save generation of a decompressed buffer, and so the decoder it goes through.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Format {
	/// A bare block array with no header at all.
	PreClassic,
	/// Name, author, timestamp, dimensions, and blocks.
	ClassicV1,
	/// A serialized level object.
	ClassicV2
}

/// Classifies a decompressed save by its magic number and version byte.
///
/// Buffers without the classic magic are assumed to be pre-classic, leaving the pre-classic
/// decoder to reject them if they are not.
pub fn detect(buffer: &[u8]) -> Result<Format, DecodeError> {
	let mut reader = ByteReader::new(buffer);

	if reader.remaining() < 4 || reader.i32()? != CLASSIC_MAGIC {
		return Ok(Format::PreClassic);
	}

	match reader.u8()? {
		1 => Ok(Format::ClassicV1),
		2 => Ok(Format::ClassicV2),
		version => Err(DecodeError::UnsupportedVersion(version))
	}
}

/// Detects the generation of a decompressed save and decodes it.
pub fn decode<P: WorldParser + ?Sized>(buffer: &[u8], parser: &P) -> Result<ClassicWorld, DecodeError> {
	let format = detect(buffer)?;

	info!("Found {} world format", format.describe());

	let world = match format {
		Format::PreClassic => preclassic::decode(buffer)?,
		Format::ClassicV1 => v1::decode(&buffer[HEADER_LEN..])?,
		Format::ClassicV2 => v2::decode(&buffer[HEADER_LEN..], parser)?
	};

	debug!(
		"Decoded world: {}x{}x{}, {} entities, player: {}, spawn: {:?}",
		world.blocks.width(),
		world.blocks.length(),
		world.blocks.height(),
		world.entities.len(),
		world.player.is_some(),
		world.spawn
	);

	Ok(world)
}

impl Format {
	pub fn describe(self) -> &'static str {
		match self {
			Format::PreClassic => "pre-classic",
			Format::ClassicV1 => "classic version 1",
			Format::ClassicV2 => "classic version 2"
		}
	}
}

#[cfg(test)]
mod test {
	use super::{detect, Format, CLASSIC_MAGIC};
	use crate::DecodeError;

	fn header(version: u8) -> Vec<u8> {
		let mut buffer = CLASSIC_MAGIC.to_be_bytes().to_vec();
		buffer.push(version);

		buffer
	}

	#[test]
	fn test_classic_versions() {
		assert_eq!(detect(&header(1)).unwrap(), Format::ClassicV1);
		assert_eq!(detect(&header(2)).unwrap(), Format::ClassicV2);
	}

	#[test]
	fn test_unsupported_version() {
		match detect(&header(3)) {
			Err(DecodeError::UnsupportedVersion(3)) => (),
			other => panic!("expected UnsupportedVersion(3), got {:?}", other)
		}
	}

	#[test]
	fn test_without_magic_is_pre_classic() {
		assert_eq!(detect(&[1, 2, 3, 4, 5, 6]).unwrap(), Format::PreClassic);
		assert_eq!(detect(&[1, 2]).unwrap(), Format::PreClassic);
		assert_eq!(detect(&[]).unwrap(), Format::PreClassic);
	}

	#[test]
	fn test_magic_without_version() {
		match detect(&CLASSIC_MAGIC.to_be_bytes()) {
			Err(DecodeError::UnexpectedEof { needed: 1, remaining: 0 }) => (),
			other => panic!("expected UnexpectedEof, got {:?}", other)
		}
	}
}
