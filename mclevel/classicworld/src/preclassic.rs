use crate::error::DecodeError;
use crate::{BlockVolume, ClassicWorld, PRE_CLASSIC_SIZE};

/// Highest block ID that existed in the pre-classic block set.
pub const MAX_BLOCK_ID: u8 = 49;

/// Decodes a pre-classic save: a bare 256x256x64 block array.
pub fn decode(buffer: &[u8]) -> Result<ClassicWorld, DecodeError> {
	let (width, length, height) = PRE_CLASSIC_SIZE;

	if buffer.len() != width * length * height {
		return Err(DecodeError::InvalidPreClassicSize(buffer.len()));
	}

	if let Some((index, &id)) = buffer.iter().enumerate().find(|&(_, &id)| id > MAX_BLOCK_ID) {
		return Err(DecodeError::InvalidPreClassicBlockId { index, id });
	}

	let blocks = BlockVolume::new(buffer.into(), width, height, length)?;

	Ok(ClassicWorld::from_blocks(blocks))
}
