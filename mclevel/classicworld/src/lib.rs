extern crate byteorder;
extern crate java_rand;
extern crate jserial;
extern crate log;
extern crate nbt_turbo;
extern crate thiserror;

pub mod entity;
pub mod format;
pub mod mapping;
pub mod reader;
pub mod serialized;
pub mod spawn;

mod error;
mod preclassic;
mod v1;
mod v2;

pub use entity::{EntityRecord, Inventory, PlayerRecord};
pub use error::DecodeError;
pub use format::{decode, detect, Format};
pub use mapping::TargetProfile;
pub use serialized::{SerializedError, SerializedParser};
pub use spawn::{find_spawn, SpawnRandom};
pub use v2::{LevelRecord, WorldParser};

/// Dimensions of a pre-classic world, the only size that generation could save.
pub const PRE_CLASSIC_SIZE: (usize, usize, usize) = (256, 256, 64);

/// Largest dimension representable by the target formats, which store sizes as shorts.
pub const MAX_DIMENSION: usize = 32767;

/// A decoded world, independent of which generation it came from or which format it will be
/// written as. Anything the source generation does not store is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicWorld {
	pub name: Option<String>,
	pub author: Option<String>,
	pub time_created: Option<i64>,
	pub colors: Option<Colors>,
	/// Absent spawns must be computed by [`spawn::find_spawn`].
	pub spawn: Option<(i16, i16, i16)>,
	pub blocks: BlockVolume,
	pub entities: Vec<EntityRecord>,
	pub player: Option<PlayerRecord>
}

impl ClassicWorld {
	/// A world with nothing but blocks, as stored by the generations without metadata.
	pub fn from_blocks(blocks: BlockVolume) -> Self {
		ClassicWorld {
			name: None,
			author: None,
			time_created: None,
			colors: None,
			spawn: None,
			blocks,
			entities: Vec::new(),
			player: None
		}
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Colors {
	pub sky: i32,
	pub fog: i32,
	pub cloud: i32
}

/// Flat block storage in YZX order. `x_size` is the width, `y_size` the height, and `z_size`
/// the length of the world.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockVolume {
	pub blocks: Box<[u8]>,
	pub x_size: usize,
	pub y_size: usize,
	pub z_size: usize
}

impl BlockVolume {
	/// Wraps a block array, checking the dimensions and that the array covers them exactly.
	pub fn new(blocks: Box<[u8]>, width: usize, height: usize, length: usize) -> Result<Self, DecodeError> {
		let dimensions_valid = [width, height, length].iter().all(|&size| size > 0 && size <= MAX_DIMENSION);

		if !dimensions_valid {
			return Err(DecodeError::InvalidDimensions { width, length, height });
		}

		let expected = width * height * length;

		if blocks.len() != expected {
			return Err(DecodeError::BlockArraySizeMismatch { expected, actual: blocks.len() });
		}

		Ok(BlockVolume { blocks, x_size: width, y_size: height, z_size: length })
	}

	pub fn width(&self) -> usize {
		self.x_size
	}

	pub fn height(&self) -> usize {
		self.y_size
	}

	pub fn length(&self) -> usize {
		self.z_size
	}

	pub fn len(&self) -> usize {
		self.blocks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.blocks.is_empty()
	}

	pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
		assert!(x < self.x_size);
		assert!(y < self.y_size);
		assert!(z < self.z_size);

		(y * self.z_size + z) * self.x_size + x
	}

	pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
		self.blocks[self.index(x, y, z)]
	}
}

#[cfg(test)]
mod test {
	use super::{BlockVolume, DecodeError};

	#[test]
	fn test_index_order() {
		let volume = BlockVolume::new(vec![0; 4 * 3 * 2].into_boxed_slice(), 4, 3, 2).unwrap();

		assert_eq!(volume.index(1, 0, 0), 1);
		assert_eq!(volume.index(0, 0, 1), 4);
		assert_eq!(volume.index(0, 1, 0), 8);
		assert_eq!(volume.index(3, 2, 1), 23);
	}

	#[test]
	fn test_rejects_mismatched_array() {
		match BlockVolume::new(vec![0; 5].into_boxed_slice(), 2, 2, 2) {
			Err(DecodeError::BlockArraySizeMismatch { expected: 8, actual: 5 }) => (),
			other => panic!("expected BlockArraySizeMismatch, got {:?}", other)
		}
	}

	#[test]
	fn test_rejects_zero_dimension() {
		match BlockVolume::new(Vec::new().into_boxed_slice(), 0, 2, 2) {
			Err(DecodeError::InvalidDimensions { width: 0, .. }) => (),
			other => panic!("expected InvalidDimensions, got {:?}", other)
		}
	}
}
