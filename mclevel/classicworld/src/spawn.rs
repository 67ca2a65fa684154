use java_rand::Random;
use log::{debug, warn};

use crate::BlockVolume;

/// Upper bound on random columns tried before giving up.
pub const SPAWN_ATTEMPTS: usize = 10_000;

/// Spawn height reported when no acceptable column was found.
pub const UNRESOLVED_SPAWN_Y: i16 = -100;

/// Blocks a column can be scanned through: air and both states of water and lava.
pub const PASSABLE_BLOCKS: [u8; 5] = [0, 8, 9, 10, 11];

/// Source of random column coordinates.
pub trait SpawnRandom {
	/// Returns a value in `[0, bound)`. `bound` is always positive.
	fn next_bounded(&mut self, bound: i32) -> i32;
}

impl SpawnRandom for Random {
	fn next_bounded(&mut self, bound: i32) -> i32 {
		self.next_i32_bound(bound)
	}
}

impl<R: SpawnRandom + ?Sized> SpawnRandom for &mut R {
	fn next_bounded(&mut self, bound: i32) -> i32 {
		(**self).next_bounded(bound)
	}
}

pub fn is_passable(block: u8) -> bool {
	PASSABLE_BLOCKS.contains(&block)
}

/// Height of the topmost block in a column that a player could stand on. Columns that are
/// passable all the way down report half the world height.
pub fn column_height(blocks: &BlockVolume, x: usize, z: usize) -> usize {
	(0..blocks.height()).rev()
		.find(|&y| !is_passable(blocks.get(x, y, z)))
		.unwrap_or(blocks.height() / 2)
}

/// Picks a spawn near the middle of the world, above half the world height.
pub fn find_spawn<R: SpawnRandom>(blocks: &BlockVolume, rng: &mut R) -> (i16, i16, i16) {
	let (width, height, length) = (blocks.width() as i32, blocks.height() as i32, blocks.length() as i32);

	let mut x = 0;
	let mut z = 0;

	for attempt in 0..SPAWN_ATTEMPTS {
		x = rng.next_bounded((width / 2).max(1)) + width / 4;
		z = rng.next_bounded((length / 2).max(1)) + length / 4;

		let y = column_height(blocks, x as usize, z as usize) as i32 + 1;

		if y > height / 2 {
			debug!("Found spawn at {}, {}, {} after {} attempt(s)", x, y, z, attempt + 1);

			return (x as i16, y as i16, z as i16);
		}
	}

	warn!("No suitable spawn found after {} attempts, using {}, {}, {}", SPAWN_ATTEMPTS, x, UNRESOLVED_SPAWN_Y, z);

	(x as i16, UNRESOLVED_SPAWN_Y, z as i16)
}
