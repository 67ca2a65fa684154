use log::debug;

use crate::entity::{EntityRecord, PlayerRecord};
use crate::error::DecodeError;
use crate::{BlockVolume, ClassicWorld, Colors};

/// A level as a version 2 parser reports it, in the source's own terms.
///
/// Classic levels call the horizontal Z extent `height` and the vertical extent `depth`.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRecord {
	pub name: String,
	pub creator: String,
	pub create_time: i64,
	pub width: i32,
	pub height: i32,
	pub depth: i32,
	pub x_spawn: i32,
	pub y_spawn: i32,
	pub z_spawn: i32,
	pub sky_color: i32,
	pub fog_color: i32,
	pub cloud_color: i32,
	pub blocks: Vec<u8>,
	pub entities: Vec<EntityRecord>,
	pub player: Option<PlayerRecord>
}

/// Parses the body of a version 2 save into a level record.
pub trait WorldParser {
	type Error: std::error::Error + Send + Sync + 'static;

	fn parse(&self, body: &[u8]) -> Result<LevelRecord, Self::Error>;
}

/// Spawns are stored as shorts by both targets. Out-of-range values saturate instead of
/// wrapping around to the other side of the world.
fn clamp_coordinate(value: i32) -> i16 {
	value.max(i16::MIN as i32).min(i16::MAX as i32) as i16
}

pub fn decode<P: WorldParser + ?Sized>(body: &[u8], parser: &P) -> Result<ClassicWorld, DecodeError> {
	let record = parser.parse(body).map_err(|error| DecodeError::Parser(Box::new(error)))?;

	adapt(record)
}

/// Reshapes a parsed level into the intermediate model.
pub fn adapt(record: LevelRecord) -> Result<ClassicWorld, DecodeError> {
	let LevelRecord {
		name,
		creator,
		create_time,
		width,
		height,
		depth,
		x_spawn,
		y_spawn,
		z_spawn,
		sky_color,
		fog_color,
		cloud_color,
		blocks,
		entities,
		player
	} = record;

	let dimension = |size: i32| if size < 0 { 0 } else { size as usize };

	let (width, length, height) = (dimension(width), dimension(height), dimension(depth));
	let blocks = BlockVolume::new(blocks.into_boxed_slice(), width, height, length)?;

	let total = entities.len();

	// The player is carried separately, it must not appear twice.
	let entities: Vec<EntityRecord> = entities.into_iter().filter(|entity| !entity.is_player()).collect();

	debug!("Kept {} of {} entities, dropped {} player avatar(s)", entities.len(), total, total - entities.len());

	Ok(ClassicWorld {
		name: Some(name),
		author: Some(creator),
		time_created: Some(create_time),
		colors: Some(Colors {
			sky: sky_color,
			fog: fog_color,
			cloud: cloud_color
		}),
		spawn: Some((clamp_coordinate(x_spawn), clamp_coordinate(y_spawn), clamp_coordinate(z_spawn))),
		blocks,
		entities,
		player
	})
}

#[cfg(test)]
mod test {
	use super::{decode, LevelRecord, WorldParser};
	use crate::entity::{EntityRecord, Inventory, PlayerRecord, PLAYER_TEXTURE};
	use crate::DecodeError;
	use std::fmt;

	fn record() -> LevelRecord {
		let zombie = EntityRecord { texture: "/mob/zombie.png".to_owned(), ..EntityRecord::default() };
		let avatar = EntityRecord { texture: PLAYER_TEXTURE.to_owned(), ..EntityRecord::default() };

		LevelRecord {
			name: "A Level".to_owned(),
			creator: "notch".to_owned(),
			create_time: 1_250_000_000_000,
			width: 4,
			height: 8,
			depth: 2,
			x_spawn: 1,
			y_spawn: 2,
			z_spawn: 3,
			sky_color: 0x99CCFF,
			fog_color: 0xFFFFFF,
			cloud_color: 0xFFFFFF,
			blocks: vec![1; 64],
			entities: vec![zombie, avatar.clone()],
			player: Some(PlayerRecord { entity: avatar, inventory: Inventory::default(), arrows: 0, score: 7 })
		}
	}

	struct Fixed(LevelRecord);

	impl WorldParser for Fixed {
		type Error = std::io::Error;

		fn parse(&self, _: &[u8]) -> Result<LevelRecord, Self::Error> {
			Ok(self.0.clone())
		}
	}

	#[derive(Debug)]
	struct Broken;

	impl fmt::Display for Broken {
		fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
			write!(f, "broken stream")
		}
	}

	impl std::error::Error for Broken {}

	impl WorldParser for Broken {
		type Error = Broken;

		fn parse(&self, _: &[u8]) -> Result<LevelRecord, Self::Error> {
			Err(Broken)
		}
	}

	#[test]
	fn test_adapter_renames_and_filters() {
		let world = decode(&[], &Fixed(record())).unwrap();

		assert_eq!((world.blocks.width(), world.blocks.length(), world.blocks.height()), (4, 8, 2));
		assert_eq!(world.spawn, Some((1, 2, 3)));
		assert_eq!(world.author.as_deref(), Some("notch"));
		assert_eq!(world.entities.len(), 1);
		assert_eq!(world.entities[0].texture, "/mob/zombie.png");
		assert_eq!(world.player.map(|player| player.score), Some(7));
	}

	#[test]
	fn test_out_of_range_spawn_saturates() {
		let mut record = record();
		record.x_spawn = 40000;
		record.y_spawn = -70000;
		record.z_spawn = 100;

		let world = decode(&[], &Fixed(record)).unwrap();

		assert_eq!(world.spawn, Some((32767, -32768, 100)));
	}

	#[test]
	fn test_block_count_checked() {
		let mut record = record();
		record.blocks.pop();

		match decode(&[], &Fixed(record)) {
			Err(DecodeError::BlockArraySizeMismatch { expected: 64, actual: 63 }) => (),
			other => panic!("expected BlockArraySizeMismatch, got {:?}", other)
		}
	}

	#[test]
	fn test_parser_error_is_surfaced() {
		match decode(&[], &Broken) {
			Err(error @ DecodeError::Parser(_)) => assert_eq!(error.to_string(), "broken stream"),
			other => panic!("expected a parser error, got {:?}", other)
		}
	}
}
