//! Extracts a level from the object stream written by classic's `Level` serialization.

use std::collections::HashSet;

use jserial::{Array, Object, Stream, Value};
use log::debug;
use thiserror::Error;

use crate::entity::{EntityRecord, Inventory, PlayerRecord, PLAYER_TEXTURE};
use crate::v2::{LevelRecord, WorldParser};

pub const DEFAULT_SKY_COLOR: i32 = 0x99CCFF;
pub const DEFAULT_FOG_COLOR: i32 = 0xFFFFFF;
pub const DEFAULT_CLOUD_COLOR: i32 = 0xFFFFFF;

#[derive(Debug, Error)]
pub enum SerializedError {
	#[error(transparent)]
	Stream(#[from] jserial::Error),

	#[error("the object stream does not contain a level")]
	MissingLevel,

	#[error("the level has no `{0}` field")]
	MissingField(&'static str),

	#[error("the level field `{0}` has an unexpected type")]
	MistypedField(&'static str)
}

/// The default [`WorldParser`], reading the Java object stream directly.
#[derive(Debug, Default, Copy, Clone)]
pub struct SerializedParser;

impl WorldParser for SerializedParser {
	type Error = SerializedError;

	fn parse(&self, body: &[u8]) -> Result<LevelRecord, SerializedError> {
		let stream = Stream::parse(body)?;

		debug!("Object stream has {} top level value(s)", stream.roots().len());

		let level = stream.roots().iter()
			.filter_map(|root| stream.object(root))
			.find(|object| object.field("blocks").is_some())
			.ok_or(SerializedError::MissingLevel)?;

		read_level(&stream, level)
	}
}

struct Fields<'s> {
	stream: &'s Stream,
	object: &'s Object
}

impl<'s> Fields<'s> {
	fn new(stream: &'s Stream, object: &'s Object) -> Self {
		Fields { stream, object }
	}

	fn value(&self, name: &'static str) -> Result<&'s Value, SerializedError> {
		self.object.field(name).ok_or(SerializedError::MissingField(name))
	}

	fn require_i32(&self, name: &'static str) -> Result<i32, SerializedError> {
		self.value(name)?.as_i32().ok_or(SerializedError::MistypedField(name))
	}

	fn i32(&self, name: &str) -> Option<i32> {
		self.object.field(name).and_then(Value::as_i32)
	}

	fn i64(&self, name: &str) -> Option<i64> {
		self.object.field(name).and_then(Value::as_i64)
	}

	fn f32(&self, name: &str) -> Option<f32> {
		self.object.field(name).and_then(Value::as_f32)
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self.object.field(name).and_then(Value::as_bool)
	}

	fn string(&self, name: &str) -> Option<&'s str> {
		self.object.field(name).and_then(|value| self.stream.string(value))
	}

	fn object(&self, name: &str) -> Option<&'s Object> {
		self.object.field(name).and_then(|value| self.stream.object(value))
	}

	fn int_array(&self, name: &str) -> Option<&'s [i32]> {
		match self.object.field(name).and_then(|value| self.stream.array(value)) {
			Some(Array::Int(values)) => Some(values),
			_ => None
		}
	}
}

fn read_level(stream: &Stream, level: &Object) -> Result<LevelRecord, SerializedError> {
	let fields = Fields::new(stream, level);

	let blocks = match stream.array(fields.value("blocks")?) {
		Some(Array::Byte(blocks)) => blocks.clone(),
		_ => return Err(SerializedError::MistypedField("blocks"))
	};

	let entities = match level.field("blockMap") {
		Some(block_map) => reachable_entities(stream, block_map),
		None => Vec::new()
	};

	let player = entities.iter()
		.find(|object| Fields::new(stream, object).string("textureName") == Some(PLAYER_TEXTURE))
		.copied()
		.or_else(|| fields.object("player"))
		.map(|object| read_player(stream, object));

	debug!("Found {} entities, player present: {}", entities.len(), player.is_some());

	Ok(LevelRecord {
		name: fields.string("name").unwrap_or("").to_owned(),
		creator: fields.string("creator").unwrap_or("").to_owned(),
		create_time: fields.i64("createTime").unwrap_or(0),
		width: fields.require_i32("width")?,
		height: fields.require_i32("height")?,
		depth: fields.require_i32("depth")?,
		x_spawn: fields.require_i32("xSpawn")?,
		y_spawn: fields.require_i32("ySpawn")?,
		z_spawn: fields.require_i32("zSpawn")?,
		sky_color: fields.i32("skyColor").unwrap_or(DEFAULT_SKY_COLOR),
		fog_color: fields.i32("fogColor").unwrap_or(DEFAULT_FOG_COLOR),
		cloud_color: fields.i32("cloudColor").unwrap_or(DEFAULT_CLOUD_COLOR),
		blocks,
		entities: entities.into_iter().map(|object| read_entity(stream, object)).collect(),
		player
	})
}

/// Every object with a texture that can be reached from `start`, in depth first order.
/// Entities are referenced from several grids at once, each is reported once.
fn reachable_entities<'s>(stream: &'s Stream, start: &'s Value) -> Vec<&'s Object> {
	let mut visited = HashSet::new();
	let mut pending = vec![start];
	let mut found = Vec::new();

	while let Some(value) = pending.pop() {
		let handle = match value.as_handle() {
			Some(handle) => handle,
			None => continue
		};

		if !visited.insert(handle) {
			continue;
		}

		if let Some(object) = stream.object(value) {
			if Fields::new(stream, object).string("textureName").is_some() {
				found.push(object);
			}
		}

		pending.extend(stream.children(value).into_iter().rev());
	}

	found
}

fn read_entity(stream: &Stream, object: &Object) -> EntityRecord {
	let fields = Fields::new(stream, object);
	let defaults = EntityRecord::default();

	let float = |name, default| fields.f32(name).unwrap_or(default);
	let int = |name, default| fields.i32(name).unwrap_or(default);

	EntityRecord {
		texture: fields.string("textureName").unwrap_or("").to_owned(),
		position: [float("x", 0.0), float("y", 0.0), float("z", 0.0)],
		motion: [float("xd", 0.0), float("yd", 0.0), float("zd", 0.0)],
		rotation: [float("yRot", 0.0), float("xRot", 0.0)],
		fall_distance: float("fallDistance", defaults.fall_distance),
		health: int("health", defaults.health),
		attack_time: int("attackTime", defaults.attack_time),
		hurt_time: int("hurtTime", defaults.hurt_time),
		death_time: int("deathTime", defaults.death_time),
		air_supply: int("airSupply", defaults.air_supply),
		on_ground: fields.bool("onGround").unwrap_or(defaults.on_ground),
		has_hair: fields.bool("hasFur").or_else(|| fields.bool("hasHair")).unwrap_or(defaults.has_hair)
	}
}

fn read_player(stream: &Stream, object: &Object) -> PlayerRecord {
	let fields = Fields::new(stream, object);

	let inventory = match fields.object("inventory") {
		Some(inventory) => {
			let inventory = Fields::new(stream, inventory);

			Inventory::from_arrays(
				inventory.int_array("slots").unwrap_or(&[]),
				inventory.int_array("count").unwrap_or(&[])
			)
		},
		None => Inventory::default()
	};

	PlayerRecord {
		entity: read_entity(stream, object),
		inventory,
		arrows: fields.i32("arrows").unwrap_or(0),
		score: fields.i32("score").unwrap_or(0)
	}
}

#[cfg(test)]
mod test {
	use super::{SerializedError, SerializedParser};
	use crate::entity::EMPTY_SLOT;
	use crate::v2::WorldParser;
	use jserial::builder::StreamBuilder;

	const STRING: Option<&str> = Some("Ljava/lang/String;");

	/// Starts a level the way a save does, with its descriptor inline, and writes every field
	/// up to and including the blocks.
	fn level_header(builder: &mut StreamBuilder) {
		builder.object_new_class("com.mojang.minecraft.level.Level", &[
			(b'J', "createTime", None),
			(b'I', "depth", None),
			(b'I', "height", None),
			(b'I', "width", None),
			(b'I', "xSpawn", None),
			(b'I', "ySpawn", None),
			(b'I', "zSpawn", None),
			(b'[', "blocks", Some("[B")),
			(b'L', "blockMap", Some("Lcom/mojang/minecraft/level/BlockMap;")),
			(b'L', "creator", STRING),
			(b'L', "name", STRING)
		], None);

		builder.long(1_250_000_000_000);
		builder.int(2);
		builder.int(4);
		builder.int(4);
		builder.int(1);
		builder.int(2);
		builder.int(3);
		builder.byte_array(&[1; 32]);
	}

	fn mob_fields(builder: &mut StreamBuilder, x: f32, health: i32, on_ground: bool, texture: &str) {
		builder.float(x);
		builder.int(health);
		builder.bool(on_ground);
		builder.string(texture);
	}

	#[test]
	fn test_level_with_entities() {
		let mut builder = StreamBuilder::new();

		let mob = builder.class("com.mojang.minecraft.mob.Mob", &[
			(b'F', "x", None),
			(b'I', "health", None),
			(b'Z', "onGround", None),
			(b'L', "textureName", STRING)
		], None);
		let sheep = builder.class("com.mojang.minecraft.mob.Sheep", &[(b'Z', "hasFur", None)], Some(mob));
		let inventory = builder.class("com.mojang.minecraft.player.Inventory", &[
			(b'[', "count", Some("[I")),
			(b'[', "slots", Some("[I"))
		], None);
		let player = builder.class("com.mojang.minecraft.player.Player", &[
			(b'I', "arrows", None),
			(b'I', "score", None),
			(b'L', "inventory", Some("Lcom/mojang/minecraft/player/Inventory;"))
		], Some(mob));

		level_header(&mut builder);

		// blockMap holds every entity in `all`, and again in a grid
		builder.object_new_class("com.mojang.minecraft.level.BlockMap", &[
			(b'L', "all", Some("[Ljava/lang/Object;")),
			(b'L', "grid", Some("[Ljava/lang/Object;"))
		], None);

		builder.object_array(3);

		let sheared = builder.object(sheep);
		mob_fields(&mut builder, 12.5, 8, true, "/mob/sheep.png");
		builder.bool(false);

		builder.object_new_class("com.mojang.minecraft.mob.Pig", &[], Some(mob));
		mob_fields(&mut builder, 7.0, 10, false, "/mob/pig.png");

		builder.object(player);
		mob_fields(&mut builder, 3.0, 20, false, "/char.png");
		builder.int(3);
		builder.int(99);
		builder.object(inventory);
		builder.int_array(&[5]);
		builder.int_array(&[1]);

		builder.object_array(1);
		builder.reference(sheared);

		builder.string("notch");
		builder.string("A Level");

		let record = SerializedParser.parse(&builder.finish()).unwrap();

		assert_eq!((record.width, record.height, record.depth), (4, 4, 2));
		assert_eq!((record.x_spawn, record.y_spawn, record.z_spawn), (1, 2, 3));
		assert_eq!(record.create_time, 1_250_000_000_000);
		assert_eq!(record.name, "A Level");
		assert_eq!(record.creator, "notch");
		assert_eq!(record.blocks.len(), 32);
		assert_eq!(record.sky_color, super::DEFAULT_SKY_COLOR);

		let textures: Vec<&str> = record.entities.iter().map(|entity| entity.texture.as_str()).collect();
		assert_eq!(textures, ["/mob/sheep.png", "/mob/pig.png", "/char.png"]);

		let sheep = &record.entities[0];
		assert_eq!(sheep.position[0], 12.5);
		assert_eq!(sheep.health, 8);
		assert!(sheep.on_ground);
		assert!(!sheep.has_hair);

		let pig = &record.entities[1];
		assert_eq!(pig.position[0], 7.0);
		assert_eq!(pig.health, 10);
		assert!(pig.has_hair);

		let player = record.player.unwrap();
		assert_eq!(player.entity.position[0], 3.0);
		assert_eq!(player.arrows, 3);
		assert_eq!(player.score, 99);
		assert_eq!(player.inventory.slots[..2], [1, EMPTY_SLOT]);
		assert_eq!(player.inventory.counts[0], 5);
	}

	#[test]
	fn test_level_without_block_map() {
		let mut builder = StreamBuilder::new();

		level_header(&mut builder);
		builder.null();
		builder.null();
		builder.string("Untitled");

		let record = SerializedParser.parse(&builder.finish()).unwrap();

		assert!(record.entities.is_empty());
		assert!(record.player.is_none());
		assert_eq!(record.creator, "");
		assert_eq!(record.name, "Untitled");
	}

	#[test]
	fn test_missing_level() {
		let mut builder = StreamBuilder::new();
		builder.string("not a level");

		match SerializedParser.parse(&builder.finish()) {
			Err(SerializedError::MissingLevel) => (),
			other => panic!("expected MissingLevel, got {:?}", other)
		}
	}

	#[test]
	fn test_missing_dimension() {
		let mut builder = StreamBuilder::new();

		builder.object_new_class("Level", &[(b'I', "width", None), (b'[', "blocks", Some("[B"))], None);
		builder.int(1);
		builder.byte_array(&[0]);

		match SerializedParser.parse(&builder.finish()) {
			Err(SerializedError::MissingField("height")) => (),
			other => panic!("expected MissingField, got {:?}", other)
		}
	}

	#[test]
	fn test_mistyped_blocks() {
		let mut builder = StreamBuilder::new();

		builder.object_new_class("Level", &[(b'[', "blocks", Some("[I"))], None);
		builder.int_array(&[0]);

		match SerializedParser.parse(&builder.finish()) {
			Err(SerializedError::MistypedField("blocks")) => (),
			other => panic!("expected MistypedField, got {:?}", other)
		}
	}
}
