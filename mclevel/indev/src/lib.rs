//! Indev levels (`.mclevel`), the single-file format that replaced classic saves.

extern crate classicworld;
extern crate log;
extern crate nbt_turbo;

use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use classicworld::mapping::{entity_compound, player_compound};
use classicworld::{find_spawn, ClassicWorld, SpawnRandom, TargetProfile};
use log::debug;
use nbt_turbo::{clamp_string, Compound, List, NamedCompound};

pub const ROOT_NAME: &str = "MinecraftLevel";
pub const DEFAULT_NAME: &str = "A Nice World";

#[derive(Debug, Clone, PartialEq)]
pub struct About {
	/// Seconds since the unix epoch for freshly created levels. Converted levels keep whatever
	/// their source stored.
	pub created_on: i64,
	pub name: String,
	pub author: String
}

impl Default for About {
	fn default() -> Self {
		let created_on = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|elapsed| elapsed.as_secs() as i64)
			.unwrap_or(0);

		About {
			created_on,
			name: DEFAULT_NAME.to_owned(),
			author: String::new()
		}
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Environment {
	pub time_of_day: i16,
	pub sky_brightness: i8,
	pub sky_color: i32,
	pub fog_color: i32,
	pub cloud_color: i32,
	pub cloud_height: i16,
	pub surrounding_ground_type: i8,
	pub surrounding_ground_height: i16,
	pub surrounding_water_type: i8,
	pub surrounding_water_height: i16
}

impl Default for Environment {
	fn default() -> Self {
		Environment {
			time_of_day: 0,
			sky_brightness: 15,
			sky_color: 0x99CCFF,
			fog_color: 0xFFFFFF,
			cloud_color: 0xFFFFFF,
			cloud_height: 66,
			// grass at 23, water at 32
			surrounding_ground_type: 2,
			surrounding_ground_height: 23,
			surrounding_water_type: 8,
			surrounding_water_height: 32
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Map {
	pub width: i16,
	pub length: i16,
	pub height: i16,
	pub spawn: (i16, i16, i16),
	pub blocks: Vec<u8>,
	/// Block metadata, which classic never had. Always zero.
	pub data: Vec<u8>
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndevLevel {
	pub about: About,
	pub environment: Environment,
	pub map: Map,
	/// Mob compounds, followed by the player compound if the level has one.
	pub entities: Vec<Compound>
}

impl IndevLevel {
	/// Builds a level from a decoded world, searching for a spawn if the world has none.
	pub fn from_world<R: SpawnRandom>(world: &ClassicWorld, rng: &mut R) -> Self {
		let mut about = About::default();

		// Classic saves can hold names longer than a tag string once decoded
		if let Some(ref name) = world.name {
			about.name = clamp_string(name).to_owned();
		}

		if let Some(ref author) = world.author {
			about.author = clamp_string(author).to_owned();
		}

		if let Some(time_created) = world.time_created {
			about.created_on = time_created;
		}

		let mut environment = Environment::default();

		if let Some(colors) = world.colors {
			environment.sky_color = colors.sky;
			environment.fog_color = colors.fog;
			environment.cloud_color = colors.cloud;
		}

		let spawn = world.spawn.unwrap_or_else(|| find_spawn(&world.blocks, rng));

		let blocks = &world.blocks;
		let map = Map {
			width: blocks.width() as i16,
			length: blocks.length() as i16,
			height: blocks.height() as i16,
			spawn,
			blocks: blocks.blocks.to_vec(),
			data: vec![0; blocks.len()]
		};

		let mut entities: Vec<Compound> = world.entities.iter()
			.map(|entity| entity_compound(entity, TargetProfile::IndevLevel))
			.collect();

		if let Some(ref player) = world.player {
			entities.push(player_compound(player));
		}

		debug!("Built indev level {:?} with {} entities, spawn at {:?}", about.name, entities.len(), spawn);

		IndevLevel { about, environment, map, entities }
	}

	pub fn to_nbt(&self) -> NamedCompound {
		let about = &self.about;
		let environment = &self.environment;
		let map = &self.map;

		let mut about_tag = Compound::new();
		about_tag
			.insert("CreatedOn", about.created_on)
			.insert("Name", about.name.as_str())
			.insert("Author", about.author.as_str());

		let mut environment_tag = Compound::new();
		environment_tag
			.insert("TimeOfDay", environment.time_of_day)
			.insert("SkyBrightness", environment.sky_brightness)
			.insert("SkyColor", environment.sky_color)
			.insert("FogColor", environment.fog_color)
			.insert("CloudColor", environment.cloud_color)
			.insert("CloudHeight", environment.cloud_height)
			.insert("SurroundingGroundType", environment.surrounding_ground_type)
			.insert("SurroundingGroundHeight", environment.surrounding_ground_height)
			.insert("SurroundingWaterType", environment.surrounding_water_type)
			.insert("SurroundingWaterHeight", environment.surrounding_water_height);

		let (x, y, z) = map.spawn;

		let mut map_tag = Compound::new();
		map_tag
			.insert("Width", map.width)
			.insert("Length", map.length)
			.insert("Height", map.height)
			.insert("Spawn", List::I16(vec![x, y, z]))
			.insert("Blocks", map.blocks.clone())
			.insert("Data", map.data.clone());

		let mut root = Compound::new();
		root
			.insert("About", about_tag)
			.insert("Environment", environment_tag)
			.insert("Map", map_tag)
			.insert("Entities", List::Compound(self.entities.clone()))
			.insert("TileEntities", List::End);

		NamedCompound::new(ROOT_NAME, root)
	}

	/// Renders the level and compresses it into the bytes of a `.mclevel` file.
	pub fn encode(&self) -> io::Result<Vec<u8>> {
		nbt_turbo::write_gzip(&self.to_nbt())
	}
}
