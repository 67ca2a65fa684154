//! MCEdit schematics (`.schematic`). Unlike indev levels these carry no player and no
//! environment, only the blocks and the mobs standing in them.

extern crate classicworld;
extern crate log;
extern crate nbt_turbo;

use std::io;

use classicworld::mapping::entity_compound;
use classicworld::{find_spawn, ClassicWorld, SpawnRandom, TargetProfile};
use log::debug;
use nbt_turbo::{Compound, List, NamedCompound};

pub const ROOT_NAME: &str = "Schematic";

/// Block ID namespace. Classic IDs are a subset of the alpha ones.
pub const MATERIALS: &str = "Alpha";

#[derive(Debug, Clone, PartialEq)]
pub struct Schematic {
	pub width: i16,
	pub height: i16,
	pub length: i16,
	pub blocks: Vec<u8>,
	pub data: Vec<u8>,
	pub spawn: (i16, i16, i16),
	pub entities: Vec<Compound>
}

impl Schematic {
	pub fn from_world<R: SpawnRandom>(world: &ClassicWorld, rng: &mut R) -> Self {
		let blocks = &world.blocks;
		let spawn = world.spawn.unwrap_or_else(|| find_spawn(blocks, rng));

		let entities: Vec<Compound> = world.entities.iter()
			.map(|entity| entity_compound(entity, TargetProfile::Schematic))
			.collect();

		if world.player.is_some() {
			debug!("Schematics cannot store a player, leaving it out");
		}

		Schematic {
			width: blocks.width() as i16,
			height: blocks.height() as i16,
			length: blocks.length() as i16,
			blocks: blocks.blocks.to_vec(),
			data: vec![0; blocks.len()],
			spawn,
			entities
		}
	}

	pub fn to_nbt(&self) -> NamedCompound {
		let (x, y, z) = self.spawn;

		let mut root = Compound::new();
		root
			.insert("Width", self.width)
			.insert("Height", self.height)
			.insert("Length", self.length)
			.insert("Materials", MATERIALS)
			.insert("Blocks", self.blocks.clone())
			.insert("Data", self.data.clone())
			.insert("Spawn", List::I16(vec![x, y, z]))
			.insert("Entities", List::Compound(self.entities.clone()))
			.insert("TileEntities", List::End);

		NamedCompound::new(ROOT_NAME, root)
	}

	pub fn encode(&self) -> io::Result<Vec<u8>> {
		nbt_turbo::write_gzip(&self.to_nbt())
	}
}
