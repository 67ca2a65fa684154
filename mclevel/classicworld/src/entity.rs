/// Texture of the player avatar. Entities wearing it are the player, never a regular mob.
pub const PLAYER_TEXTURE: &str = "/char.png";

/// Number of hot bar slots in a classic inventory.
pub const HOTBAR_SLOTS: usize = 9;

/// Item ID marking an empty inventory slot.
pub const EMPTY_SLOT: i32 = -1;

/// A mob as stored in a classic save.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
	/// Texture path, the only record of which kind of mob this is.
	pub texture: String,
	pub position: [f32; 3],
	pub motion: [f32; 3],
	/// Yaw, then pitch.
	pub rotation: [f32; 2],
	pub fall_distance: f32,
	pub health: i32,
	pub attack_time: i32,
	pub hurt_time: i32,
	pub death_time: i32,
	pub air_supply: i32,
	pub on_ground: bool,
	/// Only meaningful for sheep: whether the sheep still has its wool.
	pub has_hair: bool
}

impl EntityRecord {
	pub fn is_player(&self) -> bool {
		self.texture == PLAYER_TEXTURE
	}
}

impl Default for EntityRecord {
	fn default() -> Self {
		EntityRecord {
			texture: String::new(),
			position: [0.0; 3],
			motion: [0.0; 3],
			rotation: [0.0; 2],
			fall_distance: 0.0,
			health: 20,
			attack_time: 0,
			hurt_time: 0,
			death_time: 0,
			air_supply: 300,
			on_ground: false,
			has_hair: true
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
	pub entity: EntityRecord,
	pub inventory: Inventory,
	pub arrows: i32,
	pub score: i32
}

/// The hot bar. Each slot holds an item ID, or [`EMPTY_SLOT`], and a count.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Inventory {
	pub slots: [i32; HOTBAR_SLOTS],
	pub counts: [i32; HOTBAR_SLOTS]
}

impl Inventory {
	/// Builds an inventory from arrays of any length, padding with empty slots.
	pub fn from_arrays(slots: &[i32], counts: &[i32]) -> Self {
		let mut inventory = Inventory::default();

		for (slot, &id) in inventory.slots.iter_mut().zip(slots) {
			*slot = id;
		}

		for (count, &value) in inventory.counts.iter_mut().zip(counts) {
			*count = value;
		}

		inventory
	}
}

impl Default for Inventory {
	fn default() -> Self {
		Inventory {
			slots: [EMPTY_SLOT; HOTBAR_SLOTS],
			counts: [0; HOTBAR_SLOTS]
		}
	}
}
