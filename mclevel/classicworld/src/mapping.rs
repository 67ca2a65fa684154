//! Translates decoded entities into the entity compounds of the target formats.

use nbt_turbo::{Compound, List};

use crate::entity::{EntityRecord, PlayerRecord, EMPTY_SLOT, HOTBAR_SLOTS};

/// Texture paths of the classic mobs and the entity IDs they become. The first entry doubles
/// as the fallback for textures that are not listed.
pub const MOB_TEXTURES: &[(&str, &str)] = &[
	("/mob/zombie.png", "Zombie"),
	("/mob/skeleton.png", "Skeleton"),
	("/mob/creeper.png", "Creeper"),
	("/mob/spider.png", "Spider"),
	("/mob/pig.png", "Pig"),
	("/mob/sheep.png", "Sheep")
];

pub const PLAYER_ID: &str = "LocalPlayer";

/// Entities are never on fire after a conversion.
pub const NOT_BURNING: i16 = -1;

pub const ARROW_ID: i16 = 262;
pub const BOW_ID: i16 = 261;
pub const ARROW_SLOT: i8 = 9;
pub const BOW_SLOT: i8 = 10;

/// The format an entity is being written for. The two formats disagree on the precision of
/// positions and on whether `OnGround` is stored.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TargetProfile {
	IndevLevel,
	Schematic
}

impl TargetProfile {
	fn vector(self, values: [f32; 3]) -> List {
		match self {
			TargetProfile::IndevLevel => List::F32(values.to_vec()),
			TargetProfile::Schematic => List::F64(values.iter().map(|&value| value as f64).collect())
		}
	}
}

pub fn mob_id(texture: &str) -> &'static str {
	MOB_TEXTURES.iter()
		.find(|(path, _)| *path == texture)
		.unwrap_or(&MOB_TEXTURES[0])
		.1
}

/// Physical state shared by mobs and the player.
fn physics(compound: &mut Compound, entity: &EntityRecord, profile: TargetProfile) {
	compound
		.insert("Pos", profile.vector(entity.position))
		.insert("Motion", profile.vector(entity.motion))
		.insert("Rotation", List::F32(entity.rotation.to_vec()))
		.insert("FallDistance", entity.fall_distance)
		.insert("Health", entity.health as i16)
		.insert("AttackTime", entity.attack_time as i16)
		.insert("HurtTime", entity.hurt_time as i16)
		.insert("DeathTime", entity.death_time as i16)
		.insert("Air", entity.air_supply as i16)
		.insert("Fire", NOT_BURNING);

	if profile == TargetProfile::Schematic {
		compound.insert("OnGround", entity.on_ground);
	}
}

pub fn entity_compound(entity: &EntityRecord, profile: TargetProfile) -> Compound {
	let id = mob_id(&entity.texture);

	let mut compound = Compound::new();
	compound.insert("id", id);

	physics(&mut compound, entity, profile);

	if id == "Sheep" {
		compound.insert("Sheared", !entity.has_hair);
	}

	compound
}

/// The player is only stored by indev levels, always with single precision positions.
pub fn player_compound(player: &PlayerRecord) -> Compound {
	let mut compound = Compound::new();
	compound.insert("id", PLAYER_ID);

	physics(&mut compound, &player.entity, TargetProfile::IndevLevel);

	compound
		.insert("Score", player.score)
		.insert("Inventory", inventory_list(player));

	compound
}

fn item(slot: i8, id: i16, count: i8) -> Compound {
	let mut compound = Compound::new();

	compound
		.insert("Slot", slot)
		.insert("id", id)
		.insert("Damage", 0i16)
		.insert("Count", count);

	compound
}

/// The hot bar, then the arrows if there are any, then the bow every player carries.
pub fn inventory_list(player: &PlayerRecord) -> List {
	let inventory = &player.inventory;
	let mut items = Vec::with_capacity(HOTBAR_SLOTS + 2);

	for slot in 0..HOTBAR_SLOTS {
		if inventory.slots[slot] != EMPTY_SLOT {
			items.push(item(slot as i8, inventory.slots[slot] as i16, inventory.counts[slot] as i8));
		}
	}

	if player.arrows > 0 {
		items.push(item(ARROW_SLOT, ARROW_ID, player.arrows as i8));
	}

	items.push(item(BOW_SLOT, BOW_ID, 1));

	List::Compound(items)
}
