//! Converts classic saves into indev levels or schematics.

extern crate byteorder;
extern crate classicworld;
extern crate flate2;
extern crate indev;
extern crate java_rand;
extern crate log;
extern crate schematic;
extern crate thiserror;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{ByteOrder, LittleEndian};
use classicworld::{DecodeError, SerializedParser, SpawnRandom};
use flate2::read::GzDecoder;
use indev::IndevLevel;
use java_rand::Random;
use log::{debug, info, warn};
use schematic::Schematic;
use thiserror::Error;

pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Extensions of classic save files.
pub const INPUT_EXTENSIONS: [&str; 2] = ["dat", "mine"];

/// Header and trailer of a gzip member with no payload.
const GZIP_MIN_LEN: usize = 18;

/// Cap on how much is reserved up front from the size a gzip trailer claims.
const MAX_RESERVATION: usize = 1 << 28;

#[derive(Debug, Error)]
pub enum Error {
	#[error("input is not a gzip file")]
	NotGzip,

	#[error(transparent)]
	Io(#[from] io::Error),

	#[error(transparent)]
	Decode(#[from] DecodeError)
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Target {
	IndevLevel,
	Schematic
}

impl Target {
	pub fn extension(self) -> &'static str {
		match self {
			Target::IndevLevel => "mclevel",
			Target::Schematic => "schematic"
		}
	}
}

impl FromStr for Target {
	type Err = String;

	fn from_str(name: &str) -> Result<Self, String> {
		match name {
			"indev_level" => Ok(Target::IndevLevel),
			"schematic" => Ok(Target::Schematic),
			other => Err(format!("unknown output format {:?}, expected indev_level or schematic", other))
		}
	}
}

/// Unwraps the gzip envelope of a save.
///
/// The trailer's size field sizes the output buffer. The decoder checks it against what was
/// actually decompressed, so a corrupt trailer fails as `Error::Io`.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, Error> {
	if bytes.len() < 2 || bytes[..2] != GZIP_MAGIC {
		return Err(Error::NotGzip);
	}

	let declared = if bytes.len() >= GZIP_MIN_LEN {
		LittleEndian::read_u32(&bytes[bytes.len() - 4..]) as usize
	} else {
		0
	};

	if declared > MAX_RESERVATION {
		warn!("Gzip trailer declares {} bytes, reserving only {}", declared, MAX_RESERVATION);
	}

	let mut buffer = Vec::with_capacity(declared.min(MAX_RESERVATION));
	GzDecoder::new(bytes).read_to_end(&mut buffer)?;

	debug!("Decompressed {} bytes into {}", bytes.len(), buffer.len());

	Ok(buffer)
}

/// Runs the whole pipeline in memory, returning the compressed output file.
pub fn convert_bytes<R: SpawnRandom>(input: &[u8], target: Target, rng: &mut R) -> Result<Vec<u8>, Error> {
	let buffer = decompress(input)?;
	let world = classicworld::decode(&buffer, &SerializedParser)?;

	let encoded = match target {
		Target::IndevLevel => IndevLevel::from_world(&world, rng).encode()?,
		Target::Schematic => Schematic::from_world(&world, rng).encode()?
	};

	Ok(encoded)
}

/// The output file sits next to the input, with the extension of the target format.
pub fn output_path(input: &Path, target: Target) -> PathBuf {
	input.with_extension(target.extension())
}

/// A seed that differs between runs, for when none was asked for.
pub fn time_seed() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.as_nanos() as u64)
		.unwrap_or(0)
}

/// Converts a save file, writing the result next to it. Nothing is written unless the whole
/// conversion succeeds.
pub fn convert_file(input: &Path, target: Target, seed: u64) -> Result<PathBuf, Error> {
	let bytes = fs::read(input)?;

	debug!("Read {} bytes from {}, spawn seed {}", bytes.len(), input.display(), seed);

	let mut rng = Random::new(seed);
	let encoded = convert_bytes(&bytes, target, &mut rng)?;

	let output = output_path(input, target);
	fs::write(&output, encoded)?;

	info!("Generated {}", output.display());

	Ok(output)
}

#[cfg(test)]
mod test {
	use super::{convert_bytes, decompress, output_path, Error, Target};
	use classicworld::DecodeError;
	use flate2::write::GzEncoder;
	use flate2::Compression;
	use java_rand::Random;
	use std::io::Write;
	use std::path::Path;

	fn gzip(bytes: &[u8]) -> Vec<u8> {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(bytes).unwrap();
		encoder.finish().unwrap()
	}

	/// A classic version 1 save: 8x8x8 with a stone floor at y = 5.
	fn classic_v1() -> Vec<u8> {
		classic_v1_named("Level")
	}

	fn classic_v1_named(name: &str) -> Vec<u8> {
		let mut bytes = vec![0x27, 0x1B, 0xB7, 0x88, 0x01];

		for string in &[name, "Player"] {
			bytes.extend_from_slice(&(string.len() as u16).to_be_bytes());
			bytes.extend_from_slice(string.as_bytes());
		}

		bytes.extend_from_slice(&[0; 8]);

		for _ in 0..3 {
			bytes.extend_from_slice(&8u16.to_be_bytes());
		}

		for y in 0..8 {
			bytes.extend(std::iter::repeat(if y <= 5 { 1 } else { 0 }).take(64));
		}

		bytes
	}

	#[test]
	fn test_decompress_round_trip() {
		let payload = classic_v1();

		assert_eq!(decompress(&gzip(&payload)).unwrap(), payload);
	}

	#[test]
	fn test_corrupt_trailer_size() {
		let mut compressed = gzip(&classic_v1());
		let len = compressed.len();

		compressed[len - 4..].copy_from_slice(&7u32.to_le_bytes());

		match decompress(&compressed) {
			Err(Error::Io(_)) => (),
			other => panic!("expected an I/O error, got {:?}", other.map(|buffer| buffer.len()))
		}
	}

	#[test]
	fn test_not_gzip() {
		match decompress(&classic_v1()) {
			Err(Error::NotGzip) => (),
			other => panic!("expected NotGzip, got {:?}", other)
		}

		match decompress(&[0x1F]) {
			Err(Error::NotGzip) => (),
			other => panic!("expected NotGzip, got {:?}", other)
		}
	}

	#[test]
	fn test_convert_to_indev() {
		let output = convert_bytes(&gzip(&classic_v1()), Target::IndevLevel, &mut Random::new(1)).unwrap();
		let nbt = decompress(&output).unwrap();

		assert_eq!(&nbt[..17], b"\x0A\x00\x0EMinecraftLevel");
	}

	#[test]
	fn test_convert_to_schematic() {
		let output = convert_bytes(&gzip(&classic_v1()), Target::Schematic, &mut Random::new(1)).unwrap();
		let nbt = decompress(&output).unwrap();

		assert_eq!(&nbt[..12], b"\x0A\x00\x09Schematic");
	}

	#[test]
	fn test_long_level_name() {
		let save = classic_v1_named(&"a".repeat(40000));

		assert!(convert_bytes(&gzip(&save), Target::IndevLevel, &mut Random::new(1)).is_ok());
		assert!(convert_bytes(&gzip(&save), Target::Schematic, &mut Random::new(1)).is_ok());
	}

	#[test]
	fn test_decode_errors_surface() {
		let mut save = classic_v1();
		save[4] = 3;

		match convert_bytes(&gzip(&save), Target::Schematic, &mut Random::new(1)) {
			Err(Error::Decode(DecodeError::UnsupportedVersion(3))) => (),
			other => panic!("expected UnsupportedVersion, got {:?}", other)
		}
	}

	#[test]
	fn test_output_path() {
		assert_eq!(output_path(Path::new("saves/level.dat"), Target::IndevLevel), Path::new("saves/level.mclevel"));
		assert_eq!(output_path(Path::new("world.mine"), Target::Schematic), Path::new("world.schematic"));
	}

	#[test]
	fn test_target_names() {
		assert_eq!("indev_level".parse(), Ok(Target::IndevLevel));
		assert_eq!("schematic".parse(), Ok(Target::Schematic));
		assert!("alpha".parse::<Target>().is_err());
	}
}
